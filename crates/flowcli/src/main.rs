// crates/flowcli/src/main.rs

mod flows;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use flowcore::{ExecutionEvent, FlowConfig, FlowContext, FlowDefinition, SessionProvider};
use flowruntime::{Flow, FlowRuntime, RouteStatus, RuntimeConfig};
use flowsteps::{HttpSession, HttpSessionProvider};
use flows::WelcomeFlow;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flow")]
#[command(about = "End-to-end UI flow runner", long_about = None)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run flows, every route in parallel
    Run {
        #[command(flatten)]
        target: Target,

        /// Use scripted in-memory pages instead of the live site
        #[arg(long)]
        dry_run: bool,

        /// Fail any step that takes longer than this
        #[arg(long)]
        step_timeout_ms: Option<u64>,
    },

    /// Print each route's linearized step sequence
    Routes {
        #[command(flatten)]
        target: Target,
    },

    /// Build flows without running them
    Validate {
        #[command(flatten)]
        target: Target,
    },

    /// List available flows
    Flows,
}

#[derive(Args)]
struct Target {
    /// Flow to use; all flows when omitted
    #[arg(short, long)]
    flow: Option<String>,

    /// Flow configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the flow's root url
    #[arg(long)]
    root_url: Option<String>,
}

impl Target {
    fn flow_names(&self) -> Result<Vec<String>> {
        match &self.flow {
            Some(name) if flows::AVAILABLE.contains(&name.as_str()) => Ok(vec![name.clone()]),
            Some(name) => bail!("Unknown flow: {} (available: {})", name, flows::AVAILABLE.join(", ")),
            None => Ok(flows::AVAILABLE.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn flow_config(&self, flow: &str) -> Result<FlowConfig> {
        let mut config = match &self.config {
            Some(path) => FlowConfig::from_file(path)?,
            None => flows::default_config(flow),
        };
        if let Some(root_url) = &self.root_url {
            config.root_url = root_url.clone();
        }
        if config.name.is_empty() {
            config.name = flow.to_string();
        }
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            target,
            dry_run,
            step_timeout_ms,
        } => {
            let runtime_config = RuntimeConfig {
                step_timeout: step_timeout_ms.map(Duration::from_millis),
                ..RuntimeConfig::default()
            };
            run_flows(&target, dry_run, runtime_config).await?;
        }

        Commands::Routes { target } => {
            for name in target.flow_names()? {
                print_routes(&name, target.flow_config(&name)?)?;
            }
        }

        Commands::Validate { target } => {
            for name in target.flow_names()? {
                validate_flow(&name, target.flow_config(&name)?)?;
            }
        }

        Commands::Flows => {
            println!("📦 Available flows:");
            for name in flows::AVAILABLE {
                println!("  • {}", name);
            }
        }
    }

    Ok(())
}

async fn run_flows(target: &Target, dry_run: bool, runtime_config: RuntimeConfig) -> Result<()> {
    let mut failures = 0;

    for name in target.flow_names()? {
        println!("▶️  Running {}", name);
        let config = target.flow_config(&name)?;

        let outcome = match (name.as_str(), dry_run) {
            ("welcome", false) => {
                execute(&WelcomeFlow, config, runtime_config.clone(), |_| HttpSessionProvider::new()).await
            }
            ("welcome", true) => {
                execute(&WelcomeFlow, config, runtime_config.clone(), |ctx| {
                    flows::dry_run_provider("welcome", ctx)
                })
                .await
            }
            (other, _) => Err(anyhow::anyhow!("Unknown flow: {}", other)),
        };

        match outcome {
            Ok(true) => {}
            Ok(false) => failures += 1,
            Err(e) => {
                // Construction errors abort this flow only
                println!("💥 Error: {}, aborting {}", e, name);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} flow(s) had failures", failures);
    }
    Ok(())
}

/// Build and run one flow, printing step outcomes as they arrive
async fn execute<D, P, F>(
    definition: &D,
    config: FlowConfig,
    runtime_config: RuntimeConfig,
    make_provider: F,
) -> Result<bool>
where
    P: SessionProvider,
    D: FlowDefinition<P::Session>,
    F: FnOnce(&FlowContext) -> P,
{
    let runtime = FlowRuntime::with_config(runtime_config);
    let flow = runtime.build(config, definition)?;
    for rejected in flow.rejected() {
        println!("  ⚠️  Skipped definition: {}", rejected);
    }

    let provider = make_provider(flow.context().as_ref());
    let mut events = runtime.subscribe_events();

    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ExecutionEvent::RouteStarted { route, steps, .. }) => {
                    println!("  ⚡ Route {} ({} steps)", route, steps);
                }
                Ok(ExecutionEvent::StepPassed { step, duration_ms, .. }) => {
                    println!("    ✅ {} passed ({}ms)", step, duration_ms);
                }
                Ok(ExecutionEvent::StepFailed { step, error, .. }) => {
                    println!("    ❌ {} failed: {}", step, error);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event printer lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let result = runtime.run(&flow, provider).await?;

    // Dropping the runtime closes the event stream
    drop(runtime);
    printer.await?;

    println!();
    println!("📊 {} summary:", flow.name());
    println!("   Run ID: {}", result.run_id);
    println!(
        "   Steps: {} seen, {} passed, {} failed",
        result.seen.len(),
        result.passed.len(),
        result.failed.len()
    );
    for report in &result.routes {
        match &report.status {
            RouteStatus::Completed => println!("   ✨ {}: completed", report.route),
            RouteStatus::Aborted { step, error } => {
                println!("   💥 {}: aborted at {}: {}", report.route, step, error)
            }
            RouteStatus::SessionFailed { error } => {
                println!("   💥 {}: no session: {}", report.route, error)
            }
            RouteStatus::Crashed { error } => println!("   💥 {}: crashed: {}", report.route, error),
        }
    }
    println!();

    Ok(result.is_success())
}

/// Build a named flow for inspection; nothing is opened or run
fn build_flow(name: &str, config: FlowConfig) -> Result<Flow<HttpSession>> {
    let runtime = FlowRuntime::new();
    match name {
        "welcome" => Ok(runtime.build(config, &WelcomeFlow)?),
        other => bail!("Unknown flow: {}", other),
    }
}

fn print_routes(name: &str, config: FlowConfig) -> Result<()> {
    let flow = build_flow(name, config)?;
    println!("🗺️  {} ({})", name, flow.context().root_url());

    for (route, plan) in flow.plans()? {
        println!("  {}:", route);
        for (position, planned) in plan.iter().enumerate() {
            println!("    {}. {:?}", position + 1, planned);
        }
    }
    Ok(())
}

fn validate_flow(name: &str, config: FlowConfig) -> Result<()> {
    println!("🔍 Validating flow: {}", name);
    let flow = build_flow(name, config)?;
    flow.plans()?;

    println!("✅ Flow is valid:");
    println!("   Routes: {}", flow.routes().len());
    for route in flow.routes().routes() {
        let entry = route
            .entry()
            .map(|record| record.id.to_string())
            .unwrap_or_default();
        match route.root() {
            Some(root) => println!(
                "   • {} ({} steps from {}, branches off {} before {})",
                route.name(),
                route.len(),
                entry,
                root.route,
                root.ordinal
            ),
            None => println!("   • {} ({} steps from {})", route.name(), route.len(), entry),
        }
    }
    if !flow.rejected().is_empty() {
        println!("   Skipped definitions: {}", flow.rejected().len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_flow_dispatches_on_name() {
        let flow = build_flow("welcome", flows::default_config("welcome")).unwrap();
        assert_eq!(flow.name(), "welcome");
        assert_eq!(
            flow.routes().names().collect::<Vec<_>>(),
            vec!["main", "social"]
        );

        let err = build_flow("checkout", FlowConfig::new("checkout", "http://localhost:3000"))
            .err().expect("expected unknown flow error");
        assert_eq!(err.to_string(), "Unknown flow: checkout");
    }
}
