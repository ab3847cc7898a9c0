// crates/flowcli/src/flows.rs

use flowcore::{FlowConfig, FlowContext, FlowDefinition, StepDefinition};
use flowsteps::{Browser, ExpectText, MemorySessionProvider, Navigate};

/// Names of the flows this binary knows how to run
pub const AVAILABLE: &[&str] = &["welcome"];

/// The welcome landing pages: sign in by email (`main`) or through
/// Facebook (`social`, which reuses the zip entry of `main`).
pub struct WelcomeFlow;

impl<S: Browser> FlowDefinition<S> for WelcomeFlow {
    fn name(&self) -> &str {
        "welcome"
    }

    fn describe_steps(&self) -> Vec<StepDefinition<S>> {
        vec![
            StepDefinition::new("main", 1, "enter_zip", Navigate::to("/").expect_status(200)),
            StepDefinition::new(
                "main",
                2,
                "continue_with_email",
                Navigate::to("/signup/email").expect_status(200),
            ),
            StepDefinition::new("main", 3, "email_form_shown", ExpectText::new("email")),
            StepDefinition::new(
                "social",
                1,
                "continue_with_facebook",
                Navigate::to("/auth/facebook").expect_status(200),
            )
            .rooted_on("main", 2),
        ]
    }
}

pub fn default_config(flow: &str) -> FlowConfig {
    match flow {
        "welcome" => FlowConfig::new("welcome", "http://localhost:3000"),
        other => FlowConfig::new(other, ""),
    }
}

/// Scripted pages standing in for the site on `--dry-run`
pub fn dry_run_provider(flow: &str, context: &FlowContext) -> MemorySessionProvider {
    match flow {
        "welcome" => MemorySessionProvider::new()
            .with_page(context.url("/"), 200, "<form>Enter your zip</form>")
            .with_page(context.url("/signup/email"), 200, "<form>Sign up with email</form>")
            .with_page(context.url("/auth/facebook"), 200, "<p>Continue with Facebook</p>"),
        _ => MemorySessionProvider::new(),
    }
}
