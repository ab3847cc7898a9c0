// crates/flowruntime/tests/tree_test.rs

use async_trait::async_trait;
use flowcore::{FlowError, RootReference, RouteError, Session, SessionError, StepDefinition};
use flowruntime::{OutcomeRegistry, RouteTree, SequenceLinearizer, StepRegistry};

struct NullSession;

#[async_trait]
impl Session for NullSession {
    async fn close(&mut self) -> Result<(), SessionError> {
        Ok(())
    }
}

fn step(route: &str, ordinal: u32, name: &str) -> StepDefinition<NullSession> {
    StepDefinition::from_fn(route, ordinal, name, |_, _: &mut NullSession| Ok(()))
}

#[test]
fn test_resolve_links_route_registered_later() {
    let registration = StepRegistry::collect(vec![
        step("social", 1, "facebook").rooted_on("main", 2),
        step("main", 1, "enter_zip"),
        step("main", 2, "email"),
    ])
    .unwrap();
    let mut routes = registration.routes;

    assert!(routes.get("social").unwrap().root().is_none());
    RouteTree::resolve(&mut routes).unwrap();

    assert_eq!(
        routes.get("social").unwrap().root(),
        Some(&RootReference::new("main", 2))
    );
    assert!(routes.get("main").unwrap().root().is_none());
}

#[test]
fn test_linearize_without_resolution_ignores_declared_roots() {
    let registration = StepRegistry::collect(vec![
        step("main", 1, "enter_zip"),
        step("social", 1, "facebook").rooted_on("main", 2),
    ])
    .unwrap();

    let plan = SequenceLinearizer::linearize(&registration.routes, "social").unwrap();
    let names: Vec<_> = plan.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(names, vec!["facebook"]);
}

#[test]
fn test_linearize_unknown_route() {
    let registration = StepRegistry::collect(vec![step("main", 1, "enter_zip")]).unwrap();

    assert!(matches!(
        SequenceLinearizer::linearize(&registration.routes, "checkout"),
        Err(FlowError::RouteNotFound(name)) if name == "checkout"
    ));
}

#[test]
fn test_planned_steps_remember_origin_route() {
    let registration = StepRegistry::collect(vec![
        step("main", 1, "enter_zip"),
        step("main", 2, "email"),
        step("social", 1, "facebook").rooted_on("main", 2),
    ])
    .unwrap();
    let mut routes = registration.routes;
    RouteTree::resolve(&mut routes).unwrap();

    let plan = SequenceLinearizer::linearize(&routes, "social").unwrap();
    let origins: Vec<_> = plan.iter().map(|p| (p.route.as_str(), p.ordinal)).collect();
    assert_eq!(origins, vec![("main", 1), ("social", 1)]);
}

#[test]
fn test_cycle_through_three_routes() {
    let registration = StepRegistry::collect(vec![
        step("a", 1, "a1").rooted_on("c", 1),
        step("b", 1, "b1").rooted_on("a", 1),
        step("c", 1, "c1").rooted_on("b", 1),
    ])
    .unwrap();
    let mut routes = registration.routes;

    assert!(matches!(
        RouteTree::resolve(&mut routes),
        Err(RouteError::CyclicRoute { .. })
    ));
}

#[tokio::test]
async fn test_outcome_registry_first_seen_and_last_write() {
    let outcomes = OutcomeRegistry::new();
    let id = "sign_in".into();

    assert!(outcomes.record_pass(&id).await);
    assert!(!outcomes.record_failure(&id).await);

    let sets = outcomes.snapshot().await;
    assert!(sets.seen.contains(&id));
    assert!(sets.failed.contains(&id));
    assert!(!sets.passed.contains(&id));
}
