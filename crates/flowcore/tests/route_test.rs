// crates/flowcore/tests/route_test.rs

use async_trait::async_trait;
use flowcore::{
    ConfigError, FlowConfig, FlowContext, FlowError, RegistrationError, Route, Session,
    SessionError, StepDefinition, StepRecord,
};

struct NullSession;

#[async_trait]
impl Session for NullSession {
    async fn close(&mut self) -> Result<(), SessionError> {
        Ok(())
    }
}

fn record(route: &str, ordinal: u32, name: &str) -> StepRecord<NullSession> {
    StepDefinition::from_fn(route, ordinal, name, |_, _: &mut NullSession| Ok(()))
        .into_record()
        .unwrap()
}

fn names(records: &[StepRecord<NullSession>]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn test_add_step_sorts_any_registration_order() {
    let mut route = Route::new("main");
    route.add_step(record("main", 3, "c"));
    route.add_step(record("main", 1, "a"));
    route.add_step(record("main", 4, "d"));
    route.add_step(record("main", 2, "b"));

    assert_eq!(names(route.steps()), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_duplicate_ordinals_keep_registration_order() {
    let mut route = Route::new("main");
    route.add_step(record("main", 2, "second"));
    route.add_step(record("main", 1, "first"));
    route.add_step(record("main", 2, "second-again"));
    route.add_step(record("main", 3, "third"));

    assert_eq!(
        names(route.steps()),
        vec!["first", "second", "second-again", "third"]
    );
}

#[test]
fn test_prefix_is_exclusive_of_cut() {
    let mut route = Route::new("main");
    for (ordinal, name) in [(1, "a"), (2, "b"), (3, "c")] {
        route.add_step(record("main", ordinal, name));
    }

    assert_eq!(names(route.prefix(Some(3))), vec!["a", "b"]);
    assert!(route.prefix(Some(1)).is_empty());
    assert_eq!(names(route.prefix(None)), vec!["a", "b", "c"]);
    assert_eq!(names(route.prefix(Some(0))), vec!["a", "b", "c"]);
    assert_eq!(names(route.prefix(Some(10))), vec!["a", "b", "c"]);
}

#[test]
fn test_prefix_with_ordinal_gaps() {
    let mut route = Route::new("main");
    route.add_step(record("main", 1, "a"));
    route.add_step(record("main", 5, "e"));
    route.add_step(record("main", 9, "i"));

    assert_eq!(names(route.prefix(Some(6))), vec!["a", "e"]);
}

#[test]
fn test_step_at_searches_stored_ordinal() {
    let mut route = Route::new("main");
    route.add_step(record("main", 1, "a"));
    route.add_step(record("main", 5, "e"));

    assert_eq!(route.step_at(5).unwrap().id.as_str(), "e");

    match route.step_at(2) {
        Err(FlowError::OrdinalNotFound { route, ordinal }) => {
            assert_eq!(route, "main");
            assert_eq!(ordinal, 2);
        }
        other => panic!("expected OrdinalNotFound, got {:?}", other),
    }
}

#[test]
fn test_root_on_non_entry_ordinal_is_invalid_branch() {
    let result = StepDefinition::from_fn("social", 2, "facebook", |_, _: &mut NullSession| Ok(()))
        .rooted_on("main", 1)
        .into_record();

    assert!(matches!(
        result,
        Err(RegistrationError::InvalidBranch { ordinal: 2, .. })
    ));
}

#[test]
fn test_incomplete_definitions_are_malformed() {
    let missing_step = StepDefinition::<NullSession>::empty()
        .with_route("main")
        .with_ordinal(1)
        .with_name("no_step")
        .into_record();
    assert!(matches!(
        missing_step,
        Err(RegistrationError::MalformedStep { ref field, .. }) if field == "step"
    ));

    let zero_ordinal = StepDefinition::from_fn("main", 0, "zero", |_, _: &mut NullSession| Ok(()))
        .into_record();
    assert!(matches!(
        zero_ordinal,
        Err(RegistrationError::MalformedStep { ref field, .. }) if field == "ordinal"
    ));

    let blank_route = StepDefinition::from_fn(" ", 1, "blank", |_, _: &mut NullSession| Ok(()))
        .into_record();
    assert!(blank_route.unwrap_err().is_recoverable());
}

#[test]
fn test_entry_root_reference_is_kept() {
    let rec = StepDefinition::from_fn("social", 1, "facebook", |_, _: &mut NullSession| Ok(()))
        .rooted_on("main", 2)
        .into_record()
        .unwrap();

    let mut route = Route::new("social");
    route.add_step(rec);

    let root = route.declared_root().unwrap();
    assert_eq!(root.route, "main");
    assert_eq!(root.ordinal, 2);
    assert!(route.root().is_none());
}

#[test]
fn test_flow_context_requires_root_url() {
    let err = FlowContext::new(FlowConfig::new("welcome", "")).unwrap_err();
    assert_eq!(
        err,
        ConfigError::MissingConfiguration {
            flow: "welcome".to_string(),
            setting: "root_url".to_string(),
        }
    );

    let ctx = FlowContext::new(FlowConfig::new("welcome", "http://localhost:3000/")).unwrap();
    assert_eq!(ctx.url("/signin"), "http://localhost:3000/signin");
    assert_eq!(ctx.url("https://example.com/x"), "https://example.com/x");
}

#[test]
fn test_flow_config_from_file() {
    let path = std::env::temp_dir().join(format!("flow-config-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{"name": "welcome", "root_url": "http://staging.test", "settings": {"zip": "10001"}}"#,
    )
    .unwrap();

    let config = FlowConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.name, "welcome");
    let ctx = FlowContext::new(config).unwrap();
    assert_eq!(ctx.root_url(), "http://staging.test");
    assert_eq!(ctx.setting("zip"), Some(&serde_json::json!("10001")));

    assert!(FlowConfig::from_file("/nonexistent/flow.json").is_err());
}

#[test]
fn test_entry_is_lowest_ordinal() {
    let mut route = Route::new("main");
    assert!(route.entry().is_none());

    for (ordinal, name) in [(3, "confirm"), (1, "enter_zip"), (2, "continue")] {
        let rec = StepDefinition::from_fn("main", ordinal, name, |_, _: &mut NullSession| Ok(()))
            .into_record()
            .unwrap();
        route.add_step(rec);
    }

    assert_eq!(route.entry().unwrap().id.as_str(), "enter_zip");
}
