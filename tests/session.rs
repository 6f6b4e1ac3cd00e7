mod common;

use allocation_validate::*;
use common::*;
use serde_json::json;

#[test]
fn results_depend_on_what_was_set_before_the_call() {
    let mut session = Session::new();
    let clients = vec![client("C1", 2, "T1,T2")];

    let early = session.validate_data(EntityKind::Client, &clients);
    assert!(early.is_empty());

    session.set_data(EntityKind::Task, vec![task("T1", "a", "1", 1, 1)]);
    let late = session.validate_data(EntityKind::Client, &clients);
    let unknown = of_check(&late, Check::UnknownTaskReference);
    assert_eq!(unknown.len(), 1);
    assert!(unknown[0].message.ends_with("T2"));
}

#[test]
fn repeated_validation_is_identical() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("allocation_validate=trace"))
        .with_test_writer()
        .try_init();

    let mut session = Session::new();
    session.set_data(EntityKind::Worker, vec![worker("W1", "a", "1", 1)]);
    let tasks = vec![task("T1", "a,b", "1-3", 2, 2), task("T1", "a", "x", 0, 1)];

    let first = session.validate_data(EntityKind::Task, &tasks);
    let second = session.validate_data(EntityKind::Task, &tasks);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn set_rules_feeds_validate_all() {
    let mut session = Session::new();
    session.set_data(
        EntityKind::Task,
        vec![task("T1", "a", "1", 1, 1), task("T2", "a", "2", 1, 1)],
    );
    session.set_data(EntityKind::Client, vec![client("C1", 7, "T1")]);
    session.set_rules(vec![Rule::co_run("pair", ["T1", "T2"])]);

    let report = session.validate_all();
    let checks: Vec<Check> = report.diagnostics.iter().map(|d| d.check).collect();
    assert_eq!(checks, vec![Check::PriorityRange, Check::PhaseWindowConflict]);

    let stored_rules = validate(session.context(), Target::Rules);
    assert_eq!(stored_rules, session.validate_rules(&session.context().rules));
}

#[test]
fn validate_rules_uses_argument_not_stored_rules() {
    let mut session = Session::new();
    session.set_rules(vec![Rule::co_run("trio", ["T1", "T2", "T3"])]);
    let report = session.validate_rules(&[]);
    assert!(report.is_empty());
}

#[test]
fn session_options_apply() {
    let session = Session::with_options(ValidationOptions {
        max_priority: 10,
        ..Default::default()
    });
    let report = session.validate_data(EntityKind::Client, &[client("C1", 9, "")]);
    assert!(report.is_empty());
}

// ─── Report ─────────────────────────────────────────────────────────────────

#[test]
fn sorted_by_severity_is_stable() {
    let report = ValidationReport::from(vec![
        Diagnostic::warning(Check::WorkerOverloaded, "w0").at_row(0),
        Diagnostic::error(Check::MissingId, "e1").at_row(1),
        Diagnostic::warning(Check::InsufficientWorkers, "w2").at_row(2),
        Diagnostic::error(Check::PhaseSaturation, "e3"),
    ]);
    assert_eq!(report.error_count(), 2);
    assert_eq!(report.warning_count(), 2);
    assert_eq!(report.dataset_level().count(), 1);

    let messages: Vec<String> = report
        .sorted_by_severity()
        .into_iter()
        .map(|d| d.message)
        .collect();
    assert_eq!(messages, vec!["e1", "e3", "w0", "w2"]);
}

#[test]
fn diagnostic_wire_format() {
    let dataset = Diagnostic::error(Check::PhaseSaturation, "full").on_field("PreferredPhases");
    let value = serde_json::to_value(&dataset).unwrap();
    assert_eq!(
        value,
        json!({
            "severity": "error",
            "check": "phase_saturation",
            "message": "full",
            "rowIndex": -1,
            "fieldName": "PreferredPhases"
        })
    );
    let back: Diagnostic = serde_json::from_value(value).unwrap();
    assert_eq!(back, dataset);

    let row = Diagnostic::warning(Check::WorkerOverloaded, "busy").at_row(4);
    let value = serde_json::to_value(&row).unwrap();
    assert_eq!(value["rowIndex"], json!(4));
    assert!(value.get("fieldName").is_none());
}

#[test]
fn diagnostic_display() {
    let d = Diagnostic::error(Check::MissingId, "Missing TaskID")
        .at_row(3)
        .on_field("TaskID");
    assert_eq!(d.to_string(), "error [row 3, TaskID]: Missing TaskID");
    let d = Diagnostic::warning(Check::PhaseSaturation, "too much");
    assert_eq!(d.to_string(), "warning: too much");
}
