#![allow(dead_code)]

use allocation_validate::{Check, Diagnostic, Row, ValidationReport};

/// A client row with every required column and valid values.
pub fn client(id: &str, priority: i64, requested: &str) -> Row {
    Row::new()
        .with("ClientID", id)
        .with("ClientName", format!("Client {}", id))
        .with("PriorityLevel", priority)
        .with("RequestedTaskIDs", requested)
        .with("GroupTag", "GroupA")
        .with("AttributesJSON", r#"{"location":"north"}"#)
}

/// A worker row with every required column.
pub fn worker(id: &str, skills: &str, slots: &str, max_load: i64) -> Row {
    Row::new()
        .with("WorkerID", id)
        .with("WorkerName", format!("Worker {}", id))
        .with("Skills", skills)
        .with("AvailableSlots", slots)
        .with("MaxLoadPerPhase", max_load)
        .with("WorkerGroup", "Core")
        .with("QualificationLevel", 3i64)
}

/// A task row with every required column.
pub fn task(id: &str, skills: &str, phases: &str, duration: i64, max_concurrent: i64) -> Row {
    Row::new()
        .with("TaskID", id)
        .with("TaskName", format!("Task {}", id))
        .with("Category", "ETL")
        .with("Duration", duration)
        .with("RequiredSkills", skills)
        .with("PreferredPhases", phases)
        .with("MaxConcurrent", max_concurrent)
}

/// Diagnostics produced by one check.
pub fn of_check(report: &ValidationReport, check: Check) -> Vec<&Diagnostic> {
    report
        .diagnostics
        .iter()
        .filter(|d| d.check == check)
        .collect()
}

pub fn assert_has(report: &ValidationReport, check: Check) {
    assert!(
        report.diagnostics.iter().any(|d| d.check == check),
        "expected {:?}, got: {:#?}",
        check,
        report.diagnostics
    );
}

pub fn assert_lacks(report: &ValidationReport, check: Check) {
    assert!(
        report.diagnostics.iter().all(|d| d.check != check),
        "unexpected {:?} in: {:#?}",
        check,
        report.diagnostics
    );
}
