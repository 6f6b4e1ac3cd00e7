//! Per-row checks for a single entity kind.
//!
//! Runs, in order: required columns, identity (missing/duplicate ID), then the
//! kind-specific field checks. Every check is isolated: a bad cell produces a
//! diagnostic and the scan moves on.

use crate::context::ValidationOptions;
use crate::error::{Check, Diagnostic};
use crate::primitives::{cell_integer, cell_phases};
use crate::schema::{id_column, required_columns};
use crate::types::{EntityKind, Row};
use std::collections::HashMap;
use tracing::trace;

pub fn check_rows(
    kind: EntityKind,
    rows: &[Row],
    options: &ValidationOptions,
    out: &mut Vec<Diagnostic>,
) {
    trace!(kind = %kind, rows = rows.len(), "row checks");

    check_required_columns(kind, rows, out);
    check_identities(kind, rows, out);

    for (i, row) in rows.iter().enumerate() {
        match kind {
            EntityKind::Client => check_client(i, row, options, out),
            EntityKind::Worker => check_worker(i, row, out),
            EntityKind::Task => check_task(i, row, out),
        }
    }
}

// ─── Structure ──────────────────────────────────────────────────────────────

/// Column presence is judged from the first row only.
fn check_required_columns(kind: EntityKind, rows: &[Row], out: &mut Vec<Diagnostic>) {
    let Some(first) = rows.first() else {
        return;
    };

    let missing: Vec<&str> = required_columns(kind)
        .iter()
        .copied()
        .filter(|column| !first.has_column(column))
        .collect();

    if !missing.is_empty() {
        out.push(Diagnostic::error(
            Check::MissingColumns,
            format!("Missing required columns: {}", missing.join(", ")),
        ));
    }
}

fn check_identities(kind: EntityKind, rows: &[Row], out: &mut Vec<Diagnostic>) {
    let column = id_column(kind);
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (i, row) in rows.iter().enumerate() {
        match row.text(column) {
            None => out.push(
                Diagnostic::error(Check::MissingId, format!("Missing {}", column))
                    .at_row(i)
                    .on_field(column),
            ),
            Some(id) => {
                if let Some(&first) = seen.get(&*id) {
                    out.push(
                        Diagnostic::error(
                            Check::DuplicateId,
                            format!(
                                "Duplicate {} '{}' (rows {} and {})",
                                column, id, first, i
                            ),
                        )
                        .at_row(i)
                        .on_field(column),
                    );
                } else {
                    seen.insert(id.into_owned(), i);
                }
            }
        }
    }
}

// ─── Clients ────────────────────────────────────────────────────────────────

fn check_client(i: usize, row: &Row, options: &ValidationOptions, out: &mut Vec<Diagnostic>) {
    let priority = row.get("PriorityLevel");
    let in_range = cell_integer(priority)
        .is_some_and(|p| (options.min_priority..=options.max_priority).contains(&p));
    if !in_range {
        out.push(
            Diagnostic::error(
                Check::PriorityRange,
                format!(
                    "PriorityLevel must be an integer between {} and {}, got '{}'",
                    options.min_priority,
                    options.max_priority,
                    priority.as_text().unwrap_or_default()
                ),
            )
            .at_row(i)
            .on_field("PriorityLevel"),
        );
    }

    if let Some(attributes) = row.text("AttributesJSON")
        && let Err(e) = serde_json::from_str::<serde_json::Value>(&attributes)
    {
        out.push(
            Diagnostic::error(
                Check::InvalidJson,
                format!("AttributesJSON is not valid JSON: {}", e),
            )
            .at_row(i)
            .on_field("AttributesJSON"),
        );
    }
}

// ─── Workers ────────────────────────────────────────────────────────────────

fn check_worker(i: usize, row: &Row, out: &mut Vec<Diagnostic>) {
    let slots = match cell_phases(row.get("AvailableSlots")) {
        None => {
            out.push(
                Diagnostic::error(Check::MissingField, "AvailableSlots is required")
                    .at_row(i)
                    .on_field("AvailableSlots"),
            );
            return;
        }
        Some(Err(e)) => {
            out.push(malformed(i, "AvailableSlots", &e.to_string()));
            None
        }
        Some(Ok(slots)) => {
            check_positive_phases(i, "AvailableSlots", &slots, out);
            Some(slots)
        }
    };

    let max_load = cell_integer(row.get("MaxLoadPerPhase"));

    if let (Some(slots), Some(max_load)) = (&slots, max_load)
        && (slots.len() as i64) < max_load
    {
        out.push(
            Diagnostic::warning(
                Check::WorkerOverloaded,
                format!(
                    "Worker overloaded: {} available slots but MaxLoadPerPhase is {}",
                    slots.len(),
                    max_load
                ),
            )
            .at_row(i)
            .on_field("AvailableSlots"),
        );
    }

    check_min_integer(i, row, "MaxLoadPerPhase", out);
}

// ─── Tasks ──────────────────────────────────────────────────────────────────

fn check_task(i: usize, row: &Row, out: &mut Vec<Diagnostic>) {
    check_min_integer(i, row, "Duration", out);
    check_min_integer(i, row, "MaxConcurrent", out);

    match cell_phases(row.get("PreferredPhases")) {
        Some(Err(e)) => out.push(malformed(i, "PreferredPhases", &e.to_string())),
        Some(Ok(phases)) => check_positive_phases(i, "PreferredPhases", &phases, out),
        None => {}
    }
}

// ─── Shared field checks ────────────────────────────────────────────────────

/// Integer >= 1.
fn check_min_integer(i: usize, row: &Row, column: &str, out: &mut Vec<Diagnostic>) {
    let cell = row.get(column);
    if !cell_integer(cell).is_some_and(|n| n >= 1) {
        out.push(
            Diagnostic::error(
                Check::IntegerRange,
                format!(
                    "{} must be an integer >= 1, got '{}'",
                    column,
                    cell.as_text().unwrap_or_default()
                ),
            )
            .at_row(i)
            .on_field(column),
        );
    }
}

fn check_positive_phases(i: usize, column: &str, phases: &[i64], out: &mut Vec<Diagnostic>) {
    let bad: Vec<String> = phases
        .iter()
        .filter(|&&p| p < 1)
        .map(i64::to_string)
        .collect();
    if !bad.is_empty() {
        out.push(
            Diagnostic::error(
                Check::NonPositivePhase,
                format!("{} contains non-positive phases: {}", column, bad.join(", ")),
            )
            .at_row(i)
            .on_field(column),
        );
    }
}

fn malformed(i: usize, column: &str, reason: &str) -> Diagnostic {
    Diagnostic::error(
        Check::MalformedList,
        format!("{} is malformed: {}", column, reason),
    )
    .at_row(i)
    .on_field(column)
}
