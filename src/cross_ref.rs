//! Checks that join one entity kind against another.
//!
//! A check only runs when the dataset it joins against is loaded; with an
//! empty companion dataset it is skipped without a diagnostic.

use crate::context::DatasetView;
use crate::error::{Check, Diagnostic};
use crate::primitives::{cell_integer, cell_phases, split_tokens, token_set};
use crate::types::{EntityKind, Row};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::trace;

pub fn check_cross_references(view: &DatasetView<'_>, kind: EntityKind, out: &mut Vec<Diagnostic>) {
    match kind {
        EntityKind::Client => {
            if view.is_loaded(EntityKind::Task) {
                check_task_references(view.clients, view.tasks, out);
            }
        }
        EntityKind::Task => {
            if view.is_loaded(EntityKind::Worker) {
                let fold = view.options.fold_skill_case;
                check_skill_coverage(view.tasks, view.workers, fold, out);
                check_concurrency(view.tasks, view.workers, fold, out);
                check_phase_saturation(view.workers, view.tasks, out);
            }
        }
        EntityKind::Worker => {}
    }
}

// ─── Client → Task ──────────────────────────────────────────────────────────

fn check_task_references(clients: &[Row], tasks: &[Row], out: &mut Vec<Diagnostic>) {
    trace!(clients = clients.len(), tasks = tasks.len(), "task reference check");

    let known: HashSet<String> = tasks
        .iter()
        .filter_map(|row| row.text("TaskID"))
        .map(|id| id.into_owned())
        .collect();

    for (i, row) in clients.iter().enumerate() {
        let Some(requested) = row.text("RequestedTaskIDs") else {
            continue;
        };
        let unknown: Vec<&str> = split_tokens(&requested)
            .filter(|id| !known.contains(*id))
            .collect();
        if !unknown.is_empty() {
            out.push(
                Diagnostic::error(
                    Check::UnknownTaskReference,
                    format!("Unknown task IDs in RequestedTaskIDs: {}", unknown.join(", ")),
                )
                .at_row(i)
                .on_field("RequestedTaskIDs"),
            );
        }
    }
}

// ─── Task → Worker ──────────────────────────────────────────────────────────

fn check_skill_coverage(tasks: &[Row], workers: &[Row], fold: bool, out: &mut Vec<Diagnostic>) {
    trace!(tasks = tasks.len(), workers = workers.len(), "skill coverage check");

    let available: BTreeSet<String> = workers
        .iter()
        .flat_map(|row| token_set(row.get("Skills"), fold))
        .collect();

    for (i, row) in tasks.iter().enumerate() {
        let Some(required) = row.text("RequiredSkills") else {
            continue;
        };
        let uncovered: Vec<&str> = split_tokens(&required)
            .filter(|skill| !available.contains(&fold_skill(skill, fold)))
            .collect();
        if !uncovered.is_empty() {
            out.push(
                Diagnostic::error(
                    Check::UncoveredSkill,
                    format!("No worker has required skills: {}", uncovered.join(", ")),
                )
                .at_row(i)
                .on_field("RequiredSkills"),
            );
        }
    }
}

fn check_concurrency(tasks: &[Row], workers: &[Row], fold: bool, out: &mut Vec<Diagnostic>) {
    trace!(tasks = tasks.len(), workers = workers.len(), "concurrency check");

    let worker_skills: Vec<BTreeSet<String>> = workers
        .iter()
        .map(|row| token_set(row.get("Skills"), fold))
        .collect();

    for (i, row) in tasks.iter().enumerate() {
        let Some(max_concurrent) = cell_integer(row.get("MaxConcurrent")) else {
            continue;
        };
        let required = token_set(row.get("RequiredSkills"), fold);
        if required.is_empty() {
            continue;
        }

        let qualified = worker_skills
            .iter()
            .filter(|skills| required.is_subset(skills))
            .count();
        if (qualified as i64) < max_concurrent {
            out.push(
                Diagnostic::warning(
                    Check::InsufficientWorkers,
                    format!(
                        "Only {} qualified workers available for MaxConcurrent {}",
                        qualified, max_concurrent
                    ),
                )
                .at_row(i)
                .on_field("MaxConcurrent"),
            );
        }
    }
}

/// Compares per-phase task demand (summed durations) with per-phase worker
/// capacity (workers offering the phase). Unparseable cells are left out of
/// both totals, and both totals saturate at `i64::MAX`.
fn check_phase_saturation(workers: &[Row], tasks: &[Row], out: &mut Vec<Diagnostic>) {
    trace!(workers = workers.len(), tasks = tasks.len(), "phase saturation check");

    let mut capacity: BTreeMap<i64, i64> = BTreeMap::new();
    for row in workers {
        for phase in positive_phases(row, "AvailableSlots") {
            let slot = capacity.entry(phase).or_default();
            *slot = slot.saturating_add(1);
        }
    }

    let mut demand: BTreeMap<i64, i64> = BTreeMap::new();
    for row in tasks {
        let Some(duration) = cell_integer(row.get("Duration")).filter(|d| *d >= 1) else {
            continue;
        };
        for phase in positive_phases(row, "PreferredPhases") {
            let total = demand.entry(phase).or_default();
            *total = total.saturating_add(duration);
        }
    }

    for (phase, needed) in demand {
        let available = capacity.get(&phase).copied().unwrap_or(0);
        if needed > available {
            out.push(
                Diagnostic::error(
                    Check::PhaseSaturation,
                    format!(
                        "Phase {} is saturated: demand {} exceeds capacity {}",
                        phase, needed, available
                    ),
                )
                .on_field("PreferredPhases"),
            );
        }
    }
}

fn positive_phases(row: &Row, column: &str) -> BTreeSet<i64> {
    match cell_phases(row.get(column)) {
        Some(Ok(phases)) => phases.into_iter().filter(|p| *p >= 1).collect(),
        _ => BTreeSet::new(),
    }
}

fn fold_skill(skill: &str, fold: bool) -> String {
    if fold {
        skill.to_lowercase()
    } else {
        skill.to_string()
    }
}
