//! Rule checks: per-rule shape, co-run cycles, and co-run vs phase-window
//! conflicts.
//!
//! Shape checks look at every rule. The two consistency checks only consider
//! enabled rules; a disabled rule takes no part in them at all.

use crate::context::DatasetView;
use crate::error::{Check, Diagnostic};
use crate::primitives::{cell_phases, format_phases};
use crate::types::{EntityKind, GroupType, PrecedenceScope, Row, Rule, RuleKind};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::iter::Flatten;
use std::option;
use tracing::trace;

pub fn check_rules(view: &DatasetView<'_>, rules: &[Rule], out: &mut Vec<Diagnostic>) {
    check_rule_shapes(view, rules, out);

    let enabled: Vec<&Rule> = rules.iter().filter(|r| r.is_enabled()).collect();
    trace!(total = rules.len(), enabled = enabled.len(), "rule consistency checks");

    check_co_run_cycles(&enabled, out);
    check_phase_window_conflicts(view.tasks, &enabled, out);
}

/// Distinct, trimmed, non-blank task ids of a co-run rule, in first-seen order.
fn co_run_tasks(tasks: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    tasks
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && seen.insert(*t))
        .collect()
}

// ─── Shape ──────────────────────────────────────────────────────────────────

fn check_rule_shapes(view: &DatasetView<'_>, rules: &[Rule], out: &mut Vec<Diagnostic>) {
    let known_tasks = column_values(view.tasks, "TaskID");
    let client_groups = column_values(view.clients, "GroupTag");
    let worker_groups = column_values(view.workers, "WorkerGroup");

    let mut seen_ids: HashMap<&str, usize> = HashMap::new();

    for (i, rule) in rules.iter().enumerate() {
        if let Some(&first) = seen_ids.get(rule.id()) {
            out.push(
                Diagnostic::error(
                    Check::DuplicateRuleId,
                    format!(
                        "Duplicate rule id '{}' (rules {} and {})",
                        rule.id(),
                        first,
                        i
                    ),
                )
                .for_rule(rule.id()),
            );
        } else {
            seen_ids.insert(rule.id(), i);
        }

        let invalid = |message: String| {
            Diagnostic::error(
                Check::InvalidRule,
                format!("Rule '{}': {}", rule.name(), message),
            )
            .for_rule(rule.id())
        };
        let unknown = |message: String| {
            Diagnostic::error(
                Check::UnknownRuleReference,
                format!("Rule '{}': {}", rule.name(), message),
            )
            .for_rule(rule.id())
        };

        match &rule.kind {
            RuleKind::CoRun { tasks } => {
                let tasks = co_run_tasks(tasks);
                if tasks.len() < 2 {
                    out.push(invalid("co-run needs at least two distinct tasks".to_string()));
                }
                if view.is_loaded(EntityKind::Task) {
                    let missing: Vec<&str> = tasks
                        .into_iter()
                        .filter(|t| !known_tasks.contains(*t))
                        .collect();
                    if !missing.is_empty() {
                        out.push(unknown(format!("unknown tasks {}", missing.join(", "))));
                    }
                }
            }
            RuleKind::SlotRestriction {
                group_type,
                group_name,
                min_common_slots,
            } => {
                let group_name = group_name.trim();
                if group_name.is_empty() {
                    out.push(invalid("slot restriction needs a group name".to_string()));
                }
                if *min_common_slots < 1 {
                    out.push(invalid(format!(
                        "minCommonSlots must be >= 1, got {}",
                        min_common_slots
                    )));
                }
                let (groups, kind, column) = match group_type {
                    GroupType::Client => (&client_groups, EntityKind::Client, "GroupTag"),
                    GroupType::Worker => (&worker_groups, EntityKind::Worker, "WorkerGroup"),
                };
                if !group_name.is_empty() && view.is_loaded(kind) && !groups.contains(group_name) {
                    out.push(unknown_group(rule, group_name, column));
                }
            }
            RuleKind::LoadLimit {
                worker_group,
                max_slots_per_phase,
            } => {
                let worker_group = worker_group.trim();
                if worker_group.is_empty() {
                    out.push(invalid("load limit needs a worker group".to_string()));
                }
                if *max_slots_per_phase < 1 {
                    out.push(invalid(format!(
                        "maxSlotsPerPhase must be >= 1, got {}",
                        max_slots_per_phase
                    )));
                }
                if !worker_group.is_empty()
                    && view.is_loaded(EntityKind::Worker)
                    && !worker_groups.contains(worker_group)
                {
                    out.push(unknown_group(rule, worker_group, "WorkerGroup"));
                }
            }
            RuleKind::PhaseWindow {
                task_id,
                allowed_phases,
            } => {
                if allowed_phases.is_empty() {
                    out.push(invalid("phase window allows no phases".to_string()));
                } else if allowed_phases.iter().any(|p| *p < 1) {
                    out.push(invalid(format!(
                        "phase window phases must be positive, got {}",
                        format_phases(allowed_phases)
                    )));
                }
                let task_id = task_id.trim();
                if task_id.is_empty() {
                    out.push(invalid("phase window needs a task".to_string()));
                } else if view.is_loaded(EntityKind::Task) && !known_tasks.contains(task_id) {
                    out.push(unknown(format!("unknown task {}", task_id)));
                }
            }
            RuleKind::PatternMatch { regex, .. } => {
                if let Some(reason) = regex_error(regex) {
                    out.push(invalid(format!("invalid regex: {}", reason)));
                }
            }
            RuleKind::Precedence {
                scope,
                specific_target,
                ..
            } => {
                let has_target = specific_target
                    .as_deref()
                    .is_some_and(|t| !t.trim().is_empty());
                if *scope == PrecedenceScope::Specific && !has_target {
                    out.push(invalid(
                        "specific precedence needs a specificTarget".to_string(),
                    ));
                }
            }
        }
    }
}

fn unknown_group(rule: &Rule, group: &str, column: &str) -> Diagnostic {
    Diagnostic::warning(
        Check::UnknownRuleReference,
        format!(
            "Rule '{}': no row has {} '{}'",
            rule.name(),
            column,
            group
        ),
    )
    .on_field(column)
    .for_rule(rule.id())
}

#[cfg(feature = "pattern-rules")]
fn regex_error(pattern: &str) -> Option<String> {
    regex::Regex::new(pattern).err().map(|e| e.to_string())
}

#[cfg(not(feature = "pattern-rules"))]
fn regex_error(_pattern: &str) -> Option<String> {
    None
}

fn column_values(rows: &[Row], column: &str) -> HashSet<String> {
    rows.iter()
        .filter_map(|row| row.text(column))
        .map(|v| v.into_owned())
        .collect()
}

// ─── Co-run cycles ──────────────────────────────────────────────────────────

/// Undirected co-run graph with edge multiplicities. Every pair of tasks in
/// one rule is connected, so a rule over three tasks already forms a triangle,
/// and two rules sharing a pair form a double edge.
type CoRunGraph<'a> = BTreeMap<&'a str, BTreeMap<&'a str, usize>>;

fn build_co_run_graph<'a>(rules: &[&'a Rule]) -> CoRunGraph<'a> {
    let mut graph: CoRunGraph<'a> = BTreeMap::new();
    for &rule in rules {
        let RuleKind::CoRun { tasks } = &rule.kind else {
            continue;
        };
        let tasks = co_run_tasks(tasks);
        for (i, &a) in tasks.iter().enumerate() {
            for &b in &tasks[i + 1..] {
                *graph.entry(a).or_default().entry(b).or_default() += 1;
                *graph.entry(b).or_default().entry(a).or_default() += 1;
            }
        }
    }
    graph
}

fn check_co_run_cycles(rules: &[&Rule], out: &mut Vec<Diagnostic>) {
    let graph = build_co_run_graph(rules);

    let mut visited = BTreeSet::new();

    for &start in graph.keys() {
        if visited.contains(start) {
            continue;
        }
        if let Some(task) = find_cycle(start, &graph, &mut visited) {
            out.push(Diagnostic::error(
                Check::CircularCoRun,
                format!(
                    "Circular co-run groups detected involving task '{}': these create impossible scheduling constraints",
                    task
                ),
            ));
            return;
        }
    }
}

/// Depth-first search from `start` returning the first task reached again
/// while still on the current path. The edge we arrived on is not a way back;
/// a parallel edge to the parent is. The path is kept on an explicit stack so
/// a long chain of co-run pairs cannot exhaust the thread stack.
fn find_cycle<'a>(
    start: &'a str,
    graph: &CoRunGraph<'a>,
    visited: &mut BTreeSet<&'a str>,
) -> Option<&'a str> {
    let mut on_path = BTreeSet::from([start]);
    let mut stack = vec![Frame::enter(start, None, graph)];
    visited.insert(start);

    while let Some(frame) = stack.last_mut() {
        let Some((&next, &count)) = frame.neighbours.next() else {
            on_path.remove(frame.node);
            stack.pop();
            continue;
        };
        let count = if Some(next) == frame.parent { count - 1 } else { count };
        if count == 0 {
            continue;
        }
        if on_path.contains(next) {
            return Some(next);
        }
        if visited.insert(next) {
            let node = frame.node;
            on_path.insert(next);
            stack.push(Frame::enter(next, Some(node), graph));
        }
    }
    None
}

type Neighbours<'g, 'a> = Flatten<option::IntoIter<&'g BTreeMap<&'a str, usize>>>;

struct Frame<'g, 'a> {
    node: &'a str,
    parent: Option<&'a str>,
    neighbours: Neighbours<'g, 'a>,
}

impl<'g, 'a> Frame<'g, 'a> {
    fn enter(node: &'a str, parent: Option<&'a str>, graph: &'g CoRunGraph<'a>) -> Self {
        Self {
            node,
            parent,
            neighbours: graph.get(node).into_iter().flatten(),
        }
    }
}

// ─── Co-run vs phase windows ────────────────────────────────────────────────

fn check_phase_window_conflicts(tasks: &[Row], rules: &[&Rule], out: &mut Vec<Diagnostic>) {
    // First enabled window per task wins.
    let mut windows: HashMap<&str, BTreeSet<i64>> = HashMap::new();
    for rule in rules {
        if let RuleKind::PhaseWindow {
            task_id,
            allowed_phases,
        } = &rule.kind
            && !allowed_phases.is_empty()
        {
            windows
                .entry(task_id.trim())
                .or_insert_with(|| allowed_phases.iter().copied().collect());
        }
    }

    let mut preferred: HashMap<String, &Row> = HashMap::new();
    for row in tasks {
        if let Some(id) = row.text("TaskID") {
            preferred.entry(id.into_owned()).or_insert(row);
        }
    }

    for rule in rules {
        let RuleKind::CoRun { tasks: members } = &rule.kind else {
            continue;
        };

        let determined: Vec<(&str, BTreeSet<i64>)> = co_run_tasks(members)
            .into_iter()
            .filter_map(|task| {
                let phases = match windows.get(task) {
                    Some(window) => Some(window.clone()),
                    None => preferred
                        .get(task)
                        .and_then(|row| cell_phases(row.get("PreferredPhases")))
                        .and_then(Result::ok)
                        .map(|phases| phases.into_iter().collect()),
                };
                // An empty set says nothing about where the task may run.
                phases
                    .filter(|p: &BTreeSet<i64>| !p.is_empty())
                    .map(|p| (task, p))
            })
            .collect();

        if determined.len() < 2 {
            continue;
        }

        let common = determined
            .iter()
            .skip(1)
            .fold(determined[0].1.clone(), |acc, (_, phases)| {
                acc.intersection(phases).copied().collect()
            });

        if common.is_empty() {
            let listing: Vec<String> = determined
                .iter()
                .map(|(task, phases)| format!("{} {}", task, format_phases(phases)))
                .collect();
            out.push(
                Diagnostic::error(
                    Check::PhaseWindowConflict,
                    format!(
                        "Co-run rule '{}' has no phase shared by all its tasks: {}",
                        rule.name(),
                        listing.join(", ")
                    ),
                )
                .for_rule(rule.id()),
            );
        }
    }
}
