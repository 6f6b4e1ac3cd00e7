//! Validation entry points.
//!
//! Every entry point returns **all** diagnostics found, never just the first,
//! and never modifies its inputs. Diagnostics come out in check order, then
//! row order.

use crate::context::ValidationContext;
use crate::cross_ref::check_cross_references;
use crate::report::ValidationReport;
use crate::rows::check_rows;
use crate::rules::check_rules;
use crate::types::{EntityKind, Row, Rule};
use tracing::debug;

/// What a [`validate`] call looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// The context's stored rows for one entity kind.
    Data(EntityKind),
    /// The context's stored rule list.
    Rules,
}

/// Validate one target using only what the context holds.
pub fn validate(ctx: &ValidationContext, target: Target) -> ValidationReport {
    match target {
        Target::Data(kind) => validate_data(ctx, kind, ctx.rows(kind)),
        Target::Rules => validate_rules(ctx, &ctx.rules),
    }
}

/// Validate `rows` as entity `kind`.
///
/// `rows` replaces the context's stored dataset of the same kind for this
/// call; the other kinds come from the context and feed the cross-reference
/// checks.
pub fn validate_data(ctx: &ValidationContext, kind: EntityKind, rows: &[Row]) -> ValidationReport {
    debug!(kind = %kind, rows = rows.len(), "validating dataset");

    let view = ctx.view_with(kind, rows);
    let mut diagnostics = Vec::new();

    check_rows(kind, rows, &ctx.options, &mut diagnostics);
    check_cross_references(&view, kind, &mut diagnostics);

    finish(diagnostics)
}

/// Validate `rules` against each other and against the context's task rows.
pub fn validate_rules(ctx: &ValidationContext, rules: &[Rule]) -> ValidationReport {
    debug!(rules = rules.len(), tasks = ctx.tasks.len(), "validating rules");

    let mut diagnostics = Vec::new();
    check_rules(&ctx.view(), rules, &mut diagnostics);

    finish(diagnostics)
}

/// Validate clients, workers, tasks, then rules, merged into one report.
pub fn validate_all(ctx: &ValidationContext) -> ValidationReport {
    let mut report = ValidationReport::new();
    for kind in EntityKind::ALL {
        report.merge(validate(ctx, Target::Data(kind)));
    }
    report.merge(validate(ctx, Target::Rules));
    report
}

fn finish(diagnostics: Vec<crate::error::Diagnostic>) -> ValidationReport {
    let report = ValidationReport::from(diagnostics);
    debug!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validation finished"
    );
    report
}
