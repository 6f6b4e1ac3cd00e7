//! Validation inputs: an immutable [`ValidationContext`] snapshot, the
//! [`DatasetView`] validators read from, and the stateful [`Session`] wrapper
//! for callers that prefer the set-then-validate style.

use crate::report::ValidationReport;
use crate::types::{EntityKind, Row, Rule};
use crate::validate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Runtime knobs. The defaults reproduce the standard schema constraints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Lowest accepted client PriorityLevel.
    pub min_priority: i64,
    /// Highest accepted client PriorityLevel.
    pub max_priority: i64,
    /// Compare worker skills and task required skills case-insensitively.
    pub fold_skill_case: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            min_priority: 1,
            max_priority: 5,
            fold_skill_case: true,
        }
    }
}

/// Everything a validation call may look at.
///
/// Validators only borrow the context, so two calls over the same context
/// always see the same data.
#[derive(Clone, Debug, Default)]
pub struct ValidationContext {
    pub clients: Vec<Row>,
    pub workers: Vec<Row>,
    pub tasks: Vec<Row>,
    pub rules: Vec<Rule>,
    pub options: ValidationOptions,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, kind: EntityKind, rows: Vec<Row>) -> Self {
        *self.rows_mut(kind) = rows;
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn rows(&self, kind: EntityKind) -> &[Row] {
        match kind {
            EntityKind::Client => &self.clients,
            EntityKind::Worker => &self.workers,
            EntityKind::Task => &self.tasks,
        }
    }

    fn rows_mut(&mut self, kind: EntityKind) -> &mut Vec<Row> {
        match kind {
            EntityKind::Client => &mut self.clients,
            EntityKind::Worker => &mut self.workers,
            EntityKind::Task => &mut self.tasks,
        }
    }

    /// View over the stored datasets.
    pub fn view(&self) -> DatasetView<'_> {
        DatasetView {
            clients: &self.clients,
            workers: &self.workers,
            tasks: &self.tasks,
            options: &self.options,
        }
    }

    /// View where `rows` stands in for the stored dataset of `kind`.
    pub fn view_with<'a>(&'a self, kind: EntityKind, rows: &'a [Row]) -> DatasetView<'a> {
        let mut view = self.view();
        match kind {
            EntityKind::Client => view.clients = rows,
            EntityKind::Worker => view.workers = rows,
            EntityKind::Task => view.tasks = rows,
        }
        view
    }
}

/// Borrowed datasets for one validation call.
#[derive(Clone, Copy, Debug)]
pub struct DatasetView<'a> {
    pub clients: &'a [Row],
    pub workers: &'a [Row],
    pub tasks: &'a [Row],
    pub options: &'a ValidationOptions,
}

impl<'a> DatasetView<'a> {
    pub fn rows(&self, kind: EntityKind) -> &'a [Row] {
        match kind {
            EntityKind::Client => self.clients,
            EntityKind::Worker => self.workers,
            EntityKind::Task => self.tasks,
        }
    }

    pub fn is_loaded(&self, kind: EntityKind) -> bool {
        !self.rows(kind).is_empty()
    }
}

/// Stateful front end: replace datasets and rules, then validate.
///
/// Results reflect the session contents at the moment of the call; nothing
/// is re-validated automatically when a setter runs. Setters take `&mut self`,
/// so a session shared across threads must sit behind a lock, which keeps
/// setter/validate interleavings serialized.
#[derive(Clone, Debug, Default)]
pub struct Session {
    context: ValidationContext,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ValidationOptions) -> Self {
        Self {
            context: ValidationContext::new().with_options(options),
        }
    }

    /// Replace the stored snapshot for one entity kind.
    pub fn set_data(&mut self, kind: EntityKind, rows: Vec<Row>) {
        debug!(kind = %kind, rows = rows.len(), "dataset replaced");
        *self.context.rows_mut(kind) = rows;
    }

    /// Replace the stored rule list.
    pub fn set_rules(&mut self, rules: Vec<Rule>) {
        debug!(rules = rules.len(), "rule list replaced");
        self.context.rules = rules;
    }

    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    /// Validate `rows` as `kind`, cross-referencing the other stored kinds.
    pub fn validate_data(&self, kind: EntityKind, rows: &[Row]) -> ValidationReport {
        validate::validate_data(&self.context, kind, rows)
    }

    /// Validate `rules` against the stored task data.
    pub fn validate_rules(&self, rules: &[Rule]) -> ValidationReport {
        validate::validate_rules(&self.context, rules)
    }

    /// Validate every stored dataset and the stored rules in one pass.
    pub fn validate_all(&self) -> ValidationReport {
        validate::validate_all(&self.context)
    }
}
