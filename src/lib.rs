//! Validation and rule-consistency engine for resource-allocation datasets.
//!
//! Three tabular datasets (clients, workers, tasks) arrive as already-parsed
//! rows of loosely-typed cells, alongside a list of user-defined allocation
//! rules. This crate checks them and reports row-addressable diagnostics:
//!
//! ```text
//! rows ─┐
//!       ├→ ValidationContext → validate_data(kind) → ValidationReport
//! rules ┘                    → validate_rules      → ValidationReport
//! ```
//!
//! Validators are pure: they borrow an immutable [`ValidationContext`] and
//! return every finding at once. Nothing is fatal; a malformed cell becomes a
//! [`Diagnostic`] and the scan continues.
//!
//! # Quick Start
//!
//! ```rust
//! use allocation_validate::{EntityKind, Row, Rule, ValidationContext, validate_rules};
//!
//! let tasks = vec![
//!     Row::new().with("TaskID", "T1").with("PreferredPhases", "1-2"),
//!     Row::new().with("TaskID", "T2").with("PreferredPhases", "3-4"),
//! ];
//! let ctx = ValidationContext::new().with_data(EntityKind::Task, tasks);
//!
//! let report = validate_rules(&ctx, &[Rule::co_run("pair", ["T1", "T2"])]);
//! assert_eq!(report.error_count(), 1);
//! ```
//!
//! # Feature Flags
//!
//! | Feature         | Default | Description |
//! |-----------------|---------|-------------|
//! | `pattern-rules` | yes     | Compile-check `patternMatch` rule regexes via the [`regex`] crate. |

pub mod context;
pub mod cross_ref;
pub mod error;
pub mod parse;
pub mod primitives;
pub mod report;
pub mod rows;
pub mod rules;
pub mod schema;
pub mod types;
pub mod validate;

pub use context::{DatasetView, Session, ValidationContext, ValidationOptions};
pub use error::*;
pub use report::ValidationReport;
pub use types::*;

// Re-export entry-point functions at the crate root for convenience.
pub use parse::{parse_options, parse_rows, parse_rules};
pub use primitives::{parse_numeric_list, parse_phase_spec};
pub use validate::{Target, validate, validate_all, validate_data, validate_rules};
