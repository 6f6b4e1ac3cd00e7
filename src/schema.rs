//! Static column registry for the three entity kinds.

use crate::types::EntityKind;

pub const CLIENT_COLUMNS: &[&str] = &[
    "ClientID",
    "ClientName",
    "PriorityLevel",
    "RequestedTaskIDs",
    "GroupTag",
    "AttributesJSON",
];

pub const WORKER_COLUMNS: &[&str] = &[
    "WorkerID",
    "WorkerName",
    "Skills",
    "AvailableSlots",
    "MaxLoadPerPhase",
    "WorkerGroup",
    "QualificationLevel",
];

pub const TASK_COLUMNS: &[&str] = &[
    "TaskID",
    "TaskName",
    "Category",
    "Duration",
    "RequiredSkills",
    "PreferredPhases",
    "MaxConcurrent",
];

/// Columns that must appear in a non-empty dataset of `kind`, in display order.
pub fn required_columns(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Client => CLIENT_COLUMNS,
        EntityKind::Worker => WORKER_COLUMNS,
        EntityKind::Task => TASK_COLUMNS,
    }
}

/// Name of the column holding the row identity.
pub fn id_column(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Client => "ClientID",
        EntityKind::Worker => "WorkerID",
        EntityKind::Task => "TaskID",
    }
}
