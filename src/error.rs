use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Identifies the check that produced a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    MissingColumns,
    MissingId,
    DuplicateId,
    PriorityRange,
    InvalidJson,
    MissingField,
    MalformedList,
    NonPositivePhase,
    IntegerRange,
    WorkerOverloaded,
    UnknownTaskReference,
    UncoveredSkill,
    InsufficientWorkers,
    PhaseSaturation,
    CircularCoRun,
    PhaseWindowConflict,
    DuplicateRuleId,
    InvalidRule,
    UnknownRuleReference,
}

/// A single validation finding, addressed to a row (or the whole dataset)
/// and optionally to a column or rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub check: Check,
    pub message: String,
    /// `None` for dataset-level findings. Serialized as `-1` in that case.
    #[serde(with = "row_index")]
    pub row_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "fieldName")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl Diagnostic {
    pub fn error(check: Check, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, check, message)
    }

    pub fn warning(check: Check, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, check, message)
    }

    fn new(severity: DiagnosticSeverity, check: Check, message: impl Into<String>) -> Self {
        Self {
            severity,
            check,
            message: message.into(),
            row_index: None,
            field: None,
            rule_id: None,
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row_index = Some(row);
        self
    }

    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn for_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        match (self.row_index, &self.field) {
            (Some(row), Some(field)) => write!(f, "{level} [row {row}, {field}]: {}", self.message),
            (Some(row), None) => write!(f, "{level} [row {row}]: {}", self.message),
            (None, _) => write!(f, "{level}: {}", self.message),
        }
    }
}

/// Wire form of the row locator: dataset-level findings use `-1`.
mod row_index {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(row) => serializer.serialize_u64(*row as u64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        if raw < 0 {
            Ok(None)
        } else {
            usize::try_from(raw)
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}

/// Produced by the field parsers when a list or range encoding is malformed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MalformedListError {
    #[error("'{token}' is not an integer")]
    InvalidToken { token: String },
    #[error("'{raw}' is not a valid 'start-end' range")]
    InvalidRange { raw: String },
    #[error("range '{raw}' must start at 1 or above")]
    RangeStart { raw: String },
    #[error("range '{raw}' starts after it ends")]
    ReversedRange { raw: String },
    #[error("range '{raw}' spans more than {limit} phases")]
    RangeTooWide { raw: String, limit: i64 },
}

/// Error kind for ingestion failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    Syntax,
    TypeMismatch,
    UnknownVariant,
}

/// Produced by the `parse` helpers when JSON/YAML input cannot be read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ParseError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::Syntax,
            message: message.into(),
            path: None,
        }
    }

    pub(crate) fn type_mismatch(message: impl Into<String>, path: Option<String>) -> Self {
        Self {
            kind: ParseErrorKind::TypeMismatch,
            message: message.into(),
            path,
        }
    }
}
