use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

// ─── Entity kinds ───────────────────────────────────────────────────────────

/// The three tabular record sets the engine validates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Client,
    Worker,
    Task,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Client, EntityKind::Worker, EntityKind::Task];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Client => "clients",
            EntityKind::Worker => "workers",
            EntityKind::Task => "tasks",
        })
    }
}

// ─── Cell ───────────────────────────────────────────────────────────────────

/// A loosely-typed scalar as handed over by the upstream file parser.
///
/// Booleans are kept as their text form; nested structures are rejected at
/// deserialization time.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Cell {
    #[default]
    Absent,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Text rendering of the cell. Integral numbers render without a
    /// fractional part so that `3.0` and `"3"` read the same.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Absent => None,
            Cell::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Cell::Number(n) => Some(Cow::Owned(format_number(*n))),
        }
    }

    /// Trimmed text, or `None` if the cell is absent or blank.
    pub fn present(&self) -> Option<Cow<'_, str>> {
        match self.as_text()? {
            Cow::Borrowed(s) => {
                let t = s.trim();
                (!t.is_empty()).then_some(Cow::Borrowed(t))
            }
            Cow::Owned(s) => {
                let t = s.trim();
                (!t.is_empty()).then(|| Cow::Owned(t.to_string()))
            }
        }
    }

    pub fn is_present(&self) -> bool {
        self.present().is_some()
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Absent => serializer.serialize_none(),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Null => Ok(Cell::Absent),
            Value::String(s) => Ok(Cell::Text(s)),
            Value::Bool(b) => Ok(Cell::Text(b.to_string())),
            Value::Number(n) => n
                .as_f64()
                .map(Cell::Number)
                .ok_or_else(|| serde::de::Error::custom(format!("unrepresentable number {}", n))),
            other => Err(serde::de::Error::custom(format!(
                "cell must be a scalar, got {}",
                other
            ))),
        }
    }
}

// ─── Row ────────────────────────────────────────────────────────────────────

/// One record: column name to cell. Missing columns read as [`Cell::Absent`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Cell>);

static ABSENT: Cell = Cell::Absent;

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, column: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.0.insert(column.into(), cell.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, cell: impl Into<Cell>) {
        self.0.insert(column.into(), cell.into());
    }

    pub fn get(&self, column: &str) -> &Cell {
        self.0.get(column).unwrap_or(&ABSENT)
    }

    /// Trimmed, non-blank text of a column.
    pub fn text(&self, column: &str) -> Option<Cow<'_, str>> {
        self.get(column).present()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Cell>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ─── Rules ──────────────────────────────────────────────────────────────────

/// Fields every rule carries regardless of its kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMeta {
    pub id: String,
    pub name: String,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

fn default_priority() -> i64 {
    1
}

fn default_enabled() -> bool {
    true
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Client,
    Worker,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecedenceScope {
    Global,
    Specific,
}

/// The constraint a rule expresses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RuleKind {
    /// Tasks that must be scheduled in the same phase(s).
    CoRun { tasks: Vec<String> },
    SlotRestriction {
        group_type: GroupType,
        group_name: String,
        min_common_slots: i64,
    },
    LoadLimit {
        worker_group: String,
        max_slots_per_phase: i64,
    },
    PhaseWindow {
        task_id: String,
        allowed_phases: Vec<i64>,
    },
    PatternMatch {
        regex: String,
        template: String,
        #[serde(default)]
        parameters: serde_json::Map<String, Value>,
    },
    Precedence {
        scope: PrecedenceScope,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        specific_target: Option<String>,
        override_priority: i64,
    },
}

impl RuleKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            RuleKind::CoRun { .. } => "coRun",
            RuleKind::SlotRestriction { .. } => "slotRestriction",
            RuleKind::LoadLimit { .. } => "loadLimit",
            RuleKind::PhaseWindow { .. } => "phaseWindow",
            RuleKind::PatternMatch { .. } => "patternMatch",
            RuleKind::Precedence { .. } => "precedence",
        }
    }
}

/// A user-defined allocation rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(flatten)]
    pub meta: RuleMeta,
    #[serde(flatten)]
    pub kind: RuleKind,
}

impl Rule {
    /// Create an enabled rule with a fresh id and creation timestamp.
    pub fn new(name: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            meta: RuleMeta {
                id: uuid::Uuid::new_v4().to_string(),
                name: name.into(),
                priority: default_priority(),
                enabled: true,
                created_at: Utc::now(),
            },
            kind,
        }
    }

    pub fn co_run<I, S>(name: impl Into<String>, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            RuleKind::CoRun {
                tasks: tasks.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn phase_window(
        name: impl Into<String>,
        task_id: impl Into<String>,
        allowed_phases: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self::new(
            name,
            RuleKind::PhaseWindow {
                task_id: task_id.into(),
                allowed_phases: allowed_phases.into_iter().collect(),
            },
        )
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.meta.priority = priority;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.meta.enabled = false;
        self
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn is_enabled(&self) -> bool {
        self.meta.enabled
    }
}
