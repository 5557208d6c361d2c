use serde::{Deserialize, Serialize};

use super::month::MonthKey;

/// Kind of change the backend pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeEventType {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for ChangeEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeEventType::Insert => write!(f, "INSERT"),
            ChangeEventType::Update => write!(f, "UPDATE"),
            ChangeEventType::Delete => write!(f, "DELETE"),
        }
    }
}

/// One notification from the push channel.
///
/// On deletes the backend may send an incomplete (even empty) `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub event_type: ChangeEventType,
    #[serde(default)]
    pub key: String,
}

impl ChangeEvent {
    pub fn new(event_type: ChangeEventType, key: impl Into<String>) -> Self {
        Self {
            event_type,
            key: key.into(),
        }
    }

    pub fn insert(key: impl Into<String>) -> Self {
        Self::new(ChangeEventType::Insert, key)
    }

    pub fn update(key: impl Into<String>) -> Self {
        Self::new(ChangeEventType::Update, key)
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self::new(ChangeEventType::Delete, key)
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.event_type == ChangeEventType::Delete
    }
}

/// What a changed key refers to, by substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeCategory {
    /// `budget_`, `expense` or `income` keys
    BudgetData,
    /// `pockets_` or `transfer` keys
    PocketData,
    /// Matches both families
    Both,
    /// Matches neither (or the key was missing)
    Unknown,
}

/// Which refetches a change requires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefetchPlan {
    pub budget: bool,
    pub pockets: bool,
}

impl RefetchPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.budget && !self.pockets
    }
}

/// Month-scoped filter on backend keys, e.g. `*2025-11*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RealtimeFilter {
    month: MonthKey,
}

impl RealtimeFilter {
    #[must_use]
    pub fn for_month(month: MonthKey) -> Self {
        Self { month }
    }

    #[must_use]
    pub fn month(&self) -> MonthKey {
        self.month
    }

    /// The wildcard pattern sent to the backend when subscribing.
    #[must_use]
    pub fn pattern(&self) -> String {
        format!("*{}*", self.month)
    }

    /// Whether an event passes the filter. Delete events with an empty key
    /// pass: their payload may be incomplete.
    #[must_use]
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if event.key.is_empty() {
            return event.is_delete();
        }
        event.key.contains(&self.month.to_string())
    }
}
