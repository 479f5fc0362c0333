//! Status conditions reported on every managed record.
//!
//! Two condition types are tracked. `Ready` says whether the remote object
//! exists and is usable (reasons `Available`, `Unavailable`, `Creating`,
//! `Deleting`), `Synced` says whether the last reconcile tick succeeded
//! (reasons `ReconcileSuccess`, `ReconcileError`).

use std::fmt::Display;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, JsonSchema, Hash, PartialEq, Eq)]
pub enum ConditionType {
    Ready,
    Synced,
}

impl Display for ConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionType::Ready => f.write_str("Ready"),
            ConditionType::Synced => f.write_str("Synced"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, JsonSchema, Hash, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

pub mod reason {
    pub const AVAILABLE: &str = "Available";
    pub const UNAVAILABLE: &str = "Unavailable";
    pub const CREATING: &str = "Creating";
    pub const DELETING: &str = "Deleting";
    pub const RECONCILE_SUCCESS: &str = "ReconcileSuccess";
    pub const RECONCILE_ERROR: &str = "ReconcileError";
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: ConditionType,
    pub status: ConditionStatus,
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    pub fn new(
        type_: ConditionType,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Condition {
            type_,
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: Utc::now(),
        }
    }

    /// The remote object exists and is usable.
    pub fn available() -> Self {
        Self::new(
            ConditionType::Ready,
            ConditionStatus::True,
            reason::AVAILABLE,
            "",
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            ConditionType::Ready,
            ConditionStatus::False,
            reason::UNAVAILABLE,
            message,
        )
    }

    pub fn creating() -> Self {
        Self::new(
            ConditionType::Ready,
            ConditionStatus::False,
            reason::CREATING,
            "",
        )
    }

    pub fn deleting() -> Self {
        Self::new(
            ConditionType::Ready,
            ConditionStatus::False,
            reason::DELETING,
            "",
        )
    }

    pub fn reconcile_success() -> Self {
        Self::new(
            ConditionType::Synced,
            ConditionStatus::True,
            reason::RECONCILE_SUCCESS,
            "",
        )
    }

    pub fn reconcile_error(message: impl Into<String>) -> Self {
        Self::new(
            ConditionType::Synced,
            ConditionStatus::False,
            reason::RECONCILE_ERROR,
            message,
        )
    }

    /// Same type, status, reason and message. Timestamps are ignored.
    pub fn equivalent(&self, other: &Condition) -> bool {
        self.type_ == other.type_
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Set `condition` in `conditions`, replacing any existing condition of the
/// same type in place. The transition time of the existing condition is kept
/// when the status did not change.
pub fn merge(conditions: &mut Vec<Condition>, mut condition: Condition) {
    match conditions
        .iter_mut()
        .find(|existing| existing.type_ == condition.type_)
    {
        Some(existing) => {
            if existing.equivalent(&condition) {
                return;
            }

            if existing.status == condition.status {
                condition.last_transition_time = existing.last_transition_time;
            }

            *existing = condition;
        }
        None => conditions.push(condition),
    }
}
