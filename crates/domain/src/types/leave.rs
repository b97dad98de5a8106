//! Leave request types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{LaLinguaError, Result};
use crate::impl_status_conversions;

/// Review state of a leave request
///
/// The backend spells these capitalised on the wire (`"Approved"`); lowercase
/// spellings are accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

impl_status_conversions!(LeaveStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// Person who filed the leave, when the backend populates it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplicant {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leave {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<LeaveApplicant>,
    #[serde(default)]
    pub leave_type: Option<String>,
    #[serde(deserialize_with = "calendar_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "calendar_date")]
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Reads either a bare `YYYY-MM-DD` date or a full RFC 3339 timestamp.
///
/// Dates are stored as midnight UTC timestamps server-side, so only the date
/// part of a timestamp is kept.
fn calendar_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc).date_naive())
        .map_err(|e| serde::de::Error::custom(format!("invalid date {raw:?}: {e}")))
}

impl Leave {
    /// Number of calendar days covered, inclusive of both ends.
    #[must_use]
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// New leave application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

impl LeaveInput {
    /// Builds an application, rejecting inverted ranges and blank reasons.
    ///
    /// # Errors
    ///
    /// Returns [`LaLinguaError::InvalidInput`] if `end_date` precedes
    /// `start_date` or `reason` is blank.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, reason: impl Into<String>) -> Result<Self> {
        if end_date < start_date {
            return Err(LaLinguaError::InvalidInput(format!(
                "leave ends ({end_date}) before it starts ({start_date})"
            )));
        }
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(LaLinguaError::InvalidInput("leave reason is required".into()));
        }
        Ok(Self { leave_type: None, start_date, end_date, reason })
    }

    #[must_use]
    pub fn with_leave_type(mut self, leave_type: impl Into<String>) -> Self {
        self.leave_type = Some(leave_type.into());
        self
    }
}

/// Reviewer decision on a pending leave
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveDecision {
    Approve,
    Reject { reason: Option<String> },
}

impl LeaveDecision {
    #[must_use]
    pub const fn status(&self) -> LeaveStatus {
        match self {
            Self::Approve => LeaveStatus::Approved,
            Self::Reject { .. } => LeaveStatus::Rejected,
        }
    }

    #[must_use]
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Approve => None,
            Self::Reject { reason } => reason.as_deref(),
        }
    }
}

/// Body of the status-update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveStatusUpdate {
    pub status: LeaveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl From<&LeaveDecision> for LeaveStatusUpdate {
    fn from(decision: &LeaveDecision) -> Self {
        Self {
            status: decision.status(),
            rejection_reason: decision.rejection_reason().map(str::to_owned),
        }
    }
}

/// Paginated leave listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveList {
    #[serde(default)]
    pub leaves: Vec<Leave>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total: u64,
}
