//! Month view of leave requests.
//!
//! Expands each leave's inclusive date range into per-day buckets so a
//! calendar can be rendered without re-walking every leave for every cell.
//! Rejected leaves are dropped; pending and approved leaves are kept and
//! distinguished by status.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::constants::MAX_LEAVE_SPAN_DAYS;
use crate::errors::{LaLinguaError, Result};
use crate::types::{Leave, LeaveStatus};

/// One leave occupying one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub leave_id: String,
    pub applicant: Option<String>,
    pub status: LeaveStatus,
    pub reason: String,
}

impl CalendarEntry {
    fn from_leave(leave: &Leave) -> Self {
        Self {
            leave_id: leave.id.clone(),
            applicant: leave.user_id.as_ref().and_then(|u| u.name.clone().or_else(|| u.email.clone())),
            status: leave.status,
            reason: leave.reason.clone(),
        }
    }
}

/// Leaves bucketed by calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveCalendar {
    days: BTreeMap<NaiveDate, Vec<CalendarEntry>>,
}

impl LeaveCalendar {
    /// Builds the calendar from a list of leaves.
    ///
    /// Inverted ranges are skipped. Spans longer than
    /// [`MAX_LEAVE_SPAN_DAYS`] are truncated at that length.
    pub fn from_leaves<'a>(leaves: impl IntoIterator<Item = &'a Leave>) -> Self {
        let mut days: BTreeMap<NaiveDate, Vec<CalendarEntry>> = BTreeMap::new();
        for leave in leaves {
            if leave.status == LeaveStatus::Rejected || leave.end_date < leave.start_date {
                continue;
            }
            let span = leave.span_days().min(MAX_LEAVE_SPAN_DAYS);
            let entry = CalendarEntry::from_leave(leave);
            for offset in 0..span {
                let day = leave.start_date + Duration::days(offset);
                days.entry(day).or_default().push(entry.clone());
            }
        }
        Self { days }
    }

    /// Entries on `date`, empty if nobody is on leave.
    #[must_use]
    pub fn entries_on(&self, date: NaiveDate) -> &[CalendarEntry] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    /// All days of the given month that have at least one entry, in order.
    ///
    /// # Errors
    ///
    /// Returns [`LaLinguaError::InvalidInput`] if `month` is not in `1..=12`
    /// or the year is out of range.
    pub fn month(&self, year: i32, month: u32) -> Result<Vec<(NaiveDate, &[CalendarEntry])>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| LaLinguaError::InvalidInput(format!("invalid month {year}-{month}")))?;
        Ok(self
            .days
            .range(first..)
            .take_while(|(day, _)| day.year() == year && day.month() == month)
            .map(|(day, entries)| (*day, entries.as_slice()))
            .collect())
    }

    /// Number of distinct days with at least one entry.
    #[must_use]
    pub fn busy_days(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
