//! Pure helpers over domain types

pub mod leave_calendar;

pub use leave_calendar::{CalendarEntry, LeaveCalendar};
