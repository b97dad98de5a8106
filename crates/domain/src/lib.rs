//! # LaLingua Domain
//!
//! Business domain types for the LaLingua client.
//!
//! This crate contains:
//! - Wire types exchanged with the backend (courses, enrollment, leave, admin)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Endpoint paths, storage keys and other constants
//!
//! ## Architecture
//! - No dependencies on other LaLingua crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::leave_calendar::{CalendarEntry, LeaveCalendar};
