//! Skola24 Core Library
//!
//! Typed asynchronous bindings for the Skola24 school timetable service:
//! unit lookup, group lookup and rendered week timetables, plus helpers for
//! ISO weeks and iCalendar export.

pub mod client;
pub mod error;
pub mod ics;
pub mod types;
pub mod week;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{client::*, ics::*, types::*, week::*};
}
