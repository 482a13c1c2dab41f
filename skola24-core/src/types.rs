use serde::{Deserialize, Serialize};

/// A school (timetable hosting site)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Opaque unit identifier
    pub guid: String,
    /// Display name
    pub name: String,
}

/// A class within a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Opaque group identifier
    pub guid: String,
    /// Display name
    pub name: String,
}

/// One scheduled lesson in a rendered week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub guid: String,
    pub name: String,
    pub teacher: String,
    pub location: String,
    /// Weekday as numbered by the service, 1 = Monday
    pub day_of_week: u32,
    /// "HH:MM" or "HH:MM:SS", passed through from the service
    pub time_start: String,
    pub time_end: String,
}

/// Lessons of one group for one ISO week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableWeek {
    pub year: i32,
    pub week: u32,
    pub lessons: Vec<Lesson>,
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Tenant host name, e.g. `it-gymnasiet.skola24.se`
    pub host: String,
    /// API root, always `https://web.skola24.se/` outside of tests
    pub base_url: String,
    /// Request timeout in seconds; no timeout when unset
    pub timeout: Option<u64>,
    pub user_agent: String,
    /// Log resolved identifiers and raw render payloads at debug level
    pub trace_payloads: bool,
}

/// ICS generation options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcsOptions {
    /// Calendar name
    pub calendar_name: Option<String>,
    /// IANA timezone the lesson times are expressed in
    pub timezone: Option<String>,
    /// Whether to put the teacher in the event description
    pub include_teacher: bool,
    pub reminder_minutes: Option<u32>,
}

impl Default for IcsOptions {
    fn default() -> Self {
        Self {
            calendar_name: Some("Skola24".to_string()),
            timezone: Some("Europe/Stockholm".to_string()),
            include_teacher: true,
            reminder_minutes: Some(10),
        }
    }
}
