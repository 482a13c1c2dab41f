use chrono::{Datelike, Days, Local, NaiveDate, Weekday};

use crate::{Error, Result};

/// ISO week helpers
pub struct WeekDetector;

impl WeekDetector {
    /// Current ISO `(year, week)` in local time, e.g. `(2024, 10)`
    pub fn detect_current() -> (i32, u32) {
        Self::detect_from_date(Local::now().date_naive())
    }

    /// ISO `(year, week)` of a date; the ISO year differs from the calendar
    /// year around new year.
    pub fn detect_from_date(date: NaiveDate) -> (i32, u32) {
        let iso = date.iso_week();
        (iso.year(), iso.week())
    }

    /// Monday of an ISO week
    pub fn week_monday(year: i32, week: u32) -> Result<NaiveDate> {
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
            .ok_or_else(|| Error::Config(format!("Invalid ISO week: {}-W{:02}", year, week)))
    }

    /// Calendar date of a lesson, `None` when the weekday number is outside
    /// 1 (Monday) ..= 7 (Sunday)
    pub fn lesson_date(year: i32, week: u32, day_of_week: u32) -> Result<Option<NaiveDate>> {
        let weekday = match day_of_week {
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            7 => Weekday::Sun,
            _ => return Ok(None),
        };

        let monday = Self::week_monday(year, week)?;
        Ok(monday.checked_add_days(Days::new(u64::from(weekday.num_days_from_monday()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_detection() {
        assert_eq!(WeekDetector::detect_from_date(date(2024, 3, 4)), (2024, 10));
        assert_eq!(WeekDetector::detect_from_date(date(2024, 3, 10)), (2024, 10));

        // ISO year differs from calendar year around new year
        assert_eq!(WeekDetector::detect_from_date(date(2021, 1, 3)), (2020, 53));
        assert_eq!(WeekDetector::detect_from_date(date(2024, 12, 30)), (2025, 1));
    }

    #[test]
    fn test_week_monday() {
        assert_eq!(WeekDetector::week_monday(2024, 10).unwrap(), date(2024, 3, 4));
        assert_eq!(WeekDetector::week_monday(2025, 1).unwrap(), date(2024, 12, 30));
        assert_eq!(WeekDetector::week_monday(2020, 53).unwrap(), date(2020, 12, 28));
    }

    #[test]
    fn test_invalid_week() {
        // 2023 has 52 ISO weeks
        assert!(matches!(
            WeekDetector::week_monday(2023, 53),
            Err(Error::Config(_))
        ));
        assert!(WeekDetector::week_monday(2024, 0).is_err());
    }

    #[test]
    fn test_lesson_date() {
        assert_eq!(
            WeekDetector::lesson_date(2024, 10, 1).unwrap(),
            Some(date(2024, 3, 4))
        );
        assert_eq!(
            WeekDetector::lesson_date(2024, 10, 5).unwrap(),
            Some(date(2024, 3, 8))
        );
        assert_eq!(
            WeekDetector::lesson_date(2024, 10, 7).unwrap(),
            Some(date(2024, 3, 10))
        );
        assert_eq!(WeekDetector::lesson_date(2024, 10, 0).unwrap(), None);
        assert_eq!(WeekDetector::lesson_date(2024, 10, 8).unwrap(), None);
    }
}
