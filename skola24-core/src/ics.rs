use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::{Error, IcsOptions, Lesson, Result, TimetableWeek, week::WeekDetector};


/// ICS calendar generator for a rendered week
pub struct IcsGenerator {
    options: IcsOptions,
}

impl IcsGenerator {
    pub const fn new(options: IcsOptions) -> Self {
        Self { options }
    }

    /// Render the week as an iCalendar document
    pub fn generate(&self, timetable: &TimetableWeek) -> Result<String> {
        let mut ics_content = String::new();

        ics_content.push_str("BEGIN:VCALENDAR\r\n");
        ics_content.push_str("VERSION:2.0\r\n");
        ics_content.push_str("PRODID:-//Skola24 RS//Skola24 Timetable//SV\r\n");
        ics_content.push_str("CALSCALE:GREGORIAN\r\n");
        ics_content.push_str("METHOD:PUBLISH\r\n");

        if let Some(ref name) = self.options.calendar_name {
            ics_content.push_str(&format!("X-WR-CALNAME:{}\r\n", self.escape_text(name)));
        }

        if let Some(ref timezone) = self.options.timezone {
            ics_content.push_str(&format!("X-WR-TIMEZONE:{}\r\n", timezone));
        }

        for lesson in &timetable.lessons {
            let Some(date) =
                WeekDetector::lesson_date(timetable.year, timetable.week, lesson.day_of_week)?
            else {
                tracing::warn!(
                    "Skipping lesson {} with unknown weekday {}",
                    lesson.guid,
                    lesson.day_of_week
                );
                continue;
            };
            self.add_lesson_event(&mut ics_content, lesson, date)?;
        }

        ics_content.push_str("END:VCALENDAR\r\n");

        Ok(ics_content)
    }

    fn add_lesson_event(
        &self,
        ics_content: &mut String,
        lesson: &Lesson,
        date: NaiveDate,
    ) -> Result<()> {
        let uid = Uuid::new_v4().to_string();
        let dtstamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let start = date.and_time(self.parse_time(&lesson.time_start)?);
        let end = date.and_time(self.parse_time(&lesson.time_end)?);

        ics_content.push_str("BEGIN:VEVENT\r\n");
        ics_content.push_str(&format!("UID:{}\r\n", uid));
        ics_content.push_str(&format!("DTSTAMP:{}\r\n", dtstamp));
        ics_content.push_str(&self.format_datetime("DTSTART", &start));
        ics_content.push_str(&self.format_datetime("DTEND", &end));
        ics_content.push_str(&format!(
            "SUMMARY:{}\r\n",
            self.escape_text(&self.build_lesson_title(lesson))
        ));

        if !lesson.location.is_empty() {
            ics_content.push_str(&format!(
                "LOCATION:{}\r\n",
                self.escape_text(&lesson.location)
            ));
        }

        if self.options.include_teacher && !lesson.teacher.is_empty() {
            ics_content.push_str(&format!(
                "DESCRIPTION:{}\r\n",
                self.escape_text(&format!("Teacher: {}", lesson.teacher))
            ));
        }

        if let Some(reminder_minutes) = self.options.reminder_minutes {
            ics_content.push_str("BEGIN:VALARM\r\n");
            ics_content.push_str("ACTION:DISPLAY\r\n");
            ics_content.push_str(&format!(
                "DESCRIPTION:{}\r\n",
                self.escape_text(&lesson.name)
            ));
            ics_content.push_str(&format!("TRIGGER:-PT{}M\r\n", reminder_minutes));
            ics_content.push_str("END:VALARM\r\n");
        }

        ics_content.push_str("END:VEVENT\r\n");

        Ok(())
    }

    /// Local time, anchored to the configured timezone when there is one
    fn format_datetime(&self, name: &str, datetime: &NaiveDateTime) -> String {
        let value = datetime.format("%Y%m%dT%H%M%S");
        match self.options.timezone {
            Some(ref tz) => format!("{};TZID={}:{}\r\n", name, tz, value),
            None => format!("{}:{}\r\n", name, value),
        }
    }

    fn parse_time(&self, time_str: &str) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(time_str, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M"))
            .map_err(|_| Error::IcsGeneration(format!("Invalid time format: {}", time_str)))
    }

    /// RFC 5545 text escaping. Line breaks become `\n`, bare CRs are dropped
    fn escape_text(&self, text: &str) -> String {
        text.replace('\\', "\\\\")
            .replace("\r\n", "\n")
            .replace('\r', "")
            .replace('\n', "\\n")
            .replace(',', "\\,")
            .replace(';', "\\;")
    }

    /// Lesson name, followed by the room when known
    pub fn build_lesson_title(&self, lesson: &Lesson) -> String {
        if lesson.location.is_empty() {
            lesson.name.clone()
        } else {
            format!("{} - {}", lesson.name, lesson.location)
        }
    }
}

impl Default for IcsGenerator {
    fn default() -> Self {
        Self::new(IcsOptions::default())
    }
}
