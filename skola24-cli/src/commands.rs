use std::fs;

use anyhow::{Result, bail};
use skola24_core::{ics::IcsGenerator, prelude::*};

use crate::OutputFormat;

/// Timetable command parameters
pub struct TimetableParams {
    pub unit_guid: String,
    pub group_guid: String,
    pub year: Option<i32>,
    pub week: Option<u32>,
    pub format: OutputFormat,
    pub output: Option<String>,
    pub calendar_name: Option<String>,
    pub include_teacher: bool,
    pub reminder_minutes: u32,
}

/// List units command
pub async fn units_command<A: TimetableApi + ?Sized>(api: &A) -> Result<()> {
    let units = api.list_units().await?;
    print!("{}", render_units(&units));
    Ok(())
}

/// List groups command
pub async fn groups_command<A: TimetableApi + ?Sized>(api: &A, unit_guid: &str) -> Result<()> {
    let groups = api.list_groups(unit_guid).await?;
    print!("{}", render_groups(&groups));
    Ok(())
}

/// Fetch a week and write it in the requested format
pub async fn timetable_command<A: TimetableApi + ?Sized>(
    api: &A,
    params: TimetableParams,
) -> Result<()> {
    let timetable = fetch_week(api, &params).await?;

    let content = match params.format {
        OutputFormat::Table => render_timetable(&timetable)?,
        OutputFormat::Json => serde_json::to_string_pretty(&timetable)? + "\n",
        OutputFormat::Ics => {
            let options = IcsOptions {
                calendar_name: params.calendar_name.or_else(|| {
                    Some(format!("Skola24 {}-W{:02}", timetable.year, timetable.week))
                }),
                include_teacher: params.include_teacher,
                reminder_minutes: Some(params.reminder_minutes),
                ..IcsOptions::default()
            };
            IcsGenerator::new(options).generate(&timetable)?
        }
    };

    match params.output {
        Some(path) => {
            fs::write(&path, content)?;
            eprintln!("✓ Timetable written to: {}", path);
        }
        None => print!("{}", content),
    }

    Ok(())
}

/// Resolve the week (current ISO week by default) and fetch its lessons
pub async fn fetch_week<A: TimetableApi + ?Sized>(
    api: &A,
    params: &TimetableParams,
) -> Result<TimetableWeek> {
    let (year, week) = resolve_week(params.year, params.week, WeekDetector::detect_current())?;

    tracing::info!(
        "Fetching timetable: host={}, unit={}, group={}, week={}-W{:02}",
        api.host(),
        params.unit_guid,
        params.group_guid,
        year,
        week
    );

    let lessons = api
        .fetch_timetable(&params.unit_guid, &params.group_guid, year, week)
        .await?;

    Ok(TimetableWeek {
        year,
        week,
        lessons,
    })
}

/// Year and week default as a pair; a week alone means the current ISO year
fn resolve_week(year: Option<i32>, week: Option<u32>, current: (i32, u32)) -> Result<(i32, u32)> {
    match (year, week) {
        (Some(year), Some(week)) => Ok((year, week)),
        (None, Some(week)) => Ok((current.0, week)),
        (None, None) => Ok(current),
        (Some(year), None) => bail!("--week is required when --year ({}) is given", year),
    }
}

fn render_units(units: &[Unit]) -> String {
    if units.is_empty() {
        return "No units found\n".to_string();
    }
    units
        .iter()
        .map(|u| format!("{}  {}\n", u.guid, u.name))
        .collect()
}

fn render_groups(groups: &[Group]) -> String {
    if groups.is_empty() {
        return "No classes found\n".to_string();
    }
    groups
        .iter()
        .map(|g| format!("{}  {}\n", g.guid, g.name))
        .collect()
}

fn render_timetable(timetable: &TimetableWeek) -> Result<String> {
    let mut out = format!("Week {}-W{:02}\n", timetable.year, timetable.week);

    if timetable.lessons.is_empty() {
        out.push_str("No lessons scheduled\n");
        return Ok(out);
    }

    for lesson in &timetable.lessons {
        let day = WeekDetector::lesson_date(timetable.year, timetable.week, lesson.day_of_week)?
            .map_or_else(
                || format!("day {}", lesson.day_of_week),
                |date| date.format("%a %Y-%m-%d").to_string(),
            );
        out.push_str(&format!(
            "{}  {}-{}  {}  {}  {}\n",
            day, lesson.time_start, lesson.time_end, lesson.name, lesson.teacher, lesson.location
        ));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory timetable service
    #[derive(Default)]
    struct FakeApi {
        lessons: Vec<Lesson>,
        calls: Mutex<Vec<(i32, u32)>>,
    }

    #[async_trait]
    impl TimetableApi for FakeApi {
        fn host(&self) -> &str {
            "example.skola24.se"
        }

        async fn list_units(&self) -> skola24_core::Result<Vec<Unit>> {
            Ok(vec![Unit {
                guid: "g1".to_string(),
                name: "School A".to_string(),
            }])
        }

        async fn list_groups(&self, unit_guid: &str) -> skola24_core::Result<Vec<Group>> {
            if unit_guid == "g1" {
                Ok(vec![Group {
                    guid: "c1".to_string(),
                    name: "9A".to_string(),
                }])
            } else {
                Err(skola24_core::Error::Upstream(
                    r#"[{"message":"Unknown unit"}]"#.to_string(),
                ))
            }
        }

        async fn fetch_timetable(
            &self,
            _unit_guid: &str,
            _group_guid: &str,
            year: i32,
            week: u32,
        ) -> skola24_core::Result<Vec<Lesson>> {
            self.calls.lock().unwrap().push((year, week));
            Ok(self.lessons.clone())
        }
    }

    fn params(year: Option<i32>, week: Option<u32>) -> TimetableParams {
        TimetableParams {
            unit_guid: "g1".to_string(),
            group_guid: "c1".to_string(),
            year,
            week,
            format: OutputFormat::Table,
            output: None,
            calendar_name: None,
            include_teacher: true,
            reminder_minutes: 10,
        }
    }

    fn math() -> Lesson {
        Lesson {
            guid: "l1".to_string(),
            name: "Math".to_string(),
            teacher: "Ms. Lee".to_string(),
            location: "Room 3".to_string(),
            day_of_week: 1,
            time_start: "08:00".to_string(),
            time_end: "09:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_week_uses_given_week() {
        let api = FakeApi {
            lessons: vec![math()],
            ..FakeApi::default()
        };

        let timetable = fetch_week(&api, &params(Some(2024), Some(10))).await.unwrap();

        assert_eq!(timetable.year, 2024);
        assert_eq!(timetable.week, 10);
        assert_eq!(timetable.lessons, vec![math()]);
        assert_eq!(*api.calls.lock().unwrap(), vec![(2024, 10)]);
    }

    #[tokio::test]
    async fn test_fetch_week_defaults_to_current_week() {
        let api = FakeApi::default();

        let timetable = fetch_week(&api, &params(None, None)).await.unwrap();

        assert_eq!(
            (timetable.year, timetable.week),
            WeekDetector::detect_current()
        );
    }

    #[test]
    fn test_resolve_week_defaults_as_pair() {
        let current = (2020, 53);

        assert_eq!(resolve_week(None, None, current).unwrap(), (2020, 53));
        assert_eq!(resolve_week(None, Some(2), current).unwrap(), (2020, 2));
        assert_eq!(
            resolve_week(Some(2024), Some(10), current).unwrap(),
            (2024, 10)
        );

        let err = resolve_week(Some(2024), None, current).unwrap_err();
        assert!(err.to_string().contains("--week"));
    }

    #[tokio::test]
    async fn test_fetch_week_year_without_week_fails() {
        let api = FakeApi::default();

        let err = fetch_week(&api, &params(Some(2024), None)).await.unwrap_err();

        assert!(err.to_string().contains("--week"));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_groups_error_propagates() {
        let api = FakeApi::default();
        let err = groups_command(&api, "nope").await.unwrap_err();
        assert!(err.to_string().contains("Unknown unit"));
    }

    #[test]
    fn test_render_timetable() {
        let timetable = TimetableWeek {
            year: 2024,
            week: 10,
            lessons: vec![math()],
        };

        let out = render_timetable(&timetable).unwrap();
        assert_eq!(
            out,
            "Week 2024-W10\nMon 2024-03-04  08:00-09:00  Math  Ms. Lee  Room 3\n"
        );
    }

    #[test]
    fn test_render_empty_lists() {
        assert_eq!(render_units(&[]), "No units found\n");
        assert_eq!(render_groups(&[]), "No classes found\n");

        let empty = TimetableWeek {
            year: 2024,
            week: 30,
            lessons: Vec::new(),
        };
        assert_eq!(
            render_timetable(&empty).unwrap(),
            "Week 2024-W30\nNo lessons scheduled\n"
        );
    }

    #[test]
    fn test_render_units_keeps_order() {
        let units = vec![
            Unit {
                guid: "z".to_string(),
                name: "Zeta".to_string(),
            },
            Unit {
                guid: "a".to_string(),
                name: "Alpha".to_string(),
            },
        ];
        assert_eq!(render_units(&units), "z  Zeta\na  Alpha\n");
    }
}
