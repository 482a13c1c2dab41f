pub mod base;
pub mod envelope;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ClientConfig, Error, Group, Lesson, Result, Unit};

pub use base::*;

const UNITS_PATH: &str = "api/services/skola24/get/timetable/viewer/units";
const SELECTION_PATH: &str = "api/get/timetable/selection";
const RENDER_KEY_PATH: &str = "api/get/timetable/render/key";
const RENDER_PATH: &str = "api/render/timetable";

/// Tenant queried by `list_units`, independent of the configured host
pub const UNITS_TENANT: &str = "it-gymnasiet.skola24.se";

/// Render canvas size; irrelevant to the returned lesson data
const RENDER_SIZE: u32 = 512;

/// `selectionType` value selecting a whole week for a group
const SELECTION_TYPE_WEEK: u32 = 0;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UnitsRequest<'a> {
    get_timetable_viewer_units_request: HostNameRequest<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HostNameRequest<'a> {
    host_name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitsData {
    get_timetable_viewer_units_response: UnitsResponse,
}

#[derive(Debug, Deserialize)]
struct UnitsResponse {
    units: Option<Vec<RawUnit>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUnit {
    unit_guid: String,
    unit_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectionRequest<'a> {
    host_name: &'a str,
    unit_guid: &'a str,
    filters: SelectionFilters,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Serialize)]
struct SelectionFilters {
    class: bool,
    course: bool,
    group: bool,
    period: bool,
    room: bool,
    student: bool,
    subject: bool,
    teacher: bool,
}

impl SelectionFilters {
    /// Only the class category is ever requested
    const CLASSES_ONLY: Self = Self {
        class: true,
        course: false,
        group: false,
        period: false,
        room: false,
        student: false,
        subject: false,
        teacher: false,
    };
}

#[derive(Debug, Deserialize)]
struct SelectionData {
    classes: Option<Vec<RawClass>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClass {
    group_guid: String,
    group_name: String,
}

#[derive(Debug, Deserialize)]
struct RenderKeyData {
    key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequest<'a> {
    render_key: &'a str,
    host: &'a str,
    unit_guid: &'a str,
    start_date: Option<&'a str>,
    end_date: Option<&'a str>,
    schedule_day: u32,
    black_and_white: bool,
    width: u32,
    height: u32,
    selection_type: u32,
    selection: &'a str,
    show_header: bool,
    period_text: &'a str,
    week: u32,
    year: i32,
    private_free_text_mode: Option<bool>,
    private_selection_mode: bool,
    customer_key: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderData {
    lesson_info: Option<Vec<RawLesson>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLesson {
    guid_id: String,
    #[serde(default)]
    texts: Vec<String>,
    day_of_week_number: u32,
    time_start: String,
    time_end: String,
}

impl RawLesson {
    /// `texts` is positional: name, teacher, location
    fn into_lesson(self) -> Result<Lesson> {
        let count = self.texts.len();
        let mut texts = self.texts.into_iter();
        match (texts.next(), texts.next(), texts.next()) {
            (Some(name), Some(teacher), Some(location)) => Ok(Lesson {
                guid: self.guid_id,
                name,
                teacher,
                location,
                day_of_week: self.day_of_week_number,
                time_start: self.time_start,
                time_end: self.time_end,
            }),
            _ => Err(Error::MalformedPayload(format!(
                "lesson {} has {} texts, expected name, teacher and location",
                self.guid_id, count
            ))),
        }
    }
}

/// Timetable operations, implemented by [`TimetableClient`]
#[async_trait]
pub trait TimetableApi: Send + Sync {
    /// Tenant host sent with selection and render requests
    fn host(&self) -> &str;

    /// List the units (schools) of the fixed viewer tenant
    async fn list_units(&self) -> Result<Vec<Unit>>;

    /// List the classes of a unit
    async fn list_groups(&self, unit_guid: &str) -> Result<Vec<Group>>;

    /// Fetch the lessons of one group for one ISO week
    async fn fetch_timetable(
        &self,
        unit_guid: &str,
        group_guid: &str,
        year: i32,
        week: u32,
    ) -> Result<Vec<Lesson>>;
}

/// Skola24 API client
pub struct TimetableClient {
    base: BaseClient,
}

/// Builder for [`TimetableClient`]
#[derive(Debug, Clone)]
pub struct TimetableClientBuilder {
    config: ClientConfig,
}

impl TimetableClientBuilder {
    fn new(host: String) -> Self {
        Self {
            config: ClientConfig {
                host,
                base_url: API_ROOT.to_string(),
                timeout: None,
                user_agent: DEFAULT_USER_AGENT.to_string(),
                trace_payloads: false,
            },
        }
    }

    /// Overrides the API root (for wiremock in tests)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Sets a request timeout in seconds
    #[must_use]
    pub const fn timeout(mut self, secs: u64) -> Self {
        self.config.timeout = Some(secs);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Logs identifiers and raw render payloads at debug level
    #[must_use]
    pub const fn trace_payloads(mut self, enabled: bool) -> Self {
        self.config.trace_payloads = enabled;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - the base URL does not parse
    /// - `reqwest::Client` build fails
    pub fn build(self) -> Result<TimetableClient> {
        Ok(TimetableClient {
            base: BaseClientBuilder::new(self.config).build()?,
        })
    }
}

impl TimetableClient {
    /// Client for `host` with default settings
    pub fn new(host: impl Into<String>) -> Result<Self> {
        Self::builder(host).build()
    }

    pub fn builder(host: impl Into<String>) -> TimetableClientBuilder {
        TimetableClientBuilder::new(host.into())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.base.config
    }

    pub async fn list_units(&self) -> Result<Vec<Unit>> {
        tracing::info!("Listing timetable units for tenant: {}", UNITS_TENANT);

        let request = UnitsRequest {
            get_timetable_viewer_units_request: HostNameRequest {
                host_name: UNITS_TENANT,
            },
        };
        let data = self.base.post(UNITS_PATH, &request).await?;
        let data: UnitsData = envelope::decode(data, "units")?;

        let units: Vec<Unit> = data
            .get_timetable_viewer_units_response
            .units
            .unwrap_or_default()
            .into_iter()
            .map(|u| Unit {
                guid: u.unit_guid,
                name: u.unit_id,
            })
            .collect();

        tracing::debug!("Received {} units", units.len());
        Ok(units)
    }

    pub async fn list_groups(&self, unit_guid: &str) -> Result<Vec<Group>> {
        tracing::info!(
            "Listing classes of unit {} on host {}",
            unit_guid,
            self.base.config.host
        );

        let request = SelectionRequest {
            host_name: &self.base.config.host,
            unit_guid,
            filters: SelectionFilters::CLASSES_ONLY,
        };
        let data = self.base.post(SELECTION_PATH, &request).await?;
        let data: SelectionData = envelope::decode(data, "selection")?;

        let groups: Vec<Group> = data
            .classes
            .unwrap_or_default()
            .into_iter()
            .map(|c| Group {
                guid: c.group_guid,
                name: c.group_name,
            })
            .collect();

        tracing::debug!("Received {} classes", groups.len());
        Ok(groups)
    }

    /// Fresh render key; one per render request
    pub(crate) async fn fetch_render_key(&self) -> Result<String> {
        let data = self.base.get(RENDER_KEY_PATH).await?;
        let data: RenderKeyData = envelope::decode(data, "render key")?;
        Ok(data.key)
    }

    pub async fn fetch_timetable(
        &self,
        unit_guid: &str,
        group_guid: &str,
        year: i32,
        week: u32,
    ) -> Result<Vec<Lesson>> {
        tracing::info!(
            "Fetching timetable for group {} in unit {}, week {}-W{:02}",
            group_guid,
            unit_guid,
            year,
            week
        );

        let render_key = self.fetch_render_key().await?;

        if self.base.config.trace_payloads {
            tracing::debug!(unit_guid, group_guid, render_key = %render_key, "render request");
        }

        let request = RenderRequest {
            render_key: &render_key,
            host: &self.base.config.host,
            unit_guid,
            start_date: None,
            end_date: None,
            schedule_day: 0,
            black_and_white: false,
            width: RENDER_SIZE,
            height: RENDER_SIZE,
            selection_type: SELECTION_TYPE_WEEK,
            selection: group_guid,
            show_header: false,
            period_text: "",
            week,
            year,
            private_free_text_mode: None,
            private_selection_mode: false,
            customer_key: "",
        };
        let data = self.base.post(RENDER_PATH, &request).await?;

        if self.base.config.trace_payloads {
            tracing::debug!(payload = %data, "render response");
        }

        let data: RenderData = envelope::decode(data, "render")?;
        let lessons = data
            .lesson_info
            .unwrap_or_default()
            .into_iter()
            .map(RawLesson::into_lesson)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Received {} lessons", lessons.len());
        Ok(lessons)
    }
}

#[async_trait]
impl TimetableApi for TimetableClient {
    fn host(&self) -> &str {
        &self.base.config.host
    }

    async fn list_units(&self) -> Result<Vec<Unit>> {
        Self::list_units(self).await
    }

    async fn list_groups(&self, unit_guid: &str) -> Result<Vec<Group>> {
        Self::list_groups(self, unit_guid).await
    }

    async fn fetch_timetable(
        &self,
        unit_guid: &str,
        group_guid: &str,
        year: i32,
        week: u32,
    ) -> Result<Vec<Lesson>> {
        Self::fetch_timetable(self, unit_guid, group_guid, year, week).await
    }
}
