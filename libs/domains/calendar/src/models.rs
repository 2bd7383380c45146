use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub type EventId = i64;
pub type UserId = i64;

/// OpenAPI tag shared by every calendar endpoint
pub const TAG: &str = "Events";

/// Calendar event owned by a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Assigned by the store on create, never reused
    pub id: EventId,
    pub user_id: UserId,
    /// When the event takes place
    pub date: DateTime<Utc>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// New unsaved event. `id` stays 0 until the repository assigns one.
    pub fn new(user_id: UserId, date: DateTime<Utc>, text: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id,
            date,
            text,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the schedulable fields and bump `updated_at`.
    pub fn reschedule(&mut self, date: DateTime<Utc>, text: String) {
        self.date = date;
        self.text = text;
        self.updated_at = Utc::now();
    }
}

/// A calendar month, valid only when its successor month is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    first_day: NaiveDate,
    next_first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_first_day = first_day.checked_add_months(Months::new(1))?;
        Some(Self {
            first_day,
            next_first_day,
        })
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// Midnight UTC on the first day of the month.
    pub fn first_instant(&self) -> DateTime<Utc> {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// One nanosecond before the first instant of the following month.
    pub fn last_instant(&self) -> DateTime<Utc> {
        self.next_first_day.and_time(NaiveTime::MIN).and_utc() - TimeDelta::nanoseconds(1)
    }
}

/// Success envelope: every 200 response wraps its payload in `result`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub result: T,
}

impl<T> ApiResponse<T> {
    pub fn new(result: T) -> Self {
        Self { result }
    }
}

/// Payload returned after a successful delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeletedMessage {
    pub message: String,
}

impl Default for DeletedMessage {
    fn default() -> Self {
        Self {
            message: "event deleted".to_string(),
        }
    }
}

/// Form body for `POST /create_event`
///
/// Fields are kept as text so presence is checked here and parsing
/// failures surface as domain validation errors.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateEventForm {
    #[validate(
        required(message = "parameter user_id is required"),
        length(min = 1, message = "parameter user_id is required")
    )]
    #[schema(example = "1")]
    pub user_id: Option<String>,

    #[validate(
        required(message = "parameter date is required"),
        length(min = 1, message = "parameter date is required")
    )]
    #[schema(example = "2023-12-31")]
    pub date: Option<String>,

    #[validate(
        required(message = "parameter text is required"),
        length(min = 1, message = "parameter text is required")
    )]
    #[schema(example = "New Year party")]
    pub text: Option<String>,
}

/// Form body for `POST /update_event`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEventForm {
    #[validate(
        required(message = "parameter id is required"),
        length(min = 1, message = "parameter id is required")
    )]
    #[schema(example = "1")]
    pub id: Option<String>,

    #[validate(
        required(message = "parameter user_id is required"),
        length(min = 1, message = "parameter user_id is required")
    )]
    #[schema(example = "1")]
    pub user_id: Option<String>,

    #[validate(
        required(message = "parameter date is required"),
        length(min = 1, message = "parameter date is required")
    )]
    #[schema(example = "2024-01-01")]
    pub date: Option<String>,

    #[validate(
        required(message = "parameter text is required"),
        length(min = 1, message = "parameter text is required")
    )]
    pub text: Option<String>,
}

/// Form body for `POST /delete_event`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct DeleteEventForm {
    #[validate(
        required(message = "parameter id is required"),
        length(min = 1, message = "parameter id is required")
    )]
    #[schema(example = "1")]
    pub id: Option<String>,

    #[validate(
        required(message = "parameter user_id is required"),
        length(min = 1, message = "parameter user_id is required")
    )]
    #[schema(example = "1")]
    pub user_id: Option<String>,
}

/// Query string for the `events_for_*` endpoints
///
/// `date` is `YYYY-MM-DD` for day and week queries and `YYYY-MM` for month queries.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    #[validate(
        required(message = "parameter user_id is required"),
        length(min = 1, message = "parameter user_id is required")
    )]
    pub user_id: Option<String>,

    #[validate(
        required(message = "parameter date is required"),
        length(min = 1, message = "parameter date is required")
    )]
    pub date: Option<String>,
}
