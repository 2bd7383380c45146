use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;

use crate::error::{EventError, EventResult};
use crate::models::{Event, EventId, UserId, YearMonth};
use crate::repository::EventRepository;
use crate::validation::{validate_event_data, validate_event_id, validate_user_id};

/// Length of the window returned by [`EventService::get_events_for_week`]
const WEEK: TimeDelta = TimeDelta::days(7);

/// Passes ownership and existence failures through; anything else the
/// store reports becomes an internal error.
fn storage_failure(message: &'static str) -> impl FnOnce(EventError) -> EventError {
    move |err| match err {
        EventError::NotFound(_) | EventError::AccessDenied(_) => err,
        other => EventError::internal(message, other),
    }
}

/// Service layer for Event business logic
#[derive(Clone)]
pub struct EventService<R: EventRepository> {
    repository: Arc<R>,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create an event for `user_id`
    #[tracing::instrument(skip(self, text))]
    pub async fn create_event(
        &self,
        user_id: UserId,
        date: DateTime<Utc>,
        text: String,
    ) -> EventResult<Event> {
        validate_event_data(user_id, &text)?;

        self.repository
            .create(Event::new(user_id, date, text))
            .await
            .map_err(storage_failure("failed to create event"))
    }

    /// Reschedule an event owned by `user_id`
    ///
    /// The ownership check and the write are two separate store calls. A
    /// `NotFound` or `AccessDenied` from the write is returned as is, so a
    /// concurrent delete in between surfaces as `NotFound`; any other store
    /// failure on the write becomes `Internal`.
    #[tracing::instrument(skip(self, text))]
    pub async fn update_event(
        &self,
        id: EventId,
        user_id: UserId,
        date: DateTime<Utc>,
        text: String,
    ) -> EventResult<Event> {
        validate_event_data(user_id, &text)?;
        validate_event_id(id)?;

        let mut event = self.owned_event(id, user_id, "no permission to modify this event").await?;
        event.reschedule(date, text);

        self.repository
            .update(event)
            .await
            .map_err(storage_failure("failed to update event"))
    }

    /// Delete an event owned by `user_id`
    ///
    /// Write failures are classified as in [`Self::update_event`].
    #[tracing::instrument(skip(self))]
    pub async fn delete_event(&self, id: EventId, user_id: UserId) -> EventResult<()> {
        validate_event_id(id)?;
        validate_user_id(user_id)?;

        self.owned_event(id, user_id, "no permission to delete this event").await?;

        self.repository
            .delete(id, user_id)
            .await
            .map_err(storage_failure("failed to delete event"))
    }

    /// Events strictly inside the calendar day of `date`
    pub async fn get_events_for_day(
        &self,
        user_id: UserId,
        date: DateTime<Utc>,
    ) -> EventResult<Vec<Event>> {
        validate_user_id(user_id)?;

        self.repository
            .get_by_user_and_date(user_id, date)
            .await
            .map_err(storage_failure("failed to get events for day"))
    }

    /// Events in `[start, start + 7 days]`
    pub async fn get_events_for_week(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
    ) -> EventResult<Vec<Event>> {
        validate_user_id(user_id)?;

        let end = start
            .checked_add_signed(WEEK)
            .ok_or_else(|| EventError::validation("date out of range"))?;

        self.repository
            .get_by_user_and_date_range(user_id, start, end)
            .await
            .map_err(storage_failure("failed to get events for week"))
    }

    /// Events anywhere in the given month
    pub async fn get_events_for_month(
        &self,
        user_id: UserId,
        month: YearMonth,
    ) -> EventResult<Vec<Event>> {
        validate_user_id(user_id)?;

        self.repository
            .get_by_user_and_date_range(user_id, month.first_instant(), month.last_instant())
            .await
            .map_err(storage_failure("failed to get events for month"))
    }

    /// Fetch `id` and check that `user_id` owns it. Any fetch failure reads as not found.
    async fn owned_event(
        &self,
        id: EventId,
        user_id: UserId,
        denied: &'static str,
    ) -> EventResult<Event> {
        let event = self.repository.get_by_id(id).await.map_err(|err| {
            tracing::debug!(event_id = id, error = %err, "Event lookup failed");
            EventError::not_found("event not found")
        })?;

        if event.user_id != user_id {
            return Err(EventError::access_denied(denied));
        }

        Ok(event)
    }
}
