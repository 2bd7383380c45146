use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{EventError, EventResult};
use crate::models::{Event, EventId, UserId};

/// Repository trait for Event persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Store a new event, assigning its id. Other fields are kept as given.
    async fn create(&self, event: Event) -> EventResult<Event>;

    /// Replace a stored event wholesale. The owner cannot change: a differing
    /// `user_id` is refused with `AccessDenied`.
    async fn update(&self, event: Event) -> EventResult<Event>;

    /// Delete an event owned by `user_id`
    async fn delete(&self, id: EventId, user_id: UserId) -> EventResult<()>;

    /// Get an event by ID
    async fn get_by_id(&self, id: EventId) -> EventResult<Event>;

    /// Events of `user_id` strictly inside the calendar day of `date`
    async fn get_by_user_and_date(
        &self,
        user_id: UserId,
        date: DateTime<Utc>,
    ) -> EventResult<Vec<Event>>;

    /// Events of `user_id` with `start <= date <= end`
    async fn get_by_user_and_date_range(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EventResult<Vec<Event>>;
}

/// Primary map plus per-user index. Both change under the same write lock.
#[derive(Debug, Default)]
struct EventStore {
    events: HashMap<EventId, Event>,
    by_user: HashMap<UserId, Vec<EventId>>,
    last_id: EventId,
}

impl EventStore {
    /// Events of `user_id` in index order that satisfy `keep`.
    fn collect_for_user(&self, user_id: UserId, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        self.by_user
            .get(&user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.events.get(id))
                    .filter(|event| keep(event))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn remove_from_index(&mut self, user_id: UserId, id: EventId) {
        if let Some(ids) = self.by_user.get_mut(&user_id) {
            if let Some(pos) = ids.iter().position(|&x| x == id) {
                ids.remove(pos);
            }
            if ids.is_empty() {
                self.by_user.remove(&user_id);
            }
        }
    }

    /// Panics if the index and the primary map disagree.
    #[cfg(test)]
    fn assert_consistent(&self) {
        let mut indexed = 0;
        for (user_id, ids) in &self.by_user {
            assert!(!ids.is_empty(), "empty index entry for user {user_id}");
            for id in ids {
                let event = self
                    .events
                    .get(id)
                    .unwrap_or_else(|| panic!("index of user {user_id} points at missing {id}"));
                assert_eq!(event.user_id, *user_id);
            }
            let mut unique = ids.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), ids.len(), "duplicate ids for user {user_id}");
            indexed += ids.len();
        }
        assert_eq!(indexed, self.events.len());
        assert!(self.events.keys().all(|id| *id <= self.last_id));
    }
}

/// In-memory implementation of EventRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventRepository {
    store: Arc<RwLock<EventStore>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, mut event: Event) -> EventResult<Event> {
        let mut store = self.store.write().await;

        store.last_id += 1;
        event.id = store.last_id;

        store.by_user.entry(event.user_id).or_default().push(event.id);
        store.events.insert(event.id, event.clone());

        tracing::info!(event_id = event.id, user_id = event.user_id, "Created event");
        Ok(event)
    }

    async fn update(&self, event: Event) -> EventResult<Event> {
        let mut store = self.store.write().await;

        let stored = store
            .events
            .get_mut(&event.id)
            .ok_or_else(|| EventError::not_found("event not found"))?;

        // The owner is fixed at creation; the index relies on it.
        if stored.user_id != event.user_id {
            return Err(EventError::access_denied(
                "no permission to modify this event",
            ));
        }

        *stored = event.clone();

        tracing::info!(event_id = event.id, user_id = event.user_id, "Updated event");
        Ok(event)
    }

    async fn delete(&self, id: EventId, user_id: UserId) -> EventResult<()> {
        let mut store = self.store.write().await;

        let owner = store
            .events
            .get(&id)
            .map(|event| event.user_id)
            .ok_or_else(|| EventError::not_found("event not found"))?;

        if owner != user_id {
            return Err(EventError::access_denied(
                "no permission to delete this event",
            ));
        }

        store.events.remove(&id);
        store.remove_from_index(user_id, id);

        tracing::info!(event_id = id, user_id, "Deleted event");
        Ok(())
    }

    async fn get_by_id(&self, id: EventId) -> EventResult<Event> {
        let store = self.store.read().await;
        store
            .events
            .get(&id)
            .cloned()
            .ok_or_else(|| EventError::not_found("event not found"))
    }

    async fn get_by_user_and_date(
        &self,
        user_id: UserId,
        date: DateTime<Utc>,
    ) -> EventResult<Vec<Event>> {
        let start = date.date_naive().and_time(NaiveTime::MIN).and_utc();
        let end = start
            .checked_add_signed(TimeDelta::hours(24))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let store = self.store.read().await;
        let events = store.collect_for_user(user_id, |e| e.date > start && e.date < end);

        tracing::debug!(user_id, %start, count = events.len(), "Fetched events for day");
        Ok(events)
    }

    async fn get_by_user_and_date_range(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EventResult<Vec<Event>> {
        let store = self.store.read().await;
        let events = store.collect_for_user(user_id, |e| e.date >= start && e.date <= end);

        tracing::debug!(user_id, %start, %end, count = events.len(), "Fetched events for range");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    async fn seed(repo: &InMemoryEventRepository, user_id: UserId, date: DateTime<Utc>) -> Event {
        repo.create(Event::new(user_id, date, format!("event at {date}")))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryEventRepository::new();

        let first = seed(&repo, 1, at(2023, 12, 31, 10, 0)).await;
        let second = seed(&repo, 2, at(2023, 12, 31, 11, 0)).await;

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.get_by_id(2).await.unwrap(), second);
        repo.store.read().await.assert_consistent();
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = InMemoryEventRepository::new();

        let first = seed(&repo, 1, at(2023, 12, 31, 10, 0)).await;
        repo.delete(first.id, 1).await.unwrap();
        let next = seed(&repo, 1, at(2023, 12, 31, 10, 0)).await;

        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_create_keeps_caller_timestamps() {
        let repo = InMemoryEventRepository::new();
        let mut event = Event::new(1, at(2024, 1, 1, 0, 0), "party".into());
        event.created_at = at(2020, 1, 1, 0, 0);

        let stored = repo.create(event).await.unwrap();
        assert_eq!(stored.created_at, at(2020, 1, 1, 0, 0));
    }

    #[tokio::test]
    async fn test_update_replaces_event() {
        let repo = InMemoryEventRepository::new();
        let mut event = seed(&repo, 1, at(2023, 12, 31, 10, 0)).await;

        event.text = "moved".into();
        event.date = at(2024, 1, 2, 9, 0);
        repo.update(event.clone()).await.unwrap();

        assert_eq!(repo.get_by_id(event.id).await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_update_missing_event_is_not_found() {
        let repo = InMemoryEventRepository::new();
        let mut event = Event::new(1, at(2023, 12, 31, 10, 0), "x".into());
        event.id = 99;

        let err = repo.update(event).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_cannot_change_owner() {
        let repo = InMemoryEventRepository::new();
        let mut event = seed(&repo, 1, at(2023, 12, 31, 10, 0)).await;

        let original = event.clone();
        event.user_id = 2;
        event.text = "stolen".into();
        let err = repo.update(event).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AccessDenied);
        assert_eq!(repo.get_by_id(original.id).await.unwrap(), original);
        assert!(repo
            .get_by_user_and_date_range(2, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
            .await
            .unwrap()
            .is_empty());
        repo.store.read().await.assert_consistent();
    }

    #[tokio::test]
    async fn test_delete_checks_owner() {
        let repo = InMemoryEventRepository::new();
        let event = seed(&repo, 1, at(2023, 12, 31, 10, 0)).await;

        let err = repo.delete(event.id, 2).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
        assert!(repo.get_by_id(event.id).await.is_ok());

        let err = repo.delete(42, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_preserves_index_order() {
        let repo = InMemoryEventRepository::new();
        let a = seed(&repo, 1, at(2023, 12, 10, 10, 0)).await;
        let b = seed(&repo, 1, at(2023, 12, 5, 10, 0)).await;
        let c = seed(&repo, 1, at(2023, 12, 20, 10, 0)).await;

        repo.delete(b.id, 1).await.unwrap();

        let events = repo
            .get_by_user_and_date_range(1, at(2023, 12, 1, 0, 0), at(2023, 12, 31, 0, 0))
            .await
            .unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);

        let err = repo.get_by_id(b.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        repo.store.read().await.assert_consistent();
    }

    #[tokio::test]
    async fn test_deleting_last_event_drops_index_entry() {
        let repo = InMemoryEventRepository::new();
        let event = seed(&repo, 5, at(2023, 12, 10, 10, 0)).await;

        repo.delete(event.id, 5).await.unwrap();

        assert!(repo.store.read().await.by_user.is_empty());
    }

    #[tokio::test]
    async fn test_day_query_is_strict_on_both_ends() {
        let repo = InMemoryEventRepository::new();
        let midnight = seed(&repo, 1, at(2023, 12, 31, 0, 0)).await;
        let morning = seed(&repo, 1, at(2023, 12, 31, 10, 0)).await;
        let next_day = seed(&repo, 1, at(2024, 1, 1, 0, 0)).await;
        seed(&repo, 2, at(2023, 12, 31, 10, 0)).await;

        let events = repo
            .get_by_user_and_date(1, at(2023, 12, 31, 15, 30))
            .await
            .unwrap();

        // An event exactly at the start of the day falls outside the window.
        assert_eq!(events, vec![morning]);
        assert!(!events.contains(&midnight));
        assert!(!events.contains(&next_day));
    }

    #[tokio::test]
    async fn test_range_query_is_inclusive() {
        let repo = InMemoryEventRepository::new();
        let start = at(2023, 12, 25, 0, 0);
        let end = at(2024, 1, 1, 0, 0);
        let on_start = seed(&repo, 1, start).await;
        let on_end = seed(&repo, 1, end).await;
        seed(&repo, 1, start - TimeDelta::seconds(1)).await;
        seed(&repo, 1, end + TimeDelta::seconds(1)).await;

        let events = repo.get_by_user_and_date_range(1, start, end).await.unwrap();
        assert_eq!(events, vec![on_start, on_end]);
    }

    #[tokio::test]
    async fn test_queries_for_unknown_user_are_empty() {
        let repo = InMemoryEventRepository::new();
        seed(&repo, 1, at(2023, 12, 31, 10, 0)).await;

        assert!(repo
            .get_by_user_and_date(2, at(2023, 12, 31, 0, 0))
            .await
            .unwrap()
            .is_empty());
        assert!(repo
            .get_by_user_and_date_range(2, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mutations_keep_index_consistent() {
        const USERS: i64 = 8;
        const PER_USER: i64 = 40;

        let repo = InMemoryEventRepository::new();
        let mut tasks = Vec::new();

        for user_id in 1..=USERS {
            let repo = repo.clone();
            tasks.push(tokio::spawn(async move {
                let mut kept = Vec::new();
                for n in 0..PER_USER {
                    let date = at(2023, 12, 1, 0, 0) + TimeDelta::hours(n);
                    let event = repo
                        .create(Event::new(user_id, date, format!("{user_id}-{n}")))
                        .await
                        .unwrap();
                    if n % 3 == 0 {
                        repo.delete(event.id, user_id).await.unwrap();
                    } else {
                        let mut moved = event.clone();
                        moved.reschedule(
                            date + TimeDelta::minutes(30),
                            format!("{user_id}-{n}-moved"),
                        );
                        repo.update(moved).await.unwrap();
                        kept.push(event.id);
                    }
                    // Reader interleaved with the writers.
                    repo.get_by_user_and_date_range(user_id, DateTime::<Utc>::MIN_UTC, date)
                        .await
                        .unwrap();
                }
                (user_id, kept)
            }));
        }

        for task in tasks {
            let (user_id, kept) = task.await.unwrap();
            let events = repo
                .get_by_user_and_date_range(user_id, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
                .await
                .unwrap();
            let ids: Vec<_> = events.iter().map(|e| e.id).collect();
            assert_eq!(ids, kept);
            assert!(events.iter().all(|e| e.user_id == user_id));
            assert!(events.iter().all(|e| e.text.ends_with("-moved")));
        }

        let store = repo.store.read().await;
        store.assert_consistent();
        assert_eq!(store.last_id, USERS * PER_USER);
    }
}
