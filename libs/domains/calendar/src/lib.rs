//! Calendar Domain
//!
//! Per-user calendar events kept in memory, with ownership-checked
//! updates and deletes and day/week/month queries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, wire parameter parsing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business rules, ownership checks
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← In-memory store with a per-user index
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Event, YearMonth, form and query DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_calendar::{
//!     handlers,
//!     repository::InMemoryEventRepository,
//!     service::EventService,
//! };
//!
//! let repository = InMemoryEventRepository::new();
//! let service = EventService::new(repository);
//!
//! let router = handlers::router(service);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod params;
pub mod repository;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use error::{ErrorKind, EventError, EventResult};
pub use models::{
    ApiResponse, CreateEventForm, DeleteEventForm, DeletedMessage, Event, EventId, EventsQuery,
    UpdateEventForm, UserId, YearMonth,
};
pub use repository::{EventRepository, InMemoryEventRepository};
pub use service::EventService;
