use axum::Router;
use axum_helpers::{create_router, health_router};
use domain_calendar::{EventService, InMemoryEventRepository, handlers};
use std::io;

use crate::config::Config;
use crate::openapi::ApiDoc;

/// Wire the in-memory store, the event service and the shared middleware stack.
///
/// - `/api/*`: calendar endpoints
/// - `/health`: liveness with app name/version
/// - `/swagger-ui`: API docs
pub fn build(config: &Config) -> io::Result<Router> {
    let repository = InMemoryEventRepository::new();
    let service = EventService::new(repository);

    let router = create_router::<ApiDoc>(handlers::router(service), &config.server)?;

    Ok(router.merge(health_router(config.app)))
}
