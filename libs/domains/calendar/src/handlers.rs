use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, ValidatedForm, ValidatedQuery,
    errors::responses::{
        BadRequestValidationResponse, ForbiddenResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{ErrorKind, EventResult};
use crate::models::{
    ApiResponse, CreateEventForm, DeleteEventForm, DeletedMessage, Event, EventsQuery,
    TAG, UpdateEventForm, UserId,
};
use crate::params::{parse_date, parse_event_id, parse_user_id, parse_year_month};
use crate::repository::EventRepository;
use crate::service::EventService;

/// OpenAPI documentation for Events API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_event,
        update_event,
        delete_event,
        events_for_day,
        events_for_week,
        events_for_month,
    ),
    components(
        schemas(Event, CreateEventForm, UpdateEventForm, DeleteEventForm, DeletedMessage),
        responses(
            BadRequestValidationResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Calendar event endpoints")
    )
)]
pub struct ApiDoc;

/// Create the events router with all HTTP endpoints
///
/// Paths here are relative. `calendar_api` mounts the router under `/api`,
/// so clients call `/api/create_event`, `/api/events_for_day` and so on,
/// not the bare paths.
pub fn router<R: EventRepository + 'static>(service: EventService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/create_event", post(create_event::<R>))
        .route("/update_event", post(update_event::<R>))
        .route("/delete_event", post(delete_event::<R>))
        .route("/events_for_day", get(events_for_day::<R>))
        .route("/events_for_week", get(events_for_week::<R>))
        .route("/events_for_month", get(events_for_month::<R>))
        .with_state(shared_service)
}

/// Presence is already checked by the validated extractors; an absent
/// value still reaches the parser as empty and is reported there.
fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

/// Record the outcome of a state-changing request on the audit target.
fn audit<T>(
    headers: &HeaderMap,
    action: &str,
    user_id: Option<UserId>,
    event_id: Option<i64>,
    result: &EventResult<T>,
) {
    let (outcome, details) = match result {
        Ok(_) => (AuditOutcome::Success, None),
        Err(err) if err.kind() == ErrorKind::AccessDenied => {
            (AuditOutcome::Denied, Some(json!({ "reason": err.message() })))
        }
        Err(err) => (AuditOutcome::Failure, Some(json!({ "reason": err.message() }))),
    };

    let mut event = AuditEvent::new(
        user_id,
        action,
        event_id.map(|id| format!("event:{id}")),
        outcome,
    )
    .with_client(headers);

    if let Some(details) = details {
        event = event.with_details(details);
    }

    event.log();
}

/// Create a new event
#[utoipa::path(
    post,
    path = "/create_event",
    tag = TAG,
    request_body(content = CreateEventForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Event created", body = ApiResponse<Event>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    headers: HeaderMap,
    ValidatedForm(form): ValidatedForm<CreateEventForm>,
) -> EventResult<Json<ApiResponse<Event>>> {
    let user_id = parse_user_id(field(&form.user_id))?;
    let date = parse_date(field(&form.date))?;
    let text = form.text.unwrap_or_default();

    let result = service.create_event(user_id, date, text).await;
    audit(
        &headers,
        "event.create",
        Some(user_id),
        result.as_ref().ok().map(|e| e.id),
        &result,
    );

    Ok(Json(ApiResponse::new(result?)))
}

/// Reschedule an existing event
#[utoipa::path(
    post,
    path = "/update_event",
    tag = TAG,
    request_body(content = UpdateEventForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Event updated", body = ApiResponse<Event>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    headers: HeaderMap,
    ValidatedForm(form): ValidatedForm<UpdateEventForm>,
) -> EventResult<Json<ApiResponse<Event>>> {
    let id = parse_event_id(field(&form.id))?;
    let user_id = parse_user_id(field(&form.user_id))?;
    let date = parse_date(field(&form.date))?;
    let text = form.text.unwrap_or_default();

    let result = service.update_event(id, user_id, date, text).await;
    audit(&headers, "event.update", Some(user_id), Some(id), &result);

    Ok(Json(ApiResponse::new(result?)))
}

/// Delete an event
#[utoipa::path(
    post,
    path = "/delete_event",
    tag = TAG,
    request_body(content = DeleteEventForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Event deleted", body = ApiResponse<DeletedMessage>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    headers: HeaderMap,
    ValidatedForm(form): ValidatedForm<DeleteEventForm>,
) -> EventResult<Json<ApiResponse<DeletedMessage>>> {
    let id = parse_event_id(field(&form.id))?;
    let user_id = parse_user_id(field(&form.user_id))?;

    let result = service.delete_event(id, user_id).await;
    audit(&headers, "event.delete", Some(user_id), Some(id), &result);

    result?;
    Ok(Json(ApiResponse::new(DeletedMessage::default())))
}

/// Events of a user on one day (`date` as YYYY-MM-DD)
#[utoipa::path(
    get,
    path = "/events_for_day",
    tag = TAG,
    params(EventsQuery),
    responses(
        (status = 200, description = "Events on the day", body = ApiResponse<Vec<Event>>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn events_for_day<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    ValidatedQuery(query): ValidatedQuery<EventsQuery>,
) -> EventResult<Json<ApiResponse<Vec<Event>>>> {
    let user_id = parse_user_id(field(&query.user_id))?;
    let date = parse_date(field(&query.date))?;

    let events = service.get_events_for_day(user_id, date).await?;
    Ok(Json(ApiResponse::new(events)))
}

/// Events of a user in the seven days starting at `date` (YYYY-MM-DD)
#[utoipa::path(
    get,
    path = "/events_for_week",
    tag = TAG,
    params(EventsQuery),
    responses(
        (status = 200, description = "Events in the week", body = ApiResponse<Vec<Event>>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn events_for_week<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    ValidatedQuery(query): ValidatedQuery<EventsQuery>,
) -> EventResult<Json<ApiResponse<Vec<Event>>>> {
    let user_id = parse_user_id(field(&query.user_id))?;
    let start = parse_date(field(&query.date))?;

    let events = service.get_events_for_week(user_id, start).await?;
    Ok(Json(ApiResponse::new(events)))
}

/// Events of a user in one month (`date` as YYYY-MM)
#[utoipa::path(
    get,
    path = "/events_for_month",
    tag = TAG,
    params(EventsQuery),
    responses(
        (status = 200, description = "Events in the month", body = ApiResponse<Vec<Event>>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn events_for_month<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    ValidatedQuery(query): ValidatedQuery<EventsQuery>,
) -> EventResult<Json<ApiResponse<Vec<Event>>>> {
    let user_id = parse_user_id(field(&query.user_id))?;
    let month = parse_year_month(field(&query.date))?;

    let events = service.get_events_for_month(user_id, month).await?;
    Ok(Json(ApiResponse::new(events)))
}
