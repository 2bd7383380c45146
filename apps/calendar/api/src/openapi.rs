use utoipa::OpenApi;

/// Root document served at `/api-docs/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Calendar API",
        description = "Per-user calendar events with day, week and month views"
    ),
    nest(
        (path = "/api", api = domain_calendar::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;
