use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get},
};
use axum_macros::debug_handler;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{InboundEnvelope, ResponseEnvelope, ResponseKind},
    service::EmailService,
};

#[derive(OpenApi)]
#[openapi(
    paths(send_email),
    components(schemas(InboundEnvelope, ResponseEnvelope, ResponseKind)),
    tags(
        (name = "email", description = "Email relay API")
    )
)]
pub struct ApiDoc;

pub fn router(service: Arc<EmailService>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/email", any(send_email))
        .route("/api-doc/openapi.json", get(openapi))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
}

/// API Gateway keeps the stage in the request path, so under Lambda every
/// event goes to the relay regardless of its path.
pub fn lambda_router(service: Arc<EmailService>) -> Router {
    Router::new()
        .fallback(send_email)
        .with_state(service)
        .layer(TraceLayer::new_for_http())
}

/// Any method is accepted; the body is decoded by the service so that
/// malformed JSON maps to the relay's own error envelope.
#[utoipa::path(
    post,
    path = "/email",
    request_body = InboundEnvelope,
    responses(
        (status = 200, description = "Message is sent", body = ResponseEnvelope),
        (status = 400, description = "A required field is empty", body = ResponseEnvelope),
        (status = 500, description = "Malformed body or provider failure", body = ResponseEnvelope)
    ),
    tag = "email"
)]
#[debug_handler]
pub async fn send_email(State(service): State<Arc<EmailService>>, body: Bytes) -> Response {
    let (status, envelope) = service.handle(&body).await;
    (status, Json(envelope)).into_response()
}

#[debug_handler]
pub async fn health_check() -> Response {
    (StatusCode::OK, "Hello from email relay!").into_response()
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
