use crate::AppState;
use axum::routing::get;
use axum::{response::IntoResponse, Json, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/ping", get(ping))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PingResponse {
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/api/ping",
    tag = "testing",
    responses(
        (status = 200, description = "Liveness probe response", body = PingResponse)
    )
)]
pub async fn ping() -> impl IntoResponse {
    Json(PingResponse {
        message: "pong".to_string(),
    })
}

#[derive(OpenApi)]
#[openapi(paths(ping), components(schemas(PingResponse)))]
pub struct ApiDoc;
