pub mod login;
pub mod logout;

use crate::AppState;
use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/auth endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
}

#[derive(OpenApi)]
#[openapi(
    paths(login::login, logout::logout),
    components(schemas(login::LoginRequest, login::LoginResponse))
)]
pub struct ApiDoc;
