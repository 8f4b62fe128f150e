pub mod get;
pub mod list;

use crate::AppState;
use axum::routing::get as get_method;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/tags endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get_method(list::list_tags))
        .route("/{id}", get_method(get::get_tag))
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_tags, get::get_tag),
    components(schemas(crate::models::Tag))
)]
pub struct ApiDoc;
