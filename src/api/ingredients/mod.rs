pub mod get;
pub mod list;

use crate::AppState;
use axum::routing::get as get_method;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/ingredients endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get_method(list::list_ingredients))
        .route("/{id}", get_method(get::get_ingredient))
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_ingredients, get::get_ingredient),
    components(schemas(crate::models::Ingredient))
)]
pub struct ApiDoc;
