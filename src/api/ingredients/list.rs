use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Ingredient;
use crate::schema::ingredients;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListIngredientsParams {
    /// Case-insensitive prefix to match ingredient names against
    pub name: Option<String>,
}

/// Build the ILIKE pattern for a prefix search, escaping the LIKE
/// metacharacters so they match literally.
fn prefix_pattern(prefix: &str) -> String {
    format!(
        "{}%",
        prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    )
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    params(ListIngredientsParams),
    responses(
        (status = 200, description = "Ingredients matching the name prefix, ordered by name", body = [Ingredient])
    )
)]
pub async fn list_ingredients(
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListIngredientsParams>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let mut query = ingredients::table.into_boxed();

    if let Some(ref name) = params.name {
        if !name.is_empty() {
            query = query.filter(ingredients::name.ilike(prefix_pattern(name)));
        }
    }

    let rows: Vec<Ingredient> = match query
        .order(ingredients::name.asc())
        .select(Ingredient::as_select())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch ingredients: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch ingredients".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::OK, Json(rows)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_anchors_at_start_only() {
        // "egg" must match "Eggplant" (prefix) but not "Scrambled egg"
        assert_eq!(prefix_pattern("egg"), "egg%");
    }

    #[test]
    fn pattern_escapes_like_metacharacters() {
        assert_eq!(prefix_pattern("100%"), "100\\%%");
        assert_eq!(prefix_pattern("a_b"), "a\\_b%");
        assert_eq!(prefix_pattern("a\\b"), "a\\\\b%");
    }
}
