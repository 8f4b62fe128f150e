use crate::api::recipes::view::{load_recipe_views, RecipeView};
use crate::api::ErrorResponse;
use crate::auth::MaybeAuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::pagination::{PageParams, PaginationMetadata};
use crate::raw_sql::count_over;
use crate::schema::{cart_items, favorites, recipe_tags, recipes, tags};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::Query;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// 1-based page number (default: 1)
    pub page: Option<i64>,
    /// Number of items per page (default: 6, max: 100)
    pub limit: Option<i64>,
    /// Tag slugs; a recipe matches if it carries ANY of them (repeat the
    /// parameter to pass several)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Filter by author id
    pub author: Option<Uuid>,
    /// Truthy (non-zero) limits the set to the caller's favorites;
    /// ignored for anonymous requests
    pub is_favorited: Option<i32>,
    /// Truthy (non-zero) limits the set to the caller's shopping cart;
    /// ignored for anonymous requests
    pub is_in_shopping_cart: Option<i32>,
}

/// A user-scoped flag filter applies only when it is truthy AND the
/// request is authenticated.
fn flag_applies(value: Option<i32>, viewer: Option<Uuid>) -> bool {
    matches!(value, Some(v) if v != 0) && viewer.is_some()
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeView>,
    pub pagination: PaginationMetadata,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Recipes, newest first", body = ListRecipesResponse)
    )
)]
pub async fn list_recipes(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListRecipesParams>,
) -> impl IntoResponse {
    let pagination = PageParams {
        page: params.page,
        limit: params.limit,
    };
    let viewer_id = viewer.map(|v| v.id);

    let mut conn = get_conn!(pool);

    let mut query = recipes::table.into_boxed();

    if let Some(author) = params.author {
        query = query.filter(recipes::author_id.eq(author));
    }

    // OR semantics across slugs: any matching tag selects the recipe
    if !params.tags.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .inner_join(tags::table)
                    .filter(tags::slug.eq_any(params.tags.clone()))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    if let Some(viewer) = viewer_id {
        if flag_applies(params.is_favorited, viewer_id) {
            query = query.filter(
                recipes::id.eq_any(
                    favorites::table
                        .filter(favorites::user_id.eq(viewer))
                        .select(favorites::recipe_id),
                ),
            );
        }

        if flag_applies(params.is_in_shopping_cart, viewer_id) {
            query = query.filter(
                recipes::id.eq_any(
                    cart_items::table
                        .filter(cart_items::user_id.eq(viewer))
                        .select(cart_items::recipe_id),
                ),
            );
        }
    }

    let rows: Vec<(Recipe, i64)> = match query
        .order(recipes::pub_date.desc())
        .select((Recipe::as_select(), count_over()))
        .limit(pagination.limit())
        .offset(pagination.offset())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let total = rows.first().map(|(_, total)| *total).unwrap_or(0);
    let page_recipes: Vec<Recipe> = rows.into_iter().map(|(recipe, _)| recipe).collect();

    let views = match load_recipe_views(&mut conn, page_recipes, viewer_id) {
        Ok(views) => views,
        Err(e) => {
            tracing::error!("Failed to load recipe views: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(ListRecipesResponse {
            recipes: views,
            pagination: pagination.metadata(total),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_requires_truthy_value_and_viewer() {
        let viewer = Some(Uuid::new_v4());
        assert!(flag_applies(Some(1), viewer));
        assert!(flag_applies(Some(2), viewer));
        assert!(!flag_applies(Some(0), viewer));
        assert!(!flag_applies(None, viewer));
    }

    #[test]
    fn flag_ignored_for_anonymous_requests() {
        assert!(!flag_applies(Some(1), None));
        assert!(!flag_applies(Some(0), None));
        assert!(!flag_applies(None, None));
    }
}
