use crate::api::recipes::validate::{
    validate_cooking_time, validate_image, validate_ingredient_amounts, validate_name,
    validate_tag_ids, validate_text, IngredientAmount,
};
use crate::api::recipes::view::{load_recipe_view, RecipeView};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRecipe, NewRecipeIngredient, NewRecipeTag, Recipe};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub name: String,
    /// Base64-encoded image payload (bare or data URL)
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<Uuid>,
}

/// Check that every id refers to an existing catalog row; returns the
/// 400 message for the first missing kind.
pub(super) fn check_references(
    conn: &mut PgConnection,
    ingredient_ids: &[Uuid],
    tag_ids: &[Uuid],
) -> Result<Result<(), String>, diesel::result::Error> {
    let found_ingredients: i64 = ingredients::table
        .filter(ingredients::id.eq_any(ingredient_ids))
        .count()
        .get_result(conn)?;
    if found_ingredients != ingredient_ids.len() as i64 {
        return Ok(Err("Unknown ingredient id".to_string()));
    }

    let found_tags: i64 = tags::table
        .filter(tags::id.eq_any(tag_ids))
        .count()
        .get_result(conn)?;
    if found_tags != tag_ids.len() as i64 {
        return Ok(Err("Unknown tag id".to_string()));
    }

    Ok(Ok(()))
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = RecipeView),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    let validation = validate_name(&request.name)
        .and_then(|()| validate_text(&request.text))
        .and_then(|()| validate_image(&request.image))
        .and_then(|()| validate_cooking_time(request.cooking_time))
        .and_then(|()| validate_ingredient_amounts(&request.ingredients))
        .and_then(|()| validate_tag_ids(&request.tags));
    if let Err(message) = validation {
        return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response();
    }

    let mut conn = get_conn!(pool);

    let ingredient_ids: Vec<Uuid> = request.ingredients.iter().map(|i| i.id).collect();
    match check_references(&mut conn, &ingredient_ids, &request.tags) {
        Ok(Ok(())) => {}
        Ok(Err(message)) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to check recipe references: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    // Recipe row and both association sets are written atomically
    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let new_recipe = NewRecipe {
            author_id: user.id,
            name: &request.name,
            image: &request.image,
            text: &request.text,
            cooking_time: request.cooking_time,
        };

        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(&new_recipe)
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        let ingredient_rows: Vec<NewRecipeIngredient> = request
            .ingredients
            .iter()
            .map(|i| NewRecipeIngredient {
                recipe_id: recipe.id,
                ingredient_id: i.id,
                amount: i.amount,
            })
            .collect();
        diesel::insert_into(recipe_ingredients::table)
            .values(&ingredient_rows)
            .execute(conn)?;

        let tag_rows: Vec<NewRecipeTag> = request
            .tags
            .iter()
            .map(|&tag_id| NewRecipeTag {
                recipe_id: recipe.id,
                tag_id,
            })
            .collect();
        diesel::insert_into(recipe_tags::table)
            .values(&tag_rows)
            .execute(conn)?;

        Ok(recipe)
    });

    let recipe = match result {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match load_recipe_view(&mut conn, recipe, Some(user.id)) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load created recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
