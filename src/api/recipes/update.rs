use crate::api::recipes::create::check_references;
use crate::api::recipes::validate::{
    validate_cooking_time, validate_image, validate_ingredient_amounts, validate_name,
    validate_tag_ids, validate_text, IngredientAmount,
};
use crate::api::recipes::view::{load_recipe_view, RecipeView};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewRecipeIngredient, NewRecipeTag, Recipe, RecipeChanges};
use crate::schema::{recipe_ingredients, recipe_tags, recipes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    /// Base64-encoded image payload (bare or data URL)
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    /// When present, fully replaces the recipe's ingredient set
    pub ingredients: Option<Vec<IngredientAmount>>,
    /// When present, fully replaces the recipe's tag set
    pub tags: Option<Vec<Uuid>>,
}

fn validate_request(request: &UpdateRecipeRequest) -> Result<(), String> {
    if let Some(ref name) = request.name {
        validate_name(name)?;
    }
    if let Some(ref text) = request.text {
        validate_text(text)?;
    }
    if let Some(ref image) = request.image {
        validate_image(image)?;
    }
    if let Some(cooking_time) = request.cooking_time {
        validate_cooking_time(cooking_time)?;
    }
    if let Some(ref ingredients) = request.ingredients {
        validate_ingredient_amounts(ingredients)?;
    }
    if let Some(ref tags) = request.tags {
        validate_tag_ids(tags)?;
    }
    Ok(())
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeView),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the recipe author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRecipeRequest>,
) -> impl IntoResponse {
    if let Err(message) = validate_request(&request) {
        return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response();
    }

    let mut conn = get_conn!(pool);

    let recipe: Recipe = match recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(r) => r,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    if recipe.author_id != user.id {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only the author may edit this recipe".to_string(),
            }),
        )
            .into_response();
    }

    let ingredient_ids: Vec<Uuid> = request
        .ingredients
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|i| i.id)
        .collect();
    let tag_ids: Vec<Uuid> = request.tags.clone().unwrap_or_default();
    match check_references(&mut conn, &ingredient_ids, &tag_ids) {
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
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    // Scalar changes and both association replacements commit together
    // or not at all
    let result: Result<(), diesel::result::Error> = conn.transaction(|conn| {
        let changes = RecipeChanges {
            name: request.name.as_deref(),
            image: request.image.as_deref(),
            text: request.text.as_deref(),
            cooking_time: request.cooking_time,
        };
        if !changes.is_empty() {
            diesel::update(recipes::table.find(recipe.id))
                .set(&changes)
                .execute(conn)?;
        }

        if let Some(ref items) = request.ingredients {
            diesel::delete(
                recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe.id)),
            )
            .execute(conn)?;

            let rows: Vec<NewRecipeIngredient> = items
                .iter()
                .map(|i| NewRecipeIngredient {
                    recipe_id: recipe.id,
                    ingredient_id: i.id,
                    amount: i.amount,
                })
                .collect();
            diesel::insert_into(recipe_ingredients::table)
                .values(&rows)
                .execute(conn)?;
        }

        if let Some(ref tag_ids) = request.tags {
            diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe.id)))
                .execute(conn)?;

            let rows: Vec<NewRecipeTag> = tag_ids
                .iter()
                .map(|&tag_id| NewRecipeTag {
                    recipe_id: recipe.id,
                    tag_id,
                })
                .collect();
            diesel::insert_into(recipe_tags::table)
                .values(&rows)
                .execute(conn)?;
        }

        Ok(())
    });

    if let Err(e) = result {
        tracing::error!("Failed to update recipe: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to update recipe".to_string(),
            }),
        )
            .into_response();
    }

    let updated: Recipe = match recipes::table
        .find(recipe.id)
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch updated recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match load_recipe_view(&mut conn, updated, Some(user.id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load recipe view: {}", e);
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
