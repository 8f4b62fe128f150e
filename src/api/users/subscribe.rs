use crate::api::users::view::{subscription_profiles, SubscriptionProfile};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewFollow, User};
use crate::schema::{follows, users};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SubscribeParams {
    /// Cap on the number of recipes embedded in the response
    pub recipes_limit: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "Author to follow"),
        SubscribeParams
    ),
    responses(
        (status = 201, description = "Subscribed; author profile with recipes", body = SubscriptionProfile),
        (status = 400, description = "Already subscribed or self-subscription", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Author not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn subscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Query(params): Query<SubscribeParams>,
) -> impl IntoResponse {
    if user.id == id {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "You cannot subscribe to yourself".to_string(),
            }),
        )
            .into_response();
    }

    let mut conn = get_conn!(pool);

    let author: User = match users::table.find(id).select(User::as_select()).first(&mut conn) {
        Ok(u) => u,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "User not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch user: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch user".to_string(),
                }),
            )
                .into_response();
        }
    };

    // The unique constraint decides whether the relation already exists
    let new_follow = NewFollow {
        follower_id: user.id,
        author_id: author.id,
    };
    match diesel::insert_into(follows::table)
        .values(&new_follow)
        .execute(&mut conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "You are already subscribed to this user".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to create subscription: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create subscription".to_string(),
                }),
            )
                .into_response();
        }
    }

    let profile = match subscription_profiles(&mut conn, std::slice::from_ref(&author), params.recipes_limit)
        .map(|mut profiles| profiles.pop())
    {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            tracing::error!("Subscription profile missing for author {}", author.id);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch subscription".to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to build subscription profile: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch subscription".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::CREATED, Json(profile)).into_response()
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "Author to unfollow")
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Author not found or not subscribed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let deleted = match diesel::delete(
        follows::table
            .filter(follows::follower_id.eq(user.id))
            .filter(follows::author_id.eq(id)),
    )
    .execute(&mut conn)
    {
        Ok(n) => n,
        Err(e) => {
            tracing::error!("Failed to delete subscription: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to delete subscription".to_string(),
                }),
            )
                .into_response();
        }
    };

    if deleted == 0 {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "You are not subscribed to this user".to_string(),
            }),
        )
            .into_response();
    }

    StatusCode::NO_CONTENT.into_response()
}
