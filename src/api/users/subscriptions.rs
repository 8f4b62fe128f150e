use crate::api::users::view::{subscription_profiles, SubscriptionProfile};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::pagination::{PageParams, PaginationMetadata};
use crate::raw_sql::count_over;
use crate::schema::{follows, users};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SubscriptionsParams {
    /// 1-based page number (default: 1)
    pub page: Option<i64>,
    /// Number of items per page (default: 6, max: 100)
    pub limit: Option<i64>,
    /// Cap on the number of recipes embedded per author
    pub recipes_limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionsResponse {
    pub subscriptions: Vec<SubscriptionProfile>,
    pub pagination: PaginationMetadata,
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "users",
    params(SubscriptionsParams),
    responses(
        (status = 200, description = "Authors the requesting user follows", body = SubscriptionsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn subscriptions(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<SubscriptionsParams>,
) -> impl IntoResponse {
    let pagination = PageParams {
        page: params.page,
        limit: params.limit,
    };

    let mut conn = get_conn!(pool);

    let rows: Vec<(User, i64)> = match users::table
        .filter(
            users::id.eq_any(
                follows::table
                    .filter(follows::follower_id.eq(user.id))
                    .select(follows::author_id),
            ),
        )
        .order(users::username.asc())
        .select((User::as_select(), count_over()))
        .limit(pagination.limit())
        .offset(pagination.offset())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch subscriptions: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch subscriptions".to_string(),
                }),
            )
                .into_response();
        }
    };

    let total = rows.first().map(|(_, total)| *total).unwrap_or(0);
    let authors: Vec<User> = rows.into_iter().map(|(author, _)| author).collect();

    let profiles = match subscription_profiles(&mut conn, &authors, params.recipes_limit) {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::error!("Failed to build subscription profiles: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch subscriptions".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(SubscriptionsResponse {
            subscriptions: profiles,
            pagination: pagination.metadata(total),
        }),
    )
        .into_response()
}
