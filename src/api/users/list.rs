use crate::api::users::view::{following_set, UserProfile};
use crate::api::ErrorResponse;
use crate::auth::MaybeAuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::pagination::{PageParams, PaginationMetadata};
use crate::raw_sql::count_over;
use crate::schema::users;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListUsersResponse {
    pub users: Vec<UserProfile>,
    pub pagination: PaginationMetadata,
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(PageParams),
    responses(
        (status = 200, description = "Registered users", body = ListUsersResponse)
    )
)]
pub async fn list_users(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let rows: Vec<(User, i64)> = match users::table
        .order(users::username.asc())
        .select((User::as_select(), count_over()))
        .limit(params.limit())
        .offset(params.offset())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch users: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch users".to_string(),
                }),
            )
                .into_response();
        }
    };

    let total = rows.first().map(|(_, total)| *total).unwrap_or(0);
    let page_users: Vec<User> = rows.into_iter().map(|(user, _)| user).collect();
    let ids: Vec<Uuid> = page_users.iter().map(|u| u.id).collect();

    let followed = match following_set(&mut conn, viewer.map(|v| v.id), &ids) {
        Ok(set) => set,
        Err(e) => {
            tracing::error!("Failed to fetch subscriptions: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch users".to_string(),
                }),
            )
                .into_response();
        }
    };

    let users = page_users
        .iter()
        .map(|user| UserProfile::from_user(user, followed.contains(&user.id)))
        .collect();

    (
        StatusCode::OK,
        Json(ListUsersResponse {
            users,
            pagination: params.metadata(total),
        }),
    )
        .into_response()
}
