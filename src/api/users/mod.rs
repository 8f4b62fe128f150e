pub mod create;
pub mod get;
pub mod list;
pub mod me;
pub mod set_password;
pub mod subscribe;
pub mod subscriptions;
pub mod view;

use crate::AppState;
use axum::routing::{get as get_method, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/users endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get_method(list::list_users).post(create::signup))
        .route("/me", get_method(me::me))
        .route("/set_password", post(set_password::set_password))
        .route("/subscriptions", get_method(subscriptions::subscriptions))
        .route("/{id}", get_method(get::get_user))
        .route(
            "/{id}/subscribe",
            post(subscribe::subscribe).delete(subscribe::unsubscribe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_users,
        create::signup,
        me::me,
        set_password::set_password,
        subscriptions::subscriptions,
        get::get_user,
        subscribe::subscribe,
        subscribe::unsubscribe
    ),
    components(schemas(
        view::UserProfile,
        view::SubscriptionProfile,
        create::SignupRequest,
        set_password::SetPasswordRequest,
        list::ListUsersResponse,
        subscriptions::SubscriptionsResponse,
    ))
)]
pub struct ApiDoc;
