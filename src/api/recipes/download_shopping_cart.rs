use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{cart_items, ingredients, recipe_ingredients};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::dsl::sum;
use diesel::prelude::*;
use std::sync::Arc;

const HEADER_LINE: &str = "Shopping list:";
const FILENAME: &str = "shopping_cart.txt";

/// One aggregated line: ingredient name, unit, summed amount.
type ShoppingListRow = (String, String, Option<i64>);

/// Render the aggregated rows as the downloadable plain-text payload.
fn render_shopping_list(rows: &[ShoppingListRow]) -> String {
    let lines: Vec<String> = rows
        .iter()
        .map(|(name, unit, total)| format!("{} - {} {}", name, total.unwrap_or(0), unit))
        .collect();
    format!("{}\n\n{}", HEADER_LINE, lines.join("\n"))
}

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    tag = "recipes",
    responses(
        (status = 200, description = "Aggregated shopping list as a text attachment", body = String, content_type = "text/plain"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    // Sum amounts over every recipe in the user's cart, grouped by
    // (ingredient name, unit)
    let rows: Vec<ShoppingListRow> = match recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(
            recipe_ingredients::recipe_id.eq_any(
                cart_items::table
                    .filter(cart_items::user_id.eq(user.id))
                    .select(cart_items::recipe_id),
            ),
        )
        .group_by((ingredients::name, ingredients::measurement_unit))
        .select((
            ingredients::name,
            ingredients::measurement_unit,
            sum(recipe_ingredients::amount),
        ))
        .order(ingredients::name.asc())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to aggregate shopping list: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to build shopping list".to_string(),
                }),
            )
                .into_response();
        }
    };

    let body = render_shopping_list(&rows);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", FILENAME),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, unit: &str, total: i64) -> ShoppingListRow {
        (name.to_string(), unit.to_string(), Some(total))
    }

    #[test]
    fn renders_summed_line_per_ingredient() {
        // Two cart recipes sharing "Salt, g" with amounts 5 and 10
        // arrive here already aggregated to 15
        let rows = vec![row("Salt", "g", 15)];
        assert_eq!(render_shopping_list(&rows), "Shopping list:\n\nSalt - 15 g");
    }

    #[test]
    fn renders_multiple_groups_in_order() {
        let rows = vec![row("Eggs", "pcs", 3), row("Milk", "ml", 500)];
        assert_eq!(
            render_shopping_list(&rows),
            "Shopping list:\n\nEggs - 3 pcs\nMilk - 500 ml"
        );
    }

    #[test]
    fn empty_cart_yields_header_only() {
        assert_eq!(render_shopping_list(&[]), "Shopping list:\n\n");
    }

    #[test]
    fn same_name_different_unit_stays_separate() {
        let rows = vec![row("Sugar", "g", 200), row("Sugar", "tbsp", 2)];
        assert_eq!(
            render_shopping_list(&rows),
            "Shopping list:\n\nSugar - 200 g\nSugar - 2 tbsp"
        );
    }
}
