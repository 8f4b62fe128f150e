//! Presentation shapes for recipes.
//!
//! `is_favorited` / `is_in_shopping_cart` are always computed for an
//! explicitly passed viewer id; anonymous viewers get `false`.

use crate::api::users::view::{following_set, UserProfile};
use crate::models::{Recipe, Tag, User};
use crate::schema::{
    cart_items, favorites, ingredients, recipe_ingredients, recipe_tags, tags, users,
};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;
use uuid::Uuid;

/// Ingredient line within a recipe: the catalog entry plus the
/// per-recipe amount.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeIngredientView {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full recipe read shape.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeView {
    pub id: Uuid,
    pub tags: Vec<Tag>,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Short recipe shape used by favorite/cart responses and the lists
/// embedded in subscription profiles.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeSummary {
    pub fn from_recipe(recipe: &Recipe) -> Self {
        RecipeSummary {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

fn marked_set(
    conn: &mut PgConnection,
    viewer: Option<Uuid>,
    recipe_ids: &[Uuid],
    in_favorites: bool,
) -> QueryResult<HashSet<Uuid>> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };

    let ids: Vec<Uuid> = if in_favorites {
        favorites::table
            .filter(favorites::user_id.eq(viewer))
            .filter(favorites::recipe_id.eq_any(recipe_ids))
            .select(favorites::recipe_id)
            .load(conn)?
    } else {
        cart_items::table
            .filter(cart_items::user_id.eq(viewer))
            .filter(cart_items::recipe_id.eq_any(recipe_ids))
            .select(cart_items::recipe_id)
            .load(conn)?
    };

    Ok(ids.into_iter().collect())
}

/// Assemble the full read shape for a page of recipes with a fixed
/// number of queries, preserving the input order.
pub fn load_recipe_views(
    conn: &mut PgConnection,
    recipes: Vec<Recipe>,
    viewer: Option<Uuid>,
) -> QueryResult<Vec<RecipeView>> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<Uuid> = recipes
        .iter()
        .map(|r| r.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors: HashMap<Uuid, User> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(User::as_select())
        .load::<User>(conn)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let followed = following_set(conn, viewer, &author_ids)?;

    let mut tags_by_recipe: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    let tag_rows: Vec<(Uuid, Tag)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .order(tags::name.asc())
        .select((recipe_tags::recipe_id, Tag::as_select()))
        .load(conn)?;
    for (recipe_id, tag) in tag_rows {
        tags_by_recipe.entry(recipe_id).or_default().push(tag);
    }

    let mut ingredients_by_recipe: HashMap<Uuid, Vec<RecipeIngredientView>> = HashMap::new();
    let ingredient_rows: Vec<(Uuid, Uuid, String, String, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .order(ingredients::name.asc())
        .select((
            recipe_ingredients::recipe_id,
            ingredients::id,
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(conn)?;
    for (recipe_id, id, name, measurement_unit, amount) in ingredient_rows {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(RecipeIngredientView {
                id,
                name,
                measurement_unit,
                amount,
            });
    }

    let favorited = marked_set(conn, viewer, &recipe_ids, true)?;
    let in_cart = marked_set(conn, viewer, &recipe_ids, false)?;

    recipes
        .into_iter()
        .map(|recipe| {
            // Authors are guaranteed by the FK; a miss means the row set
            // changed under us.
            let author = authors
                .get(&recipe.author_id)
                .ok_or(diesel::result::Error::NotFound)?;

            Ok(RecipeView {
                id: recipe.id,
                tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                author: UserProfile::from_user(author, followed.contains(&author.id)),
                ingredients: ingredients_by_recipe
                    .remove(&recipe.id)
                    .unwrap_or_default(),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                name: recipe.name,
                image: recipe.image,
                text: recipe.text,
                cooking_time: recipe.cooking_time,
            })
        })
        .collect()
}

pub fn load_recipe_view(
    conn: &mut PgConnection,
    recipe: Recipe,
    viewer: Option<Uuid>,
) -> QueryResult<RecipeView> {
    let mut views = load_recipe_views(conn, vec![recipe], viewer)?;
    views.pop().ok_or(diesel::result::Error::NotFound)
}
