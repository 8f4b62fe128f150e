//! Presentation shapes for user profiles.
//!
//! The requesting user is always passed in explicitly; nothing here
//! reads ambient request state.

use crate::api::recipes::view::RecipeSummary;
use crate::models::{Recipe, User};
use crate::schema::{follows, recipes};
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the requesting user follows this user; false for
    /// anonymous requests.
    pub is_subscribed: bool,
}

impl UserProfile {
    pub fn from_user(user: &User, is_subscribed: bool) -> Self {
        UserProfile {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// Author profile embedded in the subscriptions listing: the profile
/// plus the author's recipes and their total count.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionProfile {
    #[serde(flatten)]
    pub user: UserProfile,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

/// Which of `author_ids` the viewer follows. Anonymous viewers follow
/// nobody.
pub fn following_set(
    conn: &mut PgConnection,
    viewer: Option<Uuid>,
    author_ids: &[Uuid],
) -> QueryResult<HashSet<Uuid>> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };
    if author_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let followed: Vec<Uuid> = follows::table
        .filter(follows::follower_id.eq(viewer))
        .filter(follows::author_id.eq_any(author_ids))
        .select(follows::author_id)
        .load(conn)?;

    Ok(followed.into_iter().collect())
}

pub fn is_following(
    conn: &mut PgConnection,
    viewer: Option<Uuid>,
    author_id: Uuid,
) -> QueryResult<bool> {
    Ok(following_set(conn, viewer, &[author_id])?.contains(&author_id))
}

/// Build subscription profiles for authors the viewer follows.
/// `recipes_limit` caps the embedded recipe list per author;
/// `recipes_count` always reflects the full total.
pub fn subscription_profiles(
    conn: &mut PgConnection,
    authors: &[User],
    recipes_limit: Option<i64>,
) -> QueryResult<Vec<SubscriptionProfile>> {
    let author_ids: Vec<Uuid> = authors.iter().map(|a| a.id).collect();

    let counts: HashMap<Uuid, i64> = recipes::table
        .filter(recipes::author_id.eq_any(&author_ids))
        .group_by(recipes::author_id)
        .select((recipes::author_id, count_star()))
        .load::<(Uuid, i64)>(conn)?
        .into_iter()
        .collect();

    let mut by_author: HashMap<Uuid, Vec<RecipeSummary>> = HashMap::new();
    let rows: Vec<Recipe> = recipes::table
        .filter(recipes::author_id.eq_any(&author_ids))
        .order(recipes::pub_date.desc())
        .select(Recipe::as_select())
        .load(conn)?;
    for recipe in rows {
        let entry = by_author.entry(recipe.author_id).or_default();
        if recipes_limit.map_or(true, |limit| (entry.len() as i64) < limit) {
            entry.push(RecipeSummary::from_recipe(&recipe));
        }
    }

    Ok(authors
        .iter()
        .map(|author| SubscriptionProfile {
            user: UserProfile::from_user(author, true),
            recipes: by_author.remove(&author.id).unwrap_or_default(),
            recipes_count: counts.get(&author.id).copied().unwrap_or(0),
        })
        .collect())
}
