//! Payload validation for recipe create/update. All checks run before
//! anything is written.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

pub const MIN_AMOUNT: i32 = 1;
pub const MAX_AMOUNT: i32 = 2000;
pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 720;

/// Write-side ingredient reference: catalog id plus amount.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientAmount {
    pub id: Uuid,
    pub amount: i32,
}

pub fn validate_ingredient_amounts(items: &[IngredientAmount]) -> Result<(), String> {
    if items.is_empty() {
        return Err("Recipe must have at least one ingredient".to_string());
    }

    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.id) {
            return Err("Recipe ingredients must be unique".to_string());
        }
        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&item.amount) {
            return Err(format!(
                "Ingredient amount must be between {} and {}",
                MIN_AMOUNT, MAX_AMOUNT
            ));
        }
    }
    Ok(())
}

pub fn validate_tag_ids(tag_ids: &[Uuid]) -> Result<(), String> {
    if tag_ids.is_empty() {
        return Err("Recipe must have at least one tag".to_string());
    }

    let unique: HashSet<Uuid> = tag_ids.iter().copied().collect();
    if unique.len() != tag_ids.len() {
        return Err("Recipe tags must be unique".to_string());
    }
    Ok(())
}

pub fn validate_cooking_time(cooking_time: i32) -> Result<(), String> {
    if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&cooking_time) {
        return Err(format!(
            "Cooking time must be between {} and {} minutes",
            MIN_COOKING_TIME, MAX_COOKING_TIME
        ));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    Ok(())
}

pub fn validate_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Text cannot be empty".to_string());
    }
    Ok(())
}

/// Accepts a bare base64 payload or a `data:<mime>;base64,<payload>`
/// data URL, and checks the payload actually decodes.
pub fn validate_image(image: &str) -> Result<(), String> {
    let payload = match image.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => image,
    };

    if payload.is_empty() {
        return Err("Image cannot be empty".to_string());
    }

    STANDARD
        .decode(payload)
        .map(|_| ())
        .map_err(|_| "Image must be base64-encoded".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: Uuid, amount: i32) -> IngredientAmount {
        IngredientAmount { id, amount }
    }

    #[test]
    fn amounts_at_bounds_accepted() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(validate_ingredient_amounts(&[item(a, 1), item(b, 2000)]).is_ok());
    }

    #[test]
    fn amounts_out_of_bounds_rejected() {
        let a = Uuid::new_v4();
        assert!(validate_ingredient_amounts(&[item(a, 0)]).is_err());
        assert!(validate_ingredient_amounts(&[item(a, 2001)]).is_err());
        assert!(validate_ingredient_amounts(&[item(a, -3)]).is_err());
    }

    #[test]
    fn duplicate_ingredient_ids_rejected() {
        let a = Uuid::new_v4();
        assert!(validate_ingredient_amounts(&[item(a, 5), item(a, 7)]).is_err());
    }

    #[test]
    fn empty_ingredient_list_rejected() {
        assert!(validate_ingredient_amounts(&[]).is_err());
    }

    #[test]
    fn duplicate_tags_rejected() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(validate_tag_ids(&[a, b]).is_ok());
        assert!(validate_tag_ids(&[a, a]).is_err());
        assert!(validate_tag_ids(&[]).is_err());
    }

    #[test]
    fn cooking_time_bounds() {
        assert!(validate_cooking_time(0).is_err());
        assert!(validate_cooking_time(1).is_ok());
        assert!(validate_cooking_time(720).is_ok());
        assert!(validate_cooking_time(721).is_err());
    }

    #[test]
    fn image_accepts_bare_base64_and_data_url() {
        assert!(validate_image("aGVsbG8=").is_ok());
        assert!(validate_image("data:image/png;base64,aGVsbG8=").is_ok());
    }

    #[test]
    fn image_rejects_invalid_payloads() {
        assert!(validate_image("").is_err());
        assert!(validate_image("data:image/png;base64,").is_err());
        assert!(validate_image("not base64!!").is_err());
    }

    #[test]
    fn name_and_text_must_be_nonblank() {
        assert!(validate_name("Borscht").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_text("Chop and simmer.").is_ok());
        assert!(validate_text("").is_err());
    }
}
