//! Input validation
//!
//! Field rules are declared here as one explicit spec per payload —
//! create and update variants are separate functions, not one mutable
//! rule map. The validation layer rejects before any business logic or
//! store access runs; SQLite TEXT has no built-in length enforcement,
//! so lengths are checked up front.

use crate::utils::{AppError, AppResult};
use shared::models::{
    DiningTableCreate, DiningTableUpdate, FoodCreate, FoodUpdate, OrderCreate, SetTableRequest,
    TransactionCreate, UserCreate, UserUpdate,
};

// ── Limits ──────────────────────────────────────────────────────────

/// Entity names, descriptions, tips
pub const MAX_TEXT_LEN: usize = 255;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Image uploads: accepted extensions
pub const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png"];

/// Image uploads: size ceiling (4096 KB)
pub const MAX_IMAGE_BYTES: usize = 4096 * 1024;

// ── Field helpers ───────────────────────────────────────────────────

/// Required string: non-empty after trimming, within the length limit
pub fn required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Optional string: when present, within the length limit
pub fn optional_text(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Positive integer (table numbers, ids carried in payloads, quantities)
pub fn positive(value: i64, field: &str) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::validation(format!(
            "{field} must be a positive integer"
        )));
    }
    Ok(())
}

/// Usernames: lowercase letters, digits and underscores only
pub fn username(value: &str) -> AppResult<()> {
    if value.is_empty()
        || !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(AppError::validation(
            "username may only contain lowercase letters, digits and underscores",
        ));
    }
    Ok(())
}

/// Two-valued flags are stored as `"Y"` / `"N"`; input is accepted
/// case-insensitively
pub fn flag(value: &str, field: &str) -> AppResult<()> {
    match value {
        "Y" | "N" | "y" | "n" => Ok(()),
        _ => Err(AppError::validation(format!("{field} must be Y or N"))),
    }
}

fn password(value: &str) -> AppResult<()> {
    if value.len() < MIN_PASSWORD_LEN || value.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

// ── Payload specs ───────────────────────────────────────────────────

pub fn table_create(payload: &DiningTableCreate) -> AppResult<()> {
    positive(payload.number, "number")
}

pub fn table_update(payload: &DiningTableUpdate) -> AppResult<()> {
    if let Some(number) = payload.number {
        positive(number, "number")?;
    }
    if let Some(available) = &payload.available {
        flag(available, "available")?;
    }
    Ok(())
}

pub fn set_table(payload: &SetTableRequest) -> AppResult<()> {
    if let Some(number) = payload.number {
        positive(number, "number")?;
    }
    required_text(&payload.username, "username", MAX_TEXT_LEN)?;
    required_text(&payload.password, "password", MAX_PASSWORD_LEN)
}

pub fn order_create(payload: &OrderCreate) -> AppResult<()> {
    positive(payload.table_number, "table_number")?;
    if payload.details.is_empty() {
        return Err(AppError::validation("details must not be empty"));
    }
    for detail in &payload.details {
        positive(detail.food_id, "details.food_id")?;
        positive(detail.qty, "details.qty")?;
        optional_text(&detail.tips, "details.tips", MAX_TEXT_LEN)?;
    }
    Ok(())
}

pub fn transaction_create(payload: &TransactionCreate) -> AppResult<()> {
    positive(payload.order_id, "order_id")
}

pub fn food_create(payload: &FoodCreate) -> AppResult<()> {
    positive(payload.category_id, "category_id")?;
    required_text(&payload.name, "name", MAX_TEXT_LEN)?;
    required_text(&payload.description, "description", MAX_TEXT_LEN)?;
    food_price(payload.price)?;
    food_discount(payload.discount)
}

pub fn food_update(payload: &FoodUpdate) -> AppResult<()> {
    if let Some(category_id) = payload.category_id {
        positive(category_id, "category_id")?;
    }
    if let Some(name) = &payload.name {
        required_text(name, "name", MAX_TEXT_LEN)?;
    }
    if let Some(description) = &payload.description {
        required_text(description, "description", MAX_TEXT_LEN)?;
    }
    if let Some(price) = payload.price {
        food_price(price)?;
    }
    if let Some(discount) = payload.discount {
        food_discount(discount)?;
    }
    Ok(())
}

fn food_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation("price must not be negative"));
    }
    Ok(())
}

/// Whole-percentage discount, 0-100
fn food_discount(discount: i64) -> AppResult<()> {
    if !(0..=100).contains(&discount) {
        return Err(AppError::validation("discount must be 0-100"));
    }
    Ok(())
}

/// Category create and update share one single-field rule set
pub fn category_name(name: &str) -> AppResult<()> {
    required_text(name, "name", MAX_TEXT_LEN)
}

/// Role create and update share one single-field rule set
pub fn role_name(name: &str) -> AppResult<()> {
    required_text(name, "name", MAX_TEXT_LEN)
}

pub fn user_create(payload: &UserCreate) -> AppResult<()> {
    required_text(&payload.name, "name", MAX_TEXT_LEN)?;
    username(&payload.username)?;
    password(&payload.password)
}

pub fn user_update(payload: &UserUpdate) -> AppResult<()> {
    if let Some(name) = &payload.name {
        required_text(name, "name", MAX_TEXT_LEN)?;
    }
    if let Some(value) = &payload.username {
        username(value)?;
    }
    if let Some(value) = &payload.password {
        password(value)?;
    }
    Ok(())
}

pub fn login(username_value: &str, password_value: &str) -> AppResult<()> {
    username(username_value)?;
    required_text(password_value, "password", MAX_PASSWORD_LEN)
}

/// Validate an uploaded image file name + size against the fixed rules,
/// returning the normalized extension
pub fn image_upload(file_name: &str, len: usize) -> AppResult<String> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::validation(
            "image must be a jpeg, jpg or png file",
        ));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(AppError::validation("image must not exceed 4096 KB"));
    }
    Ok(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::DetailOrderInput;

    #[test]
    fn order_spec_rejects_bad_quantities() {
        let payload = OrderCreate {
            table_number: 5,
            details: vec![DetailOrderInput {
                food_id: 1,
                qty: 0,
                tips: None,
            }],
        };
        assert!(order_create(&payload).is_err());
    }

    #[test]
    fn order_spec_rejects_empty_details() {
        let payload = OrderCreate {
            table_number: 5,
            details: vec![],
        };
        assert!(order_create(&payload).is_err());
    }

    #[test]
    fn username_rule_rejects_mixed_case() {
        assert!(username("john_doe9").is_ok());
        assert!(username("John").is_err());
        assert!(username("john doe").is_err());
        assert!(username("").is_err());
    }

    #[test]
    fn flag_rule_accepts_both_cases() {
        assert!(flag("Y", "available").is_ok());
        assert!(flag("n", "available").is_ok());
        assert!(flag("maybe", "available").is_err());
    }

    #[test]
    fn discount_is_a_whole_percentage() {
        let base = FoodCreate {
            category_id: 1,
            name: "Nasi Goreng".to_string(),
            description: "Fried rice".to_string(),
            price: 20000.0,
            discount: 100,
        };
        assert!(food_create(&base).is_ok());

        let over = FoodCreate {
            discount: 101,
            ..base.clone()
        };
        assert!(food_create(&over).is_err());

        let negative = FoodCreate {
            discount: -1,
            ..base
        };
        assert!(food_create(&negative).is_err());
    }

    #[test]
    fn image_upload_accepts_known_extensions() {
        assert_eq!(image_upload("dish.PNG", 1024).unwrap(), "png");
        assert_eq!(image_upload("a.b.jpeg", 1024).unwrap(), "jpeg");
    }

    #[test]
    fn image_upload_rejects_bad_inputs() {
        assert!(image_upload("dish.gif", 1024).is_err());
        assert!(image_upload("noextension", 1024).is_err());
        assert!(image_upload("dish.png", MAX_IMAGE_BYTES + 1).is_err());
    }
}
