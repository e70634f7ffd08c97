use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};

pub mod addresses;
pub mod auth;
pub mod favorites;
pub mod inventory;
pub mod menu_items;
pub mod orders;
pub mod recipes;
pub mod reviews;

/// Runs the derived validators and turns failures into a 400.
pub fn validated<T: Validate>(payload: T) -> AppResult<T> {
    payload
        .validate()
        .map_err(|errors| AppError::BadRequest(errors.to_string()))?;
    Ok(payload)
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}
