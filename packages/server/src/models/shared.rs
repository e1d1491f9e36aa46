use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::AppError;

/// Validate a trimmed display name (1-256 Unicode characters).
pub fn validate_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 256 {
        return Err(AppError::Validation("Name must be 1-256 characters".into()));
    }
    Ok(())
}

pub fn parse_i32_field(name: &str, raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("'{name}' must be an integer")))
}

/// Parse a decimal wire value (digits and `.`), locale-independent.
pub fn parse_decimal_field(name: &str, raw: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(raw.trim())
        .map_err(|_| AppError::Validation(format!("'{name}' must be a decimal number")))
}

pub fn parse_bool_field(name: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        _ => Err(AppError::Validation(format!("'{name}' must be a boolean"))),
    }
}

pub fn require_non_negative(name: &str, value: Decimal) -> Result<(), AppError> {
    if value.is_sign_negative() {
        return Err(AppError::Validation(format!("'{name}' must not be negative")));
    }
    Ok(())
}
