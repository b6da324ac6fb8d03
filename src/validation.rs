//! Input validation helpers shared by the services.
//!
//! Ids are `Uuid`-typed and amounts are integer-typed, so malformed values
//! of those are rejected at the request boundary; these checks cover the
//! range and format rules that the type system cannot express.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AppError, AppResult};

pub const MAX_CONTACT_MESSAGE_LEN: usize = 500;
pub const MIN_PASSWORD_LEN: usize = 8;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

// South African mobile format: +27 XX XXX XXXX (spaces optional)
fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+27\s?\d{2}\s?\d{3}\s?\d{4}$").unwrap())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if !email_regex().is_match(email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AppError::Validation(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AppError::Validation(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Password must contain at least one number".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> AppResult<()> {
    if !phone_regex().is_match(phone) {
        return Err(AppError::Validation(
            "Invalid South African phone number format. Use: +27 XX XXX XXXX".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_contact_message(message: Option<&str>) -> AppResult<()> {
    if let Some(message) = message {
        if message.chars().count() > MAX_CONTACT_MESSAGE_LEN {
            return Err(AppError::Validation(format!(
                "Message too long (max {} characters)",
                MAX_CONTACT_MESSAGE_LEN
            )));
        }
    }
    Ok(())
}

pub fn validate_amount(amount: i64) -> AppResult<()> {
    if amount <= 0 {
        return Err(AppError::Validation(
            "Amount must be positive".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_listing_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    Ok(())
}

pub fn validate_price(price: i64) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::Validation("Price must be positive".to_string()));
    }
    Ok(())
}

/// Escape `%` and `_` so user-supplied search terms cannot act as LIKE
/// wildcards.
pub fn escape_like_pattern(input: &str) -> String {
    input.replace('%', "\\%").replace('_', "\\_")
}
