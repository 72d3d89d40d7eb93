//! Client-side checks run before a request is sent.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::error::ApiError;
use crate::models::{NewAlert, NewPost, NewUser};

pub const MIN_PASSWORD_LENGTH: usize = 6;

static USERNAME: LazyLock<Regex> = LazyLock::new(|| compile(r"^[a-zA-Z0-9_]{3,50}$"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| compile(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| compile(r"^\+?[1-9]\d{1,14}$"));

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("validation regex is valid")
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError {
            field,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::InvalidInput(e.to_string())
    }
}

pub type ValidationResult = Result<(), ValidationError>;

fn required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn validate_username(username: &str) -> ValidationResult {
    if !USERNAME.is_match(username) {
        return Err(ValidationError::new(
            "username",
            "must be 3-50 letters, digits or underscores",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> ValidationResult {
    if !EMAIL.is_match(email.trim()) {
        return Err(ValidationError::new("email", "is not a valid address"));
    }
    Ok(())
}

/// E.164-like: optional `+`, no leading zero, at most 15 digits
pub fn validate_phone(phone: &str) -> ValidationResult {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if !PHONE.is_match(&compact) {
        return Err(ValidationError::new("phone", "is not a valid phone number"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> ValidationResult {
    validate_username(&user.username)?;
    validate_email(&user.email)?;
    validate_password(&user.password)?;
    if let Some(phone) = present(&user.phone_number) {
        validate_phone(phone)?;
    }
    if let Some(email) = present(&user.subscription_email) {
        validate_email(email)?;
    }
    Ok(())
}

pub fn validate_new_alert(alert: &NewAlert) -> ValidationResult {
    required("title", &alert.title)?;
    required("breed", &alert.breed)?;
    required("description", &alert.description)?;
    required("username", &alert.username)?;
    if let Some(phone) = present(&alert.contact_phone) {
        validate_phone(phone)?;
    }
    if let Some(email) = present(&alert.contact_email) {
        validate_email(email)?;
    }
    if matches!(alert.reward, Some(r) if r < 0.0) {
        return Err(ValidationError::new("reward", "cannot be negative"));
    }
    Ok(())
}

pub fn validate_new_post(post: &NewPost) -> ValidationResult {
    required("username", &post.username)?;
    required("content", &post.content)
}
