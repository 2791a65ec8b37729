//! Client-side form checks.
//!
//! These run before any request is made and report the first failing rule.
//! The backend remains the authority; these only save a round trip.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::{Category, Subcategory};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const PRIORITY_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Name must be at least 2 characters")]
    NameTooShort,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least 8 characters")]
    PasswordTooShort,

    #[error("Password must contain at least one uppercase letter")]
    PasswordMissingUppercase,

    #[error("Password must contain at least one number")]
    PasswordMissingDigit,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Title is required")]
    TitleRequired,

    #[error("Priority must be between 1 and 10")]
    PriorityOutOfRange(u8),

    #[error("No item is being edited")]
    NoDraft,

    #[error("'{subcategory}' is not a {category} subcategory")]
    SubcategoryMismatch {
        category: Category,
        subcategory: Subcategory,
    },
}

/// The registration form as typed.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub fn validate_registration(form: &RegisterForm) -> Result<(), FormError> {
    if form.name.trim().chars().count() < MIN_NAME_CHARS {
        return Err(FormError::NameTooShort);
    }
    if !EMAIL_RE.is_match(&form.email) {
        return Err(FormError::InvalidEmail);
    }
    if form.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(FormError::PasswordTooShort);
    }
    if !form.password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(FormError::PasswordMissingUppercase);
    }
    if !form.password.chars().any(|c| c.is_ascii_digit()) {
        return Err(FormError::PasswordMissingDigit);
    }
    if form.password != form.confirm_password {
        return Err(FormError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_priority(priority: u8) -> Result<u8, FormError> {
    if PRIORITY_RANGE.contains(&priority) {
        Ok(priority)
    } else {
        Err(FormError::PriorityOutOfRange(priority))
    }
}

pub fn validate_subcategory(category: Category, subcategory: Subcategory) -> Result<(), FormError> {
    if subcategory.belongs_to(category) {
        Ok(())
    } else {
        Err(FormError::SubcategoryMismatch {
            category,
            subcategory,
        })
    }
}
