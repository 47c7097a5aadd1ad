use bigdecimal::BigDecimal;
use std::fmt;

use crate::pricing::MAX_SALE_PERCENTAGE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for crate::error::AppError {
    fn from(err: ValidationError) -> Self {
        crate::error::AppError::Validation(err.to_string())
    }
}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

/// Same shape check the storefront applies: local part, '@', domain with a dot.
pub fn validate_email(email: &str) -> ValidationResult {
    let email = email.trim();
    validate_required("email", email)?;

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(ValidationError::new("email", "invalid email format")),
    };

    if local.is_empty()
        || domain.is_empty()
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(ValidationError::new("email", "invalid email format"));
    }

    Ok(())
}

/// Sale percentages are integers in [0, 90]; out-of-range is an error, not a clamp.
pub fn validate_percentage(percentage: i64) -> Result<u8, ValidationError> {
    if !(0..=MAX_SALE_PERCENTAGE).contains(&percentage) {
        return Err(ValidationError::new(
            "percentage",
            format!("must be between 0 and {}", MAX_SALE_PERCENTAGE),
        ));
    }

    Ok(percentage as u8)
}

pub fn validate_positive_amount(amount: &BigDecimal) -> ValidationResult {
    if amount <= &BigDecimal::from(0) {
        return Err(ValidationError::new("amount", "must be greater than zero"));
    }

    Ok(())
}

pub fn validate_quantity(quantity: i64) -> ValidationResult {
    if quantity < 1 {
        return Err(ValidationError::new("quantity", "must be at least 1"));
    }

    Ok(())
}
