//! Input validation for directory records.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid phone number format.
    InvalidPhone(String),
    /// Invalid language tag.
    InvalidLanguage(String),
    /// Coordinate outside its range.
    OutOfRange { field: String, value: String },
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidPhone(msg) => write!(f, "Invalid phone number: {}", msg),
            ValidationError::InvalidLanguage(tag) => write!(f, "Invalid language tag: {}", tag),
            ValidationError::OutOfRange { field, value } => {
                write!(f, "{} out of range: {}", field, value)
            }
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Minimum digits in a phone number.
pub const MIN_PHONE_LENGTH: usize = 8;

/// Maximum digits in a phone number (E.164).
pub const MAX_PHONE_LENGTH: usize = 15;

/// Maximum allowed length for region names.
pub const MAX_NAME_LENGTH: usize = 255;

/// Validate a phone number.
///
/// Accepts an optional leading `+` followed by 8 to 15 digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Empty("phone_number".to_string()));
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPhone(
            "must contain only digits after an optional +".to_string(),
        ));
    }

    if digits.len() < MIN_PHONE_LENGTH || digits.len() > MAX_PHONE_LENGTH {
        return Err(ValidationError::InvalidPhone(format!(
            "must have {}-{} digits, got {}",
            MIN_PHONE_LENGTH,
            MAX_PHONE_LENGTH,
            digits.len()
        )));
    }

    Ok(())
}

/// Validate a language tag like `en` or `as-IN`.
pub fn validate_language(tag: &str) -> Result<(), ValidationError> {
    let bytes = tag.as_bytes();
    let base_ok = |b: &[u8]| b.len() == 2 && b.iter().all(|c| c.is_ascii_lowercase());

    let valid = match bytes.len() {
        2 => base_ok(bytes),
        5 => {
            base_ok(&bytes[..2])
                && bytes[2] == b'-'
                && bytes[3..].iter().all(|c| c.is_ascii_uppercase())
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidLanguage(tag.to_string()))
    }
}

/// Validate a latitude/longitude pair.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::OutOfRange {
            field: "latitude".to_string(),
            value: latitude.to_string(),
        });
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::OutOfRange {
            field: "longitude".to_string(),
            value: longitude.to_string(),
        });
    }
    Ok(())
}

/// Validate a region name.
pub fn validate_region_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty("name".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
            actual: name.chars().count(),
        });
    }
    Ok(())
}
