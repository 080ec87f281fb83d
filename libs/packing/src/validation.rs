//! Input validation at the operation boundary

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{PackingError, PackingResult};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_LENGTH: usize = 30;

fn invalid(message: impl Into<String>) -> PackingError {
    PackingError::Validation(message.into())
}

/// Validate and trim a list, category, item or template name
pub fn validate_name(field: &str, name: &str) -> PackingResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid(format!("{} is required", field)));
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(invalid(format!(
            "{} must be at most {} characters long",
            field, MAX_NAME_LENGTH
        )));
    }

    Ok(trimmed.to_string())
}

/// Validate item quantity
pub fn validate_quantity(quantity: i32) -> PackingResult<()> {
    if quantity < 1 {
        return Err(invalid("Quantity must be a positive integer"));
    }
    Ok(())
}

/// Validate item weight
pub fn validate_weight(weight: f64) -> PackingResult<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(invalid("Weight must be a non-negative number"));
    }
    Ok(())
}

/// Validate a `#rrggbb` category color
pub fn validate_color(color: &str) -> PackingResult<()> {
    static COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = COLOR_REGEX
        .get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("Failed to compile color regex"));

    if !regex.is_match(color) {
        return Err(invalid("Color must be a hex value like #1a2b3c"));
    }
    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> PackingResult<()> {
    if email.len() > 254 {
        return Err(invalid("Email must be at most 254 characters long"));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(invalid("Invalid email format"));
    }
    Ok(())
}

/// Trim, drop empties and de-duplicate tags, keeping first occurrences
pub fn normalize_tags(tags: Vec<String>) -> PackingResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || normalized.iter().any(|t| t == tag) {
            continue;
        }
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(invalid(format!(
                "Tags must be at most {} characters long",
                MAX_TAG_LENGTH
            )));
        }
        normalized.push(tag.to_string());
    }

    if normalized.len() > MAX_TAGS {
        return Err(invalid(format!("At most {} tags are allowed", MAX_TAGS)));
    }
    Ok(normalized)
}

/// Trim optional free text, mapping blank to `None`
pub fn normalize_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
