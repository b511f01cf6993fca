//! Input-side validation.

use crate::error::{Error, Result};

/// Input contract checked before any external call is made.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reject empty or whitespace-only text.
pub fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Require at least `min` characters after trimming.
pub fn require_min_chars(field: &str, value: &str, min: usize) -> Result<()> {
    let len = value.trim().chars().count();
    if len < min {
        return Err(Error::validation(
            field,
            format!("must be at least {} characters (got {})", min, len),
        ));
    }
    Ok(())
}
