//! Form field validation helpers.
//!
//! Each validator is a small pure function returning `Ok(())` or a static
//! message suitable for inline display next to the field. Empty (unset) values
//! pass the non-required validators, matching the original form semantics
//! where `min`/`greater-than` only fire once a value is present.

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::unwrap_used)]
static API_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://.+$").unwrap());

/// Validates that a required text field is non-empty.
pub fn required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        Err("This field is required")
    } else {
        Ok(())
    }
}

/// Validates that a required numeric field has a value.
pub fn required_number(value: Option<f64>) -> Result<(), &'static str> {
    if value.is_some() {
        Ok(())
    } else {
        Err("This field is required")
    }
}

/// Validates `value >= min`. Unset values pass.
pub fn min(value: Option<f64>, min: f64) -> Result<(), &'static str> {
    match value {
        Some(v) if v < min => Err("Value is below the minimum"),
        _ => Ok(()),
    }
}

/// Validates `value > bound`. Unset values pass.
pub fn greater_than(value: Option<f64>, bound: f64) -> Result<(), &'static str> {
    match value {
        Some(v) if v <= bound => Err("Value must be greater than the bound"),
        _ => Ok(()),
    }
}

/// Validates an API base URL (`http://` or `https://`).
pub fn api_url(value: &str) -> Result<(), &'static str> {
    if API_URL.is_match(value) {
        Ok(())
    } else {
        Err("URL must start with http:// or https://")
    }
}

/// Trims trailing slashes before an API URL is persisted.
pub fn trim_api_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_text() {
        assert!(required("").is_err());
        assert!(required("   ").is_err());
        assert!(required("x**2").is_ok());
    }

    #[test]
    fn min_only_fires_on_present_values() {
        assert!(min(None, 1.0).is_ok());
        assert!(min(Some(0.0), 1.0).is_err());
        assert!(min(Some(1.0), 1.0).is_ok());
    }

    #[test]
    fn greater_than_is_strict() {
        assert!(greater_than(Some(0.0), 0.0).is_err());
        assert!(greater_than(Some(1e-6), 0.0).is_ok());
        assert!(greater_than(None, 0.0).is_ok());
    }

    #[test]
    fn api_url_requires_http_scheme() {
        assert!(api_url("http://localhost:8000/api").is_ok());
        assert!(api_url("https://numerics.example/api").is_ok());
        assert!(api_url("localhost:8000").is_err());
        assert!(api_url("ws://host/api").is_err());
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        assert_eq!(trim_api_url("http://host:9999/"), "http://host:9999");
        assert_eq!(trim_api_url("http://host:9999///"), "http://host:9999");
        assert_eq!(trim_api_url("http://host:9999"), "http://host:9999");
    }
}
