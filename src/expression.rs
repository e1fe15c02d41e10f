//! Normalization of free-text math expressions.
//!
//! Expression fields accept whatever the user types. Before the text is stored
//! or sent for validation, it is normalized the same way on every keystroke:
//! decimal commas become dots, whitespace is stripped, and runs of dots
//! collapse to a single dot.

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::unwrap_used)]
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
#[allow(clippy::unwrap_used)]
static REPEATED_DOTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").unwrap());

/// Normalizes a free-text math expression.
pub fn normalize(expr: &str) -> String {
    let replaced = expr.replace(',', ".");
    let no_whitespace = WHITESPACE.replace_all(&replaced, "");
    REPEATED_DOTS.replace_all(&no_whitespace, ".").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commas_become_dots() {
        assert_eq!(normalize("1,5*x"), "1.5*x");
    }

    #[test]
    fn whitespace_is_stripped() {
        assert_eq!(normalize("x ** 2 - 4"), "x**2-4");
    }

    #[test]
    fn repeated_dots_collapse() {
        assert_eq!(normalize("2..5"), "2.5");
        assert_eq!(normalize("2....5"), "2.5");
    }

    #[test]
    fn combined_normalization() {
        assert_eq!(normalize("1,5 + x ** 2"), "1.5+x**2");
    }

    #[test]
    fn already_normalized_text_is_unchanged() {
        assert_eq!(normalize("sin(x)/x"), "sin(x)/x");
    }
}
