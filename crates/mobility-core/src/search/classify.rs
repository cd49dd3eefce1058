//! Query shape classification.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Dutch postcode shape, `1234AB`.
static ZIP_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}[A-Za-z]{2}$").expect("postcode regex"));

/// Which family of columns a query can match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryClass {
    /// Digits only, or a postcode
    Numeric,
    /// Contains both `@` and `.`
    Email,
    Text,
}

impl fmt::Display for QueryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryClass::Numeric => "numeric",
            QueryClass::Email => "email",
            QueryClass::Text => "text",
        })
    }
}

pub fn classify(query: &str) -> QueryClass {
    let query = query.trim();
    if (!query.is_empty() && query.chars().all(|c| c.is_ascii_digit())) || ZIP_SHAPE.is_match(query)
    {
        QueryClass::Numeric
    } else if query.contains('@') && query.contains('.') {
        QueryClass::Email
    } else {
        QueryClass::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_and_postcodes_are_numeric() {
        assert_eq!(classify("0612"), QueryClass::Numeric);
        assert_eq!(classify(" 42 "), QueryClass::Numeric);
        assert_eq!(classify("1234AB"), QueryClass::Numeric);
        assert_eq!(classify("1234ab"), QueryClass::Numeric);
    }

    #[test]
    fn test_email_needs_at_and_dot() {
        assert_eq!(classify("a@x.com"), QueryClass::Email);
        assert_eq!(classify("@x."), QueryClass::Email);
        assert_eq!(classify("a@x"), QueryClass::Text);
        assert_eq!(classify("x.com"), QueryClass::Text);
    }

    #[test]
    fn test_everything_else_is_text() {
        assert_eq!(classify("Rotterdam"), QueryClass::Text);
        assert_eq!(classify("12A"), QueryClass::Text);
        assert_eq!(classify(""), QueryClass::Text);
    }
}
