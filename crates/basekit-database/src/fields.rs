//! Field-name validation.
//!
//! Every caller-supplied field name passes through this module before it
//! is spliced into SQL text. Values are always bound parameters, so the
//! identifier whitelist here is the sole line of defense for the parts of
//! a statement that cannot be parameterized.

use std::sync::LazyLock;

use regex::Regex;

use basekit_core::error::{AppError, ErrorKind};
use basekit_core::result::AppResult;

/// Identifier pattern: letter or underscore first, then letters, digits,
/// underscores, and dots (for qualified names like `category.name`).
static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").expect("valid field name regex"));

/// Aggregate functions the repository will emit.
const AGGREGATE_FNS: [&str; 5] = ["SUM", "AVG", "COUNT", "MIN", "MAX"];

/// Whether `name` is a safe SQL identifier.
pub fn is_valid_field(name: &str) -> bool {
    FIELD_NAME.is_match(name)
}

/// Validate a field name, or fail with a `Validation` error.
pub fn validate_field(name: &str) -> AppResult<()> {
    if is_valid_field(name) {
        Ok(())
    } else {
        Err(AppError::new(
            ErrorKind::Validation,
            format!("Invalid field name: {name:?}"),
        ))
    }
}

/// Validate an aggregate function name, returning its canonical
/// uppercase form.
pub fn validate_aggregate_fn(name: &str) -> AppResult<&'static str> {
    let upper = name.to_ascii_uppercase();
    AGGREGATE_FNS
        .iter()
        .find(|f| **f == upper)
        .copied()
        .ok_or_else(|| {
            AppError::new(
                ErrorKind::Validation,
                format!("Invalid aggregate function: {name:?}"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_and_qualified_names() {
        assert!(is_valid_field("id"));
        assert!(is_valid_field("created_at"));
        assert!(is_valid_field("category.name"));
        assert!(is_valid_field("_hidden"));
    }

    #[test]
    fn test_rejects_unsafe_names() {
        assert!(!is_valid_field(""));
        assert!(!is_valid_field("1abc"));
        assert!(!is_valid_field("id; DROP TABLE users"));
        assert!(!is_valid_field("name = name"));
        assert!(!is_valid_field("a-b"));
    }

    #[test]
    fn test_validate_field_error_kind() {
        let err = validate_field("id; --").unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }

    #[test]
    fn test_aggregate_fn_is_case_insensitive() {
        assert_eq!(validate_aggregate_fn("sum").unwrap(), "SUM");
        assert_eq!(validate_aggregate_fn("Count").unwrap(), "COUNT");
        assert!(validate_aggregate_fn("median").is_err());
        assert!(validate_aggregate_fn("SUM(1); --").is_err());
    }
}
