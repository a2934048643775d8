//! Sentinel values: present-but-empty markers that mean "no data".
//!
//! Upstream APIs fill optional attributes with a mix of `null`, empty
//! strings and literal `"N/A"`/`"null"`/`"undefined"` text. All of them are
//! treated alike: they never make a field count as populated during schema
//! inference, and they render as a single placeholder in tables and exports.

use serde_json::Value;

/// Placeholder rendered in place of any sentinel value.
pub const DEFAULT_PLACEHOLDER: &str = "-";

/// String values that carry no data.
pub const SENTINEL_STRINGS: &[&str] = &["", "N/A", "null", "undefined"];

/// Returns true when a field value (or its absence) means "no data".
///
/// # Example
/// ```rust
/// use assetreport_core::sentinel::is_sentinel;
/// use serde_json::json;
///
/// assert!(is_sentinel(None));
/// assert!(is_sentinel(Some(&json!("N/A"))));
/// assert!(!is_sentinel(Some(&json!(0))));
/// ```
pub fn is_sentinel(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => SENTINEL_STRINGS.contains(&s.as_str()),
        Some(_) => false,
    }
}

/// Renders a value as display text, substituting `placeholder` for sentinels.
///
/// Strings are emitted without JSON quoting; arrays and objects fall back to
/// compact JSON.
pub fn display_text(value: Option<&Value>, placeholder: &str) -> String {
    if is_sentinel(value) {
        return placeholder.to_string();
    }
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
        None => placeholder.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_sentinels_detected() {
        assert!(is_sentinel(None));
        assert!(is_sentinel(Some(&Value::Null)));
        for s in SENTINEL_STRINGS {
            assert!(is_sentinel(Some(&json!(s))), "{:?} should be a sentinel", s);
        }
    }

    #[test]
    fn test_real_values_not_sentinels() {
        assert!(!is_sentinel(Some(&json!("Active"))));
        assert!(!is_sentinel(Some(&json!(0))));
        assert!(!is_sentinel(Some(&json!(false))));
        assert!(!is_sentinel(Some(&json!("n/a "))));
        assert!(!is_sentinel(Some(&json!([]))));
    }

    #[test]
    fn test_display_text() {
        assert_eq!(display_text(Some(&json!("N/A")), "-"), "-");
        assert_eq!(display_text(None, "-"), "-");
        assert_eq!(display_text(Some(&json!("Laptop")), "-"), "Laptop");
        assert_eq!(display_text(Some(&json!(42)), "-"), "42");
        assert_eq!(display_text(Some(&json!(1.5)), "-"), "1.5");
        assert_eq!(display_text(Some(&json!(true)), "-"), "true");
        assert_eq!(display_text(Some(&json!(["a", "b"])), "-"), r#"["a","b"]"#);
    }

    #[test]
    fn test_placeholder_is_not_a_sentinel() {
        // Re-normalizing already normalized output must be a no-op.
        assert!(!is_sentinel(Some(&json!(DEFAULT_PLACEHOLDER))));
    }
}
