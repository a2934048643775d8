//! Human-readable column titles derived from field keys.

/// Converts a snake_case field key to a Title Case label.
///
/// Splits on `_`, joins the parts with spaces and upper-cases the first
/// letter of each part. The remainder of each part is left untouched.
///
/// ```rust
/// use assetreport_core::schema::title_case;
///
/// assert_eq!(title_case("asset_id"), "Asset Id");
/// assert_eq!(title_case("purchase_value"), "Purchase Value");
/// ```
pub fn title_case(key: &str) -> String {
    key.split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
