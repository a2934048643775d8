//! Applying and describing the table's filter/sort state.
//!
//! The dashboard filters and sorts client-side when rendering, so the raw
//! record array handed to export still contains hidden rows in their
//! original order. Applying the view here makes the export match what the
//! user sees.

use crate::models::{Record, SortOrder, ViewState};
use crate::schema::title_case;
use crate::sentinel::{display_text, is_sentinel};
use serde_json::Value;
use std::cmp::Ordering;

/// Returns the records visible under `view`: filtered, then stably sorted.
pub fn apply_view(records: &[Record], view: &ViewState) -> Vec<Record> {
    let filters: Vec<(&str, Vec<String>)> = view
        .active_filters()
        .map(|(field, values)| {
            let needles = values
                .iter()
                .map(|v| display_text(Some(v), "").to_lowercase())
                .collect();
            (field, needles)
        })
        .collect();

    let mut visible: Vec<Record> = records
        .iter()
        .filter(|record| {
            filters
                .iter()
                .all(|(field, needles)| matches_filter(record.get(*field), needles))
        })
        .cloned()
        .collect();

    if let Some((field, order)) = view.sorter.active() {
        visible.sort_by(|a, b| compare_for_sort(a.get(field), b.get(field), order));
    }

    visible
}

/// A record passes a field filter when its display text contains any of the
/// filter values, case-insensitively. Sentinel values never match.
fn matches_filter(value: Option<&Value>, needles: &[String]) -> bool {
    if is_sentinel(value) {
        return false;
    }
    let haystack = display_text(value, "").to_lowercase();
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}

/// Orders two values for `order`, keeping sentinels last in both directions.
fn compare_for_sort(a: Option<&Value>, b: Option<&Value>, order: SortOrder) -> Ordering {
    match (is_sentinel(a), is_sentinel(b)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = compare_values(a, b);
            match order {
                SortOrder::Ascend => ordering,
                SortOrder::Descend => ordering.reverse(),
            }
        }
    }
}

/// Numbers sort before text; numbers compare numerically, text
/// case-insensitively.
#[derive(Debug)]
enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(value: Option<&Value>) -> SortKey {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number.filter(|n| n.is_finite()) {
        Some(n) => SortKey::Number(n),
        None => SortKey::Text(display_text(value, "").to_lowercase()),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (sort_key(a), sort_key(b)) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(&y),
        (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(&y),
    }
}

/// Human-readable lines describing the view state for report headers.
pub fn describe_view(view: &ViewState) -> Vec<String> {
    let mut lines: Vec<String> = view
        .active_filters()
        .map(|(field, values)| {
            let values: Vec<String> = values.iter().map(|v| display_text(Some(v), "")).collect();
            format!("Filtered by {}: {}", title_case(field), values.join(", "))
        })
        .collect();

    if let Some((field, order)) = view.sorter.active() {
        let direction = match order {
            SortOrder::Ascend => "ascending",
            SortOrder::Descend => "descending",
        };
        lines.push(format!("Sorted by {} ({})", title_case(field), direction));
    }

    lines
}
