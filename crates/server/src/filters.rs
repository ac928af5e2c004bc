//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::NaiveDate;

/// Render an ISO date (`YYYY-MM-DD`) as a short human-readable date.
///
/// Values that are not ISO dates pass through unchanged.
///
/// Usage in templates: `{{ task.deadline|fmt_date }}`
#[askama::filter_fn]
pub fn fmt_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_iso_date(&value.to_string()))
}

/// Uppercase the first character.
///
/// Usage in templates: `{{ task.priority|capitalize }}`
#[askama::filter_fn]
pub fn capitalize(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(capitalize_first(&value.to_string()))
}

fn format_iso_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => raw.to_owned(),
    }
}

fn capitalize_first(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
