//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Build-time content hash of `site.css`.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Build-time content hash of `site.js`.
///
/// Usage in templates: `{{ ""|js_hash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn js_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("JS_HASH"))
}

/// Formats a number of minutes as `45 min` or `1 h 15`.
///
/// Usage in templates: `{{ recipe.total_minutes|duration }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn duration(minutes: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_minutes(&minutes.to_string()))
}

/// Same formatting as the `duration` filter; unparseable input passes through.
#[must_use]
pub fn format_minutes(raw: &str) -> String {
    let Ok(minutes) = raw.trim().parse::<u32>() else {
        return raw.to_string();
    };
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} h"),
        (h, m) => format!("{h} h {m:02}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes("45"), "45 min");
        assert_eq!(format_minutes("60"), "1 h");
        assert_eq!(format_minutes("75"), "1 h 15");
        assert_eq!(format_minutes("125"), "2 h 05");
        assert_eq!(format_minutes("n/a"), "n/a");
    }
}
