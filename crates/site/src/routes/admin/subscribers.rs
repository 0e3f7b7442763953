//! Newsletter subscriber export.

use std::fmt::Write;

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use tracing::{info, instrument};

use crate::db::{NewsletterRepository, Subscriber};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Quote a CSV field when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// `email,locale,subscribed_at` rows.
#[must_use]
pub fn subscribers_csv(subscribers: &[Subscriber]) -> String {
    let mut csv = String::from("email,locale,subscribed_at\n");
    for s in subscribers {
        let _ = writeln!(
            csv,
            "{},{},{}",
            csv_field(&s.email),
            s.locale.code(),
            s.created_at.to_rfc3339()
        );
    }
    csv
}

/// Download every subscriber as CSV.
///
/// # Errors
///
/// Returns an error if the subscribers cannot be loaded.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn export(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let subscribers = NewsletterRepository::new(state.pool()).export_all().await?;
    info!(count = subscribers.len(), "Exporting newsletter subscribers");

    let filename = format!(
        "abonnes-{}.csv",
        chrono::Utc::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        subscribers_csv(&subscribers),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use menucochon_core::Locale;

    use super::*;

    #[test]
    fn test_subscribers_csv() {
        let created_at = chrono::Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .unwrap_or_default();
        let rows = vec![
            Subscriber {
                email: "marie@example.com".to_string(),
                locale: Locale::Fr,
                created_at,
            },
            Subscriber {
                email: "odd,\"name\"@example.com".to_string(),
                locale: Locale::En,
                created_at,
            },
        ];

        let csv = subscribers_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.first(), Some(&"email,locale,subscribed_at"));
        assert_eq!(lines.get(1), Some(&"marie@example.com,fr,2024-05-01T12:00:00+00:00"));
        assert_eq!(
            lines.get(2),
            Some(&"\"odd,\"\"name\"\"@example.com\",en,2024-05-01T12:00:00+00:00")
        );
    }
}
