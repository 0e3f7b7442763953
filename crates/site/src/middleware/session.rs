//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. Only the
//! back-office uses sessions; the public site is cookieless.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, cookie::Key, service::SignedCookie};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::SiteConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "mc_admin";

/// Session expiry time in seconds (12 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - Site configuration (session secret and secure-cookie flag)
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &SiteConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    // Table lives in tower_sessions.session, created by migration
    let store = PostgresStore::new(pool.clone());
    let is_secure = config.is_secure();
    let key = signing_key(config.session_secret.expose_secret());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/admin")
        .with_signed(key)
}

/// Cookie signing key: SHA-512 of the secret gives the 64 bytes `Key` needs.
fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_is_deterministic() {
        let a = signing_key("a-long-session-secret-with-enough-entropy");
        let b = signing_key("a-long-session-secret-with-enough-entropy");
        let c = signing_key("another-long-session-secret-entirely-here");
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }

    #[tokio::test]
    async fn test_layer_signs_cookies() {
        let config = SiteConfig::for_tests();
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/menucochon_test")
            .unwrap_or_else(|e| panic!("lazy pool: {e}"));
        let _layer: SessionManagerLayer<PostgresStore, SignedCookie> =
            create_session_layer(&pool, &config);
    }
}
