//! Back-office user.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use menucochon_core::{AdminUserId, Email};

/// An admin account with its argon2 password hash.
#[derive(Debug, Clone, FromRow)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub password_hash: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
