//! Minimal identity: users and API keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A minimal user record. Password hashing and account provisioning are
/// out of scope (assumed external library); this is just enough identity
/// for ownership, authorization, and audit attribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Stable identifier.
    pub id: String,
    /// Login username, unique.
    pub username: String,
    /// Whether this user holds administrator privileges.
    pub is_admin: bool,
    /// Disabled users must be rejected with a 403, not a 401.
    pub is_active: bool,
}

/// An API key, the second of the two accepted authentication mechanisms
/// (see `ragq-server::auth`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiKey {
    /// The key string itself, as presented in the `X-API-Key` header.
    pub key: String,
    /// The user this key is bound to. `None` marks a legacy, unbound key —
    /// see [`crate::error::Error`] and the `allow_legacy_admin_fallback`
    /// config flag for how resolution of an unbound key is gated.
    pub owner_user_id: Option<String>,
    /// Whether the key is currently usable.
    pub active: bool,
    /// Optional expiry; an expired key must be rejected even if `active`.
    pub expires_at: Option<DateTime<Utc>>,
    /// Number of times this key has been used to authenticate.
    pub usage_count: u64,
}

impl ApiKey {
    /// Whether this key may currently be used to authenticate.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_none_or(|exp| exp > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key(active: bool, expires_at: Option<DateTime<Utc>>) -> ApiKey {
        ApiKey {
            key: "k".into(),
            owner_user_id: Some("u1".into()),
            active,
            expires_at,
            usage_count: 0,
        }
    }

    #[test]
    fn inactive_key_is_never_usable() {
        assert!(!key(false, None).is_usable(Utc::now()));
    }

    #[test]
    fn expired_key_is_not_usable() {
        let now = Utc::now();
        let expired = key(true, Some(now - Duration::seconds(1)));
        assert!(!expired.is_usable(now));
    }

    #[test]
    fn active_unexpired_key_is_usable() {
        let now = Utc::now();
        let k = key(true, Some(now + Duration::seconds(60)));
        assert!(k.is_usable(now));
    }
}
