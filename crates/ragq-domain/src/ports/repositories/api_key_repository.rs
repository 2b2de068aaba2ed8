//! API Key / User Repository

use crate::entities::{ApiKey, User};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for [`ApiKey`] and [`User`] lookups needed by
/// `ragq-server::auth`.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Look up a key by its string value.
    async fn find_key(&self, key: &str) -> Result<Option<ApiKey>>;

    /// Increment a key's usage counter. Best-effort: callers should not
    /// fail authentication if this fails.
    async fn record_key_usage(&self, key: &str) -> Result<()>;

    /// Fetch a user by id.
    async fn find_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Fetch the first administrator user, used to resolve legacy unbound
    /// API keys when `auth.allow_legacy_admin_fallback` is enabled. An
    /// absent administrator with that flag enabled is a fatal
    /// configuration error at the call site.
    async fn find_first_administrator(&self) -> Result<Option<User>>;
}
