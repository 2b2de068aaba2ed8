//! Usage Log Repository

use crate::entities::UsageLog;
use crate::error::Result;
use async_trait::async_trait;

/// Append-only persistence for [`UsageLog`] rows.
///
/// A usage-log write failure is recovered locally (logged, not propagated)
/// per the §7 propagation policy — callers should not let this repository
/// fail a request.
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Record one usage log row.
    async fn record(&self, log: &UsageLog) -> Result<()>;
}
