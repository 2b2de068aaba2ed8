//! Search-scoping value objects: caller filters and the tenant predicate.

use serde::{Deserialize, Serialize};

/// Caller-supplied filters, applied as a conjunction of field-equality
/// predicates alongside the tenant filter and group filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    /// Restrict to a chunk kind (`"code"` or `"document"`), if set.
    pub chunk_type: Option<String>,
    /// Restrict to a programming language, if set.
    pub language: Option<String>,
    /// Restrict to a knowledge category, if set.
    pub category: Option<String>,
    /// Drop candidates scoring below this threshold after fusion (or after
    /// reranking, when reranking ran).
    pub min_score: Option<f32>,
}

/// Identifies the caller for tenant-isolation purposes.
///
/// The retrieval-time predicate is always `owner_id = me OR is_public =
/// true`, unless `is_admin` overrides it to see everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    /// The requesting user's id.
    pub owner_id: String,
    /// Administrators bypass the tenant filter entirely.
    pub is_admin: bool,
}

impl TenantContext {
    /// Whether a candidate payload tagged `(owner_id, is_public)` is
    /// visible to this tenant context.
    pub fn can_see(&self, candidate_owner_id: &str, candidate_is_public: bool) -> bool {
        self.is_admin || candidate_is_public || candidate_owner_id == self.owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(owner_id: &str, is_admin: bool) -> TenantContext {
        TenantContext {
            owner_id: owner_id.to_string(),
            is_admin,
        }
    }

    #[test]
    fn owner_sees_own_private_content() {
        assert!(ctx("u1", false).can_see("u1", false));
    }

    #[test]
    fn owner_does_not_see_others_private_content() {
        assert!(!ctx("u1", false).can_see("u2", false));
    }

    #[test]
    fn everyone_sees_public_content() {
        assert!(ctx("u1", false).can_see("u2", true));
    }

    #[test]
    fn admin_sees_everything() {
        assert!(ctx("admin", true).can_see("u2", false));
    }
}
