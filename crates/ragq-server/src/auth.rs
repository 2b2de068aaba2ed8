//! Request guards implementing the two accepted authentication
//! mechanisms: a JWT `Authorization: Bearer` header (verified by
//! [`ragq_domain::ports::infrastructure::TokenVerifier`]) and an
//! `X-API-Key` header (looked up through
//! [`ragq_domain::ports::repositories::ApiKeyRepository`]).
//!
//! The JWT claims carry only a subject and token type (issuance is out of
//! scope for this service, per the domain port's own doc comment); the
//! subject is resolved against [`ApiKeyRepository::find_user`] to recover
//! admin status and active/inactive state, treating the JWT `sub` claim as
//! a user id.

use std::sync::Arc;

use chrono::Utc;
use rocket::http::Status;
use rocket::request::{self, FromRequest, Outcome, Request};
use rocket::State;

use ragq_domain::value_objects::TenantContext;

use ragq_infrastructure::AppContext;

/// The authenticated caller, resolved from either credential.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub is_admin: bool,
}

impl AuthenticatedUser {
    /// Build the tenant-isolation predicate for this caller.
    pub fn tenant(&self) -> TenantContext {
        TenantContext {
            owner_id: self.user_id.clone(),
            is_admin: self.is_admin,
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Outcome::Success(context) = req.guard::<&State<Arc<AppContext>>>().await else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        if let Some(header) = req.headers().get_one("Authorization") {
            if let Some(token) = header.strip_prefix("Bearer ") {
                return match authenticate_bearer(context, token).await {
                    Ok(user) => Outcome::Success(user),
                    Err(status) => Outcome::Error((status, ())),
                };
            }
        }

        let key_header = context.config.auth.api_key_header.as_str();
        if let Some(key) = req.headers().get_one(key_header) {
            return match authenticate_api_key(context, key).await {
                Ok(user) => Outcome::Success(user),
                Err(status) => Outcome::Error((status, ())),
            };
        }

        Outcome::Error((Status::Unauthorized, ()))
    }
}

async fn authenticate_bearer(context: &AppContext, token: &str) -> Result<AuthenticatedUser, Status> {
    let claims = context
        .token_verifier
        .verify(token)
        .await
        .map_err(|_| Status::Unauthorized)?;

    if claims.token_type != "access" {
        return Err(Status::Unauthorized);
    }

    let user = context
        .api_key_repository
        .find_user(&claims.subject)
        .await
        .map_err(|_| Status::InternalServerError)?
        .ok_or(Status::Unauthorized)?;

    if !user.is_active {
        return Err(Status::Forbidden);
    }

    Ok(AuthenticatedUser {
        user_id: user.id,
        username: user.username,
        is_admin: user.is_admin,
    })
}

async fn authenticate_api_key(context: &AppContext, key: &str) -> Result<AuthenticatedUser, Status> {
    if context.login_rate_limiter.is_locked(key) {
        return Err(Status::TooManyRequests);
    }

    let found = context
        .api_key_repository
        .find_key(key)
        .await
        .map_err(|_| Status::InternalServerError)?;

    let Some(api_key) = found else {
        context.login_rate_limiter.record_failure(key);
        return Err(Status::Unauthorized);
    };

    if !api_key.is_usable(Utc::now()) {
        context.login_rate_limiter.record_failure(key);
        return Err(Status::Unauthorized);
    }

    let owner = match &api_key.owner_user_id {
        Some(user_id) => context
            .api_key_repository
            .find_user(user_id)
            .await
            .map_err(|_| Status::InternalServerError)?,
        None if context.config.auth.allow_legacy_admin_fallback => context
            .api_key_repository
            .find_first_administrator()
            .await
            .map_err(|_| Status::InternalServerError)?,
        None => None,
    };

    let Some(owner) = owner else {
        return Err(Status::Forbidden);
    };

    if !owner.is_active {
        return Err(Status::Forbidden);
    }

    context.login_rate_limiter.record_success(key);
    let _ = context.api_key_repository.record_key_usage(key).await;

    Ok(AuthenticatedUser {
        user_id: owner.id,
        username: owner.username,
        is_admin: owner.is_admin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_carries_user_id_and_admin_flag() {
        let user = AuthenticatedUser {
            user_id: "u-7".to_string(),
            username: "bob".to_string(),
            is_admin: true,
        };
        let tenant = user.tenant();
        assert_eq!(tenant.owner_id, "u-7");
        assert!(tenant.is_admin);
    }

    #[test]
    fn tenant_defaults_non_admin() {
        let user = AuthenticatedUser {
            user_id: "u-8".to_string(),
            username: "carol".to_string(),
            is_admin: false,
        };
        assert!(!user.tenant().is_admin);
    }
}
