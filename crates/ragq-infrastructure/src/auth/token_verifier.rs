//! HS256 JWT verification. Issuance is out of scope — see
//! `ragq_domain::ports::infrastructure::auth`.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use ragq_domain::error::{Error, Result};
use ragq_domain::ports::infrastructure::{TokenClaims, TokenVerifier};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "type")]
    token_type: String,
    exp: i64,
}

/// Verifies `Authorization: Bearer <JWT>` tokens signed with a shared
/// HS256 secret.
pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    /// Build a verifier from the configured signing secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<TokenClaims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| Error::authentication(format!("invalid token: {e}")))?;

        Ok(TokenClaims {
            subject: data.claims.sub,
            token_type: data.claims.token_type,
            expires_at: data.claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp: i64, token_type: &str) -> String {
        let claims = Claims {
            sub: "alice".to_string(),
            token_type: token_type.to_string(),
            exp,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[tokio::test]
    async fn verifies_a_well_formed_token() {
        let secret = "a-secret-at-least-32-bytes-long!!";
        let exp = chrono::Utc::now().timestamp() + 3600;
        let jwt = token(secret, exp, "access");
        let verifier = JwtTokenVerifier::new(secret);

        let claims = verifier.verify(&jwt).await.unwrap();
        assert_eq!(claims.subject, "alice");
        assert_eq!(claims.token_type, "access");
    }

    #[tokio::test]
    async fn rejects_an_expired_token() {
        let secret = "a-secret-at-least-32-bytes-long!!";
        let jwt = token(secret, chrono::Utc::now().timestamp() - 60, "access");
        let verifier = JwtTokenVerifier::new(secret);

        assert!(verifier.verify(&jwt).await.is_err());
    }

    #[tokio::test]
    async fn rejects_a_token_signed_with_a_different_secret() {
        let jwt = token("wrong-secret-that-is-also-32-bytes!", chrono::Utc::now().timestamp() + 3600, "access");
        let verifier = JwtTokenVerifier::new("a-secret-at-least-32-bytes-long!!");

        assert!(verifier.verify(&jwt).await.is_err());
    }
}
