//! Bearer tokens issued by the identity provider.
//!
//! This service never logs anyone in. It trusts HS256 tokens signed with a
//! secret shared with the identity provider and reads two facts from them:
//! the user id (`sub`) and the [`Role`]. [`mint_token`] signs a token the
//! same way, for operator scripts and the integration tests.

use classroll_core::roles::Role;
use classroll_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of an identity-provider token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id at the identity provider; student profiles point at it.
    pub sub: DbId,
    /// `"admin"` or `"student"`.
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub jti: String,
}

/// Token verification settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 secret shared with the identity provider.
    pub secret: String,
    /// Required `iss` claim, when the provider sets one.
    pub issuer: Option<String>,
    /// Lifetime of tokens signed by [`mint_token`].
    pub minted_ttl_mins: i64,
}

impl JwtConfig {
    /// Load token settings from the environment.
    ///
    /// | Env Var              | Required | Default |
    /// |----------------------|----------|---------|
    /// | `JWT_SECRET`         | **yes**  | --      |
    /// | `JWT_ISSUER`         | no       | unset   |
    /// | `JWT_MINTED_TTL_MINS`| no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let issuer = std::env::var("JWT_ISSUER").ok().filter(|s| !s.is_empty());

        let minted_ttl_mins: i64 = std::env::var("JWT_MINTED_TTL_MINS")
            .map(|v| v.parse().expect("JWT_MINTED_TTL_MINS must be a valid i64"))
            .unwrap_or(60);

        Self {
            secret,
            issuer,
            minted_ttl_mins,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

/// The verified identity carried by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: DbId,
    pub role: Role,
}

/// Why a bearer token was not accepted.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid or expired token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

/// Verify a token's signature, expiry and issuer, and extract the caller.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Identity, TokenError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )?
    .claims;

    let role = Role::parse(&claims.role).ok_or(TokenError::UnknownRole(claims.role))?;
    Ok(Identity {
        user_id: claims.sub,
        role,
    })
}

/// Sign a token for `user_id` acting as `role`.
pub fn mint_token(
    user_id: DbId,
    role: Role,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.as_str().to_string(),
        exp: now + config.minted_ttl_mins * 60,
        iat: now,
        iss: config.issuer.clone(),
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn config(issuer: Option<&str>) -> JwtConfig {
        JwtConfig {
            secret: "attendance-test-secret".to_string(),
            issuer: issuer.map(str::to_string),
            minted_ttl_mins: 30,
        }
    }

    fn sign(claims: &Claims, config: &JwtConfig) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(role: &str, exp_offset: i64) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: 7,
            role: role.to_string(),
            exp: now + exp_offset,
            iat: now,
            iss: None,
            jti: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn minted_token_verifies_to_identity() {
        let config = config(Some("idp"));
        let token = mint_token(42, Role::Student, &config).unwrap();
        assert_eq!(
            verify_token(&token, &config).unwrap(),
            Identity {
                user_id: 42,
                role: Role::Student
            }
        );
    }

    #[test]
    fn expired_token_is_invalid() {
        let config = config(None);
        // Past the default 60-second leeway.
        let token = sign(&claims("admin", -300), &config);
        assert_matches!(verify_token(&token, &config), Err(TokenError::Invalid(_)));
    }

    #[test]
    fn unknown_role_is_refused() {
        let config = config(None);
        let token = sign(&claims("guest", 600), &config);
        assert_matches!(
            verify_token(&token, &config),
            Err(TokenError::UnknownRole(role)) if role == "guest"
        );
    }

    #[test]
    fn issuer_is_enforced_when_configured() {
        let strict = config(Some("idp"));
        let foreign = Claims {
            iss: Some("elsewhere".to_string()),
            ..claims("admin", 600)
        };
        let token = sign(&foreign, &strict);
        assert_matches!(verify_token(&token, &strict), Err(TokenError::Invalid(_)));
        assert!(verify_token(&token, &config(None)).is_ok());
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let token = mint_token(1, Role::Admin, &config(None)).unwrap();
        let other = JwtConfig {
            secret: "some-other-secret".to_string(),
            ..config(None)
        };
        assert_matches!(verify_token(&token, &other), Err(TokenError::Invalid(_)));
    }
}
