//! JWT access-token generation and validation.
//!
//! Accounts and login live in the university identity service; this API
//! only verifies the HS256 tokens it issues. [`generate_access_token`] is
//! used by provisioning scripts and tests.

use clearance_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims carried by every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// Role name (`"admin"`, `"approver"`, `"student"`, `"teacher"`).
    pub role: String,
    /// Office the user approves for. Only set for approvers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office_id: Option<DbId>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier for audit.
    pub jti: String,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 60).
    pub access_token_expiry_mins: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `JWT_SECRET`             | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS` | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Generate an HS256 access token for the given user.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    office_id: Option<DbId>,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        office_id,
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Checks the signature and expiration.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signing(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 15,
        }
    }

    fn encode_claims(claims: &Claims, config: &JwtConfig) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_approver_token_carries_office() {
        let config = signing("clearance-test-secret");
        let token = generate_access_token(42, "approver", Some(7), &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!((claims.sub, claims.role.as_str()), (42, "approver"));
        assert_eq!(claims.office_id, Some(7));
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn test_requester_token_omits_office_claim() {
        let config = signing("clearance-test-secret");
        let token = generate_access_token(9, "student", None, &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.office_id, None);
        let encoded = serde_json::to_value(&claims).unwrap();
        assert!(encoded.get("office_id").is_none());
    }

    #[test]
    fn test_tokens_get_distinct_ids() {
        let config = signing("clearance-test-secret");
        let a = validate_token(&generate_access_token(1, "admin", None, &config).unwrap(), &config)
            .unwrap();
        let b = validate_token(&generate_access_token(1, "admin", None, &config).unwrap(), &config)
            .unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = signing("clearance-test-secret");
        let now = chrono::Utc::now().timestamp();
        // Past the decoder's 60 second leeway.
        let token = encode_claims(
            &Claims {
                sub: 3,
                role: "approver".to_string(),
                office_id: Some(2),
                exp: now - 600,
                iat: now - 1200,
                jti: Uuid::new_v4().to_string(),
            },
            &config,
        );

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let token = generate_access_token(1, "admin", None, &signing("issuer-a")).unwrap();
        assert!(validate_token(&token, &signing("issuer-b")).is_err());
    }
}
