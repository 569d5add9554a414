//! Bearer tokens: compact HS256 JSON Web Tokens.
//!
//! A token is `base64url(header).base64url(claims).base64url(signature)`,
//! unpadded, where the signature is HMAC-SHA256 over the first two segments
//! keyed with `JWT_SECRET`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use food_app_core::{Role, UserId};

use crate::config::JwtConfig;

const ALGORITHM: &str = "HS256";

/// Clock skew tolerated when checking `exp`.
const LEEWAY_SECONDS: i64 = 60;

/// Errors from issuing or verifying a token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token issuer does not match")]
    WrongIssuer,
    #[error("token audience does not match")]
    WrongAudience,
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    /// Username.
    pub name: String,
    pub role: Role,
    /// Unique token id.
    pub jti: String,
    pub iss: String,
    pub aud: String,
    /// Issued at (seconds since the epoch).
    pub iat: i64,
    /// Expires at (seconds since the epoch).
    pub exp: i64,
}

impl Claims {
    /// The authenticated user's id.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if `sub` is not an integer.
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub.parse().map_err(|_| TokenError::Malformed)
    }
}

/// A freshly signed token and the instant it stops being accepted.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expiration: DateTime<Utc>,
}

/// Signs and verifies tokens with the configured key, issuer and audience.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: SecretString,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: Duration::minutes(config.ttl_minutes),
        }
    }

    /// Issue a token for a user, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if the claims cannot be serialized.
    pub fn issue(
        &self,
        user_id: UserId,
        username: &str,
        role: Role,
    ) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, username, role, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if the claims cannot be serialized.
    pub fn issue_at(
        &self,
        user_id: UserId,
        username: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expiration = now + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            name: username.to_owned(),
            role,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        let header = Header {
            alg: ALGORITHM.to_owned(),
            typ: "JWT".to_owned(),
        };

        let header = encode_segment(&header)?;
        let payload = encode_segment(&claims)?;
        let signing_input = format!("{header}.{payload}");
        let signature = URL_SAFE_NO_PAD.encode(self.mac(&signing_input)?.finalize().into_bytes());

        Ok(IssuedToken {
            token: format!("{signing_input}.{signature}"),
            expiration,
        })
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    ///
    /// Returns a `TokenError` describing the first check that failed.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// The signature is checked before any claim is trusted.
    ///
    /// # Errors
    ///
    /// Returns a `TokenError` describing the first check that failed.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header_segment), Some(payload_segment), Some(signature_segment), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_segment(header_segment)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_segment)
            .map_err(|_| TokenError::Malformed)?;
        self.mac(&format!("{header_segment}.{payload_segment}"))?
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_segment(payload_segment)?;
        if now.timestamp() > claims.exp + LEEWAY_SECONDS {
            return Err(TokenError::Expired);
        }
        if claims.iss != self.issuer {
            return Err(TokenError::WrongIssuer);
        }
        if claims.aud != self.audience {
            return Err(TokenError::WrongAudience);
        }

        Ok(claims)
    }

    fn mac(&self, signing_input: &str) -> Result<Hmac<Sha256>, TokenError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| TokenError::Encoding(e.to_string()))?;
        mac.update(signing_input.as_bytes());
        Ok(mac)
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|e| TokenError::Encoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&JwtConfig {
            secret: SecretString::from("k9$Lw2@pQ7!zR4#tV8&xB1*nM5^cF3%h"),
            issuer: "food-app".to_string(),
            audience: "food-app-clients".to_string(),
            ttl_minutes: 60,
        })
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = issuer();
        let issued = tokens.issue(UserId::new(12), "lan", Role::Admin).unwrap();

        let claims = tokens.verify(&issued.token).unwrap();
        assert_eq!(claims.user_id().unwrap(), UserId::new(12));
        assert_eq!(claims.name, "lan");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, "food-app");
        assert_eq!(claims.aud, "food-app-clients");
        assert_eq!(claims.exp, issued.expiration.timestamp());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let tokens = issuer();
        let a = tokens.issue(UserId::new(1), "a", Role::User).unwrap();
        let b = tokens.issue(UserId::new(1), "a", Role::User).unwrap();

        let a = tokens.verify(&a.token).unwrap();
        let b = tokens.verify(&b.token).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token_rejected_after_leeway() {
        let tokens = issuer();
        let now = Utc::now();
        let issued = tokens
            .issue_at(UserId::new(1), "a", Role::User, now)
            .unwrap();

        let within_leeway = now + Duration::minutes(60) + Duration::seconds(30);
        assert!(tokens.verify_at(&issued.token, within_leeway).is_ok());

        let past_leeway = now + Duration::minutes(62);
        assert_eq!(
            tokens.verify_at(&issued.token, past_leeway),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let tokens = issuer();
        let issued = tokens.issue(UserId::new(1), "a", Role::User).unwrap();

        let parts: Vec<&str> = issued.token.split('.').collect();
        let forged_claims = Claims {
            sub: "1".to_string(),
            name: "a".to_string(),
            role: Role::Admin,
            jti: "x".to_string(),
            iss: "food-app".to_string(),
            aud: "food-app-clients".to_string(),
            iat: 0,
            exp: i64::MAX / 2,
        };
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            encode_segment(&forged_claims).unwrap(),
            parts[2]
        );

        assert_eq!(tokens.verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let issued = issuer()
            .issue(UserId::new(1), "a", Role::User)
            .unwrap();

        let other = TokenIssuer::new(&JwtConfig {
            secret: SecretString::from("Zq8#mV3!rT6@wY1$uI4%oP7^aS2&dF9*"),
            issuer: "food-app".to_string(),
            audience: "food-app-clients".to_string(),
            ttl_minutes: 60,
        });

        assert_eq!(other.verify(&issued.token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let issued = issuer()
            .issue(UserId::new(1), "a", Role::User)
            .unwrap();

        let other = TokenIssuer::new(&JwtConfig {
            secret: SecretString::from("k9$Lw2@pQ7!zR4#tV8&xB1*nM5^cF3%h"),
            issuer: "food-app".to_string(),
            audience: "someone-else".to_string(),
            ttl_minutes: 60,
        });

        assert_eq!(other.verify(&issued.token), Err(TokenError::WrongAudience));
    }

    #[test]
    fn test_malformed_tokens() {
        let tokens = issuer();
        assert_eq!(tokens.verify(""), Err(TokenError::Malformed));
        assert_eq!(tokens.verify("a.b"), Err(TokenError::Malformed));
        assert_eq!(tokens.verify("a.b.c.d"), Err(TokenError::Malformed));
        assert_eq!(tokens.verify("!!.??.**"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_none_algorithm_rejected() {
        let tokens = issuer();
        let header = encode_segment(&Header {
            alg: "none".to_string(),
            typ: "JWT".to_string(),
        })
        .unwrap();
        let token = format!("{header}.e30.");

        assert_eq!(
            tokens.verify(&token),
            Err(TokenError::UnsupportedAlgorithm("none".to_string()))
        );
    }
}
