//! Identity token verification.
//!
//! Tokens are compact `header.payload.signature` strings, base64url without
//! padding, signed with HMAC-SHA256. The payload carries the subject (`sub`)
//! and an expiry (`exp`, unix seconds).

use crate::identity::Principal;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
#[cfg(test)]
use mockall::automock;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";
const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("token signature does not match")]
    BadSignature,
    #[error("unsupported token header: alg {alg}, typ {typ:?}")]
    UnsupportedHeader { alg: String, typ: Option<String> },
    #[error("token expired at {0}")]
    Expired(DateTime<Utc>),
    #[error("signing key rejected: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

#[derive(Debug, serde::Deserialize)]
struct Header {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

impl Header {
    fn decode(segment: &str) -> Result<Self, TokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        let header: Header =
            serde_json::from_slice(&bytes).map_err(|e| TokenError::Malformed(e.to_string()))?;
        let typ_ok = header.typ.as_deref().is_none_or(|typ| typ.eq_ignore_ascii_case(TOKEN_TYPE));
        if header.alg != ALGORITHM || !typ_ok {
            return Err(TokenError::UnsupportedHeader {
                alg: header.alg,
                typ: header.typ,
            });
        }
        Ok(header)
    }
}

/// Verifies identity tokens and derives the principal they were issued to.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Principal, TokenError>;
}

pub struct HmacTokenVerifier {
    secret: SecretString,
}

impl HmacTokenVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| TokenError::InvalidKey(e.to_string()))
    }

    /// Issues a token for `uid` valid for `ttl` from `now`.
    pub fn issue_at(&self, uid: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: uid.to_string(),
            exp: (now + ttl).timestamp(),
        };
        let payload =
            serde_json::to_vec(&claims).map_err(|e| TokenError::Malformed(e.to_string()))?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{signing_input}.{signature}"))
    }

    pub fn issue(&self, uid: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(uid, ttl, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed("expected three segments".to_string()));
        };
        Header::decode(header)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|e| TokenError::Malformed(e.to_string()))?;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::Malformed(format!("invalid exp {}", claims.exp)))?;
        if expires_at <= now {
            return Err(TokenError::Expired(expires_at));
        }
        if claims.sub.is_empty() {
            return Err(TokenError::Malformed("empty subject".to_string()));
        }
        Ok(Principal::new(claims.sub))
    }
}

#[async_trait]
impl TokenVerifier for HmacTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        self.verify_at(token, Utc::now())
    }
}
