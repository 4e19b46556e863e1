use base64::Engine;
use serde_json::{Map, Value};

/// Why a bearer token could not be used
///
/// Never handed to callers of [`CredentialStore`](super::CredentialStore);
/// every variant collapses into "no credential" there.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TokenError {
    #[error("token has no claims segment")]
    MissingClaims,
    #[error("claims segment is not valid base64: {0}")]
    Base64(String),
    #[error("claims are not a JSON object: {0}")]
    Json(String),
    #[error("expiry claim is missing or not numeric")]
    InvalidExpiry,
}

/// The decoded payload of a signed bearer token
///
/// Only the claims segment is decoded. The signature is the backend's
/// business; the client just needs to know when the token stops working.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    expires_at: f64,
    claims: Map<String, Value>,
}

impl TokenClaims {
    /// Decode the middle segment of a `header.claims.signature` token
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let segment = token
            .split('.')
            .nth(1)
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::MissingClaims)?;

        // tolerate padded and standard-alphabet encodings
        let normalized: String = segment
            .trim_end_matches('=')
            .chars()
            .map(|c| match c {
                '+' => '-',
                '/' => '_',
                c => c,
            })
            .collect();

        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(normalized.as_bytes())
            .map_err(|e| TokenError::Base64(e.to_string()))?;

        let claims: Map<String, Value> =
            serde_json::from_slice(&bytes).map_err(|e| TokenError::Json(e.to_string()))?;

        let expires_at = claims
            .get("exp")
            .and_then(numeric_claim)
            .filter(|exp| exp.is_finite())
            .ok_or(TokenError::InvalidExpiry)?;

        Ok(Self { expires_at, claims })
    }

    /// Absolute expiry in epoch seconds, rounded up
    pub fn expires_at(&self) -> i64 {
        self.expires_at.ceil() as i64
    }

    /// Seconds of life left at `now`, zero once expired
    pub fn remaining(&self, now: i64) -> u64 {
        let left = self.expires_at - now as f64;
        if left > 0.0 {
            left.ceil() as u64
        } else {
            0
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now as f64
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.claims.get(claim)
    }
}

// `exp` is a JSON number per RFC 7519, but some issuers send it as a string
fn numeric_claim(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
