// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token issuance and verification.
//!
//! Tokens are stateless HS512-signed JWTs; validity is a pure function of
//! the signature and the clock, nothing is persisted. Two verification
//! paths exist: [`TokenCodec::verify`] with strict expiry for the request
//! pipeline, and [`TokenCodec::verify_with_grace`] which tolerates a
//! bounded post-expiry window for the refresh endpoint only.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtSettings;
use crate::models::ApiClient;

/// Token validation and signing failures.
///
/// External callers must not learn *why* a token failed strict
/// verification; `Invalid` deliberately collapses signature, issuer, and
/// expiry mismatches. The wrapped source error is for internal logs only.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is invalid")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token is too expired to refresh")]
    TooExpired,

    #[error("failed to sign token")]
    Creation(#[source] jsonwebtoken::errors::Error),
}

/// Claims carried by every gateway token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the client's username.
    pub sub: String,
    /// Issuer, fixed per process.
    pub iss: String,
    /// Application label of the client at issuance time.
    pub app: String,
    /// Issued-at (Unix seconds).
    pub iat: i64,
    /// Expires-at (Unix seconds).
    pub exp: i64,
}

/// Signs, verifies, and decodes bearer tokens.
///
/// Constructed once at startup from [`JwtSettings`] and shared by
/// reference; the issuer string lives in exactly one place so issuance
/// and verification can never drift apart.
pub struct TokenCodec {
    issuer: String,
    access_token_lifetime: i64,
    refresh_grace_period: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            issuer: settings.issuer.clone(),
            access_token_lifetime: settings.access_token_lifetime,
            refresh_grace_period: settings.refresh_grace_period,
            encoding_key: EncodingKey::from_secret(settings.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret_key.as_bytes()),
        }
    }

    /// Issue a token for `client` with a full access-token lifetime.
    pub fn issue(&self, client: &ApiClient) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: client.username.clone(),
            iss: self.issuer.clone(),
            app: client.application_name.clone(),
            iat: now,
            exp: now + self.access_token_lifetime,
        };

        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(TokenError::Creation)
    }

    /// Verify signature, issuer, and strict expiry (no tolerance).
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation(0))
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }

    /// Verify signature and issuer, accepting expiry up to the configured
    /// grace period in the past. Refresh flow only.
    pub fn verify_with_grace(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let leeway = self.refresh_grace_period.max(0) as u64;
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation(leeway))
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::TooExpired,
                _ => TokenError::Invalid(e),
            })
    }

    /// Decode claims without verifying the signature.
    ///
    /// Only for best-effort diagnostics on tokens that already failed
    /// verification. Never an input to an authorization decision.
    pub fn decode_unsafe(&self, token: &str) -> Option<TokenClaims> {
        jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)
            .map(|data| data.claims)
            .ok()
    }

    /// Best-effort subject for log lines about invalid tokens.
    pub fn safe_subject(&self, token: &str) -> String {
        self.decode_unsafe(token)
            .map(|claims| claims.sub)
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn validation(&self, leeway: u64) -> Validation {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = leeway;
        validation.validate_aud = false;
        validation
    }
}
