// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup into an
//! immutable [`GatewayConfig`]. The JWT settings are validated here so a
//! misconfigured gateway refuses to boot instead of denying every request
//! at runtime.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET_KEY` | HMAC signing secret for bearer tokens | Required, non-blank |
//! | `JWT_ISSUER` | Issuer claim stamped into and required from every token | `EsbGateway` |
//! | `JWT_ACCESS_TOKEN_LIFETIME` | Token lifetime in seconds (minimum 300) | `3600` |
//! | `JWT_REFRESH_GRACE_PERIOD` | Seconds past expiry a token may still be refreshed | `300` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

use thiserror::Error;

/// Environment variable name for the token signing secret.
pub const JWT_SECRET_KEY_ENV: &str = "JWT_SECRET_KEY";

/// Environment variable name for the token issuer claim.
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";

/// Environment variable name for the access token lifetime (seconds).
pub const JWT_ACCESS_TOKEN_LIFETIME_ENV: &str = "JWT_ACCESS_TOKEN_LIFETIME";

/// Environment variable name for the refresh grace period (seconds).
pub const JWT_REFRESH_GRACE_PERIOD_ENV: &str = "JWT_REFRESH_GRACE_PERIOD";

/// Default issuer claim when `JWT_ISSUER` is not set.
pub const DEFAULT_ISSUER: &str = "EsbGateway";

/// Default access token lifetime (1 hour).
pub const DEFAULT_ACCESS_TOKEN_LIFETIME: i64 = 3_600;

/// Shortest permitted access token lifetime (5 minutes).
pub const MIN_ACCESS_TOKEN_LIFETIME: i64 = 300;

/// Default refresh grace period (5 minutes).
pub const DEFAULT_REFRESH_GRACE_PERIOD: i64 = 300;

/// Configuration errors raised during startup validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{JWT_SECRET_KEY_ENV} must be set and non-blank")]
    MissingSecretKey,

    #[error("{JWT_ACCESS_TOKEN_LIFETIME_ENV} must be at least {MIN_ACCESS_TOKEN_LIFETIME} seconds, got {0}")]
    LifetimeTooShort(i64),

    #[error("{0:?} is not a valid number for {1}")]
    InvalidNumber(String, &'static str),
}

/// Token signing and validation settings.
///
/// The issuer is intentionally stored once and consumed by both the
/// issuing and the verifying path of [`crate::auth::TokenCodec`]; an
/// issuer that differs between the two silently rejects every token.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    /// Symmetric HMAC signing secret.
    pub secret_key: String,
    /// Issuer claim stamped into and required from every token.
    pub issuer: String,
    /// Access token lifetime in seconds.
    pub access_token_lifetime: i64,
    /// How long after expiry a token can still be refreshed, in seconds.
    pub refresh_grace_period: i64,
}

impl JwtSettings {
    /// Build settings, enforcing the invariants the gateway depends on.
    pub fn new(
        secret_key: impl Into<String>,
        issuer: impl Into<String>,
        access_token_lifetime: i64,
        refresh_grace_period: i64,
    ) -> Result<Self, ConfigError> {
        let secret_key = secret_key.into();
        if secret_key.trim().is_empty() {
            return Err(ConfigError::MissingSecretKey);
        }
        if access_token_lifetime < MIN_ACCESS_TOKEN_LIFETIME {
            return Err(ConfigError::LifetimeTooShort(access_token_lifetime));
        }

        Ok(Self {
            secret_key,
            issuer: issuer.into(),
            access_token_lifetime,
            refresh_grace_period,
        })
    }
}

/// Top-level gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Server bind address.
    pub host: String,
    /// Server bind port.
    pub port: u16,
    /// Token settings shared by issuance, validation, and refresh.
    pub jwt: JwtSettings,
}

impl GatewayConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_env("PORT", 8080u16)?;

        let secret_key = env::var(JWT_SECRET_KEY_ENV).unwrap_or_default();
        let issuer = env::var(JWT_ISSUER_ENV).unwrap_or_else(|_| DEFAULT_ISSUER.to_string());
        let access_token_lifetime =
            parse_env(JWT_ACCESS_TOKEN_LIFETIME_ENV, DEFAULT_ACCESS_TOKEN_LIFETIME)?;
        let refresh_grace_period =
            parse_env(JWT_REFRESH_GRACE_PERIOD_ENV, DEFAULT_REFRESH_GRACE_PERIOD)?;

        Ok(Self {
            host,
            port,
            jwt: JwtSettings::new(secret_key, issuer, access_token_lifetime, refresh_grace_period)?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(raw, name)),
        Err(_) => Ok(default),
    }
}
