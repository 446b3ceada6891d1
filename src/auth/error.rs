// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors.
//!
//! Every variant maps to a terminal denial with a deliberately generic
//! user-facing message; the detailed cause goes to the security log at the
//! point of denial, never into the response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authorization failure surfaced to the caller.
#[derive(Debug)]
pub enum AuthError {
    /// No identity was established for a route that requires one.
    Unauthenticated,
    /// Login failed; covers unknown username and wrong password alike so
    /// the response cannot be used for username enumeration.
    InvalidCredentials,
    /// The client exists but its status blocks authentication.
    AccountDisabled,
    /// Refresh token failed grace validation or its subject vanished.
    RefreshRejected,
    /// The caller's network origin is not whitelisted.
    OriginDenied,
    /// The requested function is unknown, inactive, or not entitled.
    FunctionDenied,
    /// Signing or other unexpected internal failure.
    Internal,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AccountDisabled => "account_disabled",
            AuthError::RefreshRejected => "refresh_rejected",
            AuthError::OriginDenied => "origin_denied",
            AuthError::FunctionDenied => "function_denied",
            AuthError::Internal => "internal_error",
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated
            | AuthError::InvalidCredentials
            | AuthError::AccountDisabled
            | AuthError::RefreshRejected => StatusCode::UNAUTHORIZED,
            AuthError::OriginDenied | AuthError::FunctionDenied => StatusCode::FORBIDDEN,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Unauthenticated => write!(f, "Authentication required"),
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::AccountDisabled => {
                write!(f, "Your API credentials have been deactivated")
            }
            AuthError::RefreshRejected => {
                write!(f, "Token is invalid or too expired to refresh")
            }
            AuthError::OriginDenied => {
                write!(f, "Access denied: IP address not whitelisted")
            }
            AuthError::FunctionDenied => write!(f, "Unauthorized access to the API"),
            AuthError::Internal => {
                write!(f, "An unexpected error occurred. Please try again later")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
