// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain and API Data Models
//!
//! This module defines the gateway's domain records and the request and
//! response structures used by the REST surface. All API types derive
//! `Serialize`, `Deserialize`, and `ToSchema` for automatic JSON handling
//! and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Clients**: API-calling principals with credentials, status, and an
//!   optional IP whitelist
//! - **Functions**: backend-callable function endpoints, the unit of
//!   entitlement
//! - **Auth**: login/refresh request and response envelopes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Client (principal) records
// =============================================================================

/// Lifecycle status of an API client.
///
/// Only `Active` clients authenticate; `Locked` and `Suspended` block
/// authentication outright, `Inactive` is the soft-deleted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Inactive,
    Suspended,
    Locked,
}

/// An API-calling principal.
///
/// The username is globally unique and immutable after creation. The
/// password hash never leaves the store layer; responses use
/// [`ApiClientResponse`] which omits it entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClient {
    /// Unique identifier for this client.
    pub id: String,
    /// Globally unique login name.
    pub username: String,
    /// One-way credential hash (argon2 encoded form).
    pub password_hash: String,
    /// Label of the calling application, embedded in issued tokens.
    pub application_name: String,
    /// Lifecycle status.
    pub status: ClientStatus,
    /// Whitelisted origin patterns; empty means unrestricted.
    pub whitelisted_ips: Vec<String>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl ApiClient {
    /// Whether the client may authenticate and pass the gates.
    pub fn is_enabled(&self) -> bool {
        self.status == ClientStatus::Active
    }

    /// Whether the client is blocked outright (locked or suspended).
    pub fn is_locked(&self) -> bool {
        matches!(self.status, ClientStatus::Locked | ClientStatus::Suspended)
    }
}

/// Normalize a whitelist as supplied by an admin request: trim entries and
/// drop empties. `None` and an all-blank list both mean "unrestricted".
pub fn normalize_ip_list(raw: Option<Vec<String>>) -> Vec<String> {
    raw.unwrap_or_default()
        .into_iter()
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .collect()
}

// =============================================================================
// Function endpoint records
// =============================================================================

/// One backend-callable function, the unit of entitlement.
///
/// Authorization resolves the requested function by name and only active
/// functions resolve at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFunction {
    /// Unique identifier, referenced by entitlement records.
    pub id: String,
    /// Unique function name, used as the authorization key.
    pub function_name: String,
    /// Inactive functions are invisible to authorization.
    pub active: bool,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

// =============================================================================
// Authentication envelopes
// =============================================================================

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Response envelope for the authenticate and refresh endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Issued bearer token, present on success only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub response_code: String,
    pub response_message: String,
}

impl AuthResponse {
    pub const SUCCESS: &'static str = "00";
    pub const FAILED: &'static str = "01";

    pub fn success(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            response_code: Self::SUCCESS.to_string(),
            response_message: "Authenticated successfully".to_string(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            token: None,
            response_code: Self::FAILED.to_string(),
            response_message: message.into(),
        }
    }
}

/// Generic envelope for administrative operations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SimpleApiResponse {
    pub response_code: String,
    pub response_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
}

impl SimpleApiResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            response_code: AuthResponse::SUCCESS.to_string(),
            response_message: message.into(),
            data: None,
        }
    }

    pub fn success_with_data(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            ..Self::success(message)
        }
    }
}

// =============================================================================
// Administrative request/response models
// =============================================================================

/// Request to create (or update) an API client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateApiClientRequest {
    pub username: String,
    /// Plain-text password, hashed before storage. On update, an empty or
    /// absent password leaves the stored credential untouched.
    #[serde(default)]
    pub password: Option<String>,
    pub application_name: String,
    /// Optional whitelist; empty means allow all origins.
    #[serde(default)]
    pub whitelisted_ips: Option<Vec<String>>,
    /// Optional function ids to grant on creation.
    #[serde(default)]
    pub function_ids: Option<Vec<String>>,
}

/// Client representation returned to administrators.
///
/// The credential hash is never included here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiClientResponse {
    pub id: String,
    pub username: String,
    pub application_name: String,
    pub status: ClientStatus,
    pub whitelisted_ips: Vec<String>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl From<&ApiClient> for ApiClientResponse {
    fn from(client: &ApiClient) -> Self {
        Self {
            id: client.id.clone(),
            username: client.username.clone(),
            application_name: client.application_name.clone(),
            status: client.status,
            whitelisted_ips: client.whitelisted_ips.clone(),
            date_created: client.date_created,
            date_updated: client.date_updated,
        }
    }
}

/// Request to grant or revoke function entitlements for a client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GrantPermissionsRequest {
    pub function_ids: Vec<String>,
}

/// Request to register a backend function endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateFunctionRequest {
    pub function_name: String,
    /// Defaults to active when omitted.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Function representation returned to administrators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FunctionResponse {
    pub id: String,
    pub function_name: String,
    pub active: bool,
    pub date_created: DateTime<Utc>,
}

impl From<&ApiFunction> for FunctionResponse {
    fn from(function: &ApiFunction) -> Self {
        Self {
            id: function.id.clone(),
            function_name: function.function_name.clone(),
            active: function.active,
            date_created: function.date_created,
        }
    }
}
