// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory backing store for clients, functions, and entitlements.
//!
//! This is the gateway's principal loader, credential verifier, function
//! endpoint store, and entitlement store in one place. The authorization
//! pipeline only ever *reads* from it; mutations come from the admin
//! surface. A grant or revoke becomes visible to the next request's
//! identity load, not to requests already past the identity gate.

use std::collections::{HashMap, HashSet};

use axum::http::StatusCode;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::password;
use crate::error::ApiError;
use crate::models::{
    normalize_ip_list, ApiClient, ApiFunction, ClientStatus, CreateApiClientRequest,
    CreateFunctionRequest,
};

/// Credential verification failures.
///
/// `UnknownClient` and `BadCredential` must end up indistinguishable to
/// the caller; the distinction exists for internal logging only.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("unknown client")]
    UnknownClient,

    #[error("bad credential")]
    BadCredential,

    #[error("client is disabled")]
    Disabled,
}

#[derive(Default)]
pub struct InMemoryStore {
    clients: HashMap<String, ApiClient>,
    functions: HashMap<String, ApiFunction>,
    /// One record per (client id, function id) pair.
    entitlements: HashSet<(String, String)>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------
    // Principal loader
    // -------------------------------------------------------------------

    pub fn client_by_username(&self, username: &str) -> Option<&ApiClient> {
        self.clients
            .values()
            .find(|client| client.username == username)
    }

    pub fn client_by_id(&self, id: &str) -> Option<&ApiClient> {
        self.clients.get(id)
    }

    pub fn clients_by_status(&self, status: ClientStatus) -> Vec<ApiClient> {
        self.clients
            .values()
            .filter(|client| client.status == status)
            .cloned()
            .collect()
    }

    // -------------------------------------------------------------------
    // Credential verifier
    // -------------------------------------------------------------------

    /// Verify a username/password pair against the stored credential.
    ///
    /// Lock and enablement are checked before the password, mirroring the
    /// pre-authentication checks of the provider this replaces: probing a
    /// disabled account reports `Disabled` regardless of the password.
    pub fn verify_credentials(
        &self,
        username: &str,
        password_plain: &str,
    ) -> Result<ApiClient, CredentialError> {
        let client = self
            .client_by_username(username)
            .ok_or(CredentialError::UnknownClient)?;

        if client.is_locked() || !client.is_enabled() {
            return Err(CredentialError::Disabled);
        }

        if !password::verify_password(password_plain, &client.password_hash) {
            return Err(CredentialError::BadCredential);
        }

        Ok(client.clone())
    }

    // -------------------------------------------------------------------
    // Client administration
    // -------------------------------------------------------------------

    pub fn create_client(&mut self, request: CreateApiClientRequest) -> Result<ApiClient, ApiError> {
        if self.client_by_username(&request.username).is_some() {
            return Err(ApiError::conflict(format!(
                "Username already exists: {}",
                request.username
            )));
        }

        let password_plain = request
            .password
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("Password is required"))?;
        let password_hash = password::hash_password(password_plain).map_err(|_| {
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password")
        })?;

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let client = ApiClient {
            id: id.clone(),
            username: request.username,
            password_hash,
            application_name: request.application_name,
            status: ClientStatus::Active,
            whitelisted_ips: normalize_ip_list(request.whitelisted_ips),
            date_created: now,
            date_updated: now,
        };
        self.clients.insert(id.clone(), client.clone());

        if let Some(function_ids) = request.function_ids {
            self.grant_entitlements(&id, &function_ids)?;
        }

        Ok(client)
    }

    /// Update application name, whitelist, and (when provided) password.
    /// Username and status are not updatable through this path.
    pub fn update_client(
        &mut self,
        id: &str,
        request: CreateApiClientRequest,
    ) -> Result<ApiClient, ApiError> {
        let new_password_hash = match request.password.as_deref() {
            Some(p) if !p.trim().is_empty() => Some(password::hash_password(p).map_err(|_| {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password")
            })?),
            _ => None,
        };

        let Some(client) = self.clients.get_mut(id) else {
            return Err(ApiError::not_found(format!("Client not found with ID: {id}")));
        };

        client.application_name = request.application_name;
        client.whitelisted_ips = normalize_ip_list(request.whitelisted_ips);
        if let Some(hash) = new_password_hash {
            client.password_hash = hash;
        }
        client.date_updated = Utc::now();

        Ok(client.clone())
    }

    /// Soft delete: the record is kept but the client stops authenticating.
    pub fn deactivate_client(&mut self, id: &str) -> Result<(), ApiError> {
        let Some(client) = self.clients.get_mut(id) else {
            return Err(ApiError::not_found(format!("Client not found with ID: {id}")));
        };
        client.status = ClientStatus::Inactive;
        client.date_updated = Utc::now();
        Ok(())
    }

    /// Seed helper for startup and tests: insert a prebuilt record.
    pub fn insert_client(&mut self, client: ApiClient) -> ApiClient {
        self.clients.insert(client.id.clone(), client.clone());
        client
    }

    // -------------------------------------------------------------------
    // Function endpoint store
    // -------------------------------------------------------------------

    pub fn create_function(
        &mut self,
        request: CreateFunctionRequest,
    ) -> Result<ApiFunction, ApiError> {
        if self
            .functions
            .values()
            .any(|f| f.function_name == request.function_name)
        {
            return Err(ApiError::conflict(format!(
                "Function already exists: {}",
                request.function_name
            )));
        }

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let function = ApiFunction {
            id: id.clone(),
            function_name: request.function_name,
            active: request.active,
            date_created: now,
            date_updated: now,
        };
        self.functions.insert(id, function.clone());
        Ok(function)
    }

    pub fn list_functions(&self) -> Vec<ApiFunction> {
        self.functions.values().cloned().collect()
    }

    /// Resolve a function by name, active records only. Inactive and
    /// unknown functions are both `None` so the caller cannot tell them
    /// apart.
    pub fn active_function_by_name(&self, function_name: &str) -> Option<&ApiFunction> {
        self.functions
            .values()
            .find(|f| f.active && f.function_name == function_name)
    }

    // -------------------------------------------------------------------
    // Entitlement store
    // -------------------------------------------------------------------

    /// Grant entitlements, skipping pairs that already exist and function
    /// ids that do not resolve. Returns the number of newly created
    /// records.
    pub fn grant_entitlements(
        &mut self,
        client_id: &str,
        function_ids: &[String],
    ) -> Result<usize, ApiError> {
        if !self.clients.contains_key(client_id) {
            return Err(ApiError::not_found(format!(
                "Client not found with ID: {client_id}"
            )));
        }

        let mut created = 0;
        for function_id in function_ids {
            if !self.functions.contains_key(function_id) {
                continue;
            }
            if self
                .entitlements
                .insert((client_id.to_string(), function_id.clone()))
            {
                created += 1;
            }
        }
        Ok(created)
    }

    /// Revoke entitlements; missing pairs are silent no-ops. Returns the
    /// number of records removed.
    pub fn revoke_entitlements(&mut self, client_id: &str, function_ids: &[String]) -> usize {
        let mut removed = 0;
        for function_id in function_ids {
            if self
                .entitlements
                .remove(&(client_id.to_string(), function_id.clone()))
            {
                removed += 1;
            }
        }
        removed
    }

    pub fn entitlements_for(&self, client_id: &str) -> HashSet<String> {
        self.entitlements
            .iter()
            .filter(|(cid, _)| cid == client_id)
            .map(|(_, fid)| fid.clone())
            .collect()
    }

    pub fn has_entitlement(&self, client_id: &str, function_id: &str) -> bool {
        self.entitlements
            .contains(&(client_id.to_string(), function_id.to_string()))
    }
}
