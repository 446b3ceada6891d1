// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mapping from a client identity to the functions it may invoke.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::error::ApiError;
use crate::store::InMemoryStore;

/// Read/write view over the entitlement relation.
///
/// The identity gate loads a client's entitlement set through this index
/// once per request; grants and revokes performed here become visible to
/// the next request's load.
#[derive(Clone)]
pub struct PermissionIndex {
    store: Arc<RwLock<InMemoryStore>>,
}

impl PermissionIndex {
    pub fn new(store: Arc<RwLock<InMemoryStore>>) -> Self {
        Self { store }
    }

    /// Function ids the client may invoke.
    pub async fn entitlements_for(&self, client_id: &str) -> HashSet<String> {
        self.store.read().await.entitlements_for(client_id)
    }

    /// Grant entitlements; existing pairs are skipped. Returns the number
    /// of newly created records.
    pub async fn grant(&self, client_id: &str, function_ids: &[String]) -> Result<usize, ApiError> {
        let created = self
            .store
            .write()
            .await
            .grant_entitlements(client_id, function_ids)?;
        if created > 0 {
            info!(client_id, created, "granted entitlements");
        } else {
            info!(client_id, "no new entitlements to grant (all already exist)");
        }
        Ok(created)
    }

    /// Revoke entitlements; missing pairs are silent no-ops. Returns the
    /// number of records removed.
    pub async fn revoke(&self, client_id: &str, function_ids: &[String]) -> usize {
        let removed = self
            .store
            .write()
            .await
            .revoke_entitlements(client_id, function_ids);
        if removed > 0 {
            info!(client_id, removed, "revoked entitlements");
        }
        removed
    }

    /// Convenience check used by tooling, outside the gate pipeline:
    /// resolve the function by name and test membership.
    pub async fn has_access(&self, client_id: &str, function_name: &str) -> bool {
        let store = self.store.read().await;
        match store.active_function_by_name(function_name) {
            Some(function) => store.has_entitlement(client_id, &function.id),
            None => false,
        }
    }
}
