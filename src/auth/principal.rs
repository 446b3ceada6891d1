// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped authenticated identity.

use std::collections::HashSet;

use crate::models::ApiClient;

/// The identity established by the identity gate for one request.
///
/// This is a snapshot of the client record plus its entitlement set,
/// loaded fresh at token verification time. It lives in the request's
/// extensions only — never in process-global state — so concurrent
/// requests cannot observe each other's identity.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    /// Store id of the client record.
    pub client_id: String,
    /// Token subject.
    pub username: String,
    /// Application label, used in security log entries.
    pub application_name: String,
    /// Whitelisted origin patterns as of this request; empty = unrestricted.
    pub whitelisted_ips: Vec<String>,
    /// Function ids this client may invoke, as of this request.
    pub entitlements: HashSet<String>,
}

impl AuthenticatedClient {
    /// Snapshot a loaded client record and its entitlement set.
    pub fn from_client(client: &ApiClient, entitlements: HashSet<String>) -> Self {
        Self {
            client_id: client.id.clone(),
            username: client.username.clone(),
            application_name: client.application_name.clone(),
            whitelisted_ips: client.whitelisted_ips.clone(),
            entitlements,
        }
    }

    /// Whether this client may invoke the function with the given id.
    pub fn may_invoke(&self, function_id: &str) -> bool {
        self.entitlements.contains(function_id)
    }
}
