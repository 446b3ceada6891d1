// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::TokenCodec;
use crate::permissions::PermissionIndex;
use crate::store::InMemoryStore;

/// Shared application state.
///
/// The token codec is immutable after startup; the store is the only
/// mutable piece and sits behind an async `RwLock` because the request
/// pipeline vastly outnumbers admin mutations.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub tokens: Arc<TokenCodec>,
    pub permissions: PermissionIndex,
}

impl AppState {
    pub fn new(store: InMemoryStore, tokens: TokenCodec) -> Self {
        let store = Arc::new(RwLock::new(store));
        Self {
            permissions: PermissionIndex::new(store.clone()),
            store,
            tokens: Arc::new(tokens),
        }
    }
}
