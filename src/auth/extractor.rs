// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the established identity.
//!
//! Use the `Auth` extractor in handlers on protected routes:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(client): Auth) -> impl IntoResponse {
//!     // client is the AuthenticatedClient set by the identity gate
//! }
//! ```
//!
//! The gates deliberately pass unauthenticated requests through; this
//! extractor is the backstop that denies them at the handler boundary.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::AuthError;
use super::principal::AuthenticatedClient;

/// Requires an identity established by the identity gate; rejects with
/// 401 otherwise.
pub struct Auth(pub AuthenticatedClient);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedClient>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use axum::http::Request;

    fn identity() -> AuthenticatedClient {
        AuthenticatedClient {
            client_id: "client-1".into(),
            username: "svc".into(),
            application_name: "app".into(),
            whitelisted_ips: vec![],
            entitlements: HashSet::new(),
        }
    }

    #[tokio::test]
    async fn rejects_without_identity() {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn returns_identity_from_extensions() {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        parts.extensions.insert(identity());

        let Auth(client) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(client.username, "svc");
    }
}
