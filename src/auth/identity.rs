// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gate 1 — "who are you".
//!
//! Extracts and verifies the bearer token and, when it checks out,
//! establishes the request's [`AuthenticatedClient`]. This gate never
//! rejects by itself: requests without a usable identity continue
//! unauthenticated and are turned away by the [`crate::auth::Auth`]
//! extractor on protected handlers. What it does guarantee is fail-closed
//! identity: an invalid token or an unresolvable subject leaves the
//! request with no identity at all.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::principal::AuthenticatedClient;
use crate::state::AppState;

/// Identity middleware. Must run before the origin and entitlement gates;
/// both are no-ops until an identity has been established here.
pub async fn identity_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // No bearer token: continue unauthenticated.
    let Some(token) = bearer_token(&request) else {
        return next.run(request).await;
    };

    let claims = match state.tokens.verify(&token) {
        Ok(claims) => claims,
        Err(err) => {
            warn!(
                subject = %state.tokens.safe_subject(&token),
                error = %err,
                "invalid token received"
            );
            request.extensions_mut().remove::<AuthenticatedClient>();
            return next.run(request).await;
        }
    };

    // Re-load the client on every request so status, whitelist, and
    // entitlement changes take effect mid-token-lifetime.
    match load_identity(&state, &claims.sub).await {
        Some(identity) => {
            debug!(
                username = %identity.username,
                entitlements = identity.entitlements.len(),
                "authenticated client"
            );
            request.extensions_mut().insert(identity);
        }
        None => {
            // Subject vanished since issuance; same downstream effect as
            // an invalid token.
            warn!(subject = %claims.sub, "token subject could not be resolved");
            request.extensions_mut().remove::<AuthenticatedClient>();
        }
    }

    next.run(request).await
}

fn bearer_token(request: &Request) -> Option<String> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

async fn load_identity(state: &AppState, username: &str) -> Option<AuthenticatedClient> {
    let store = state.store.read().await;
    let client = store.client_by_username(username)?;
    let entitlements = store.entitlements_for(&client.id);
    Some(AuthenticatedClient::from_client(client, entitlements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    use crate::auth::TokenCodec;
    use crate::config::JwtSettings;
    use crate::models::CreateApiClientRequest;
    use crate::store::InMemoryStore;

    async fn whoami(identity: Option<Extension<AuthenticatedClient>>) -> String {
        match identity {
            Some(Extension(client)) => client.username,
            None => "anonymous".to_string(),
        }
    }

    fn test_state() -> AppState {
        let settings = JwtSettings::new("identity-gate-test-secret", "EsbGateway", 3600, 300).unwrap();
        AppState::new(InMemoryStore::new(), TokenCodec::new(&settings))
    }

    fn test_app(state: AppState) -> Router {
        Router::new()
            .route("/probe", get(whoami))
            .layer(middleware::from_fn_with_state(state.clone(), identity_gate))
            .with_state(state)
    }

    async fn seed_client(state: &AppState, username: &str) -> crate::models::ApiClient {
        state
            .store
            .write()
            .await
            .create_client(CreateApiClientRequest {
                username: username.into(),
                password: Some("pw-123456".into()),
                application_name: "app".into(),
                whitelisted_ips: None,
                function_ids: None,
            })
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn no_token_passes_through_unauthenticated() {
        let state = test_state();
        let app = test_app(state);

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/probe")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn valid_token_establishes_identity() {
        let state = test_state();
        let client = seed_client(&state, "svc_payments").await;
        let token = state.tokens.issue(&client).unwrap();
        let app = test_app(state);

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/probe")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_string(response).await, "svc_payments");
    }

    #[tokio::test]
    async fn garbage_token_passes_through_unauthenticated() {
        let state = test_state();
        seed_client(&state, "svc_payments").await;
        let app = test_app(state);

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/probe")
                    .header(AUTHORIZATION, "Bearer not.a.token")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn deleted_subject_is_treated_as_invalid_token() {
        let state = test_state();
        let client = seed_client(&state, "svc_payments").await;
        let token = state.tokens.issue(&client).unwrap();

        // Simulate the client disappearing after issuance.
        let fresh = InMemoryStore::new();
        *state.store.write().await = fresh;

        let app = test_app(state);
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/probe")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_string(response).await, "anonymous");
    }
}
