// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gate 3 — "are you allowed".
//!
//! Resolves the requested function from the final path segment and checks
//! it against the entitlement set established at the identity gate.
//! Unknown, inactive, and unentitled functions all produce the same 403:
//! a caller must not be able to probe which functions exist.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use super::error::AuthError;
use super::principal::AuthenticatedClient;
use crate::state::AppState;

/// Entitlement middleware. Runs last in the gate chain; a passthrough
/// until an identity exists.
pub async fn entitlement_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(identity) = request.extensions().get::<AuthenticatedClient>().cloned() else {
        return next.run(request).await;
    };

    let path = request.uri().path().to_string();
    let function_name = extract_function_name(&path);

    let resolved = state
        .store
        .read()
        .await
        .active_function_by_name(function_name)
        .cloned();

    let authorized = match resolved {
        Some(function) => identity.may_invoke(&function.id),
        None => {
            warn!(function = function_name, "API function not found or inactive");
            false
        }
    };

    if !authorized {
        error!(
            application = %identity.application_name,
            path = %path,
            "unauthorized API access attempt"
        );
        return AuthError::FunctionDenied.into_response();
    }

    debug!(username = %identity.username, function = function_name, "function access authorized");
    next.run(request).await
}

/// The requested function identifier is the final segment of the path.
fn extract_function_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use axum::{body::Body, http::Request as HttpRequest, middleware, routing::post, Router};
    use tower::ServiceExt;

    use crate::auth::TokenCodec;
    use crate::config::JwtSettings;
    use crate::models::CreateFunctionRequest;
    use crate::store::InMemoryStore;

    #[test]
    fn function_name_is_the_last_path_segment() {
        assert_eq!(extract_function_name("/esb/api/funds_transfer"), "funds_transfer");
        assert_eq!(extract_function_name("/funds_transfer"), "funds_transfer");
        assert_eq!(extract_function_name("/esb/api/"), "");
    }

    fn test_state() -> AppState {
        let settings =
            JwtSettings::new("entitlement-gate-test-secret", "EsbGateway", 3600, 300).unwrap();
        AppState::new(InMemoryStore::new(), TokenCodec::new(&settings))
    }

    async fn seed_function(state: &AppState, name: &str, active: bool) -> String {
        state
            .store
            .write()
            .await
            .create_function(CreateFunctionRequest {
                function_name: name.into(),
                active,
            })
            .unwrap()
            .id
    }

    fn app(state: AppState, identity: Option<AuthenticatedClient>) -> Router {
        let inject = move |mut request: Request, next: Next| {
            let identity = identity.clone();
            async move {
                if let Some(identity) = identity {
                    request.extensions_mut().insert(identity);
                }
                next.run(request).await
            }
        };

        Router::new()
            .route("/esb/api/{function}", post(|| async { "invoked" }))
            .layer(middleware::from_fn_with_state(state.clone(), entitlement_gate))
            .layer(middleware::from_fn(inject))
            .with_state(state)
    }

    fn identity_with(entitlements: &[&str]) -> AuthenticatedClient {
        AuthenticatedClient {
            client_id: "client-1".into(),
            username: "svc".into(),
            application_name: "app".into(),
            whitelisted_ips: vec![],
            entitlements: entitlements.iter().map(|s| s.to_string()).collect::<HashSet<_>>(),
        }
    }

    async fn invoke(app: Router, path: &str) -> axum::http::StatusCode {
        app.oneshot(
            HttpRequest::builder()
                .method("POST")
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    #[tokio::test]
    async fn entitled_client_passes() {
        let state = test_state();
        let function_id = seed_function(&state, "funds_transfer", true).await;
        let app = app(state, Some(identity_with(&[&function_id])));

        assert_eq!(
            invoke(app, "/esb/api/funds_transfer").await,
            axum::http::StatusCode::OK
        );
    }

    #[tokio::test]
    async fn unentitled_client_is_forbidden() {
        let state = test_state();
        seed_function(&state, "funds_transfer", true).await;
        let app = app(state, Some(identity_with(&[])));

        assert_eq!(
            invoke(app, "/esb/api/funds_transfer").await,
            axum::http::StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn inactive_function_is_forbidden_even_when_entitled() {
        let state = test_state();
        let function_id = seed_function(&state, "funds_transfer", false).await;
        let app = app(state, Some(identity_with(&[&function_id])));

        assert_eq!(
            invoke(app, "/esb/api/funds_transfer").await,
            axum::http::StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn unknown_function_is_forbidden() {
        let state = test_state();
        let app = app(state, Some(identity_with(&[])));

        assert_eq!(
            invoke(app, "/esb/api/no_such_function").await,
            axum::http::StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn no_identity_passes_through_to_downstream_enforcement() {
        let state = test_state();
        seed_function(&state, "funds_transfer", true).await;
        let app = app(state, None);

        // The gate itself does not reject; the Auth extractor on the real
        // dispatch handler is what turns this away.
        assert_eq!(
            invoke(app, "/esb/api/funds_transfer").await,
            axum::http::StatusCode::OK
        );
    }
}
