// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP API assembly.
//!
//! Three route groups with different protection levels:
//!
//! - public: authenticate, refresh, health
//! - gated: `/esb/api/{function}` behind the full three-gate pipeline
//! - admin: client/function/entitlement management behind the identity
//!   gate and the `Auth` extractor
//!
//! Gate order within the gated group is identity → origin → entitlement;
//! the layers are listed in that order so the identity gate runs first.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{entitlement::entitlement_gate, identity::identity_gate, origin::origin_gate},
    models::{
        ApiClientResponse, AuthRequest, AuthResponse, ClientStatus, CreateApiClientRequest,
        CreateFunctionRequest, FunctionResponse, GrantPermissionsRequest, SimpleApiResponse,
    },
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod dispatch;
pub mod health;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/esb/authenticate", post(auth::authenticate))
        .route("/esb/refresh", post(auth::refresh))
        .route("/health", get(health::health));

    let gated_routes = Router::new()
        .route(
            "/esb/api/{function}",
            post(dispatch::invoke).get(dispatch::invoke),
        )
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn_with_state(state.clone(), identity_gate))
                .layer(middleware::from_fn(origin_gate))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    entitlement_gate,
                )),
        );

    let admin_routes = Router::new()
        .route(
            "/esb/admin/users",
            post(admin::create_user).get(admin::list_users),
        )
        .route(
            "/esb/admin/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route(
            "/esb/admin/users/{id}/permissions",
            post(admin::grant_permissions).delete(admin::revoke_permissions),
        )
        .route(
            "/esb/admin/functions",
            post(admin::create_function).get(admin::list_functions),
        )
        .layer(middleware::from_fn_with_state(state.clone(), identity_gate));

    Router::new()
        .merge(public_routes)
        .merge(gated_routes)
        .merge(admin_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::authenticate,
        auth::refresh,
        dispatch::invoke,
        health::health,
        admin::create_user,
        admin::list_users,
        admin::get_user,
        admin::update_user,
        admin::delete_user,
        admin::grant_permissions,
        admin::revoke_permissions,
        admin::create_function,
        admin::list_functions
    ),
    components(
        schemas(
            AuthRequest,
            AuthResponse,
            SimpleApiResponse,
            ClientStatus,
            CreateApiClientRequest,
            ApiClientResponse,
            GrantPermissionsRequest,
            CreateFunctionRequest,
            FunctionResponse,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Credential login and token refresh"),
        (name = "Functions", description = "Gated backend function invocation"),
        (name = "Admin", description = "Client, function, and entitlement management"),
        (name = "Health", description = "Liveness")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{to_bytes, Body};
    use axum::http::{header::AUTHORIZATION, Request, StatusCode};
    use chrono::Utc;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use tower::ServiceExt;

    use crate::auth::{TokenClaims, TokenCodec};
    use crate::config::JwtSettings;
    use crate::store::InMemoryStore;

    const SECRET: &str = "router-e2e-test-secret";

    fn test_state() -> AppState {
        let settings = JwtSettings::new(SECRET, "EsbGateway", 3600, 300).unwrap();
        AppState::new(InMemoryStore::new(), TokenCodec::new(&settings))
    }

    /// Seed a client with an optional whitelist and one active function,
    /// optionally entitled. Returns (client, function id).
    async fn seed(
        state: &AppState,
        whitelist: Option<Vec<String>>,
        entitle: bool,
    ) -> (crate::models::ApiClient, String) {
        let mut store = state.store.write().await;
        let client = store
            .create_client(CreateApiClientRequest {
                username: "svc_payments".into(),
                password: Some("correct-horse".into()),
                application_name: "payments-app".into(),
                whitelisted_ips: whitelist,
                function_ids: None,
            })
            .unwrap();
        let function = store
            .create_function(CreateFunctionRequest {
                function_name: "funds_transfer".into(),
                active: true,
            })
            .unwrap();
        if entitle {
            store
                .grant_entitlements(&client.id, &[function.id.clone()])
                .unwrap();
        }
        (client, function.id)
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_state());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn unauthenticated_request_to_gated_route_is_denied() {
        let state = test_state();
        seed(&state, None, true).await;
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/esb/api/funds_transfer")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Gate one passes the request through without identity; the Auth
        // extractor on the handler is what turns it away.
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn full_pipeline_authorizes_an_entitled_client() {
        let state = test_state();
        let (client, _) = seed(&state, Some(vec!["10.0.0.*".into()]), true).await;
        let token = state.tokens.issue(&client).unwrap();
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/esb/api/funds_transfer")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header("X-Forwarded-For", "10.0.0.42, 198.51.100.1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["function"], "funds_transfer");
    }

    #[tokio::test]
    async fn empty_whitelist_still_hits_the_entitlement_gate() {
        let state = test_state();
        // Whitelist empty (gate two always passes), function NOT entitled.
        let (client, _) = seed(&state, None, false).await;
        let token = state.tokens.issue(&client).unwrap();
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/esb/api/funds_transfer")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn origin_violation_is_denied_before_entitlement() {
        let state = test_state();
        let (client, _) = seed(&state, Some(vec!["10.0.0.5".into()]), true).await;
        let token = state.tokens.issue(&client).unwrap();
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/esb/api/funds_transfer")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header("X-Forwarded-For", "192.0.2.1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["error_code"], "origin_denied");
    }

    #[tokio::test]
    async fn wrong_password_matches_unknown_user_response_exactly() {
        let state = test_state();
        seed(&state, None, true).await;

        let wrong_password = router(state.clone())
            .oneshot(json_request(
                "/esb/authenticate",
                serde_json::json!({"username": "svc_payments", "password": "wrong"}),
            ))
            .await
            .unwrap();
        let unknown_user = router(state)
            .oneshot(json_request(
                "/esb/authenticate",
                serde_json::json!({"username": "no_such_user", "password": "wrong"}),
            ))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

        // Identical bodies: no username enumeration.
        assert_eq!(
            json_body(wrong_password).await,
            json_body(unknown_user).await
        );
    }

    #[tokio::test]
    async fn refresh_within_grace_returns_a_usable_token() {
        let state = test_state();
        seed(&state, None, true).await;

        // Token expired 200s ago; grace is 300s.
        let exp = Utc::now().timestamp() - 200;
        let stale = encode(
            &Header::new(Algorithm::HS512),
            &TokenClaims {
                sub: "svc_payments".into(),
                iss: "EsbGateway".into(),
                app: "payments-app".into(),
                iat: exp - 3600,
                exp,
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let response = router(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/esb/refresh")
                    .header(AUTHORIZATION, format!("Bearer {stale}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["response_code"], "00");

        // The refreshed token passes strict verification with a full
        // lifetime ahead of it.
        let claims = state
            .tokens
            .verify(body["token"].as_str().unwrap())
            .unwrap();
        assert!(claims.exp > Utc::now().timestamp() + 3500);
    }

    #[tokio::test]
    async fn admin_routes_require_identity() {
        let state = test_state();
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/esb/admin/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_can_manage_clients_end_to_end() {
        let state = test_state();
        let (client, _) = seed(&state, None, false).await;
        let token = state.tokens.issue(&client).unwrap();
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/esb/admin/users")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "username": "svc_reports",
                            "password": "pw-123456",
                            "application_name": "reports-app"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["username"], "svc_reports");
        assert_eq!(body["status"], "active");
    }
}
