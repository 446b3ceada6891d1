// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and refresh endpoints.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use tracing::info;

use crate::auth::{flow, AuthError};
use crate::models::{AuthRequest, AuthResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/esb/authenticate",
    request_body = AuthRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Token issued", body = AuthResponse),
        (status = 401, description = "Invalid credentials or deactivated account", body = AuthResponse),
        (status = 500, description = "Signing failure", body = AuthResponse)
    )
)]
pub async fn authenticate(
    State(state): State<AppState>,
    Json(request): Json<AuthRequest>,
) -> (StatusCode, Json<AuthResponse>) {
    info!(username = %request.username, "authentication attempt");

    match flow::login(&state, &request.username, &request.password).await {
        Ok(token) => (StatusCode::OK, Json(AuthResponse::success(token))),
        Err(err) => (err.status_code(), Json(AuthResponse::failure(err.to_string()))),
    }
}

#[utoipa::path(
    post,
    path = "/esb/refresh",
    tag = "Auth",
    responses(
        (status = 200, description = "Fresh token issued", body = AuthResponse),
        (status = 401, description = "Token not refreshable", body = AuthResponse)
    ),
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<AuthResponse>) {
    info!("token refresh requested");

    let Some(bearer) = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()) else {
        let err = AuthError::RefreshRejected;
        return (err.status_code(), Json(AuthResponse::failure(err.to_string())));
    };

    match flow::refresh(&state, bearer).await {
        Ok(token) => (StatusCode::OK, Json(AuthResponse::success(token))),
        Err(err) => (err.status_code(), Json(AuthResponse::failure(err.to_string()))),
    }
}
