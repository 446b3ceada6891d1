// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Administrative endpoints: client CRUD, entitlement management, and
//! function registration.
//!
//! These routes sit behind the identity gate and require an authenticated
//! client; they are not part of the per-request authorization pipeline
//! itself.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{
    ApiClientResponse, ClientStatus, CreateApiClientRequest, CreateFunctionRequest,
    FunctionResponse, GrantPermissionsRequest, SimpleApiResponse,
};
use crate::state::AppState;

fn validate_create_request(request: &CreateApiClientRequest) -> Result<(), ApiError> {
    let username_len = request.username.trim().len();
    if !(3..=50).contains(&username_len) {
        return Err(ApiError::bad_request(
            "Username must be between 3 and 50 characters",
        ));
    }
    if request.application_name.trim().is_empty() {
        return Err(ApiError::bad_request("Application name is required"));
    }
    if let Some(password) = request.password.as_deref() {
        if !password.trim().is_empty() && password.len() < 8 {
            return Err(ApiError::bad_request("Password must be at least 8 characters"));
        }
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/esb/admin/users",
    request_body = CreateApiClientRequest,
    tag = "Admin",
    responses(
        (status = 200, body = ApiClientResponse),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "Username already exists")
    ),
)]
pub async fn create_user(
    Auth(admin): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateApiClientRequest>,
) -> Result<Json<ApiClientResponse>, ApiError> {
    validate_create_request(&request)?;
    info!(admin = %admin.username, username = %request.username, "creating API client");

    let client = state.store.write().await.create_client(request)?;
    Ok(Json(ApiClientResponse::from(&client)))
}

#[utoipa::path(
    get,
    path = "/esb/admin/users",
    tag = "Admin",
    responses((status = 200, body = [ApiClientResponse])),
)]
pub async fn list_users(
    Auth(_admin): Auth,
    State(state): State<AppState>,
) -> Json<Vec<ApiClientResponse>> {
    let store = state.store.read().await;
    let clients = store
        .clients_by_status(ClientStatus::Active)
        .iter()
        .map(ApiClientResponse::from)
        .collect();
    Json(clients)
}

#[utoipa::path(
    get,
    path = "/esb/admin/users/{id}",
    params(("id" = String, Path, description = "Client identifier")),
    tag = "Admin",
    responses((status = 200, body = ApiClientResponse), (status = 404)),
)]
pub async fn get_user(
    Auth(_admin): Auth,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiClientResponse>, ApiError> {
    let store = state.store.read().await;
    let client = store
        .client_by_id(&id)
        .ok_or_else(|| ApiError::not_found(format!("Client not found with ID: {id}")))?;
    Ok(Json(ApiClientResponse::from(client)))
}

#[utoipa::path(
    put,
    path = "/esb/admin/users/{id}",
    params(("id" = String, Path, description = "Client identifier")),
    request_body = CreateApiClientRequest,
    tag = "Admin",
    responses((status = 200, body = ApiClientResponse), (status = 404)),
)]
pub async fn update_user(
    Auth(admin): Auth,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<CreateApiClientRequest>,
) -> Result<Json<ApiClientResponse>, ApiError> {
    info!(admin = %admin.username, id = %id, "updating API client");
    let client = state.store.write().await.update_client(&id, request)?;
    Ok(Json(ApiClientResponse::from(&client)))
}

#[utoipa::path(
    delete,
    path = "/esb/admin/users/{id}",
    params(("id" = String, Path, description = "Client identifier")),
    tag = "Admin",
    responses((status = 200, body = SimpleApiResponse), (status = 404)),
)]
pub async fn delete_user(
    Auth(admin): Auth,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SimpleApiResponse>, ApiError> {
    info!(admin = %admin.username, id = %id, "deactivating API client");
    state.store.write().await.deactivate_client(&id)?;
    Ok(Json(SimpleApiResponse::success("User deactivated successfully")))
}

#[utoipa::path(
    post,
    path = "/esb/admin/users/{id}/permissions",
    params(("id" = String, Path, description = "Client identifier")),
    request_body = GrantPermissionsRequest,
    tag = "Admin",
    responses((status = 200, body = SimpleApiResponse), (status = 404)),
)]
pub async fn grant_permissions(
    Auth(admin): Auth,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<GrantPermissionsRequest>,
) -> Result<Json<SimpleApiResponse>, ApiError> {
    info!(admin = %admin.username, id = %id, "granting permissions");
    let created = state.permissions.grant(&id, &request.function_ids).await?;
    Ok(Json(SimpleApiResponse::success_with_data(
        "Permissions granted successfully",
        serde_json::json!({ "created": created }),
    )))
}

#[utoipa::path(
    delete,
    path = "/esb/admin/users/{id}/permissions",
    params(("id" = String, Path, description = "Client identifier")),
    request_body = GrantPermissionsRequest,
    tag = "Admin",
    responses((status = 200, body = SimpleApiResponse)),
)]
pub async fn revoke_permissions(
    Auth(admin): Auth,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<GrantPermissionsRequest>,
) -> Json<SimpleApiResponse> {
    info!(admin = %admin.username, id = %id, "revoking permissions");
    let removed = state.permissions.revoke(&id, &request.function_ids).await;
    Json(SimpleApiResponse::success_with_data(
        "Permissions revoked successfully",
        serde_json::json!({ "removed": removed }),
    ))
}

#[utoipa::path(
    post,
    path = "/esb/admin/functions",
    request_body = CreateFunctionRequest,
    tag = "Admin",
    responses((status = 200, body = FunctionResponse), (status = 409)),
)]
pub async fn create_function(
    Auth(admin): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateFunctionRequest>,
) -> Result<Json<FunctionResponse>, ApiError> {
    if request.function_name.trim().is_empty() {
        return Err(ApiError::bad_request("Function name is required"));
    }
    info!(admin = %admin.username, function = %request.function_name, "registering function");

    let function = state.store.write().await.create_function(request)?;
    Ok(Json(FunctionResponse::from(&function)))
}

#[utoipa::path(
    get,
    path = "/esb/admin/functions",
    tag = "Admin",
    responses((status = 200, body = [FunctionResponse])),
)]
pub async fn list_functions(
    Auth(_admin): Auth,
    State(state): State<AppState>,
) -> Json<Vec<FunctionResponse>> {
    let store = state.store.read().await;
    Json(store.list_functions().iter().map(FunctionResponse::from).collect())
}
