// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Terminal handler for the gated function routes.
//!
//! By the time a request reaches this handler it has passed all three
//! gates; the gateway's authorization job is done. Forwarding to the
//! wrapped backend function lives behind this boundary and is not part of
//! this service.

use axum::{extract::Path, Json};
use tracing::info;

use crate::auth::Auth;
use crate::models::SimpleApiResponse;

#[utoipa::path(
    post,
    path = "/esb/api/{function}",
    params(
        ("function" = String, Path, description = "Name of the backend function to invoke")
    ),
    tag = "Functions",
    responses(
        (status = 200, description = "Invocation authorized", body = SimpleApiResponse),
        (status = 401, description = "No authenticated identity"),
        (status = 403, description = "Origin or entitlement denied")
    ),
)]
pub async fn invoke(Auth(client): Auth, Path(function): Path<String>) -> Json<SimpleApiResponse> {
    info!(
        username = %client.username,
        application = %client.application_name,
        function = %function,
        "authorized function invocation"
    );

    Json(SimpleApiResponse::success_with_data(
        format!("Function '{function}' invocation authorized"),
        serde_json::json!({
            "function": function,
            "application": client.application_name,
        }),
    ))
}
