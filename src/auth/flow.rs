// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential login and token refresh.
//!
//! Both operations are terminal per call, with no state carried between
//! them. `login` trades a username/password pair for a token; `refresh`
//! trades a recently expired (or still valid) token for a fresh one with
//! a full lifetime. The refresh path reloads the client so status and
//! entitlement changes since issuance take effect.

use tracing::{error, info, warn};

use super::error::AuthError;
use crate::state::AppState;
use crate::store::CredentialError;

/// Authenticate with username and password, returning a new bearer token.
///
/// Unknown usernames and wrong passwords produce the same error so the
/// endpoint cannot be used to enumerate usernames.
pub async fn login(state: &AppState, username: &str, password: &str) -> Result<String, AuthError> {
    let verified = state.store.read().await.verify_credentials(username, password);

    let client = match verified {
        Ok(client) => client,
        Err(CredentialError::UnknownClient | CredentialError::BadCredential) => {
            warn!(username, "failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }
        Err(CredentialError::Disabled) => {
            warn!(username, "disabled account login attempt");
            return Err(AuthError::AccountDisabled);
        }
    };

    let token = state.tokens.issue(&client).map_err(|err| {
        error!(username, error = %err, "token issuance failed");
        AuthError::Internal
    })?;

    info!(username, "authenticated successfully");
    Ok(token)
}

/// Exchange a bearer token for a fresh one, tolerating expiry within the
/// configured grace period.
pub async fn refresh(state: &AppState, bearer_header: &str) -> Result<String, AuthError> {
    let token = bearer_header
        .strip_prefix("Bearer ")
        .unwrap_or(bearer_header)
        .trim();

    let claims = state.tokens.verify_with_grace(token).map_err(|err| {
        warn!(
            subject = %state.tokens.safe_subject(token),
            error = %err,
            "token refresh rejected"
        );
        AuthError::RefreshRejected
    })?;

    // Re-load the client to pick up status and entitlement changes since
    // the original token was issued.
    let client = state
        .store
        .read()
        .await
        .client_by_username(&claims.sub)
        .cloned();

    let Some(client) = client else {
        warn!(subject = %claims.sub, "refresh for a client that no longer exists");
        return Err(AuthError::RefreshRejected);
    };

    if client.is_locked() || !client.is_enabled() {
        warn!(username = %client.username, "refresh for a deactivated client");
        return Err(AuthError::AccountDisabled);
    }

    let new_token = state.tokens.issue(&client).map_err(|err| {
        error!(username = %client.username, error = %err, "token issuance failed during refresh");
        AuthError::RefreshRejected
    })?;

    info!(username = %client.username, "token refreshed");
    Ok(new_token)
}
