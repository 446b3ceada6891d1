// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gate 2 — "where are you from".
//!
//! Validates the authenticated client's network origin against its
//! whitelist. Runs after the identity gate because different clients carry
//! different IP restrictions; without an identity this gate is a
//! passthrough. An empty whitelist means the client is unrestricted.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::error::AuthError;
use super::principal::AuthenticatedClient;

/// Origin middleware. Denies with 403 when the resolved client address
/// matches none of the whitelist patterns; an unresolvable address with a
/// non-empty whitelist is also a denial.
pub async fn origin_gate(request: Request, next: Next) -> Response {
    let Some(identity) = request.extensions().get::<AuthenticatedClient>().cloned() else {
        return next.run(request).await;
    };

    if identity.whitelisted_ips.is_empty() {
        debug!(username = %identity.username, "no IP whitelist configured, allowing all origins");
        return next.run(request).await;
    }

    let address = client_address(&request);
    let allowed = address
        .as_deref()
        .map(|addr| is_whitelisted(&identity.whitelisted_ips, addr))
        .unwrap_or(false);

    if !allowed {
        error!(
            username = %identity.username,
            application = %identity.application_name,
            address = address.as_deref().unwrap_or("unresolved"),
            "IP whitelist violation"
        );
        return AuthError::OriginDenied.into_response();
    }

    debug!(
        username = %identity.username,
        address = address.as_deref().unwrap_or_default(),
        "IP validation successful"
    );
    next.run(request).await
}

/// Resolve the originating client address.
///
/// Order matters: the first `X-Forwarded-For` entry is the original client
/// in a proxy chain, `X-Real-IP` is set by single reverse proxies, and the
/// transport peer address is the last resort.
fn client_address(request: &Request) -> Option<String> {
    if let Some(forwarded) = header_value(request, "X-Forwarded-For") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }

    if let Some(real_ip) = header_value(request, "X-Real-IP") {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return Some(real_ip.to_string());
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(peer)| peer.ip().to_string())
}

fn header_value<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers().get(name)?.to_str().ok()
}

fn is_whitelisted(patterns: &[String], address: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| matches_pattern(address, pattern.trim()))
}

/// Match an address against one whitelist pattern: exact literal, or an
/// anchored wildcard where `*` spans any sequence and every other
/// character (dots included) is literal.
fn matches_pattern(address: &str, pattern: &str) -> bool {
    if address == pattern {
        return true;
    }
    if pattern.contains('*') {
        return wildcard_match(address, pattern);
    }
    false
}

fn wildcard_match(address: &str, pattern: &str) -> bool {
    let mut pieces = pattern.split('*');

    let prefix = pieces.next().unwrap_or_default();
    let Some(mut rest) = address.strip_prefix(prefix) else {
        return false;
    };

    let mut middle: Vec<&str> = pieces.collect();
    let suffix = if pattern.ends_with('*') {
        None
    } else {
        middle.pop()
    };

    for piece in middle {
        match rest.find(piece) {
            Some(idx) => rest = &rest[idx + piece.len()..],
            None => return false,
        }
    }

    match suffix {
        Some(suffix) => rest.ends_with(suffix),
        None => true,
    }
}
