// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Module
//!
//! This module implements the gateway's three-gate authorization pipeline
//! and the token lifecycle behind it.
//!
//! ## Request Flow
//!
//! 1. [`identity::identity_gate`] — verify the bearer token and establish
//!    the request's [`AuthenticatedClient`] (fresh client load, including
//!    its entitlement set)
//! 2. [`origin::origin_gate`] — validate the caller's network address
//!    against the client's IP whitelist
//! 3. [`entitlement::entitlement_gate`] — resolve the requested function
//!    and check it against the entitlement set
//!
//! The order is load-bearing: gates two and three act on the identity
//! established by gate one and are passthroughs without it. Protected
//! handlers use the [`Auth`] extractor as the final backstop for requests
//! that reached them unauthenticated.
//!
//! ## Security
//!
//! - Tokens are HS512-signed JWTs; strict expiry on the request path, a
//!   bounded grace window on the refresh path only
//! - Every ambiguous or erroring condition denies; nothing in this module
//!   fails open
//! - Denial responses carry generic messages; specifics go to the
//!   security log

pub mod entitlement;
pub mod error;
pub mod extractor;
pub mod flow;
pub mod identity;
pub mod origin;
pub mod password;
pub mod principal;
pub mod token;

pub use error::AuthError;
pub use extractor::Auth;
pub use principal::AuthenticatedClient;
pub use token::{TokenClaims, TokenCodec, TokenError};
