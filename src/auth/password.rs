// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! One-way credential hashing.
//!
//! Argon2id with the crate's default parameters. The stored form is the
//! PHC string, so parameters and salt travel with the hash and can be
//! upgraded without a migration.

use argon2::{
    password_hash::{rand_core::OsRng, Error as HashError, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

/// Hash a plain-text password into its PHC-encoded storage form.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a plain-text password against a stored PHC hash.
///
/// An unparseable stored hash counts as a mismatch; the caller cannot
/// distinguish it from a wrong password.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
