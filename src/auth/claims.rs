// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decoded JWT claims and the authenticated user built from them.
//!
//! Claim access goes through the accessor helpers below instead of ad hoc
//! map lookups, so the fallback orders (`sub` → `user_id` → `uid`, and
//! `permissions` → `perms` → `roles`) live in exactly one place.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use super::error::AuthError;

/// Decoded JWT payload, insertion-ordered.
pub type RawClaims = serde_json::Map<String, Value>;

/// Extract the user id from a payload: `sub`, then `user_id`, then `uid`.
/// Empty strings do not count.
pub fn extract_user_id(claims: &RawClaims) -> Option<&str> {
    ["sub", "user_id", "uid"].iter().find_map(|key| {
        claims
            .get(*key)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    })
}

/// Extract permissions from a payload: `permissions`, then `perms`, then
/// `roles`. The first claim holding a non-empty list wins; non-list values
/// are treated as empty. Non-string list entries are dropped.
pub fn extract_permissions(claims: &RawClaims) -> Vec<String> {
    for key in ["permissions", "perms", "roles"] {
        if let Some(values) = claims.get(key).and_then(Value::as_array) {
            if !values.is_empty() {
                return string_entries(values);
            }
        }
    }
    Vec::new()
}

/// Extract roles from a payload: the `roles` claim if it is a list, else empty.
pub fn extract_roles(claims: &RawClaims) -> Vec<String> {
    claims
        .get("roles")
        .and_then(Value::as_array)
        .map(|values| string_entries(values))
        .unwrap_or_default()
}

fn string_entries(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Read a Unix-seconds claim as a UTC timestamp.
fn claim_timestamp(claims: &RawClaims, key: &str) -> Option<DateTime<Utc>> {
    let secs = claims.get(key).and_then(Value::as_i64)?;
    Utc.timestamp_opt(secs, 0).single()
}

fn optional_string(claims: &RawClaims, key: &str) -> Option<String> {
    claims.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Authenticated caller identity extracted from a verified JWT.
///
/// Immutable once built; one instance per request, never shared between
/// requests.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Canonical user id (first of `sub`, `user_id`, `uid`).
    pub user_id: String,
    /// Email claim, when present.
    pub email: Option<String>,
    /// Permission strings granted to the caller.
    pub permissions: Vec<String>,
    /// Role strings granted to the caller.
    pub roles: Vec<String>,
    /// The full decoded payload.
    pub claims: RawClaims,
    /// Standard `sub` claim.
    pub subject: Option<String>,
    /// Standard `iss` claim.
    pub issuer: Option<String>,
    /// Standard `aud` claim, when it is a plain string.
    pub audience: Option<String>,
    /// Token expiry (`exp`), when present.
    pub expires_at: Option<DateTime<Utc>>,
    /// Token issue time (`iat`), when present.
    pub issued_at: Option<DateTime<Utc>>,
}

impl AuthenticatedUser {
    /// Build an identity from a verified claim payload.
    ///
    /// Fails when no usable user id claim is present.
    pub fn from_claims(claims: RawClaims) -> Result<Self, AuthError> {
        let user_id = extract_user_id(&claims)
            .ok_or(AuthError::MissingUserId)?
            .to_string();

        Ok(Self {
            user_id,
            email: optional_string(&claims, "email"),
            permissions: extract_permissions(&claims),
            roles: extract_roles(&claims),
            subject: optional_string(&claims, "sub"),
            issuer: optional_string(&claims, "iss"),
            audience: optional_string(&claims, "aud"),
            expires_at: claim_timestamp(&claims, "exp"),
            issued_at: claim_timestamp(&claims, "iat"),
            claims,
        })
    }

    /// Fixed development identity used when authentication is disabled.
    pub fn dev_user() -> Self {
        let claims = match json!({"sub": "dev_user", "dev_mode": true}) {
            Value::Object(map) => map,
            _ => RawClaims::new(),
        };

        Self {
            user_id: "dev_user".to_string(),
            email: Some("dev@example.com".to_string()),
            permissions: vec!["*".to_string()],
            roles: vec!["admin".to_string()],
            subject: Some("dev_user".to_string()),
            issuer: None,
            audience: None,
            expires_at: None,
            issued_at: None,
            claims,
        }
    }

    /// Check whether the caller holds a specific permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Check whether the caller holds a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check whether the caller holds any of the given permissions.
    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }

    /// Check whether the caller holds all of the given permissions.
    pub fn has_all_permissions(&self, permissions: &[&str]) -> bool {
        permissions.iter().all(|p| self.has_permission(p))
    }
}
