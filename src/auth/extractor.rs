// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users (the enforcing gate).
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! Extraction and validation live in [`authenticate`], shared with the soft
//! gate in `middleware.rs`: the extractor wraps it with abort-on-error, the
//! middleware coerces every error to an anonymous outcome.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Best-effort extraction + validation of the request's bearer identity.
///
/// Does not consult `enabled`; each gate decides separately what a disabled
/// subsystem means (dev identity for the hard gate, anonymous for the soft
/// gate).
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MissingToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let payload = state.validator.validate(token).await?;
    AuthenticatedUser::from_claims(payload)
}

/// Extractor that rejects the request unless the caller presents a valid
/// bearer token (or authentication is administratively disabled).
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // The soft gate stores the identity on success; reuse it instead of
        // validating the same token twice. Any soft-gate failure leaves the
        // extension empty and is re-validated here with full error mapping.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(Auth(user.clone()));
        }

        if !state.auth_config.enabled {
            // Local development only. The fixed identity must never be
            // reachable in a deployed configuration.
            tracing::warn!("JWT authentication is disabled - using development identity");
            return Ok(Auth(AuthenticatedUser::dev_user()));
        }

        match authenticate(&parts.headers, state).await {
            Ok(user) => {
                tracing::info!(user = %user.user_id, "User authenticated");
                Ok(Auth(user))
            }
            Err(err) => {
                match &err {
                    AuthError::Internal(detail) => {
                        tracing::error!(detail = %detail, "Unexpected error during JWT authentication");
                    }
                    other => {
                        tracing::warn!(error = %other, "JWT authentication failed");
                    }
                }
                Err(err)
            }
        }
    }
}
