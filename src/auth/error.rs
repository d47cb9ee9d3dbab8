// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors and their HTTP response contract.
//!
//! Every variant maps to a fixed status code and stable error kind. The
//! response body shape is part of the public API contract:
//! `{"error": <kind>, "message": <text>, "details": {"error_type": <type>,
//! "timestamp": <ISO-8601 UTC>}}`, with `WWW-Authenticate: Bearer` on all
//! 401 responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Authentication error taxonomy.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// No usable bearer credentials on the request.
    #[error("JWT token is required")]
    MissingToken,

    /// The `exp` claim is in the past.
    #[error("JWT token has expired")]
    Expired,

    /// Malformed token, bad signature, or issuer/audience mismatch.
    #[error("Invalid JWT token: {0}")]
    Invalid(String),

    /// One or more configured required claims are absent from the payload.
    #[error("Missing required claims: {}", .0.join(", "))]
    MissingClaims(Vec<String>),

    /// No non-empty `sub`, `user_id`, or `uid` claim to identify the caller.
    #[error("User ID not found in JWT payload")]
    MissingUserId,

    /// Verification key material could not be obtained.
    #[error("Key resolution failed: {0}")]
    KeyResolution(String),

    /// Unanticipated failure; the detail is logged, never sent to the client.
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorDetails {
    error_type: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
    message: String,
    details: AuthErrorDetails,
}

impl AuthError {
    /// Stable error kind carried in the response body's `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "authentication_required",
            AuthError::Expired => "token_expired",
            AuthError::MissingClaims(_) | AuthError::MissingUserId => "invalid_claims",
            AuthError::Invalid(_) | AuthError::KeyResolution(_) => "authentication_failed",
            AuthError::Internal(_) => "authentication_error",
        }
    }

    /// Error type identifier carried in the response body's `details`.
    pub fn error_type(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MissingToken",
            AuthError::Expired => "TokenExpired",
            AuthError::MissingClaims(_) | AuthError::MissingUserId => "InvalidClaims",
            AuthError::Invalid(_) => "InvalidToken",
            AuthError::KeyResolution(_) => "KeyResolutionFailed",
            AuthError::Internal(_) => "InternalError",
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::Expired
            | AuthError::Invalid(_)
            | AuthError::KeyResolution(_) => StatusCode::UNAUTHORIZED,
            AuthError::MissingClaims(_) | AuthError::MissingUserId => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the client. Internal details stay server-side.
    fn client_message(&self) -> String {
        match self {
            AuthError::Internal(_) => "Internal authentication error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.kind(),
            message: self.client_message(),
            details: AuthErrorDetails {
                error_type: self.error_type(),
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            },
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
