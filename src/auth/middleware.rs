// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request observation middleware (the non-enforcing gate).
//!
//! Wraps every request outside the public allow-list: resolves the caller's
//! identity best-effort, attaches it to request extensions for downstream
//! handlers, and emits exactly one log line per request after the downstream
//! chain completes. A failed validation here yields an anonymous request,
//! never a rejection; enforcement is the `Auth` extractor's job.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::extractor::authenticate;
use super::AuthError;
use crate::state::AppState;

/// Paths served without authentication, matched exactly.
const PUBLIC_PATHS: &[&str] = &["/health", "/api-doc/openapi.json"];

/// Path prefixes served without authentication (API documentation UI).
const PUBLIC_PREFIXES: &[&str] = &["/docs"];

/// Whether a path bypasses both authentication gates.
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Soft-gate middleware: best-effort identity plus request logging.
pub async fn request_observer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let user = if state.auth_config.enabled {
        match authenticate(request.headers(), &state).await {
            Ok(user) => Some(user),
            Err(AuthError::Internal(detail)) => {
                tracing::warn!(detail = %detail, "Unexpected error resolving request identity");
                None
            }
            Err(_) => None,
        }
    } else {
        None
    };

    if let Some(user) = &user {
        request.extensions_mut().insert(user.clone());
    }

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let (user_id, permission_count) = match &user {
        Some(user) => (user.user_id.as_str(), user.permissions.len()),
        None => ("anonymous", 0),
    };
    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms,
        user = user_id,
        permissions = permission_count,
        "request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::config::AuthConfig;
    use crate::tools::ToolRegistry;
    use axum::{middleware, routing::get, Extension, Router};
    use chrono::Utc;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::json;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    fn test_app() -> Router {
        let state = AppState::new(
            AuthConfig::for_tests(Algorithm::HS256).with_secret(SECRET),
            ToolRegistry::new(),
        );

        async fn probe(user: Option<Extension<AuthenticatedUser>>) -> String {
            match user {
                Some(Extension(user)) => user.user_id,
                None => "anonymous".to_string(),
            }
        }

        Router::new()
            .route("/probe", get(probe))
            .layer(middleware::from_fn_with_state(state, request_observer))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn public_paths_are_allow_listed() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/docs"));
        assert!(is_public_path("/docs/index.html"));
        assert!(is_public_path("/api-doc/openapi.json"));
        assert!(!is_public_path("/tool"));
        assert!(!is_public_path("/v1/users/me"));
    }

    #[tokio::test]
    async fn invalid_token_is_not_blocked() {
        let response = test_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/probe")
                    .header("Authorization", "Bearer not.a.jwt")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn missing_token_is_anonymous() {
        let response = test_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/probe")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn valid_token_attaches_identity() {
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({"sub": "u1", "exp": now + 3600, "iat": now - 60}),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let response = test_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/probe")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(body_string(response).await, "u1");
    }
}
