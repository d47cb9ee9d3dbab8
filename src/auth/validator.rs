// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token validation.
//!
//! Validation is a fixed sequence of hard gates; the first failure aborts
//! the call and nothing partial is returned. Signature verification always
//! uses the configured algorithm, never the one the token header advertises,
//! so an attacker cannot downgrade verification by claiming `alg: none` or a
//! different family.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Validation};
use serde_json::Value;

use super::claims::RawClaims;
use super::error::AuthError;
use super::keys::KeyResolver;
use crate::config::AuthConfig;

/// Decodes and verifies bearer tokens against the process configuration.
#[derive(Clone)]
pub struct TokenValidator {
    config: Arc<AuthConfig>,
    resolver: KeyResolver,
}

impl TokenValidator {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        let resolver = KeyResolver::new(&config);
        Self { config, resolver }
    }

    /// Validate a token and return its full decoded payload.
    ///
    /// Steps, in order: strip an optional `Bearer ` prefix, parse the
    /// unverified header, resolve key material, verify signature and
    /// standard timestamp claims, match issuer/audience when configured,
    /// then require every claim named in `required_claims`.
    pub async fn validate(&self, token: &str) -> Result<RawClaims, AuthError> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token);

        let header = decode_header(token)
            .map_err(|e| AuthError::Invalid(format!("malformed token header: {e}")))?;

        let key = self.resolver.resolve(&self.config, Some(&header)).await?;

        let mut validation = Validation::new(self.config.algorithm);
        validation.leeway = self.config.leeway_seconds;
        // Claim presence is enforced by the required_claims check below so
        // that a missing claim surfaces as invalid_claims, not as a
        // signature-level failure.
        validation.required_spec_claims = std::collections::HashSet::new();
        validation.validate_exp = true;
        if let Some(issuer) = &self.config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &self.config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let token_data =
            decode::<RawClaims>(token, &key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => {
                    AuthError::Invalid("token signature is invalid".to_string())
                }
                ErrorKind::InvalidIssuer => {
                    AuthError::Invalid("token issuer is invalid".to_string())
                }
                ErrorKind::InvalidAudience => {
                    AuthError::Invalid("token audience is invalid".to_string())
                }
                ErrorKind::ImmatureSignature => {
                    AuthError::Invalid("token is not yet valid".to_string())
                }
                ErrorKind::MissingRequiredClaim(claim) => {
                    AuthError::MissingClaims(vec![claim.clone()])
                }
                _ => AuthError::Invalid(format!("invalid token: {e}")),
            })?;
        let payload = token_data.claims;

        // iat must not be future-dated beyond the configured leeway. The JWT
        // library only range-checks exp/nbf.
        if let Some(iat) = payload.get("iat").and_then(Value::as_i64) {
            let now = Utc::now().timestamp();
            if iat > now + self.config.leeway_seconds as i64 {
                return Err(AuthError::Invalid(
                    "token issued in the future".to_string(),
                ));
            }
        }

        // A configured issuer/audience means the claim must be present, not
        // merely matching when it happens to exist.
        if self.config.issuer.is_some() && !payload.contains_key("iss") {
            return Err(AuthError::Invalid("token issuer is invalid".to_string()));
        }
        if self.config.audience.is_some() && !payload.contains_key("aud") {
            return Err(AuthError::Invalid("token audience is invalid".to_string()));
        }

        let missing: Vec<String> = self
            .config
            .required_claims
            .iter()
            .filter(|claim| !payload.contains_key(claim.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(AuthError::MissingClaims(missing));
        }

        tracing::debug!(
            subject = payload.get("sub").and_then(|v| v.as_str()).unwrap_or("unknown"),
            "JWT token validated"
        );

        Ok(payload)
    }
}
