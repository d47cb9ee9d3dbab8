// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verification key resolution.
//!
//! The key source is chosen by the *configured* algorithm family, never by
//! anything the token claims about itself: HMAC algorithms use the shared
//! secret, asymmetric algorithms use the remote key set (when a JWKS URL is
//! configured) or a local PEM file. Resolution happens per verification
//! call, since the token header decides which JWKS entry applies.

use std::path::Path;

use jsonwebtoken::{Algorithm, DecodingKey, Header};

use super::error::AuthError;
use super::jwks::JwksManager;
use crate::config::AuthConfig;

/// Whether an algorithm belongs to the HMAC (shared-secret) family.
pub fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

/// Resolves verification key material for token validation.
#[derive(Clone)]
pub struct KeyResolver {
    jwks: Option<JwksManager>,
}

impl KeyResolver {
    /// Build a resolver for the given configuration. The JWKS manager (and
    /// its HTTP client) is created once and shared across requests.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            jwks: config
                .jwks_url
                .as_ref()
                .map(|url| JwksManager::new(url.clone())),
        }
    }

    /// Resolve the verification key for one token.
    ///
    /// `header` is the token's unverified header; it is consulted only for
    /// the `kid` used to select a JWKS entry.
    pub async fn resolve(
        &self,
        config: &AuthConfig,
        header: Option<&Header>,
    ) -> Result<DecodingKey, AuthError> {
        if is_hmac(config.algorithm) {
            let secret = config.secret_key.as_deref().ok_or_else(|| {
                AuthError::KeyResolution("secret_key is required for HMAC algorithms".to_string())
            })?;
            return Ok(DecodingKey::from_secret(secret.as_bytes()));
        }

        if let Some(jwks) = &self.jwks {
            let kid = header.and_then(|h| h.kid.as_deref()).ok_or_else(|| {
                AuthError::KeyResolution(
                    "token header missing 'kid' required for JWKS lookup".to_string(),
                )
            })?;
            return jwks.decoding_key(kid).await;
        }

        if let Some(path) = &config.public_key_path {
            return load_pem_key(path, config.algorithm).await;
        }

        Err(AuthError::KeyResolution(
            "no key source configured".to_string(),
        ))
    }
}

/// Read a PEM public key file and build a decoding key for the algorithm family.
async fn load_pem_key(path: &Path, algorithm: Algorithm) -> Result<DecodingKey, AuthError> {
    let pem = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AuthError::KeyResolution(format!("public key file not found: {}", path.display()))
        } else {
            AuthError::KeyResolution(format!(
                "failed to read public key file {}: {e}",
                path.display()
            ))
        }
    })?;

    let key = match algorithm {
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(&pem),
        Algorithm::EdDSA => DecodingKey::from_ed_pem(&pem),
        _ => DecodingKey::from_rsa_pem(&pem),
    };

    key.map_err(|e| AuthError::KeyResolution(format!("invalid public key file: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TEST_RSA_PUBLIC_PEM: &str = "-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAui+0uawarQv+YMvUhEIl
buMxfnTVyJgJAtlkR4HZDwKGTBxj+eObYMl1VgmQnXTINzDzfivVVXhZpgC1jzzI
S7/x1UcOF2cql8aPm1jWeJgIR480yiHwUIaIALsJihM3HV+mbyy/Df8SguTuII0y
H4IOUJP5bOQU8Cwvm88HGvK6MXuX4hjpN7QrFueFfpye4jIzsg2WJXB1oKxrXhW3
Ecou5FGE8PJ4BT/J7TyuwEP8URmoLwyyOWt4SP5InvJ4JKxB5TpMdN8WXQye2vX6
phI1wtVPV6hoQF35piNTxajdZpZzl6/jP93V5VAxuAF9soQetBKEg5L8aXvZAz+m
SQIDAQAB
-----END PUBLIC KEY-----
";

    fn key_resolution_message(err: AuthError) -> String {
        match err {
            AuthError::KeyResolution(msg) => msg,
            other => panic!("expected KeyResolution, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn hmac_uses_configured_secret() {
        let config = AuthConfig::for_tests(Algorithm::HS256).with_secret("test-secret");
        let resolver = KeyResolver::new(&config);
        assert!(resolver.resolve(&config, None).await.is_ok());
    }

    #[tokio::test]
    async fn hmac_without_secret_fails() {
        let config = AuthConfig::for_tests(Algorithm::HS256);
        let resolver = KeyResolver::new(&config);
        let msg = key_resolution_message(resolver.resolve(&config, None).await.unwrap_err());
        assert!(msg.contains("secret_key"));
    }

    #[tokio::test]
    async fn jwks_requires_kid_in_header() {
        let mut config = AuthConfig::for_tests(Algorithm::RS256);
        config.jwks_url = Some("https://issuer.example.com/jwks.json".to_string());
        let resolver = KeyResolver::new(&config);

        // Header without kid: resolution must fail before any network call.
        let header = Header::new(Algorithm::RS256);
        let msg =
            key_resolution_message(resolver.resolve(&config, Some(&header)).await.unwrap_err());
        assert!(msg.contains("kid"));
    }

    #[tokio::test]
    async fn missing_public_key_file_fails() {
        let mut config = AuthConfig::for_tests(Algorithm::RS256);
        config.public_key_path = Some("/nonexistent/jwt_public_key.pem".into());
        let resolver = KeyResolver::new(&config);

        let msg = key_resolution_message(resolver.resolve(&config, None).await.unwrap_err());
        assert!(msg.contains("not found"));
    }

    #[tokio::test]
    async fn public_key_file_is_loaded() {
        let mut pem_file = tempfile::NamedTempFile::new().unwrap();
        pem_file.write_all(TEST_RSA_PUBLIC_PEM.as_bytes()).unwrap();

        let mut config = AuthConfig::for_tests(Algorithm::RS256);
        config.public_key_path = Some(pem_file.path().to_path_buf());
        let resolver = KeyResolver::new(&config);

        assert!(resolver.resolve(&config, None).await.is_ok());
    }

    #[tokio::test]
    async fn garbage_public_key_file_fails() {
        let mut pem_file = tempfile::NamedTempFile::new().unwrap();
        pem_file.write_all(b"not a pem").unwrap();

        let mut config = AuthConfig::for_tests(Algorithm::RS256);
        config.public_key_path = Some(pem_file.path().to_path_buf());
        let resolver = KeyResolver::new(&config);

        let msg = key_resolution_message(resolver.resolve(&config, None).await.unwrap_err());
        assert!(msg.contains("invalid public key file"));
    }

    #[tokio::test]
    async fn no_key_source_configured_fails() {
        let config = AuthConfig::for_tests(Algorithm::RS256);
        let resolver = KeyResolver::new(&config);
        let msg = key_resolution_message(resolver.resolve(&config, None).await.unwrap_err());
        assert!(msg.contains("no key source"));
    }

    #[test]
    fn hmac_family_detection() {
        assert!(is_hmac(Algorithm::HS256));
        assert!(is_hmac(Algorithm::HS512));
        assert!(!is_hmac(Algorithm::RS256));
        assert!(!is_hmac(Algorithm::ES256));
    }
}
