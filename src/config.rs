// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and never
//! mutated afterwards; every request reads the same immutable snapshot.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8008` |
//! | `JWT_ENABLED` | Enable JWT authentication | `false` |
//! | `JWT_ALGORITHM` | JWT signing algorithm | `RS256` |
//! | `JWT_SECRET_KEY` | HMAC shared secret | Required for HS* algorithms |
//! | `JWT_PUBLIC_KEY_PATH` | PEM public key file | Required for RS*/ES* without JWKS |
//! | `JWT_JWKS_URL` | JWKS endpoint | Alternative to `JWT_PUBLIC_KEY_PATH` |
//! | `JWT_REQUIRED_CLAIMS` | Comma-separated claim names | `sub,exp,iat` |
//! | `JWT_ISSUER` | Expected `iss` claim (exact match) | Optional |
//! | `JWT_AUDIENCE` | Expected `aud` claim | Optional |
//! | `JWT_ENFORCEMENT_MODE` | `header`, `payload`, `hybrid`, or `none` | `header` |
//! | `JWT_LEEWAY_SECONDS` | Clock-skew tolerance for exp/iat | `0` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use url::Url;

use crate::auth::keys::is_hmac;

/// Configuration errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported JWT algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid enforcement_mode: {0}")]
    InvalidEnforcementMode(String),

    #[error("secret_key is required for HMAC algorithms")]
    MissingSecretKey,

    #[error("either jwks_url or public_key_path is required for asymmetric algorithms")]
    MissingKeySource,

    #[error("public key file not found: {0}")]
    PublicKeyNotFound(String),

    #[error("invalid jwks_url '{url}': {reason}")]
    InvalidJwksUrl { url: String, reason: String },
}

/// Where token enforcement applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcementMode {
    Header,
    Payload,
    Hybrid,
    None,
}

impl FromStr for EnforcementMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "header" => Ok(EnforcementMode::Header),
            "payload" => Ok(EnforcementMode::Payload),
            "hybrid" => Ok(EnforcementMode::Hybrid),
            "none" => Ok(EnforcementMode::None),
            other => Err(ConfigError::InvalidEnforcementMode(other.to_string())),
        }
    }
}

/// JWT authentication configuration. Read-only after startup; shared across
/// all concurrent requests without synchronization.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Whether authentication is enforced at all. When false, the hard gate
    /// hands out a fixed development identity; never enable this bypass in a
    /// deployed configuration.
    pub enabled: bool,
    /// The one algorithm tokens are verified with. The token header's `alg`
    /// is never trusted.
    pub algorithm: Algorithm,
    /// HMAC shared secret.
    pub secret_key: Option<String>,
    /// Local PEM public key file for asymmetric algorithms.
    pub public_key_path: Option<PathBuf>,
    /// Remote key-set endpoint for asymmetric algorithms.
    pub jwks_url: Option<String>,
    /// Claim names that must be present in every accepted token.
    pub required_claims: Vec<String>,
    /// Expected `iss` claim, matched exactly when set.
    pub issuer: Option<String>,
    /// Expected `aud` claim when set.
    pub audience: Option<String>,
    /// Where enforcement applies.
    pub enforcement_mode: EnforcementMode,
    /// Clock-skew tolerance in seconds for `exp`/`iat` checks.
    pub leeway_seconds: u64,
}

impl AuthConfig {
    /// Load from `JWT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let algorithm_raw = env_var("JWT_ALGORITHM").unwrap_or_else(|| "RS256".to_string());
        let algorithm = Algorithm::from_str(&algorithm_raw)
            .map_err(|_| ConfigError::UnsupportedAlgorithm(algorithm_raw))?;

        let enforcement_mode = env_var("JWT_ENFORCEMENT_MODE")
            .unwrap_or_else(|| "header".to_string())
            .parse()?;

        Ok(Self {
            enabled: env_var("JWT_ENABLED")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            algorithm,
            secret_key: env_var("JWT_SECRET_KEY"),
            public_key_path: env_var("JWT_PUBLIC_KEY_PATH").map(PathBuf::from),
            jwks_url: env_var("JWT_JWKS_URL"),
            required_claims: parse_required_claims(
                &env_var("JWT_REQUIRED_CLAIMS").unwrap_or_else(|| "sub,exp,iat".to_string()),
            ),
            issuer: env_var("JWT_ISSUER"),
            audience: env_var("JWT_AUDIENCE"),
            enforcement_mode,
            leeway_seconds: env_var("JWT_LEEWAY_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        })
    }

    /// Enforce the key-material invariants. Called once at startup; a
    /// misconfigured service refuses to boot rather than failing per-request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        if is_hmac(self.algorithm) {
            if self.secret_key.is_none() {
                return Err(ConfigError::MissingSecretKey);
            }
            return Ok(());
        }

        if let Some(url) = &self.jwks_url {
            Url::parse(url).map_err(|e| ConfigError::InvalidJwksUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
            return Ok(());
        }

        if let Some(path) = &self.public_key_path {
            if !path.exists() {
                return Err(ConfigError::PublicKeyNotFound(
                    path.display().to_string(),
                ));
            }
            return Ok(());
        }

        Err(ConfigError::MissingKeySource)
    }
}

#[cfg(test)]
impl AuthConfig {
    /// Minimal enabled configuration for unit tests.
    pub(crate) fn for_tests(algorithm: Algorithm) -> Self {
        Self {
            enabled: true,
            algorithm,
            secret_key: None,
            public_key_path: None,
            jwks_url: None,
            required_claims: vec!["sub".to_string(), "exp".to_string(), "iat".to_string()],
            issuer: None,
            audience: None,
            enforcement_mode: EnforcementMode::Header,
            leeway_seconds: 0,
        }
    }

    pub(crate) fn with_secret(mut self, secret: &str) -> Self {
        self.secret_key = Some(secret.to_string());
        self
    }
}

/// Server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_var("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8008),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_required_claims(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enforcement_mode_parses_known_values() {
        assert_eq!(
            "header".parse::<EnforcementMode>().unwrap(),
            EnforcementMode::Header
        );
        assert_eq!(
            "hybrid".parse::<EnforcementMode>().unwrap(),
            EnforcementMode::Hybrid
        );
        assert!(matches!(
            "both".parse::<EnforcementMode>(),
            Err(ConfigError::InvalidEnforcementMode(_))
        ));
    }

    #[test]
    fn required_claims_are_split_and_trimmed() {
        assert_eq!(
            parse_required_claims("sub, exp ,iat"),
            vec!["sub", "exp", "iat"]
        );
        assert_eq!(parse_required_claims("sub,,"), vec!["sub"]);
    }

    #[test]
    fn disabled_config_always_validates() {
        let mut config = AuthConfig::for_tests(Algorithm::HS256);
        config.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn hmac_requires_secret() {
        let config = AuthConfig::for_tests(Algorithm::HS256);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingSecretKey)
        ));

        let config = AuthConfig::for_tests(Algorithm::HS256).with_secret("s");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn asymmetric_requires_a_key_source() {
        let config = AuthConfig::for_tests(Algorithm::RS256);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingKeySource)
        ));
    }

    #[test]
    fn jwks_url_must_parse() {
        let mut config = AuthConfig::for_tests(Algorithm::RS256);
        config.jwks_url = Some("not a url".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidJwksUrl { .. })
        ));

        config.jwks_url = Some("https://issuer.example.com/jwks.json".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_public_key_file_is_rejected() {
        let mut config = AuthConfig::for_tests(Algorithm::RS256);
        config.public_key_path = Some("/nonexistent/key.pem".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PublicKeyNotFound(_))
        ));
    }
}
