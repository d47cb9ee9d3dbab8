// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! JWT authentication for the tool dispatch API.
//!
//! ## Auth Flow
//!
//! 1. Caller sends `Authorization: Bearer <JWT>`
//! 2. Key material is resolved per token from the configured source
//!    (HMAC shared secret, JWKS endpoint, or local PEM file)
//! 3. Signature and standard claims are verified against the *configured*
//!    algorithm, then the configured required-claims set
//! 4. The verified payload becomes an [`AuthenticatedUser`]
//!
//! ## Gates
//!
//! The [`Auth`] extractor is the hard gate: protected handlers fail with a
//! structured 401/422/500 before business logic runs. The
//! [`middleware::request_observer`] layer is the soft gate: it resolves the
//! same identity best-effort for request logging and context propagation but
//! never rejects a request itself.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod keys;
pub mod middleware;
pub mod validator;

pub use claims::{AuthenticatedUser, RawClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use jwks::JwksManager;
pub use keys::KeyResolver;
pub use validator::TokenValidator;
