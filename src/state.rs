// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenValidator;
use crate::config::AuthConfig;
use crate::tools::ToolRegistry;

/// Shared application state, built once at startup and cloned per request.
/// Everything here is read-only after construction.
#[derive(Clone)]
pub struct AppState {
    pub auth_config: Arc<AuthConfig>,
    pub validator: TokenValidator,
    pub tools: Arc<ToolRegistry>,
}

impl AppState {
    pub fn new(auth_config: AuthConfig, tools: ToolRegistry) -> Self {
        let auth_config = Arc::new(auth_config);
        Self {
            validator: TokenValidator::new(auth_config.clone()),
            auth_config,
            tools: Arc::new(tools),
        }
    }
}
