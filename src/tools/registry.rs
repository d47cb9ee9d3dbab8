// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tool registry.

use std::collections::HashMap;

use serde_json::Value;

use super::request::ToolRequest;
use crate::auth::AuthenticatedUser;

/// A tool adapter.
///
/// Adapters receive the authenticated caller and the validated request
/// envelope, and return tool-specific JSON output or an error string.
pub trait Tool: Send + Sync {
    /// Stable name used for registration and dispatch.
    fn name(&self) -> &'static str;

    /// Execute one tool request.
    fn handle(&self, user: &AuthenticatedUser, request: &ToolRequest) -> Result<Value, String>;
}

/// Registry mapping tool names to adapter instances.
///
/// Populated once at startup and shared read-only across requests.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in adapters registered.
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.add_tool(Box::new(super::usage::UsageLoggingTool));
        registry
    }

    /// Register a tool under its own name. A later registration under the
    /// same name replaces the earlier one.
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name.
    pub fn get_tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    /// Names of all registered tools, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
