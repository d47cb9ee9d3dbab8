// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Usage logging tool.
//!
//! Captures agent activity that happens outside regular tool calls (internal
//! agent actions that should still show up as billable usage). The event is
//! written to the structured log, where the gateway collects it.

use serde_json::{json, Value};

use super::registry::Tool;
use super::request::ToolRequest;
use crate::auth::AuthenticatedUser;

pub struct UsageLoggingTool;

impl Tool for UsageLoggingTool {
    fn name(&self) -> &'static str {
        "usage_logging_tool"
    }

    fn handle(&self, user: &AuthenticatedUser, request: &ToolRequest) -> Result<Value, String> {
        tracing::info!(
            user = %user.user_id,
            request_id = request.request_id.as_deref().unwrap_or("-"),
            event = %request.tool_input,
            "usage event recorded"
        );
        Ok(json!({}))
    }
}
