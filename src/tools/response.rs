// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tool response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Outcome of one tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToolResponse {
    /// Whether the tool execution succeeded.
    pub success: bool,

    /// Wall-clock duration of the invocation in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// Error message when execution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Tool-specific output data.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub tool_output: Option<Value>,
}

impl ToolResponse {
    /// Build a successful response.
    pub fn success(tool_output: Value, duration_ms: u64) -> Self {
        Self {
            success: true,
            duration_ms: Some(duration_ms),
            error_message: None,
            tool_output: Some(tool_output),
        }
    }

    /// Build an error response.
    pub fn error(message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            duration_ms: Some(duration_ms),
            error_message: Some(message.into()),
            tool_output: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_response_shape() {
        let response = ToolResponse::success(json!({"ok": true}), 12);
        assert!(response.success);
        assert_eq!(response.duration_ms, Some(12));
        assert!(response.error_message.is_none());

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["tool_output"]["ok"], true);
        assert!(body.get("error_message").is_none());
    }

    #[test]
    fn error_response_shape() {
        let response = ToolResponse::error("upstream timeout", 31000);
        assert!(!response.success);
        assert_eq!(response.error_message.as_deref(), Some("upstream timeout"));
        assert!(response.tool_output.is_none());
    }
}
