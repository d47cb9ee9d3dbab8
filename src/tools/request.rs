// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tool request envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// A tool invocation with its non-tool-specific parameters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToolRequest {
    /// Name of the tool to execute.
    pub tool: String,

    /// Optional request identifier for correlation; generated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Advisory timeout in seconds, passed through to the adapter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Tool-specific input parameters, validated by the adapter.
    #[schema(value_type = Object)]
    pub tool_input: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_minimal_request() {
        let request: ToolRequest = serde_json::from_value(json!({
            "tool": "usage_logging_tool",
            "tool_input": {"event": "completion"},
        }))
        .unwrap();

        assert_eq!(request.tool, "usage_logging_tool");
        assert!(request.request_id.is_none());
        assert!(request.timeout.is_none());
        assert_eq!(request.tool_input["event"], "completion");
    }

    #[test]
    fn optional_fields_round_trip() {
        let request: ToolRequest = serde_json::from_value(json!({
            "tool": "usage_logging_tool",
            "request_id": "req-1",
            "timeout": 30,
            "tool_input": {},
        }))
        .unwrap();

        assert_eq!(request.request_id.as_deref(), Some("req-1"));
        assert_eq!(request.timeout, Some(30));
    }
}
