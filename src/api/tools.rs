// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tool dispatch endpoint.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::Auth,
    error::ApiError,
    state::AppState,
    tools::{ToolRequest, ToolResponse},
};

/// Dispatch a tool request to its registered adapter.
///
/// The caller must be authenticated; the adapter receives the caller's
/// identity alongside the validated request. An adapter failure is reported
/// as a 500 with the error in the response envelope.
#[utoipa::path(
    post,
    path = "/tool",
    tag = "Tools",
    security(("bearer_auth" = [])),
    request_body = ToolRequest,
    responses(
        (status = 200, description = "Tool executed successfully", body = ToolResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Unknown tool"),
        (status = 422, description = "Token is missing required claims"),
        (status = 500, description = "Tool execution failed", body = ToolResponse)
    )
)]
pub async fn dispatch_tool(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(mut request): Json<ToolRequest>,
) -> Result<(StatusCode, Json<ToolResponse>), ApiError> {
    let start = Instant::now();

    if request.request_id.is_none() {
        request.request_id = Some(uuid::Uuid::new_v4().to_string());
    }

    tracing::info!(user = %user.user_id, tool = %request.tool, "Tool request");

    let tool = state
        .tools
        .get_tool(&request.tool)
        .ok_or_else(|| ApiError::not_found(format!("Tool '{}' not found", request.tool)))?;

    let result = tool.handle(&user, &request);
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(output) => Ok((
            StatusCode::OK,
            Json(ToolResponse::success(output, duration_ms)),
        )),
        Err(message) => {
            tracing::warn!(tool = %request.tool, error = %message, "Tool execution failed");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ToolResponse::error(message, duration_ms)),
            ))
        }
    }
}
