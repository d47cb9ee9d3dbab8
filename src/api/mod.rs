// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::middleware::request_observer,
    state::AppState,
    tools::{ToolRequest, ToolResponse},
};

pub mod health;
pub mod tools;
pub mod users;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        .route("/tool", post(tools::dispatch_tool))
        .route("/v1/users/me", get(users::get_current_user))
        .with_state(state.clone());

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(state, request_observer))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        tools::dispatch_tool,
        users::get_current_user
    ),
    components(
        schemas(
            health::HealthResponse,
            ToolRequest,
            ToolResponse,
            users::UserMeResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness probes"),
        (name = "Tools", description = "Authenticated tool dispatch"),
        (name = "Users", description = "Caller identity")
    )
)]
struct ApiDoc;
