//! REST API endpoints for the gateway

pub mod chat;
pub mod health;

use axum::{middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;

use crate::middleware::auth_middleware;
use crate::state::GatewayState;

/// Session-authenticated API routes plus the open health check.
pub fn create_rest_routes(state: Arc<GatewayState>) -> Router<Arc<GatewayState>> {
    Router::new()
        .merge(
            chat::create_chat_routes()
                .route_layer(axum_middleware::from_fn_with_state(state, auth_middleware)),
        )
        .route("/health", get(health::health_check))
}
