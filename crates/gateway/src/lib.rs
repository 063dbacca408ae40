//! # Agora Gateway Crate
//!
//! HTTP and WebSocket surface of the chat core. Requests are authenticated
//! from the session cookie and routed to the services in `agora-chats`.
//!
//! ## Architecture
//!
//! - **REST**: chat list, search, history paging, and mark-read
//! - **WebSocket**: the live connection at `/ws`
//! - **State**: shared services and the session authenticator
//! - **Middleware**: session auth, CORS, tracing, request logging
//!
//! ## Usage
//!
//! ```rust,no_run
//! use agora_gateway::{create_router, GatewayState};
//! # async fn run(state: GatewayState) -> std::io::Result<()> {
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
//! axum::serve(listener, app).await
//! # }
//! ```

pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod websocket;

pub use error::{GatewayError, GatewayResult};
pub use middleware::{auth_middleware, AuthenticatedUser};
pub use state::GatewayState;

use axum::{middleware as axum_middleware, Router};
use std::sync::Arc;

pub fn create_router(state: GatewayState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .merge(rest::create_rest_routes(state.clone()))
        .merge(websocket::create_websocket_routes())
        .with_state(state)
        .layer(middleware::create_cors_middleware())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(middleware::create_trace_middleware())
}
