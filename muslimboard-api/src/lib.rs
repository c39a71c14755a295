//! # Muslimboard API Server
//!
//! REST API serving monthly prayer schedules and proxying remote images.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness and cache statistics
//! - `GET /api/v1/shalat-schedule/by-coordinate` - Schedule by `latitude`/`longitude`
//! - `GET /api/v1/shalat-schedule/by-location` - Schedule by `province`/`city`
//! - `GET /api/v1/image?image=<url>` - Stream a remote image
//!
//! Schedule lookups go through a cache-aside layer keyed by the request's
//! path and query string.
//!
//! ## Example
//!
//! ```rust,ignore
//! use muslimboard_api::{ApiServer, ApiConfig};
//!
//! let server = ApiServer::new(ApiConfig::from_env()).await?;
//! server.run(([0, 0, 0, 0], 8080)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use dto::{Envelope, SchedulePayload};
pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState, CacheBackend};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use muslimboard_core::Result;

/// API server for Muslimboard.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    pub async fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self::with_state(AppState::new(config).await?))
    }

    /// Creates a server over prebuilt state.
    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!(
            upstream = %self.state.config.upstream.base_url,
            keep_alive_secs = self.state.config.keep_alive.as_secs(),
            cache_backend = ?self.state.config.cache_backend,
            cache_key_mode = ?self.state.config.cache_key_mode,
            "Muslimboard API server listening on {}",
            addr
        );

        axum::serve(listener, self.router()).await
    }
}
