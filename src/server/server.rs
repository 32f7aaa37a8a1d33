// HTTP server wiring: router, CORS and request tracing.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes::api_routes;
use crate::engine::Engine;
use crate::utils::{
    config::ServerConfig,
    error::{EngineError, EngineResult},
};

/// HTTP server exposing the engine
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server using the engine's own server configuration
    pub fn new(engine: Engine) -> Self {
        let config = engine.config().server.clone();
        Self::with_config(engine, config)
    }

    /// Create a server with an explicit configuration
    pub fn with_config(engine: Engine, config: ServerConfig) -> Self {
        let router = Self::build_router(Arc::new(engine), &config);
        Self { config, router }
    }

    /// Build the router with CORS and tracing layers
    fn build_router(engine: Arc<Engine>, config: &ServerConfig) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        };

        api_routes(engine)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> EngineResult<()> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            EngineError::Configuration(format!("invalid listen address '{}': {}", self.config.socket_addr(), e))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| EngineError::Internal(format!("failed to bind {}: {}", addr, e)))?;

        tracing::info!(%addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .await
            .map_err(|e| EngineError::Internal(format!("server error: {}", e)))
    }
}
