//! HTTP Server
//!
//! Combines all endpoint routers into the status API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::auth::{JwtConfig, JwtManager, SessionConfig};
use crate::observability::{Logger, MetricsRegistry};

use super::auth_routes::{auth_routes, AuthState};
use super::config::HttpServerConfig;
use super::incident_routes::incident_routes;
use super::service_routes::service_routes;
use super::status_routes::{health_routes, observability_routes, status_routes};
use super::ApiState;

/// HTTP server for the status API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with default configuration
    pub fn new() -> Self {
        Self::with_config(HttpServerConfig::default())
    }

    /// Create a new HTTP server with custom HTTP configuration
    pub fn with_config(config: HttpServerConfig) -> Self {
        Self::with_parts(config, JwtConfig::default(), SessionConfig::default())
    }

    /// Create a new HTTP server wiring all collaborator configuration
    pub fn with_parts(
        config: HttpServerConfig,
        jwt_config: JwtConfig,
        session_config: SessionConfig,
    ) -> Self {
        let router = Self::build_router(&config, jwt_config, session_config);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(
        config: &HttpServerConfig,
        jwt_config: JwtConfig,
        session_config: SessionConfig,
    ) -> Router {
        let metrics = Arc::new(MetricsRegistry::new());
        let auth_state = Arc::new(AuthState::new(jwt_config.clone(), session_config));
        let api_state = Arc::new(ApiState::new(
            JwtManager::new(jwt_config),
            metrics.clone(),
        ));

        let cors = if config.cors_origins.is_empty() {
            // No origins configured: permissive, for development
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
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(status_routes(api_state.clone()))
            .nest("/api/auth", auth_routes(auth_state))
            .nest("/api/services", service_routes(api_state.clone()))
            .nest("/api/incidents", incident_routes(api_state))
            .nest("/observability", observability_routes(metrics))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        Logger::info("HTTP_LISTEN", &[("addr", &addr.to_string())]);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

impl Default for HttpServer {
    fn default() -> Self {
        Self::new()
    }
}
