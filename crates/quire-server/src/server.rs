use std::sync::Arc;

use tokio::net::TcpListener;

use quire_sdk::Engine;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Quire HTTP server. Owns one engine shared by all requests.
pub struct QuireServer {
    config: ServerConfig,
    engine: Arc<Engine>,
}

impl QuireServer {
    pub fn new(config: ServerConfig) -> Self {
        let engine = Arc::new(Engine::new(config.engine.clone()));
        Self { config, engine }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.engine))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "quire server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_construction() {
        let server = QuireServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr, "127.0.0.1:7878".parse().unwrap());
        assert_eq!(server.engine().config().node_id, 0);
    }

    #[test]
    fn router_builds() {
        let server = QuireServer::new(ServerConfig::default());
        let _router = server.router();
    }
}
