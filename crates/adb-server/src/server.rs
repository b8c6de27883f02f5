use std::sync::Arc;

use adb_sdk::Db;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AdbConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// ADB query server.
pub struct AdbServer {
    config: AdbConfig,
    db: Arc<Db>,
}

impl AdbServer {
    /// A server over `db`.
    pub fn new(config: AdbConfig, db: Arc<Db>) -> Self {
        Self { config, db }
    }

    /// A server over a fresh database whose build directory is
    /// `server.artifacts_dir`, preloaded when one is configured.
    pub fn with_artifacts(config: AdbConfig) -> ServerResult<Self> {
        let mut db = Db::new();
        if let Some(dir) = &config.server.artifacts_dir {
            db = db.with_build_dir(dir);
            let loaded = db.load_build_dir()?;
            info!(dir = %dir.display(), contracts = loaded.len(), "preloaded artifacts");
        }
        Ok(Self::new(config, Arc::new(db)))
    }

    pub fn config(&self) -> &AdbConfig {
        &self.config
    }

    pub fn db(&self) -> &Arc<Db> {
        &self.db
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.db), self.config.server.max_body_bytes)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.server.bind_addr).await?;
        info!("ADB server listening on {}", self.config.server.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
