//! Web server for authgate.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::{AuthgateError, Database, Result};

use super::handlers::AppState;
use super::router::create_router;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Interval for purging expired sessions; disabled when zero.
    reap_interval: Duration,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, db: &Database) -> Result<Self> {
        let addr = format!("{}:{}", config.web.host, config.web.port)
            .parse()
            .map_err(|e| AuthgateError::Config(format!("invalid web server address: {e}")))?;

        let app_state = AppState::from_config(db, config)
            .map_err(|e| AuthgateError::Config(e.to_string()))?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            reap_interval: Duration::from_secs(config.session.reap_interval_secs),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shared application state.
    pub fn app_state(&self) -> Arc<AppState> {
        Arc::clone(&self.app_state)
    }

    fn prepare(self) -> Router {
        if !self.reap_interval.is_zero() {
            self.app_state.sessions.spawn_reaper(self.reap_interval);
            tracing::info!(
                interval_secs = self.reap_interval.as_secs(),
                "Session reaper started"
            );
        }

        create_router(self.app_state)
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        let router = self.prepare();

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        let router = self.prepare();

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashingConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn create_test_config() -> Config {
        let mut config = Config::default();
        config.web.host = "127.0.0.1".to_string();
        config.web.port = 0; // Use random port
        config.hashing = HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        config
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let config = create_test_config();
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::new(&config, &db).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
        assert_eq!(server.app_state().cookie_name, "session_token");
    }

    #[tokio::test]
    async fn test_web_server_invalid_address() {
        let mut config = create_test_config();
        config.web.host = "not an address".to_string();
        let db = Database::open_in_memory().await.unwrap();

        assert!(matches!(
            WebServer::new(&config, &db),
            Err(AuthgateError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let config = create_test_config();
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::new(&config, &db).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        // Test health endpoint
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("OK"));
    }

    #[tokio::test]
    async fn test_web_server_starts_reaper() {
        let mut config = create_test_config();
        config.session.ttl_secs = 1;
        config.session.reap_interval_secs = 1;
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::new(&config, &db).unwrap();
        let state = server.app_state();
        state.sessions.issue(crate::auth::Identity::new("alice"));

        server.run_with_addr().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(state.sessions.is_empty());
    }
}
