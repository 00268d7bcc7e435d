//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use context_server::config::ServerConfig;
use context_server::http::HttpServer;
use context_server::lifecycle::Shutdown;
use context_server::pages::{MemoryPageStore, PageStore};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server with `config` over an in-memory page store.
pub async fn start_server(config: ServerConfig) -> TestServer {
    start_server_with_store(config, Arc::new(MemoryPageStore::new())).await
}

pub async fn start_server_with_store(config: ServerConfig, store: Arc<dyn PageStore>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store).unwrap();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer { addr, shutdown, handle }
}

/// Config with a short simulated workload.
pub fn config_with_work_ms(work_ms: u64) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.hello.work_ms = work_ms;
    config
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
