//! Shared utilities for integration tests.

use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

use spa_devserver::{DevServerConfig, HttpServer, Shutdown};
use tempfile::TempDir;
use tokio::task::JoinHandle;

pub const SHELL: &str = "<!doctype html><title>shell</title>";
pub const STYLES: &str = "body { margin: 0 }";
pub const SCRIPT: &str = "import init from './pkg/app.js';";
pub const WASM: &[u8] = b"\0asm\x01\0\0\0";
pub const ICON: &[u8] = b"\0\0\x01\0";

/// A running server bound to an ephemeral port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
    _assets: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Asset directory shaped like the bundler's output.
pub fn asset_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), SHELL).unwrap();
    fs::write(dir.path().join("app.css"), STYLES).unwrap();
    fs::write(dir.path().join("main.js"), SCRIPT).unwrap();
    fs::write(dir.path().join("bundle.wasm"), WASM).unwrap();
    fs::write(dir.path().join("favicon.ico"), ICON).unwrap();
    fs::create_dir(dir.path().join("pkg")).unwrap();
    fs::write(dir.path().join("pkg").join("app_bg.wasm"), WASM).unwrap();
    dir
}

/// Start a server over a fresh asset directory. `config.assets.directory` is replaced.
pub async fn start_server(mut config: DevServerConfig) -> TestServer {
    let assets = asset_dir();
    config.assets.directory = assets.path().to_path_buf();

    let server = HttpServer::new(config).expect("rules compile");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    // Give the accept loop a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        shutdown,
        handle,
        _assets: assets,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
