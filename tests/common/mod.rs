//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use control_plane::engine::{Activation, ActiveConfig, EngineError, ServingEngine, Snapshot};
use tracing_subscriber::fmt::MakeWriter;

/// Serving engine that counts load calls and delegates to `ActiveConfig`.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    inner: ActiveConfig,
    loads: AtomicUsize,
}

impl RecordingEngine {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn epoch(&self) -> u64 {
        self.inner.epoch()
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot()
    }

    /// Method constraint of the first route of the active configuration.
    pub fn first_route_methods(&self) -> Vec<String> {
        let snapshot = self.snapshot().expect("no active configuration");
        let route = snapshot.config.routes().next().expect("no routes");
        route.matchers[0].method.clone()
    }
}

impl ServingEngine for RecordingEngine {
    fn load(&self, payload: &[u8], force_reload: bool) -> Result<Activation, EngineError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(payload, force_reload)
    }
}

/// Poll `cond` every 20ms until it holds or `timeout` elapses.
pub async fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}

pub fn write_config(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// A single GraphQL route constrained to `methods`.
pub fn graphql_route(methods: &[&str]) -> String {
    let methods = methods
        .iter()
        .map(|m| format!("\"{m}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"
[server]
listen = [":4122"]

[[routes]]
path = ["/v1/graphql"]
methods = [{methods}]
handler = {{ name = "graphql" }}
"#
    )
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }

    /// Install as the thread's default subscriber until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buf: Arc::clone(&self.buf),
        }
    }
}
