//! Filesystem adapter with hot reload.

use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::adapter::{AdapterError, ConfigAdapter, RawConfig, RawFormat, FILE_ADAPTER};

/// Reads declared configuration from a single file and watches it for changes.
///
/// `.json` files are treated as JSON, everything else as TOML.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    path: PathBuf,
}

impl FileAdapter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn format_of(path: &Path) -> RawFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => RawFormat::Json,
        _ => RawFormat::Toml,
    }
}

fn read_file(path: &Path) -> Result<RawConfig, AdapterError> {
    let bytes = std::fs::read(path).map_err(|source| AdapterError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(RawConfig::new(
        format_of(path),
        path.display().to_string(),
        bytes,
    ))
}

/// The parent directory is watched, so events for siblings must be filtered out.
fn is_relevant(event: &Event, path: &Path) -> bool {
    if !(event.kind.is_modify() || event.kind.is_create()) {
        return false;
    }
    let Some(name) = path.file_name() else {
        return false;
    };
    event.paths.iter().any(|p| p.file_name() == Some(name))
}

impl ConfigAdapter for FileAdapter {
    fn name(&self) -> &'static str {
        FILE_ADAPTER
    }

    fn get_raw_config(&self) -> BoxFuture<'_, Result<RawConfig, AdapterError>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(&self.path)
                .await
                .map_err(|source| AdapterError::Read {
                    path: self.path.clone(),
                    source,
                })?;
            Ok(RawConfig::new(
                format_of(&self.path),
                self.path.display().to_string(),
                bytes,
            ))
        })
    }

    fn run(
        &self,
        cancel: CancellationToken,
    ) -> Result<mpsc::UnboundedReceiver<RawConfig>, AdapterError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let path = self.path.clone();
        let closed = tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !is_relevant(&event, &path) {
                        return;
                    }
                    tracing::debug!(path = %path.display(), kind = ?event.kind, "Config file change detected");
                    match read_file(&path) {
                        Ok(raw) => {
                            let _ = tx.send(raw);
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to read changed config file");
                        }
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default(),
        )
        .map_err(|source| AdapterError::Watch {
            path: self.path.clone(),
            source,
        })?;

        let watch_dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|source| AdapterError::Watch {
                path: watch_dir.clone(),
                source,
            })?;

        tracing::info!(path = %self.path.display(), "Config watcher started");

        let path = self.path.clone();
        tokio::spawn(async move {
            hold_watcher(watcher, closed, cancel).await;
            tracing::info!(path = %path.display(), "Config watcher stopped");
        });

        Ok(rx)
    }
}

/// Keep `watcher` alive until cancellation or until the receiver is dropped.
///
/// Dropping the watcher drops the callback's sender; with `tx` gone too the
/// channel closes.
async fn hold_watcher<W>(
    watcher: W,
    tx: mpsc::UnboundedSender<RawConfig>,
    cancel: CancellationToken,
) {
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = tx.closed() => {
            tracing::debug!("Config change receiver dropped");
        }
    }
    drop(watcher);
}
