//! Config loader: initial activation plus the debounced watch loop.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::adapter::{self, ConfigAdapter, RawConfig};
use crate::compiler::ConfigCompiler;
use crate::config::{parse_duration, ConfigError, GatewaySettings};
use crate::engine::{Activation, ServingEngine};
use crate::observability::metrics;
use crate::reload::Debouncer;
use crate::{Error, Result};

/// Loader lifecycle.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Uninitialized = 0,
    Watching = 1,
    Stopped = 2,
}

impl From<u8> for LoaderState {
    fn from(val: u8) -> Self {
        match val {
            1 => LoaderState::Watching,
            2 => LoaderState::Stopped,
            _ => LoaderState::Uninitialized,
        }
    }
}

/// Compile-and-activate step shared by the initial load and every reload.
struct Reloader {
    compiler: ConfigCompiler,
    engine: Arc<dyn ServingEngine>,
}

impl Reloader {
    fn apply(&self, raw: &RawConfig) -> Result<Activation> {
        let outcome = self
            .compiler
            .compile_to_bytes(raw)
            .map_err(Error::from)
            .and_then(|payload| self.engine.load(&payload, false).map_err(Error::from));

        match &outcome {
            Ok(Activation::Applied { .. }) => metrics::record_reload("applied"),
            Ok(Activation::Unchanged) => metrics::record_reload("unchanged"),
            Err(_) => metrics::record_reload("failed"),
        }
        outcome
    }

    /// Debounced reload: failures are logged and the active config is kept.
    fn reload(&self, raw: RawConfig) {
        match self.apply(&raw) {
            Ok(Activation::Applied { epoch }) => {
                tracing::info!(origin = %raw.origin(), epoch, "Configuration reloaded");
            }
            Ok(Activation::Unchanged) => {
                tracing::debug!(origin = %raw.origin(), "Configuration unchanged");
            }
            Err(e) => {
                tracing::error!(
                    origin = %raw.origin(),
                    error = %e,
                    "Failed to reload configuration. Keeping current configuration."
                );
            }
        }
    }
}

pub struct ConfigLoader {
    adapter: Box<dyn ConfigAdapter>,
    reloader: Arc<Reloader>,
    debounce_interval: Duration,
    state: AtomicU8,
}

impl ConfigLoader {
    pub fn new(
        adapter: Box<dyn ConfigAdapter>,
        compiler: ConfigCompiler,
        engine: Arc<dyn ServingEngine>,
        debounce_interval: Duration,
    ) -> Self {
        Self {
            adapter,
            reloader: Arc::new(Reloader { compiler, engine }),
            debounce_interval,
            state: AtomicU8::new(LoaderState::Uninitialized as u8),
        }
    }

    /// Resolve the adapter, then load and activate the initial configuration.
    ///
    /// Any failure here is fatal: there is no configuration to fall back to.
    pub async fn initialize(
        settings: &GatewaySettings,
        engine: Arc<dyn ServingEngine>,
    ) -> Result<Self> {
        let adapter = adapter::resolve(&settings.config)?;
        let interval = parse_duration(&settings.config.debounce_interval)
            .map_err(ConfigError::from)?;

        let loader = Self::new(adapter, ConfigCompiler::from_settings(settings), engine, interval);
        loader.load_initial().await?;
        Ok(loader)
    }

    /// Read, compile and activate the current configuration, then enter `Watching`.
    pub async fn load_initial(&self) -> Result<Activation> {
        let raw = self.adapter.get_raw_config().await?;
        let outcome = self.reloader.apply(&raw)?;

        tracing::info!(
            adapter = self.adapter.name(),
            origin = %raw.origin(),
            format = %raw.format(),
            "Initial configuration loaded"
        );
        self.set_state(LoaderState::Watching);
        Ok(outcome)
    }

    /// Apply adapter changes until `cancel` fires or the adapter's channel closes.
    ///
    /// A watch that cannot start is logged; the loaded configuration keeps
    /// serving and the loader moves to `Stopped`.
    pub async fn watch(&self, cancel: CancellationToken) -> Result<()> {
        if self.state() != LoaderState::Watching {
            return Err(Error::NotInitialized);
        }

        let mut rx = match self.adapter.run(cancel.clone()) {
            Ok(rx) => rx,
            Err(e) => {
                tracing::error!(
                    adapter = self.adapter.name(),
                    error = %e,
                    "Unable to watch configuration; live updates disabled"
                );
                self.set_state(LoaderState::Stopped);
                return Ok(());
            }
        };

        let reloader = Arc::clone(&self.reloader);
        let debouncer = Debouncer::new(
            self.debounce_interval,
            cancel.child_token(),
            move |raw: RawConfig| reloader.reload(raw),
        );

        tracing::info!(
            adapter = self.adapter.name(),
            debounce_ms = self.debounce_interval.as_millis() as u64,
            "Watching configuration"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Configuration watch cancelled");
                    break;
                }
                msg = rx.recv() => match msg {
                    Some(raw) => {
                        tracing::debug!(origin = %raw.origin(), "Configuration change detected");
                        debouncer.call(raw);
                    }
                    None => {
                        tracing::warn!(adapter = self.adapter.name(), "Configuration watch ended");
                        break;
                    }
                },
            }
        }

        self.set_state(LoaderState::Stopped);
        Ok(())
    }

    pub fn state(&self) -> LoaderState {
        LoaderState::from(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: LoaderState) {
        self.state.store(state as u8, Ordering::Release);
    }
}
