//! Control plane binary.
//!
//! ```text
//! control-plane --config control-plane.toml
//! ```

use std::path::PathBuf;

use clap::Parser;

use control_plane::config::{load_settings, ConfigError, GatewaySettings};
use control_plane::lifecycle::{signals, startup, Shutdown};
use control_plane::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "control-plane", version, about = "Dynamic configuration control plane")]
struct Cli {
    /// Path to the process settings file
    #[arg(short, long, default_value = "control-plane.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (settings, missing) = match load_settings(&cli.config) {
        Ok(settings) => (settings, false),
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            (GatewaySettings::default(), true)
        }
        Err(e) => return Err(e.into()),
    };

    init_logging(&settings.logging.level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "control-plane starting");

    if missing {
        tracing::warn!(path = %cli.config.display(), "Settings file not found, using defaults");
    }

    tracing::info!(
        adapter = %settings.config.adapter,
        path = %settings.config.path,
        debounce_interval = %settings.config.debounce_interval,
        "Settings loaded"
    );

    let shutdown = Shutdown::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            signals::wait_for_signal().await;
            shutdown.trigger();
        }
    });

    startup::run(settings, shutdown).await?;
    Ok(())
}
