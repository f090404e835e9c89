//! Log subscriber setup for processes embedding AlertSync.
//!
//! The AlertSync crates log at `logging.level`, every other target at
//! `logging.dependencies`. A `RUST_LOG` in the environment replaces both.
//! The filter sits behind a reload layer so a re-read config can change it
//! without restarting.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

use crate::config::{AlertSyncConfig, LoggingConfig, loader};

/// Log targets owned by this workspace.
pub const ALERTSYNC_TARGETS: [&str; 4] = [
    "alertsync_core",
    "alertsync_client",
    "alertsync_client_memory",
    "alertsync_reconcile",
];

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Filter directive for `logging`, e.g.
/// `warn,alertsync_core=info,...,alertsync_reconcile=info`.
pub fn filter_directive(logging: &LoggingConfig) -> String {
    let mut directive = logging.dependencies.to_ascii_lowercase();
    let level = logging.level.to_ascii_lowercase();
    for target in ALERTSYNC_TARGETS {
        directive.push_str(&format!(",{target}={level}"));
    }
    directive
}

fn build_filter(logging: &LoggingConfig) -> Result<EnvFilter, String> {
    if std::env::var_os("RUST_LOG").is_some() {
        return EnvFilter::try_from_default_env().map_err(|e| format!("invalid RUST_LOG: {e}"));
    }
    EnvFilter::try_new(filter_directive(logging)).map_err(|e| format!("invalid log filter: {e}"))
}

/// Installs the global subscriber for `config`.
///
/// Returns `false` when a subscriber was already installed by someone else;
/// the filter handle is then left unset and [`reload_logging`] is a no-op.
pub fn init_tracing(config: &AlertSyncConfig) -> Result<bool, String> {
    let (layer, handle) = reload::Layer::new(build_filter(&config.logging)?);
    let installed = tracing_subscriber::registry()
        .with(layer)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok();
    if installed {
        let _ = FILTER_HANDLE.set(handle);
    }
    Ok(installed)
}

/// Swaps the active filter for the one `config` describes.
///
/// Returns whether a filter installed by [`init_tracing`] was updated.
pub fn reload_logging(config: &AlertSyncConfig) -> Result<bool, String> {
    let Some(handle) = FILTER_HANDLE.get() else {
        return Ok(false);
    };
    let filter = build_filter(&config.logging)?;
    handle
        .reload(filter)
        .map(|()| true)
        .map_err(|e| format!("log filter reload failed: {e}"))
}

/// Loads the configuration at `path` and sets up logging from it.
pub fn bootstrap(path: Option<&str>) -> Result<AlertSyncConfig, String> {
    let config = loader::load_config(path)?;
    init_tracing(&config)?;
    tracing::debug!(
        level = %config.logging.level,
        log_payloads = config.reconcile.log_payloads,
        "AlertSync logging initialized"
    );
    Ok(config)
}
