//! AliGenie home skill server
//!
//! Loads `configuration.yaml` from the config directory and serves the home
//! skill endpoint.
//!
//! - `HA_CONFIG_DIR` (or the first argument): config directory, default `config`
//! - `ALIGENIE_BIND`: listen address, default `0.0.0.0:8123`
//! - `RUST_LOG`: log filter, default `info`
//!
//! The platform built here starts with no entity states and no registered
//! services. Until the host fills both, Discovery reports no devices and every
//! Control or Query answers `DEVICE_IS_NOT_EXIST`.

use anyhow::{Context as _, Result};
use ha_aligenie::http::{router, start_server};
use ha_aligenie::{HomeAssistant, HomeSkill, HomeSkillConfig};
use ha_config::{load_yaml, CoreConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "configuration.yaml";
const DEFAULT_CONFIG_DIR: &str = "config";
const DEFAULT_BIND: &str = "0.0.0.0:8123";

/// Config directory from the command line, then the environment
fn config_dir() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HA_CONFIG_DIR").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string())
        .into()
}

/// Build the platform and skill from a config directory
fn setup(config_dir: PathBuf) -> Result<(HomeAssistant, HomeSkill)> {
    let root = load_yaml(config_dir.clone(), CONFIG_FILE)
        .with_context(|| format!("loading {CONFIG_FILE} from {}", config_dir.display()))?;
    let core = CoreConfig::from_yaml(&root).context("parsing homeassistant section")?;

    let skill_config = match HomeSkillConfig::from_yaml(&root)? {
        Some(config) => config,
        None => {
            warn!("aligenie.home_skill is not configured, exposing every entity");
            HomeSkillConfig::default()
        }
    };
    let skill = HomeSkill::new(skill_config).context("building home skill")?;

    info!(name = %core.name, unit = %core.temperature_unit(), "Loaded configuration");
    Ok((HomeAssistant::new(core), skill))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting AliGenie home skill");

    let (hass, skill) = setup(config_dir())?;
    let app = router(Arc::new(hass.clone()), Arc::new(skill));

    let addr = std::env::var("ALIGENIE_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    tokio::select! {
        result = start_server(app, &addr) => result.with_context(|| format!("serving on {addr}"))?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down..."),
    }

    hass.services.block_till_done().await;
    Ok(())
}
