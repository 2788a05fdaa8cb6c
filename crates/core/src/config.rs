//! Application configuration.
//!
//! Values are layered: built-in defaults, then `<config_dir>/seatgrid/config.json`,
//! then `SEATGRID__*` environment variables (for example `SEATGRID__HISTORY_LIMIT=50`,
//! `SEATGRID__DEFAULT_LAYOUT__ROWS=12` or `SEATGRID__PRICING__SEMI_SLEEPER=750`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    models::{LayoutConfig, SeatType},
    save::SnapshotStore,
    trip::PricingTable,
};

const CONFIG_DIR: &str = "seatgrid";
const CONFIG_FILE: &str = "config.json";
const ENV_PREFIX: &str = "SEATGRID";

/// Runtime configuration for the layout engine and its frontends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory exported snapshots are written to.
    pub snapshot_root: PathBuf,
    /// Undo depth cap; `0` keeps every snapshot.
    pub history_limit: usize,
    /// Layout generated when a script does not bring its own.
    pub default_layout: LayoutDefaults,
    /// Base fares applied when a trip is projected.
    pub pricing: PricingDefaults,
}

/// Default grid shape. Kept in snake_case so every key can be set from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutDefaults {
    /// Rows per deck.
    pub rows: usize,
    /// Seats left of the aisle.
    pub left_seats: usize,
    /// Seats right of the aisle.
    pub right_seats: usize,
    /// Whether a sleeper upper deck is generated.
    pub has_upper_deck: bool,
    /// Seat type of the lower deck.
    pub default_seat_type: SeatType,
}

/// Default fares, in snake_case for the same reason as [`LayoutDefaults`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingDefaults {
    /// Fare for seater seats.
    pub seater: u32,
    /// Fare for a full sleeper berth.
    pub sleeper: u32,
    /// Fare for semi-sleeper seats.
    pub semi_sleeper: u32,
}

impl Default for PricingDefaults {
    fn default() -> Self {
        PricingTable::default().into()
    }
}

impl From<PricingTable> for PricingDefaults {
    fn from(table: PricingTable) -> Self {
        Self {
            seater: table.seater,
            sleeper: table.sleeper,
            semi_sleeper: table.semi_sleeper,
        }
    }
}

impl From<PricingDefaults> for PricingTable {
    fn from(defaults: PricingDefaults) -> Self {
        Self {
            seater: defaults.seater,
            sleeper: defaults.sleeper,
            semi_sleeper: defaults.semi_sleeper,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_root: SnapshotStore::default_root(),
            history_limit: 100,
            default_layout: LayoutDefaults::default(),
            pricing: PricingDefaults::default(),
        }
    }
}

impl Default for LayoutDefaults {
    fn default() -> Self {
        LayoutConfig::default().into()
    }
}

impl From<LayoutConfig> for LayoutDefaults {
    fn from(config: LayoutConfig) -> Self {
        Self {
            rows: config.rows,
            left_seats: config.left_seats,
            right_seats: config.right_seats,
            has_upper_deck: config.has_upper_deck,
            default_seat_type: config.default_seat_type,
        }
    }
}

impl From<&LayoutDefaults> for LayoutConfig {
    fn from(defaults: &LayoutDefaults) -> Self {
        Self {
            rows: defaults.rows,
            left_seats: defaults.left_seats,
            right_seats: defaults.right_seats,
            has_upper_deck: defaults.has_upper_deck,
            default_seat_type: defaults.default_seat_type,
        }
    }
}

impl AppConfig {
    /// Load from the user's config file and environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load with `path` as the file layer. A missing file is not an error.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        Self::load_layers(path, environment())
    }

    fn load_layers(path: Option<PathBuf>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&AppConfig::default()).context("failed to encode default config")?,
        );
        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Json)
                    .required(false),
            );
        }
        builder = builder.add_source(env);

        let config: AppConfig = builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;
        Ok(config)
    }

    /// Layout configuration built from [`AppConfig::default_layout`].
    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig::from(&self.default_layout)
    }

    /// Price table built from [`AppConfig::pricing`].
    pub fn pricing_table(&self) -> PricingTable {
        self.pricing.into()
    }

    /// Undo cap for new editing sessions.
    pub fn history_cap(&self) -> Option<usize> {
        (self.history_limit > 0).then_some(self.history_limit)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Location of the user's config file, if a config directory exists.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Write the default configuration unless a config file already exists.
pub fn ensure_default_config() -> Result<()> {
    match config_path() {
        Some(path) => write_default_config(&path),
        None => Ok(()),
    }
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(&AppConfig::default())?;
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}
