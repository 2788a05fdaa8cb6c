mod script;

use anyhow::{Context, Result};
use std::{
    env,
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};
use seatgrid_core::{
    config::{self, AppConfig},
    SnapshotStore,
};

use crate::script::{Script, ScriptRunner};

fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let script_path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: seatgrid <script.json>")?;
    let script = Script::from_path(&script_path)?;
    info!(path = %script_path.display(), steps = script.steps.len(), "Script loaded");

    let mut runner = ScriptRunner::new(&script, &config)?;
    runner.run(&script.steps)?;

    let store = SnapshotStore::new(&config.snapshot_root);
    for entry in runner.export(&store, &script.layout_name)? {
        info!(kind = ?entry.kind, path = %entry.path.display(), "Snapshot exported");
    }
    runner.log_summary();
    Ok(())
}

fn init_logging() -> Result<()> {
    let log_dir = env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("seatgrid.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
