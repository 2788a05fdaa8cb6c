//! Snapshot payloads and their on-disk export.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;

use crate::{
    models::{Grid, LayoutConfig},
    trip::{PricingTable, TripSeat, TripSummary},
};

/// Directory under `~/.config` used for exported snapshots.
pub const DEFAULT_SNAPSHOT_DIR: &str = "seatgrid/snapshots";

/// Saved layout template, as handed to a persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePayload {
    /// Operator-facing template name.
    pub layout_name: String,
    /// Configuration the grids were generated from.
    pub config: LayoutConfig,
    /// Lower deck grid.
    pub lower_deck: Grid,
    /// Upper deck grid, if the bus has one.
    pub upper_deck: Option<Grid>,
    /// Active seats across both decks.
    pub total_seats: usize,
}

/// Saved trip inventory: template cells plus status, fares and passengers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPayload {
    /// Template the trip was projected from.
    pub layout_name: String,
    /// Base price table in effect.
    pub pricing: PricingTable,
    /// Lower deck trip grid.
    pub lower_deck: Grid<TripSeat>,
    /// Upper deck trip grid, if the bus has one.
    pub upper_deck: Option<Grid<TripSeat>>,
    /// Sellable seats across both decks.
    pub total_seats: usize,
    /// Status counts and revenue at export time.
    pub summary: TripSummary,
}

/// Kind of snapshot stored in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    /// A [`TemplatePayload`].
    Template,
    /// A [`TripPayload`].
    Trip,
}

impl SnapshotKind {
    fn as_str(self) -> &'static str {
        match self {
            SnapshotKind::Template => "template",
            SnapshotKind::Trip => "trip",
        }
    }
}

/// Metadata describing an exported snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Absolute path to the snapshot file.
    pub path: PathBuf,
    /// Payload kind.
    pub kind: SnapshotKind,
    /// Layout name recorded in the payload.
    pub name: String,
    /// Export timestamp.
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile<T> {
    kind: SnapshotKind,
    name: String,
    saved_at: DateTime<Utc>,
    payload: T,
}

/// Writes and reads snapshot files under a root directory.
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    /// Create a store rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default location under the user's config directory.
    pub fn default_root() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_SNAPSHOT_DIR)
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Export a template snapshot.
    pub fn save_template(&self, payload: &TemplatePayload) -> Result<SnapshotEntry> {
        self.write(SnapshotKind::Template, &payload.layout_name, payload)
    }

    /// Export a trip snapshot.
    pub fn save_trip(&self, payload: &TripPayload) -> Result<SnapshotEntry> {
        self.write(SnapshotKind::Trip, &payload.layout_name, payload)
    }

    /// Load the template stored at `entry`.
    pub fn load_template(&self, entry: &SnapshotEntry) -> Result<TemplatePayload> {
        self.read(&entry.path, SnapshotKind::Template)
    }

    /// Load the trip stored at `entry`.
    pub fn load_trip(&self, entry: &SnapshotEntry) -> Result<TripPayload> {
        self.read(&entry.path, SnapshotKind::Trip)
    }

    /// All readable snapshots, most recent first.
    pub fn entries(&self) -> Result<Vec<SnapshotEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root).context("failed to read snapshot directory")? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if entry.path().extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            match self.read_header(&entry.path()) {
                Ok(file) => entries.push(SnapshotEntry {
                    path: entry.path(),
                    kind: file.kind,
                    name: file.name,
                    saved_at: file.saved_at,
                }),
                Err(err) => {
                    warn!("Failed to read snapshot {:?}: {err}", entry.path());
                }
            }
        }

        entries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(entries)
    }

    /// Most recent snapshot of `kind`, if any.
    pub fn latest(&self, kind: SnapshotKind) -> Result<Option<SnapshotEntry>> {
        Ok(self.entries()?.into_iter().find(|entry| entry.kind == kind))
    }

    fn write<T: Serialize>(
        &self,
        kind: SnapshotKind,
        name: &str,
        payload: &T,
    ) -> Result<SnapshotEntry> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;

        let saved_at = Utc::now();
        let file_name = format!(
            "{}_{}_{}.json",
            sanitize_component(name),
            kind.as_str(),
            saved_at.format("%Y%m%d%H%M%S%3f")
        );
        let path = self.root.join(file_name);
        let file = SnapshotFile {
            kind,
            name: name.to_string(),
            saved_at,
            payload,
        };
        let serialised = serde_json::to_vec_pretty(&file)?;
        fs::write(&path, serialised)
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(SnapshotEntry {
            path,
            kind,
            name: name.to_string(),
            saved_at,
        })
    }

    fn read<T: DeserializeOwned>(&self, path: &Path, kind: SnapshotKind) -> Result<T> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file: SnapshotFile<T> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        if file.kind != kind {
            anyhow::bail!(
                "{} holds a {:?} snapshot, expected {:?}",
                path.display(),
                file.kind,
                kind
            );
        }
        Ok(file.payload)
    }

    fn read_header(&self, path: &Path) -> Result<SnapshotFile<serde::de::IgnoredAny>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

fn sanitize_component(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') {
            result.push(ch);
        }
    }
    if result.is_empty() {
        "layout".to_string()
    } else {
        result
    }
}
