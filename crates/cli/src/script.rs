use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use seatgrid_core::{
    save::SnapshotEntry, AppConfig, Deck, EditOutcome, LayoutConfig, LayoutEditor, Passenger,
    PricingTable, SeatId, SeatProperty, SeatType, SnapshotStore, TripInventory,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Editing script read from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub layout_name: String,
    #[serde(default)]
    pub config: Option<LayoutConfig>,
    #[serde(default)]
    pub pricing: Option<PricingTable>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse script {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Step {
    RemoveSeat { seat: SeatId },
    RestoreSeat { seat: SeatId },
    ChangeSeatType { seat: SeatId, seat_type: SeatType },
    SetSeatNumber { seat: SeatId, seat_number: String },
    SetLadies { seat: SeatId, value: bool },
    SetBlocked { seat: SeatId, value: bool },
    ColumnType { col: usize, seat_type: SeatType },
    Renumber,
    Undo,
    Redo,
    Reset,
    Project,
    SetPricing { pricing: PricingTable },
    SeatPrice {
        seat: SeatId,
        #[serde(default)]
        price: Option<u32>,
    },
    ColumnPrice {
        deck: Deck,
        col: usize,
        #[serde(default)]
        price: Option<u32>,
    },
    Book { seat: SeatId, passenger: Passenger },
    Unbook { seat: SeatId },
    ToggleBlock { seat: SeatId },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::RemoveSeat { .. } => "removeSeat",
            Step::RestoreSeat { .. } => "restoreSeat",
            Step::ChangeSeatType { .. } => "changeSeatType",
            Step::SetSeatNumber { .. } => "setSeatNumber",
            Step::SetLadies { .. } => "setLadies",
            Step::SetBlocked { .. } => "setBlocked",
            Step::ColumnType { .. } => "columnType",
            Step::Renumber => "renumber",
            Step::Undo => "undo",
            Step::Redo => "redo",
            Step::Reset => "reset",
            Step::Project => "project",
            Step::SetPricing { .. } => "setPricing",
            Step::SeatPrice { .. } => "seatPrice",
            Step::ColumnPrice { .. } => "columnPrice",
            Step::Book { .. } => "book",
            Step::Unbook { .. } => "unbook",
            Step::ToggleBlock { .. } => "toggleBlock",
        }
    }
}

/// Applies script steps to a template session and, once projected, its trip.
pub struct ScriptRunner {
    editor: LayoutEditor,
    pricing: PricingTable,
    trip: Option<TripInventory>,
}

impl ScriptRunner {
    pub fn new(script: &Script, config: &AppConfig) -> Result<Self> {
        let layout_config = script
            .config
            .clone()
            .unwrap_or_else(|| config.layout_config());
        let editor = LayoutEditor::with_history_limit(layout_config, config.history_cap())
            .context("failed to generate layout")?;
        info!(
            layout = %script.layout_name,
            seats = editor.total_seats(),
            "Layout generated"
        );
        Ok(Self {
            editor,
            pricing: script.pricing.unwrap_or_else(|| config.pricing_table()),
            trip: None,
        })
    }

    pub fn editor(&self) -> &LayoutEditor {
        &self.editor
    }

    pub fn trip(&self) -> Option<&TripInventory> {
        self.trip.as_ref()
    }

    /// Run `steps` in order, stopping at the first failure.
    pub fn run(&mut self, steps: &[Step]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            self.apply(step)
                .with_context(|| format!("step {index} ({}) failed", step.name()))?;
        }
        Ok(())
    }

    fn apply(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::RemoveSeat { seat } => log_edit(step, self.editor.remove_seat(seat)?),
            Step::RestoreSeat { seat } => log_edit(step, self.editor.restore_seat(seat)?),
            Step::ChangeSeatType { seat, seat_type } => {
                let outcome = self.editor.change_seat_type(seat, *seat_type)?;
                log_edit(step, outcome)
            }
            Step::SetSeatNumber { seat, seat_number } => {
                let outcome = self
                    .editor
                    .update_seat_property(seat, SeatProperty::SeatNumber(seat_number.clone()))?;
                log_edit(step, outcome)
            }
            Step::SetLadies { seat, value } => {
                let outcome = self
                    .editor
                    .update_seat_property(seat, SeatProperty::Ladies(*value))?;
                log_edit(step, outcome)
            }
            Step::SetBlocked { seat, value } => {
                let outcome = self
                    .editor
                    .update_seat_property(seat, SeatProperty::Blocked(*value))?;
                log_edit(step, outcome)
            }
            Step::ColumnType { col, seat_type } => {
                let outcome = self.editor.update_column_type(*col, *seat_type)?;
                log_edit(step, outcome)
            }
            Step::Renumber => log_edit(step, self.editor.auto_renumber()?),
            Step::Undo => {
                if !self.editor.undo() {
                    warn!("Nothing to undo");
                }
            }
            Step::Redo => {
                if !self.editor.redo() {
                    warn!("Nothing to redo");
                }
            }
            Step::Reset => {
                self.editor.reset()?;
                info!(seats = self.editor.total_seats(), "Layout reset");
            }
            Step::Project => {
                if self.trip.is_some() {
                    warn!("Replacing existing trip inventory");
                }
                self.trip = Some(TripInventory::project(self.editor.layout(), &self.pricing));
            }
            Step::SetPricing { pricing } => {
                self.trip_mut()?.set_pricing_table(*pricing);
                self.pricing = *pricing;
            }
            Step::SeatPrice { seat, price } => self.trip_mut()?.set_seat_override(seat, *price)?,
            Step::ColumnPrice { deck, col, price } => {
                let touched = self.trip_mut()?.set_column_override(*deck, *col, *price)?;
                debug!(%deck, col, touched, "Column price applied");
            }
            Step::Book { seat, passenger } => self.trip_mut()?.book(seat, passenger.clone())?,
            Step::Unbook { seat } => {
                self.trip_mut()?.unbook(seat)?;
            }
            Step::ToggleBlock { seat } => {
                self.trip_mut()?.toggle_block(seat)?;
            }
        }
        Ok(())
    }

    fn trip_mut(&mut self) -> Result<&mut TripInventory> {
        self.trip
            .as_mut()
            .ok_or_else(|| anyhow!("no trip inventory; add a project step first"))
    }

    /// Export the template, and the trip when one was projected.
    pub fn export(&self, store: &SnapshotStore, layout_name: &str) -> Result<Vec<SnapshotEntry>> {
        let mut entries = vec![store.save_template(&self.editor.template_payload(layout_name))?];
        if let Some(trip) = &self.trip {
            entries.push(store.save_trip(&trip.trip_payload(layout_name))?);
        }
        Ok(entries)
    }

    pub fn log_summary(&self) {
        info!(
            seats = self.editor.total_seats(),
            can_undo = self.editor.can_undo(),
            can_redo = self.editor.can_redo(),
            "Template ready"
        );
        if let Some(trip) = &self.trip {
            let summary = trip.summary();
            info!(
                sellable = summary.sellable,
                available = summary.available,
                blocked = summary.blocked,
                booked = summary.booked,
                revenue = summary.booked_revenue,
                "Trip ready"
            );
        }
    }
}

fn log_edit(step: &Step, outcome: EditOutcome) {
    match outcome {
        EditOutcome::Applied => debug!(op = step.name(), "Edit applied"),
        EditOutcome::Unchanged => debug!(op = step.name(), "Edit left layout unchanged"),
    }
}
