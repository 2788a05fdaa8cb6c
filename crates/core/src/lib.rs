#![warn(clippy::all, missing_docs)]

//! Core domain logic for the seatgrid bus layout engine.
//!
//! This crate hosts the seat models, template generation and editing,
//! per-trip inventory, configuration handling and snapshot export
//! used by the command-line driver and any future frontends.

pub mod config;
pub mod error;
pub mod layout;
pub mod models;
pub mod save;
pub mod trip;

pub use config::AppConfig;
pub use error::{LayoutError, TripError};
pub use layout::{EditOutcome, LayoutEditor, SeatProperty};
pub use models::{BusLayout, Deck, Grid, LayoutConfig, Seat, SeatId, SeatType};
pub use save::{SnapshotKind, SnapshotStore, TemplatePayload, TripPayload};
pub use trip::{Gender, Passenger, PricingTable, SeatStatus, TripInventory, TripSeat, TripSummary};
