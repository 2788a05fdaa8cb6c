//! Error types surfaced by the layout and trip engines.

use thiserror::Error;

use crate::models::{Deck, SeatId};

/// Failures raised while generating or editing a layout template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A configuration field is outside its accepted range.
    #[error("invalid layout configuration: {field} must be at least 1 (got {value})")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Value supplied by the caller.
        value: usize,
    },
    /// No seat carries the requested identifier.
    #[error("seat {0} not found")]
    SeatNotFound(SeatId),
    /// The requested deck is not part of this layout.
    #[error("layout has no {0} deck")]
    DeckMissing(Deck),
    /// Column index beyond the grid width.
    #[error("column {col} out of range (deck has {width} columns)")]
    ColumnOutOfRange {
        /// Requested column.
        col: usize,
        /// Grid width, aisle included.
        width: usize,
    },
    /// Column operations cannot target the aisle.
    #[error("column {0} is the aisle")]
    AisleColumn(usize),
    /// Another active seat already carries the label.
    #[error("seat number {number} is already used by seat {holder}")]
    DuplicateSeatNumber {
        /// Requested label.
        number: String,
        /// Active seat holding the label.
        holder: SeatId,
    },
    /// A loaded grid breaks a structural invariant.
    #[error("layout invariant violated: {0}")]
    Invariant(String),
}

/// Failures raised by pricing and booking operations on a trip inventory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TripError {
    /// No trip seat carries the requested identifier.
    #[error("seat {0} not found")]
    SeatNotFound(SeatId),
    /// The requested deck is not part of this trip.
    #[error("trip has no {0} deck")]
    DeckMissing(Deck),
    /// Column index beyond the grid width.
    #[error("column {col} out of range (deck has {width} columns)")]
    ColumnOutOfRange {
        /// Requested column.
        col: usize,
        /// Grid width, aisle included.
        width: usize,
    },
    /// The seat was removed from the template and cannot be sold.
    #[error("seat {0} is not sellable")]
    NotSellable(SeatId),
    /// The seat already carries a booking.
    #[error("seat {0} is already booked")]
    AlreadyBooked(SeatId),
    /// The seat is blocked for this trip.
    #[error("seat {0} is blocked")]
    Blocked(SeatId),
    /// The seat carries no booking to cancel.
    #[error("seat {0} is not booked")]
    NotBooked(SeatId),
    /// The passenger record misses mandatory data.
    #[error("invalid passenger: {0}")]
    InvalidPassenger(String),
    /// A loaded trip is structurally or internally inconsistent.
    #[error("trip invariant violated: {0}")]
    Invariant(String),
}
