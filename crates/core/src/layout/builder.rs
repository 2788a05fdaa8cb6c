//! Seat grid generation from a layout configuration.

use tracing::info;

use crate::{
    error::LayoutError,
    models::{BusLayout, Deck, Grid, LayoutConfig, Seat, SeatType},
};

use super::merge;

/// Reject configurations that would produce empty grids.
pub fn validate_config(config: &LayoutConfig) -> Result<(), LayoutError> {
    for (field, value) in [
        ("rows", config.rows),
        ("leftSeats", config.left_seats),
        ("rightSeats", config.right_seats),
    ] {
        if value < 1 {
            return Err(LayoutError::InvalidConfig { field, value });
        }
    }
    Ok(())
}

/// Build one deck, numbering seats from `first_number`.
///
/// Returns the grid and the next unused seat number. Sleeper decks are paired
/// column by column before returning.
pub fn build_deck(
    config: &LayoutConfig,
    deck: Deck,
    seat_type: SeatType,
    first_number: u32,
) -> (Grid, u32) {
    let aisle = config.left_seats;
    let mut next_number = first_number;
    let rows = (0..config.rows)
        .map(|row| {
            (0..config.cols())
                .map(|col| {
                    if col == aisle {
                        return None;
                    }
                    let seat = Seat::new(deck, row, col, next_number, seat_type);
                    next_number += 1;
                    Some(seat)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut grid = Grid::from_rows(rows);
    if seat_type == SeatType::Sleeper {
        for col in (0..config.cols()).filter(|col| *col != aisle) {
            merge::apply_merge(&mut grid, col);
        }
    }
    (grid, next_number)
}

/// Build both decks for `config`. The upper deck is always sleeper and continues
/// the lower deck's numbering.
pub fn build_layout(config: &LayoutConfig) -> Result<BusLayout, LayoutError> {
    validate_config(config)?;

    let (lower_deck, next_number) = build_deck(config, Deck::Lower, config.default_seat_type, 1);
    let upper_deck = config
        .has_upper_deck
        .then(|| build_deck(config, Deck::Upper, SeatType::Sleeper, next_number).0);

    let layout = BusLayout {
        lower_deck,
        upper_deck,
    };
    info!(
        "generated {}x{} layout ({} lower, upper deck: {}) with {} seats",
        config.rows,
        config.cols(),
        config.default_seat_type,
        config.has_upper_deck,
        layout.total_seats()
    );
    Ok(layout)
}
