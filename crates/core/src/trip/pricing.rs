//! Fare resolution: per-type base prices with per-seat and per-column overrides.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::TripError,
    models::{Deck, SeatId, SeatType},
};

use super::{TripInventory, TripSeat};

/// Base fare for each seat type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PricingTable {
    /// Fare for seater seats.
    pub seater: u32,
    /// Fare for a full sleeper berth.
    pub sleeper: u32,
    /// Fare for semi-sleeper seats.
    pub semi_sleeper: u32,
}

impl PricingTable {
    /// Fare for `seat_type`.
    pub fn price_for(&self, seat_type: SeatType) -> u32 {
        match seat_type {
            SeatType::Seater => self.seater,
            SeatType::Sleeper => self.sleeper,
            SeatType::SemiSleeper => self.semi_sleeper,
        }
    }

    /// Replace the fare for `seat_type`.
    pub fn set(&mut self, seat_type: SeatType, price: u32) {
        match seat_type {
            SeatType::Seater => self.seater = price,
            SeatType::Sleeper => self.sleeper = price,
            SeatType::SemiSleeper => self.semi_sleeper = price,
        }
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            seater: 500,
            sleeper: 1200,
            semi_sleeper: 800,
        }
    }
}

impl TripSeat {
    /// Set or clear the operator override.
    pub fn set_override(&mut self, price: Option<u32>) {
        self.custom_price = price;
        self.final_price = price.unwrap_or(self.base_price);
    }

    fn reprice(&mut self, table: &PricingTable) {
        self.base_price = table.price_for(self.seat.seat_type);
        self.final_price = self.custom_price.unwrap_or(self.base_price);
    }
}

impl TripInventory {
    /// Apply a new base price table. Overridden seats keep their override.
    pub fn set_pricing_table(&mut self, table: PricingTable) {
        self.pricing = table;
        let grids = std::iter::once(&mut self.layout.lower_deck).chain(self.layout.upper_deck.as_mut());
        for grid in grids {
            for cell in grid.cells_mut().filter(|cell| cell.is_sellable()) {
                cell.reprice(&table);
            }
        }
        debug!("pricing table updated: {table:?}");
    }

    /// Change the base price of one seat type.
    pub fn set_base_price(&mut self, seat_type: SeatType, price: u32) {
        let mut table = self.pricing;
        table.set(seat_type, price);
        self.set_pricing_table(table);
    }

    /// Set or clear the override for one seat.
    pub fn set_seat_override(&mut self, id: &SeatId, price: Option<u32>) -> Result<(), TripError> {
        let cell = self.sellable_mut(id)?;
        cell.set_override(price);
        debug!("seat {} fare now {}", cell.seat.id, cell.final_price);
        Ok(())
    }

    /// Set or clear the override for every sellable seat of a column. Returns the seats touched.
    pub fn set_column_override(
        &mut self,
        deck: Deck,
        col: usize,
        price: Option<u32>,
    ) -> Result<usize, TripError> {
        let grid = self
            .layout
            .deck_mut(deck)
            .ok_or(TripError::DeckMissing(deck))?;
        if col >= grid.width() {
            return Err(TripError::ColumnOutOfRange {
                col,
                width: grid.width(),
            });
        }

        let mut touched = 0;
        for row in grid.column_rows(col) {
            if let Some(cell) = grid.cell_mut(row, col) {
                if cell.is_sellable() {
                    cell.set_override(price);
                    touched += 1;
                }
            }
        }
        debug!("{deck} deck column {col}: override {price:?} on {touched} seats");
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::LayoutEditor,
        models::LayoutConfig,
        trip::tests::{mixed_layout, pricing},
    };

    #[test]
    fn override_survives_table_change_until_cleared() -> anyhow::Result<()> {
        let editor = LayoutEditor::new(LayoutConfig::default())?;
        let mut trip = TripInventory::project(editor.layout(), &pricing());
        let target = SeatId::new(Deck::Lower, 0, 0);
        let other = SeatId::new(Deck::Lower, 0, 1);
        assert!(trip
            .layout()
            .cells()
            .all(|cell| cell.final_price == 500));

        trip.set_seat_override(&target, Some(700))?;
        assert_eq!(trip.seat(&target).map(|s| s.final_price), Some(700));

        trip.set_base_price(SeatType::Seater, 600);
        assert_eq!(trip.seat(&target).map(|s| s.final_price), Some(700));
        assert_eq!(trip.seat(&target).map(|s| s.base_price), Some(600));
        assert_eq!(trip.seat(&other).map(|s| s.final_price), Some(600));

        trip.set_seat_override(&target, None)?;
        let seat = trip.seat(&target).expect("seat");
        assert_eq!((seat.custom_price, seat.final_price), (None, 600));
        Ok(())
    }

    #[test]
    fn table_change_skips_merged_and_removed_seats() {
        let mut trip = TripInventory::project(&mixed_layout(), &pricing());
        trip.set_pricing_table(PricingTable {
            seater: 550,
            sleeper: 1000,
            semi_sleeper: 700,
        });

        let half = trip.seat(&SeatId::new(Deck::Upper, 1, 0)).expect("seat");
        assert_eq!(half.final_price, 0);
        let removed = trip.seat(&SeatId::new(Deck::Lower, 3, 0)).expect("seat");
        assert_eq!(removed.final_price, 500);
        let berth = trip.seat(&SeatId::new(Deck::Upper, 0, 0)).expect("seat");
        assert_eq!(berth.final_price, 1000);
        assert_eq!(trip.pricing().semi_sleeper, 700);
    }

    #[test]
    fn column_override_applies_to_sellable_seats() -> anyhow::Result<()> {
        let mut trip = TripInventory::project(&mixed_layout(), &pricing());

        assert_eq!(trip.set_column_override(Deck::Lower, 0, Some(450))?, 3);
        let removed = trip.seat(&SeatId::new(Deck::Lower, 3, 0)).expect("seat");
        assert_eq!(removed.custom_price, None);

        assert_eq!(trip.set_column_override(Deck::Upper, 2, Some(1500))?, 2);
        let half = trip.seat(&SeatId::new(Deck::Upper, 1, 2)).expect("seat");
        assert_eq!(half.final_price, 0);

        trip.set_column_override(Deck::Lower, 0, None)?;
        assert_eq!(
            trip.seat(&SeatId::new(Deck::Lower, 1, 0)).map(|s| s.final_price),
            Some(500)
        );

        assert_eq!(
            trip.set_column_override(Deck::Lower, 7, Some(1)),
            Err(TripError::ColumnOutOfRange { col: 7, width: 4 })
        );
        Ok(())
    }

    #[test]
    fn seat_override_on_merged_half_prices_the_berth() -> anyhow::Result<()> {
        let mut trip = TripInventory::project(&mixed_layout(), &pricing());
        trip.set_seat_override(&SeatId::new(Deck::Upper, 1, 0), Some(1100))?;
        let berth = trip.seat(&SeatId::new(Deck::Upper, 0, 0)).expect("seat");
        assert_eq!(berth.final_price, 1100);

        assert_eq!(
            trip.set_seat_override(&SeatId::new(Deck::Lower, 3, 0), Some(1)),
            Err(TripError::NotSellable(SeatId::new(Deck::Lower, 3, 0)))
        );
        Ok(())
    }
}
