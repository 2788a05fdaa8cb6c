//! Per-trip seat inventory projected from a layout template.

/// Seat status transitions and passenger records.
pub mod booking;
/// Base prices and overrides.
pub mod pricing;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::TripError,
    layout::check_layout,
    models::{BusLayout, Grid, Seat, SeatCell, SeatId},
    save::TripPayload,
};

pub use booking::{Gender, Passenger, SeatStatus};
pub use pricing::PricingTable;

/// A template seat with its booking and fare state for one trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSeat {
    /// Template seat this trip seat was projected from.
    #[serde(flatten)]
    pub seat: Seat,
    /// Operational status for this trip.
    pub status: SeatStatus,
    /// Price from the per-type table.
    pub base_price: u32,
    /// Operator override, if any.
    pub custom_price: Option<u32>,
    /// Price charged: the override when set, else the base price.
    pub final_price: u32,
    /// Passenger holding the seat.
    pub passenger: Option<Passenger>,
}

impl TripSeat {
    /// Project a template seat. Merged berth halves carry no fare of their own.
    pub fn from_seat(seat: &Seat, pricing: &PricingTable) -> Self {
        let base_price = if seat.merged {
            0
        } else {
            pricing.price_for(seat.seat_type)
        };
        Self {
            seat: seat.clone(),
            status: SeatStatus::Available,
            base_price,
            custom_price: None,
            final_price: base_price,
            passenger: None,
        }
    }

    /// Whether the seat can carry a fare and a booking.
    pub fn is_sellable(&self) -> bool {
        self.seat.is_active()
    }
}

impl SeatCell for TripSeat {
    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }
}

/// Aggregate counts for a trip inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    /// Seats that are neither removed nor merged.
    pub sellable: usize,
    /// Sellable seats open for booking.
    pub available: usize,
    /// Sellable seats held back for this trip.
    pub blocked: usize,
    /// Sellable seats holding a passenger.
    pub booked: usize,
    /// Sum of final prices over booked seats.
    pub booked_revenue: u64,
    /// Sellable seats designated ladies-only in the template.
    pub ladies_seats: usize,
}

/// Bookable, priced copy of a layout for one trip.
///
/// The inventory owns its grids outright; nothing written here flows back into the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripInventory {
    layout: BusLayout<TripSeat>,
    pricing: PricingTable,
}

impl TripInventory {
    /// Project `layout` into a fresh inventory priced from `pricing`.
    pub fn project(layout: &BusLayout, pricing: &PricingTable) -> Self {
        let inventory = Self {
            layout: BusLayout {
                lower_deck: project_grid(&layout.lower_deck, pricing),
                upper_deck: layout
                    .upper_deck
                    .as_ref()
                    .map(|grid| project_grid(grid, pricing)),
            },
            pricing: *pricing,
        };
        info!(
            "projected trip inventory with {} sellable seats",
            inventory.layout.total_seats()
        );
        inventory
    }

    /// Resume a previously exported trip.
    ///
    /// The grids must pass the layout checks, every fare must resolve from its override or base
    /// price, and a seat must hold a passenger exactly when it is booked.
    pub fn from_payload(payload: TripPayload) -> Result<Self, TripError> {
        let layout = BusLayout {
            lower_deck: payload.lower_deck,
            upper_deck: payload.upper_deck,
        };

        let violations = check_layout(&layout);
        if !violations.is_empty() {
            let details = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(TripError::Invariant(details));
        }

        for cell in layout.cells() {
            let id = &cell.seat.id;
            let expected = cell.custom_price.unwrap_or(cell.base_price);
            if cell.final_price != expected {
                return Err(TripError::Invariant(format!(
                    "seat {id} charges {} but its fare resolves to {expected}",
                    cell.final_price
                )));
            }
            if (cell.status == SeatStatus::Booked) != cell.passenger.is_some() {
                return Err(TripError::Invariant(format!(
                    "seat {id} is {:?} but {} a passenger",
                    cell.status,
                    if cell.passenger.is_some() { "holds" } else { "lacks" }
                )));
            }
        }

        info!(
            "loaded trip '{}' with {} sellable seats",
            payload.layout_name,
            layout.total_seats()
        );
        Ok(Self {
            layout,
            pricing: payload.pricing,
        })
    }

    /// Trip grids for both decks.
    pub fn layout(&self) -> &BusLayout<TripSeat> {
        &self.layout
    }

    /// Base price table currently applied.
    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    /// Trip seat with `id`.
    pub fn seat(&self, id: &SeatId) -> Option<&TripSeat> {
        self.layout.find(id)
    }

    /// Sellable trip seat labelled `seat_number`.
    pub fn seat_by_number(&self, seat_number: &str) -> Option<&TripSeat> {
        self.layout.find_by_number(seat_number)
    }

    /// Sellable seats across both decks.
    pub fn total_seats(&self) -> usize {
        self.layout.total_seats()
    }

    /// Status counts and revenue over sellable seats.
    pub fn summary(&self) -> TripSummary {
        self.layout
            .cells()
            .filter(|cell| cell.is_sellable())
            .fold(TripSummary::default(), |mut summary, cell| {
                summary.sellable += 1;
                match cell.status {
                    SeatStatus::Available => summary.available += 1,
                    SeatStatus::Blocked => summary.blocked += 1,
                    SeatStatus::Booked => {
                        summary.booked += 1;
                        summary.booked_revenue += u64::from(cell.final_price);
                    }
                }
                if cell.seat.is_ladies {
                    summary.ladies_seats += 1;
                }
                summary
            })
    }

    /// Snapshot for export under `layout_name`.
    pub fn trip_payload(&self, layout_name: &str) -> TripPayload {
        TripPayload {
            layout_name: layout_name.to_string(),
            pricing: self.pricing,
            lower_deck: self.layout.lower_deck.clone(),
            upper_deck: self.layout.upper_deck.clone(),
            total_seats: self.total_seats(),
            summary: self.summary(),
        }
    }

    /// Sellable seat owning `id`; a merged half resolves to the seat spanning it.
    fn sellable_mut(&mut self, id: &SeatId) -> Result<&mut TripSeat, TripError> {
        let berth = self
            .layout
            .berth_id(id)
            .ok_or_else(|| TripError::SeatNotFound(id.clone()))?;
        let cell = self
            .layout
            .find_mut(&berth)
            .ok_or_else(|| TripError::SeatNotFound(id.clone()))?;
        if !cell.is_sellable() {
            return Err(TripError::NotSellable(berth));
        }
        Ok(cell)
    }
}

fn project_grid(grid: &Grid, pricing: &PricingTable) -> Grid<TripSeat> {
    Grid::from_rows(
        grid.rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().map(|seat| TripSeat::from_seat(seat, pricing)))
                    .collect()
            })
            .collect(),
    )
}
