#![allow(missing_docs)]

//! Seat status transitions for a trip.
//!
//! Every transition is an explicit operator action:
//! `available <-> blocked`, `available -> booked` (with a passenger) and
//! `booked -> available`. A booked seat is never blocked directly.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::TripError, models::SeatId};

use super::TripInventory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Blocked,
    Booked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Passenger attached to a booked seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub gender: Gender,
    pub age: u8,
}

impl Passenger {
    /// Check the mandatory fields of the record.
    pub fn validate(&self) -> Result<(), TripError> {
        if self.name.trim().is_empty() {
            return Err(TripError::InvalidPassenger("name is required".to_string()));
        }
        if self.phone.trim().is_empty() {
            return Err(TripError::InvalidPassenger("phone is required".to_string()));
        }
        if !(1..=120).contains(&self.age) {
            return Err(TripError::InvalidPassenger(format!(
                "age {} is out of range",
                self.age
            )));
        }
        match self.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() && !email.contains('@') => Err(
                TripError::InvalidPassenger(format!("email '{email}' is malformed")),
            ),
            _ => Ok(()),
        }
    }
}

impl TripInventory {
    /// Book an available seat for `passenger`.
    pub fn book(&mut self, id: &SeatId, passenger: Passenger) -> Result<(), TripError> {
        passenger.validate()?;
        let cell = self.sellable_mut(id)?;
        match cell.status {
            SeatStatus::Available => {}
            SeatStatus::Blocked => return Err(TripError::Blocked(cell.seat.id.clone())),
            SeatStatus::Booked => return Err(TripError::AlreadyBooked(cell.seat.id.clone())),
        }
        info!(
            "seat {} booked for {} at {}",
            cell.seat.seat_number, passenger.name, cell.final_price
        );
        cell.status = SeatStatus::Booked;
        cell.passenger = Some(passenger);
        Ok(())
    }

    /// Cancel a booking, returning the released passenger record.
    pub fn unbook(&mut self, id: &SeatId) -> Result<Passenger, TripError> {
        let cell = self.sellable_mut(id)?;
        if cell.status != SeatStatus::Booked {
            return Err(TripError::NotBooked(cell.seat.id.clone()));
        }
        let passenger = cell
            .passenger
            .take()
            .ok_or_else(|| TripError::NotBooked(cell.seat.id.clone()))?;
        cell.status = SeatStatus::Available;
        info!("seat {} released by {}", cell.seat.seat_number, passenger.name);
        Ok(passenger)
    }

    /// Flip a seat between available and blocked. Booked seats are rejected.
    pub fn toggle_block(&mut self, id: &SeatId) -> Result<SeatStatus, TripError> {
        let cell = self.sellable_mut(id)?;
        cell.status = match cell.status {
            SeatStatus::Available => SeatStatus::Blocked,
            SeatStatus::Blocked => SeatStatus::Available,
            SeatStatus::Booked => return Err(TripError::AlreadyBooked(cell.seat.id.clone())),
        };
        info!("seat {} is now {:?}", cell.seat.seat_number, cell.status);
        Ok(cell.status)
    }

    /// Block an available seat; blocking a blocked seat is a no-op.
    pub fn block(&mut self, id: &SeatId) -> Result<(), TripError> {
        match self.status_of(id)? {
            SeatStatus::Blocked => Ok(()),
            _ => self.toggle_block(id).map(|_| ()),
        }
    }

    /// Unblock a blocked seat; unblocking an available seat is a no-op.
    pub fn unblock(&mut self, id: &SeatId) -> Result<(), TripError> {
        match self.status_of(id)? {
            SeatStatus::Available => Ok(()),
            _ => self.toggle_block(id).map(|_| ()),
        }
    }

    fn status_of(&mut self, id: &SeatId) -> Result<SeatStatus, TripError> {
        self.sellable_mut(id).map(|cell| cell.status)
    }
}
