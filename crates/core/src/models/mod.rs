//! Shared domain models for seat layouts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical seat kinds offered on a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeatType {
    /// Upright seat occupying a single cell.
    Seater,
    /// Lie-flat berth spanning two vertically adjacent cells.
    Sleeper,
    /// Reclining seat occupying a single cell.
    SemiSleeper,
}

impl SeatType {
    /// Label used in payloads and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            SeatType::Seater => "seater",
            SeatType::Sleeper => "sleeper",
            SeatType::SemiSleeper => "semi-sleeper",
        }
    }
}

impl fmt::Display for SeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical level of the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deck {
    /// Ground level, always present.
    Lower,
    /// Optional upper level, sleeper-only.
    Upper,
}

impl Deck {
    fn code(self) -> char {
        match self {
            Deck::Lower => 'L',
            Deck::Upper => 'U',
        }
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deck::Lower => f.write_str("lower"),
            Deck::Upper => f.write_str("upper"),
        }
    }
}

/// Stable seat identifier derived from the seat's deck and grid slot.
///
/// Identifiers never change when seats are renumbered, so callers can hold on to them
/// across edits and undo/redo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(String);

impl SeatId {
    /// Build the identifier for the cell at `row`/`col` on `deck`.
    pub fn new(deck: Deck, row: usize, col: usize) -> Self {
        Self(format!("{}-{row}-{col}", deck.code()))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeatId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A seat cell of a layout template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    /// Stable identifier, unique across both decks.
    pub id: SeatId,
    /// Display label shown to passengers and operators.
    pub seat_number: String,
    /// Physical seat kind.
    #[serde(rename = "type")]
    pub seat_type: SeatType,
    /// Deck this seat belongs to.
    pub deck: Deck,
    /// Zero-based grid row.
    pub row: usize,
    /// Zero-based grid column.
    pub col: usize,
    /// Excluded from counts and selection, but recoverable.
    #[serde(default)]
    pub removed: bool,
    /// Lower half of a sleeper berth; the seat directly above spans it.
    #[serde(default)]
    pub merged: bool,
    /// Template designation for ladies-only seating.
    #[serde(default)]
    pub is_ladies: bool,
    /// Template designation for seats withheld from sale.
    #[serde(default)]
    pub is_blocked: bool,
}

impl Seat {
    /// Create a fresh, active seat.
    pub fn new(deck: Deck, row: usize, col: usize, seat_number: u32, seat_type: SeatType) -> Self {
        Self {
            id: SeatId::new(deck, row, col),
            seat_number: seat_number.to_string(),
            seat_type,
            deck,
            row,
            col,
            removed: false,
            merged: false,
            is_ladies: false,
            is_blocked: false,
        }
    }

    /// Whether the seat contributes to the seat count.
    pub fn is_active(&self) -> bool {
        !self.removed && !self.merged
    }
}

/// Access to the template seat carried by a grid cell.
///
/// Implemented by the template [`Seat`] itself and by trip-level seats wrapping one,
/// so a single [`Grid`] implementation serves both editing and booking.
pub trait SeatCell {
    /// Borrow the underlying template seat.
    fn seat(&self) -> &Seat;
    /// Mutably borrow the underlying template seat.
    fn seat_mut(&mut self) -> &mut Seat;
}

impl SeatCell for Seat {
    fn seat(&self) -> &Seat {
        self
    }

    fn seat_mut(&mut self) -> &mut Seat {
        self
    }
}

/// Row-major grid of one deck. `None` cells mark the aisle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid<S = Seat> {
    rows: Vec<Vec<Option<S>>>,
}

impl<S> Default for Grid<S> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<S: SeatCell> Grid<S> {
    /// Wrap pre-built rows.
    pub fn from_rows(rows: Vec<Vec<Option<S>>>) -> Self {
        Self { rows }
    }

    /// Borrow the raw rows.
    pub fn rows(&self) -> &[Vec<Option<S>>] {
        &self.rows
    }

    /// Number of rows in the grid.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns, aisle included.
    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Column index of the aisle, taken from the first row.
    pub fn aisle_col(&self) -> Option<usize> {
        self.rows.first()?.iter().position(Option::is_none)
    }

    /// Cell at `row`/`col`, if it holds a seat.
    pub fn cell(&self, row: usize, col: usize) -> Option<&S> {
        self.rows.get(row)?.get(col)?.as_ref()
    }

    /// Mutable cell at `row`/`col`, if it holds a seat.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut S> {
        self.rows.get_mut(row)?.get_mut(col)?.as_mut()
    }

    /// Every seat cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &S> {
        self.rows.iter().flatten().flatten()
    }

    /// Every seat cell in row-major order, mutably.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut S> {
        self.rows.iter_mut().flatten().flatten()
    }

    /// Cell holding the seat with `id`.
    pub fn find(&self, id: &SeatId) -> Option<&S> {
        self.cells().find(|cell| &cell.seat().id == id)
    }

    /// Mutable cell holding the seat with `id`.
    pub fn find_mut(&mut self, id: &SeatId) -> Option<&mut S> {
        self.cells_mut().find(|cell| &cell.seat().id == id)
    }

    /// Grid coordinates of the seat with `id`.
    pub fn position(&self, id: &SeatId) -> Option<(usize, usize)> {
        self.find(id).map(|cell| (cell.seat().row, cell.seat().col))
    }

    /// Resolve a slot to its logical berth.
    ///
    /// A live merged slot resolves to the nearest live seat above it, which spans it.
    /// Every other slot resolves to itself.
    pub fn berth_at(&self, row: usize, col: usize) -> Option<&S> {
        let cell = self.cell(row, col)?;
        if !cell.seat().merged || cell.seat().removed {
            return Some(cell);
        }
        (0..row)
            .rev()
            .filter_map(|above| self.cell(above, col))
            .find(|above| !above.seat().removed)
            .or(Some(cell))
    }

    /// Row indices in `col` that hold a seat, top to bottom.
    pub fn column_rows(&self, col: usize) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches!(row.get(col), Some(Some(_))))
            .map(|(index, _)| index)
            .collect()
    }

    /// Seats that are neither removed nor merged.
    pub fn active_seat_count(&self) -> usize {
        self.cells().filter(|cell| cell.seat().is_active()).count()
    }
}

/// Both decks of one bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusLayout<S = Seat> {
    /// Always-present ground deck.
    pub lower_deck: Grid<S>,
    /// Optional sleeper deck.
    pub upper_deck: Option<Grid<S>>,
}

impl<S: SeatCell> BusLayout<S> {
    /// Borrow the grid for `deck`.
    pub fn deck(&self, deck: Deck) -> Option<&Grid<S>> {
        match deck {
            Deck::Lower => Some(&self.lower_deck),
            Deck::Upper => self.upper_deck.as_ref(),
        }
    }

    /// Mutably borrow the grid for `deck`.
    pub fn deck_mut(&mut self, deck: Deck) -> Option<&mut Grid<S>> {
        match deck {
            Deck::Lower => Some(&mut self.lower_deck),
            Deck::Upper => self.upper_deck.as_mut(),
        }
    }

    /// Grids in deck order, lower first.
    pub fn grids(&self) -> impl Iterator<Item = (Deck, &Grid<S>)> {
        std::iter::once((Deck::Lower, &self.lower_deck))
            .chain(self.upper_deck.as_ref().map(|grid| (Deck::Upper, grid)))
    }

    /// Seat cells across both decks, lower first, row-major.
    pub fn cells(&self) -> impl Iterator<Item = &S> {
        self.grids().flat_map(|(_, grid)| grid.cells())
    }

    /// Cell holding the seat with `id` on either deck.
    pub fn find(&self, id: &SeatId) -> Option<&S> {
        self.grids().find_map(|(_, grid)| grid.find(id))
    }

    /// Mutable cell holding the seat with `id` on either deck.
    pub fn find_mut(&mut self, id: &SeatId) -> Option<&mut S> {
        if self.lower_deck.find(id).is_some() {
            return self.lower_deck.find_mut(id);
        }
        self.upper_deck.as_mut()?.find_mut(id)
    }

    /// First active seat labelled `seat_number`.
    pub fn find_by_number(&self, seat_number: &str) -> Option<&S> {
        self.cells()
            .find(|cell| cell.seat().is_active() && cell.seat().seat_number == seat_number)
    }

    /// Total seat count across both decks.
    pub fn total_seats(&self) -> usize {
        self.grids().map(|(_, grid)| grid.active_seat_count()).sum()
    }

    /// Deck and grid holding the seat with `id`.
    pub fn locate(&self, id: &SeatId) -> Option<(Deck, usize, usize)> {
        self.grids()
            .find_map(|(deck, grid)| grid.position(id).map(|(row, col)| (deck, row, col)))
    }

    /// Id of the logical berth owning `id`: the spanning seat when `id` is a merged slot.
    pub fn berth_id(&self, id: &SeatId) -> Option<SeatId> {
        let (deck, row, col) = self.locate(id)?;
        let grid = self.deck(deck)?;
        grid.berth_at(row, col).map(|cell| cell.seat().id.clone())
    }
}

/// Parameters for generating a fresh layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Number of seat rows per deck.
    pub rows: usize,
    /// Seats left of the aisle.
    pub left_seats: usize,
    /// Seats right of the aisle.
    pub right_seats: usize,
    /// Whether an upper sleeper deck is built.
    #[serde(default)]
    pub has_upper_deck: bool,
    /// Seat type for the lower deck.
    pub default_seat_type: SeatType,
}

impl LayoutConfig {
    /// Columns per row, aisle included.
    pub fn cols(&self) -> usize {
        self.left_seats + 1 + self.right_seats
    }

    /// Seats per deck before any sleeper pairing.
    pub fn seats_per_deck(&self) -> usize {
        self.rows * (self.left_seats + self.right_seats)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            left_seats: 2,
            right_seats: 2,
            has_upper_deck: false,
            default_seat_type: SeatType::Seater,
        }
    }
}
