//! Structural invariant checks for layout grids.

use std::fmt;

use crate::models::{BusLayout, Deck, Grid, SeatCell, SeatId, SeatType};

/// A single broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A row's aisle is not at the deck's aisle column.
    AisleMismatch {
        /// Deck of the row.
        deck: Deck,
        /// Offending row.
        row: usize,
    },
    /// A seat's stored coordinates disagree with its slot.
    MisplacedSeat {
        /// Offending seat.
        id: SeatId,
    },
    /// A seat records the wrong deck.
    WrongDeck {
        /// Offending seat.
        id: SeatId,
    },
    /// A live merged cell has no live, unmerged sleeper above it.
    OrphanMerge {
        /// Offending seat.
        id: SeatId,
    },
    /// An upper deck seat is not a sleeper.
    UpperDeckNotSleeper {
        /// Offending seat.
        id: SeatId,
    },
    /// Two cells share the same identifier.
    DuplicateId {
        /// Repeated identifier.
        id: SeatId,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::AisleMismatch { deck, row } => {
                write!(f, "{deck} deck row {row} does not keep the aisle column")
            }
            Violation::MisplacedSeat { id } => write!(f, "seat {id} coordinates disagree with its slot"),
            Violation::WrongDeck { id } => write!(f, "seat {id} records the wrong deck"),
            Violation::OrphanMerge { id } => {
                write!(f, "merged seat {id} has no live sleeper spanning it")
            }
            Violation::UpperDeckNotSleeper { id } => {
                write!(f, "upper deck seat {id} is not a sleeper")
            }
            Violation::DuplicateId { id } => write!(f, "seat id {id} appears more than once"),
        }
    }
}

/// Collect every invariant violation in `layout`.
pub fn check_layout<S: SeatCell>(layout: &BusLayout<S>) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for (deck, grid) in layout.grids() {
        check_grid(deck, grid, &mut violations);
        for cell in grid.cells() {
            if !seen.insert(cell.seat().id.clone()) {
                violations.push(Violation::DuplicateId {
                    id: cell.seat().id.clone(),
                });
            }
        }
    }
    violations
}

fn check_grid<S: SeatCell>(deck: Deck, grid: &Grid<S>, violations: &mut Vec<Violation>) {
    let aisle = grid.aisle_col();
    for (row_index, row) in grid.rows().iter().enumerate() {
        let row_aisle = row.iter().position(Option::is_none);
        let aisle_count = row.iter().filter(|cell| cell.is_none()).count();
        if row_aisle != aisle || aisle_count != 1 || row.len() != grid.width() {
            violations.push(Violation::AisleMismatch {
                deck,
                row: row_index,
            });
        }
        for (col_index, cell) in row.iter().enumerate() {
            let Some(cell) = cell else {
                continue;
            };
            let seat = cell.seat();
            if seat.row != row_index || seat.col != col_index {
                violations.push(Violation::MisplacedSeat {
                    id: seat.id.clone(),
                });
            }
            if seat.deck != deck {
                violations.push(Violation::WrongDeck {
                    id: seat.id.clone(),
                });
            }
            if deck == Deck::Upper && seat.seat_type != SeatType::Sleeper {
                violations.push(Violation::UpperDeckNotSleeper {
                    id: seat.id.clone(),
                });
            }
        }
    }

    for col in 0..grid.width() {
        let mut spanner_ok = false;
        for row in grid.column_rows(col) {
            let Some(cell) = grid.cell(row, col) else {
                continue;
            };
            let seat = cell.seat();
            if seat.removed {
                continue;
            }
            if seat.merged {
                if !spanner_ok || seat.seat_type != SeatType::Sleeper {
                    violations.push(Violation::OrphanMerge {
                        id: seat.id.clone(),
                    });
                }
                spanner_ok = false;
            } else {
                spanner_ok = seat.seat_type == SeatType::Sleeper;
            }
        }
    }
}
