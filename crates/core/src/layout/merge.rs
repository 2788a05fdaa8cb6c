//! Sleeper berth pairing within a single column.
//!
//! A sleeper occupies two vertically adjacent cells. The upper cell keeps the seat
//! identity and label; the lower cell is flagged `merged` and counts for nothing.

use crate::models::{Grid, SeatCell, SeatType};

/// Pair the live seats of `col` top to bottom into sleeper berths.
///
/// Removed seats are skipped, so pairs re-pack over gaps. A trailing odd seat stays a
/// standalone sleeper.
pub fn apply_merge<S: SeatCell>(grid: &mut Grid<S>, col: usize) {
    let live_rows = grid
        .column_rows(col)
        .into_iter()
        .filter(|row| {
            grid.cell(*row, col)
                .map(|cell| !cell.seat().removed)
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();

    for pair in live_rows.chunks(2) {
        for (index, row) in pair.iter().enumerate() {
            if let Some(cell) = grid.cell_mut(*row, col) {
                let seat = cell.seat_mut();
                seat.seat_type = SeatType::Sleeper;
                seat.merged = index == 1;
            }
        }
    }
}

/// Dissolve every berth in `col`, retyping live seats to `seat_type`.
///
/// Removed cells keep their type but lose any `merged` flag so the column ends up
/// fully unpaired.
pub fn remove_merge<S: SeatCell>(grid: &mut Grid<S>, col: usize, seat_type: SeatType) {
    for row in grid.column_rows(col) {
        if let Some(cell) = grid.cell_mut(row, col) {
            let seat = cell.seat_mut();
            if !seat.removed {
                seat.seat_type = seat_type;
            }
            seat.merged = false;
        }
    }
}

/// Row of the merged partner spanned by the seat at `row`, if any.
///
/// The partner is the next live seat below, provided it is flagged `merged`.
pub fn partner_row<S: SeatCell>(grid: &Grid<S>, row: usize, col: usize) -> Option<usize> {
    let below = grid
        .column_rows(col)
        .into_iter()
        .filter(|candidate| *candidate > row)
        .find(|candidate| {
            grid.cell(*candidate, col)
                .map(|cell| !cell.seat().removed)
                .unwrap_or(false)
        })?;
    grid.cell(below, col)
        .filter(|cell| cell.seat().merged)
        .map(|_| below)
}

/// Release live merged cells in `col` that no longer sit under a live, unmerged sleeper.
///
/// Returns the rows that were released.
pub fn release_orphans<S: SeatCell>(grid: &mut Grid<S>, col: usize) -> Vec<usize> {
    let mut released = Vec::new();
    let mut spanner_ok = false;
    for row in grid.column_rows(col) {
        let Some(cell) = grid.cell_mut(row, col) else {
            continue;
        };
        let seat = cell.seat_mut();
        if seat.removed {
            continue;
        }
        if seat.merged {
            if !spanner_ok || seat.seat_type != SeatType::Sleeper {
                seat.merged = false;
                released.push(row);
                spanner_ok = seat.seat_type == SeatType::Sleeper;
            } else {
                spanner_ok = false;
            }
        } else {
            spanner_ok = seat.seat_type == SeatType::Sleeper;
        }
    }
    released
}
