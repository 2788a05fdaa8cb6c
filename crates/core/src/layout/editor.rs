//! Editing session over a layout template.

use tracing::{debug, info};

use crate::{
    error::LayoutError,
    models::{BusLayout, Deck, Grid, LayoutConfig, Seat, SeatId, SeatType},
    save::TemplatePayload,
};

use super::{builder, check, history::HistoryManager, merge};

/// Result of an edit that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The layout changed and one history entry was recorded.
    Applied,
    /// A policy guard or identical value left the layout untouched.
    Unchanged,
}

impl EditOutcome {
    /// Whether the layout changed.
    pub fn is_applied(self) -> bool {
        self == EditOutcome::Applied
    }
}

/// Plain seat attributes editable outside of type changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatProperty {
    /// Display label.
    SeatNumber(String),
    /// Ladies-only designation.
    Ladies(bool),
    /// Template-level block designation.
    Blocked(bool),
}

/// One template editing session: the current layout, its configuration and its history.
#[derive(Debug, Clone)]
pub struct LayoutEditor {
    config: LayoutConfig,
    layout: BusLayout,
    history: HistoryManager<BusLayout>,
}

impl LayoutEditor {
    /// Generate a fresh layout with unbounded history.
    pub fn new(config: LayoutConfig) -> Result<Self, LayoutError> {
        Self::with_history_limit(config, None)
    }

    /// Generate a fresh layout, capping history at `limit` entries.
    pub fn with_history_limit(
        config: LayoutConfig,
        limit: Option<usize>,
    ) -> Result<Self, LayoutError> {
        let layout = builder::build_layout(&config)?;
        Ok(Self {
            config,
            layout,
            history: HistoryManager::new(limit),
        })
    }

    /// Resume editing a previously exported template.
    pub fn from_template(
        payload: TemplatePayload,
        limit: Option<usize>,
    ) -> Result<Self, LayoutError> {
        builder::validate_config(&payload.config)?;
        let layout = BusLayout {
            lower_deck: payload.lower_deck,
            upper_deck: payload.upper_deck,
        };

        let config = payload.config;
        let shape_ok = |grid: &Grid| grid.height() == config.rows && grid.width() == config.cols();
        if !shape_ok(&layout.lower_deck) || layout.upper_deck.as_ref().is_some_and(|g| !shape_ok(g))
        {
            return Err(LayoutError::Invariant(format!(
                "grid shape does not match {}x{} configuration",
                config.rows,
                config.cols()
            )));
        }
        if layout.upper_deck.is_some() != config.has_upper_deck {
            return Err(LayoutError::Invariant(
                "upper deck presence does not match configuration".to_string(),
            ));
        }

        let violations = check::check_layout(&layout);
        if !violations.is_empty() {
            let details = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(LayoutError::Invariant(details));
        }

        info!(
            "loaded template '{}' with {} seats",
            payload.layout_name,
            layout.total_seats()
        );
        Ok(Self {
            config,
            layout,
            history: HistoryManager::new(limit),
        })
    }

    /// Configuration the current layout was generated from.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Current layout.
    pub fn layout(&self) -> &BusLayout {
        &self.layout
    }

    /// Active seats across both decks.
    pub fn total_seats(&self) -> usize {
        self.layout.total_seats()
    }

    /// Seat with `id` on either deck.
    pub fn seat(&self, id: &SeatId) -> Option<&Seat> {
        self.layout.find(id)
    }

    /// Active seat labelled `seat_number`.
    pub fn seat_by_number(&self, seat_number: &str) -> Option<&Seat> {
        self.layout.find_by_number(seat_number)
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the layout with a fresh one built from `config` and clear history.
    pub fn regenerate(&mut self, config: LayoutConfig) -> Result<(), LayoutError> {
        self.layout = builder::build_layout(&config)?;
        self.config = config;
        self.history.reset();
        Ok(())
    }

    /// Rebuild from the current configuration and clear history.
    pub fn reset(&mut self) -> Result<(), LayoutError> {
        self.regenerate(self.config.clone())
    }

    /// Take a seat out of service. Removing a spanning sleeper releases its partner.
    pub fn remove_seat(&mut self, id: &SeatId) -> Result<EditOutcome, LayoutError> {
        let (deck, row, col) = self.locate(id)?;
        self.commit("remove seat", |layout| {
            let grid = deck_grid(layout, deck)?;
            let Some(seat) = grid.cell(row, col) else {
                return Ok(());
            };
            if seat.removed {
                return Ok(());
            }
            let partner = if seat.merged {
                None
            } else {
                merge::partner_row(grid, row, col)
            };

            if let Some(seat) = grid.cell_mut(row, col) {
                seat.removed = true;
            }
            if let Some(partner) = partner.and_then(|partner| grid.cell_mut(partner, col)) {
                partner.merged = false;
            }
            merge::release_orphans(grid, col);
            Ok(())
        })
    }

    /// Bring a removed seat back.
    pub fn restore_seat(&mut self, id: &SeatId) -> Result<EditOutcome, LayoutError> {
        let (deck, row, col) = self.locate(id)?;
        self.commit("restore seat", |layout| {
            let grid = deck_grid(layout, deck)?;
            if let Some(seat) = grid.cell_mut(row, col) {
                seat.removed = false;
            }
            merge::release_orphans(grid, col);
            Ok(())
        })
    }

    /// Retype a single lower deck seat, pairing or releasing the seat below as needed.
    pub fn change_seat_type(
        &mut self,
        id: &SeatId,
        seat_type: SeatType,
    ) -> Result<EditOutcome, LayoutError> {
        let (deck, row, col) = self.locate(id)?;
        let current = self
            .layout
            .find(id)
            .ok_or_else(|| LayoutError::SeatNotFound(id.clone()))?;

        if deck == Deck::Upper {
            debug!("seat {id} is on the upper deck; type stays sleeper");
            return Ok(EditOutcome::Unchanged);
        }
        if current.merged {
            debug!("seat {id} is the lower half of a berth; type follows the berth");
            return Ok(EditOutcome::Unchanged);
        }
        if current.seat_type == seat_type {
            return Ok(EditOutcome::Unchanged);
        }
        let previous = current.seat_type;
        let removed = current.removed;

        self.commit("change seat type", |layout| {
            let grid = &mut layout.lower_deck;
            if seat_type == SeatType::Sleeper {
                let below_free = {
                    let grid: &Grid = grid;
                    grid.cell(row + 1, col)
                        .map(|below| {
                            let spans_own = below.seat_type == SeatType::Sleeper
                                && merge::partner_row(grid, row + 1, col).is_some();
                            !removed && !below.removed && !below.merged && !spans_own
                        })
                        .unwrap_or(false)
                };
                if let Some(seat) = grid.cell_mut(row, col) {
                    seat.seat_type = SeatType::Sleeper;
                }
                if below_free {
                    if let Some(below) = grid.cell_mut(row + 1, col) {
                        below.seat_type = SeatType::Sleeper;
                        below.merged = true;
                    }
                }
            } else {
                let partner = if previous == SeatType::Sleeper {
                    merge::partner_row(grid, row, col)
                } else {
                    None
                };
                if let Some(seat) = grid.cell_mut(row, col) {
                    seat.seat_type = seat_type;
                }
                if let Some(partner) = partner.and_then(|partner| grid.cell_mut(partner, col)) {
                    partner.seat_type = seat_type;
                    partner.merged = false;
                }
            }
            merge::release_orphans(grid, col);
            Ok(())
        })
    }

    /// Set a label or designation flag on one seat.
    ///
    /// An active seat cannot take a label another active seat already carries.
    pub fn update_seat_property(
        &mut self,
        id: &SeatId,
        property: SeatProperty,
    ) -> Result<EditOutcome, LayoutError> {
        self.locate(id)?;
        if let SeatProperty::SeatNumber(number) = &property {
            let target_active = self.layout.find(id).is_some_and(Seat::is_active);
            let holder = self.layout.cells().find(|seat| {
                seat.is_active() && seat.seat_number == *number && seat.id != *id
            });
            if let Some(holder) = holder.filter(|_| target_active) {
                return Err(LayoutError::DuplicateSeatNumber {
                    number: number.clone(),
                    holder: holder.id.clone(),
                });
            }
        }
        self.commit("update seat property", |layout| {
            let seat = layout
                .find_mut(id)
                .ok_or_else(|| LayoutError::SeatNotFound(id.clone()))?;
            match property {
                SeatProperty::SeatNumber(number) => seat.seat_number = number,
                SeatProperty::Ladies(value) => seat.is_ladies = value,
                SeatProperty::Blocked(value) => seat.is_blocked = value,
            }
            Ok(())
        })
    }

    /// Retype every seat of a lower deck column, pairing sleepers top to bottom.
    pub fn update_column_type(
        &mut self,
        col: usize,
        seat_type: SeatType,
    ) -> Result<EditOutcome, LayoutError> {
        let grid = &self.layout.lower_deck;
        if col >= grid.width() {
            return Err(LayoutError::ColumnOutOfRange {
                col,
                width: grid.width(),
            });
        }
        if grid.aisle_col() == Some(col) {
            return Err(LayoutError::AisleColumn(col));
        }

        self.commit("update column type", |layout| {
            if seat_type == SeatType::Sleeper {
                merge::apply_merge(&mut layout.lower_deck, col);
            } else {
                merge::remove_merge(&mut layout.lower_deck, col, seat_type);
            }
            Ok(())
        })
    }

    /// Relabel active seats 1..n in row-major order, lower deck first.
    ///
    /// Removed and merged cells keep their labels.
    pub fn auto_renumber(&mut self) -> Result<EditOutcome, LayoutError> {
        self.commit("renumber", |layout| {
            let mut next = 1u32;
            let grids = std::iter::once(&mut layout.lower_deck).chain(layout.upper_deck.as_mut());
            for grid in grids {
                for seat in grid.cells_mut().filter(|seat| seat.is_active()) {
                    seat.seat_number = next.to_string();
                    next += 1;
                }
            }
            Ok(())
        })
    }

    /// Revert the latest edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.layout);
        if undone {
            debug!("undo; {} seats", self.layout.total_seats());
        }
        undone
    }

    /// Reapply the latest undone edit. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.layout);
        if redone {
            debug!("redo; {} seats", self.layout.total_seats());
        }
        redone
    }

    /// Snapshot for export under `layout_name`.
    pub fn template_payload(&self, layout_name: &str) -> TemplatePayload {
        TemplatePayload {
            layout_name: layout_name.to_string(),
            config: self.config.clone(),
            lower_deck: self.layout.lower_deck.clone(),
            upper_deck: self.layout.upper_deck.clone(),
            total_seats: self.layout.total_seats(),
        }
    }

    fn locate(&self, id: &SeatId) -> Result<(Deck, usize, usize), LayoutError> {
        self.layout
            .locate(id)
            .ok_or_else(|| LayoutError::SeatNotFound(id.clone()))
    }

    /// Apply `edit` to a copy of the layout and keep it only if something changed.
    fn commit<F>(&mut self, action: &str, edit: F) -> Result<EditOutcome, LayoutError>
    where
        F: FnOnce(&mut BusLayout) -> Result<(), LayoutError>,
    {
        let mut next = self.layout.clone();
        edit(&mut next)?;
        if next == self.layout {
            debug!("{action}: no change");
            return Ok(EditOutcome::Unchanged);
        }
        self.history.record(&self.layout);
        self.layout = next;
        debug!("{action}: applied; {} seats", self.layout.total_seats());
        Ok(EditOutcome::Applied)
    }
}

fn deck_grid(layout: &mut BusLayout, deck: Deck) -> Result<&mut Grid, LayoutError> {
    layout.deck_mut(deck).ok_or(LayoutError::DeckMissing(deck))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::check::check_layout;
    use proptest::prelude::*;

    fn seater_config(rows: usize) -> LayoutConfig {
        LayoutConfig {
            rows,
            left_seats: 2,
            right_seats: 2,
            has_upper_deck: false,
            default_seat_type: SeatType::Seater,
        }
    }

    fn numbers(editor: &LayoutEditor) -> Vec<String> {
        editor
            .layout()
            .cells()
            .filter(|seat| seat.is_active())
            .map(|seat| seat.seat_number.clone())
            .collect()
    }

    fn id(deck: Deck, row: usize, col: usize) -> SeatId {
        SeatId::new(deck, row, col)
    }

    #[test]
    fn remove_renumber_then_undo() -> anyhow::Result<()> {
        let mut editor = LayoutEditor::new(seater_config(10))?;
        assert_eq!(editor.total_seats(), 40);

        let five = editor.seat_by_number("5").map(|seat| seat.id.clone());
        let five = five.expect("seat 5");
        assert_eq!(editor.remove_seat(&five)?, EditOutcome::Applied);
        assert_eq!(editor.total_seats(), 39);

        editor.auto_renumber()?;
        let expected = (1..=39).map(|n| n.to_string()).collect::<Vec<_>>();
        assert_eq!(numbers(&editor), expected);

        // renumbering records its own snapshot, so a single undo does not reach the removal;
        // one step reverts the renumbering, the next brings seat 5 back
        assert!(editor.undo());
        let still_removed = editor.seat(&five).expect("seat");
        assert!(still_removed.removed);
        assert_eq!(editor.total_seats(), 39);

        assert!(editor.undo());
        assert_eq!(editor.total_seats(), 40);
        let expected = (1..=40).map(|n| n.to_string()).collect::<Vec<_>>();
        assert_eq!(numbers(&editor), expected);
        assert_eq!(
            editor.seat(&five).map(|seat| seat.seat_number.as_str()),
            Some("5")
        );
        Ok(())
    }

    #[test]
    fn remove_and_restore_round_trip() -> anyhow::Result<()> {
        let mut editor = LayoutEditor::new(seater_config(3))?;
        let target = id(Deck::Lower, 1, 3);
        let before = editor.seat(&target).cloned();

        editor.remove_seat(&target)?;
        assert_eq!(editor.remove_seat(&target)?, EditOutcome::Unchanged);
        editor.restore_seat(&target)?;
        assert_eq!(editor.restore_seat(&target)?, EditOutcome::Unchanged);

        assert_eq!(editor.seat(&target).cloned(), before);
        Ok(())
    }

    #[test]
    fn unknown_seat_is_an_error() -> anyhow::Result<()> {
        let mut editor = LayoutEditor::new(seater_config(2))?;
        let missing = SeatId::from("L-9-9");
        assert_eq!(
            editor.remove_seat(&missing),
            Err(LayoutError::SeatNotFound(missing.clone()))
        );
        assert!(!editor.can_undo());
        Ok(())
    }

    #[test]
    fn sleeper_change_pairs_and_releases_seat_below() -> anyhow::Result<()> {
        let mut editor = LayoutEditor::new(seater_config(3))?;
        let top = id(Deck::Lower, 0, 0);
        let below = id(Deck::Lower, 1, 0);

        editor.change_seat_type(&top, SeatType::Sleeper)?;
        let merged = editor.seat(&below).expect("seat");
        assert!(merged.merged);
        assert_eq!(merged.seat_type, SeatType::Sleeper);
        assert_eq!(editor.total_seats(), 11);

        // the merged half has no independent type
        assert_eq!(
            editor.change_seat_type(&below, SeatType::Seater)?,
            EditOutcome::Unchanged
        );

        editor.change_seat_type(&top, SeatType::SemiSleeper)?;
        let released = editor.seat(&below).expect("seat");
        assert!(!released.merged);
        assert_eq!(released.seat_type, SeatType::SemiSleeper);
        assert_eq!(editor.total_seats(), 12);
        assert!(check_layout(editor.layout()).is_empty());
        Ok(())
    }

    #[test]
    fn sleeper_change_skips_removed_or_paired_seat_below() -> anyhow::Result<()> {
        let mut editor = LayoutEditor::new(seater_config(4))?;
        editor.remove_seat(&id(Deck::Lower, 1, 0))?;
        editor.change_seat_type(&id(Deck::Lower, 0, 0), SeatType::Sleeper)?;
        let below = editor.seat(&id(Deck::Lower, 1, 0)).expect("seat");
        assert!(!below.merged);

        editor.change_seat_type(&id(Deck::Lower, 2, 1), SeatType::Sleeper)?;
        editor.change_seat_type(&id(Deck::Lower, 1, 1), SeatType::Sleeper)?;
        let spanning = editor.seat(&id(Deck::Lower, 2, 1)).expect("seat");
        assert!(!spanning.merged);
        assert!(editor
            .seat(&id(Deck::Lower, 3, 1))
            .map(|seat| seat.merged)
            .unwrap_or(false));
        assert!(check_layout(editor.layout()).is_empty());
        Ok(())
    }

    #[test]
    fn policy_guards_do_not_touch_history() -> anyhow::Result<()> {
        let mut config = seater_config(2);
        config.has_upper_deck = true;
        let mut editor = LayoutEditor::new(config)?;

        let upper = id(Deck::Upper, 0, 0);
        assert_eq!(
            editor.change_seat_type(&upper, SeatType::Seater)?,
            EditOutcome::Unchanged
        );
        assert_eq!(
            editor.change_seat_type(&id(Deck::Lower, 0, 0), SeatType::Seater)?,
            EditOutcome::Unchanged
        );
        assert!(!editor.can_undo());
        assert!(!editor.undo());
        assert!(!editor.redo());
        Ok(())
    }

    #[test]
    fn removing_spanning_seat_releases_partner() -> anyhow::Result<()> {
        let mut config = seater_config(4);
        config.default_seat_type = SeatType::Sleeper;
        let mut editor = LayoutEditor::new(config)?;
        let top = id(Deck::Lower, 0, 0);
        let partner = id(Deck::Lower, 1, 0);
        let before = editor.seat(&top).cloned();

        editor.remove_seat(&top)?;
        let released = editor.seat(&partner).expect("seat");
        assert!(!released.merged);
        assert_eq!(released.seat_type, SeatType::Sleeper);
        assert!(check_layout(editor.layout()).is_empty());

        editor.restore_seat(&top)?;
        assert_eq!(editor.seat(&top).cloned(), before);
        assert!(check_layout(editor.layout()).is_empty());
        Ok(())
    }

    #[test]
    fn removing_merged_half_round_trips() -> anyhow::Result<()> {
        let mut config = seater_config(4);
        config.default_seat_type = SeatType::Sleeper;
        let mut editor = LayoutEditor::new(config)?;
        let half = id(Deck::Lower, 1, 0);
        let before = editor.seat(&half).cloned();

        editor.remove_seat(&half)?;
        assert_eq!(editor.total_seats(), 8);
        editor.restore_seat(&half)?;
        assert_eq!(editor.seat(&half).cloned(), before);
        assert!(check_layout(editor.layout()).is_empty());
        Ok(())
    }

    #[test]
    fn column_type_pairs_and_unpairs() -> anyhow::Result<()> {
        let mut editor = LayoutEditor::new(seater_config(5))?;
        editor.remove_seat(&id(Deck::Lower, 2, 3))?;

        editor.update_column_type(3, SeatType::Sleeper)?;
        let column = (0..5)
            .filter_map(|row| editor.layout().lower_deck.cell(row, 3))
            .filter(|seat| !seat.removed)
            .map(|seat| (seat.seat_type, seat.merged))
            .collect::<Vec<_>>();
        assert_eq!(
            column,
            [
                (SeatType::Sleeper, false),
                (SeatType::Sleeper, true),
                (SeatType::Sleeper, false),
                (SeatType::Sleeper, true)
            ]
        );

        editor.update_column_type(3, SeatType::Seater)?;
        assert!((0..5)
            .filter_map(|row| editor.layout().lower_deck.cell(row, 3))
            .all(|seat| !seat.merged));

        assert_eq!(
            editor.update_column_type(2, SeatType::Sleeper),
            Err(LayoutError::AisleColumn(2))
        );
        assert!(matches!(
            editor.update_column_type(9, SeatType::Sleeper),
            Err(LayoutError::ColumnOutOfRange { col: 9, width: 5 })
        ));
        Ok(())
    }

    #[test]
    fn column_type_leaves_upper_deck_alone() -> anyhow::Result<()> {
        let mut config = seater_config(4);
        config.has_upper_deck = true;
        let mut editor = LayoutEditor::new(config)?;
        let upper_before = editor.layout().upper_deck.clone();

        editor.update_column_type(0, SeatType::Sleeper)?;
        editor.update_column_type(0, SeatType::SemiSleeper)?;
        assert_eq!(editor.layout().upper_deck, upper_before);
        Ok(())
    }

    #[test]
    fn renumber_skips_merged_and_removed_cells() -> anyhow::Result<()> {
        let mut config = seater_config(2);
        config.has_upper_deck = true;
        let mut editor = LayoutEditor::new(config)?;
        editor.remove_seat(&id(Deck::Lower, 0, 1))?;
        editor.auto_renumber()?;

        let removed = editor.seat(&id(Deck::Lower, 0, 1)).expect("seat");
        assert_eq!(removed.seat_number, "2");
        let merged = editor.seat(&id(Deck::Upper, 1, 0)).expect("seat");
        assert!(merged.merged);
        assert_eq!(merged.seat_number, "13");

        let expected = (1..=11).map(|n| n.to_string()).collect::<Vec<_>>();
        assert_eq!(numbers(&editor), expected);
        Ok(())
    }

    #[test]
    fn property_updates_and_redo() -> anyhow::Result<()> {
        let mut editor = LayoutEditor::new(seater_config(2))?;
        let target = id(Deck::Lower, 0, 0);

        editor.update_seat_property(&target, SeatProperty::Ladies(true))?;
        editor.update_seat_property(&target, SeatProperty::SeatNumber("A1".into()))?;
        assert_eq!(
            editor.update_seat_property(&target, SeatProperty::Blocked(false))?,
            EditOutcome::Unchanged
        );

        let after = editor.layout().clone();
        assert!(editor.undo());
        assert_eq!(editor.seat(&target).map(|s| s.seat_number.as_str()), Some("1"));
        assert!(editor.redo());
        assert_eq!(editor.layout(), &after);

        editor.update_seat_property(&target, SeatProperty::Blocked(true))?;
        assert!(!editor.can_redo());
        Ok(())
    }

    #[test]
    fn seat_numbers_stay_unique_among_active_seats() -> anyhow::Result<()> {
        let mut editor = LayoutEditor::new(seater_config(2))?;
        let first = id(Deck::Lower, 0, 0);
        let second = id(Deck::Lower, 0, 1);

        assert_eq!(
            editor.update_seat_property(&first, SeatProperty::SeatNumber("2".into())),
            Err(LayoutError::DuplicateSeatNumber {
                number: "2".to_string(),
                holder: second.clone(),
            })
        );
        assert!(!editor.can_undo());
        assert_eq!(
            editor.update_seat_property(&first, SeatProperty::SeatNumber("1".into()))?,
            EditOutcome::Unchanged
        );

        // a removed seat's label is free to reuse, and a removed seat may keep any label
        editor.remove_seat(&second)?;
        editor.update_seat_property(&first, SeatProperty::SeatNumber("2".into()))?;
        editor.update_seat_property(&second, SeatProperty::SeatNumber("3".into()))?;
        assert_eq!(editor.seat_by_number("2").map(|seat| &seat.id), Some(&first));
        assert!(check_layout(editor.layout()).is_empty());
        Ok(())
    }

    #[test]
    fn reset_rebuilds_and_clears_history() -> anyhow::Result<()> {
        let mut editor = LayoutEditor::new(seater_config(3))?;
        editor.remove_seat(&id(Deck::Lower, 0, 0))?;
        editor.reset()?;
        assert_eq!(editor.total_seats(), 12);
        assert!(!editor.can_undo());

        let mut bigger = seater_config(4);
        bigger.right_seats = 1;
        editor.regenerate(bigger.clone())?;
        assert_eq!(editor.total_seats(), 12);
        assert_eq!(editor.config(), &bigger);

        bigger.rows = 0;
        assert!(editor.regenerate(bigger).is_err());
        assert_eq!(editor.config().rows, 4);
        Ok(())
    }

    #[test]
    fn template_payload_round_trips_through_editor() -> anyhow::Result<()> {
        let mut config = seater_config(4);
        config.has_upper_deck = true;
        let mut editor = LayoutEditor::new(config)?;
        editor.remove_seat(&id(Deck::Lower, 3, 4))?;

        let payload = editor.template_payload("Volvo 9400");
        assert_eq!(payload.total_seats, 15 + 8);
        let resumed = LayoutEditor::from_template(payload, None)?;
        assert_eq!(resumed.layout(), editor.layout());
        Ok(())
    }

    #[test]
    fn from_template_rejects_orphaned_merge() -> anyhow::Result<()> {
        let editor = LayoutEditor::new(seater_config(2))?;
        let mut payload = editor.template_payload("broken");
        if let Some(seat) = payload.lower_deck.cell_mut(0, 0) {
            seat.merged = true;
        }
        assert!(matches!(
            LayoutEditor::from_template(payload, None),
            Err(LayoutError::Invariant(_))
        ));
        Ok(())
    }

    #[derive(Debug, Clone)]
    enum Op {
        Remove(usize, usize),
        Restore(usize, usize),
        Retype(usize, usize, SeatType),
        Column(usize, SeatType),
        Renumber,
    }

    fn seat_type() -> impl Strategy<Value = SeatType> {
        prop_oneof![
            Just(SeatType::Seater),
            Just(SeatType::Sleeper),
            Just(SeatType::SemiSleeper)
        ]
    }

    fn op() -> impl Strategy<Value = Op> {
        let col = prop_oneof![Just(0usize), Just(1), Just(3), Just(4)];
        prop_oneof![
            (0usize..6, col.clone()).prop_map(|(r, c)| Op::Remove(r, c)),
            (0usize..6, col.clone()).prop_map(|(r, c)| Op::Restore(r, c)),
            (0usize..6, col.clone(), seat_type()).prop_map(|(r, c, t)| Op::Retype(r, c, t)),
            (col, seat_type()).prop_map(|(c, t)| Op::Column(c, t)),
            Just(Op::Renumber),
        ]
    }

    fn apply(editor: &mut LayoutEditor, op: &Op) -> EditOutcome {
        let result = match op {
            Op::Remove(r, c) => editor.remove_seat(&id(Deck::Lower, *r, *c)),
            Op::Restore(r, c) => editor.restore_seat(&id(Deck::Lower, *r, *c)),
            Op::Retype(r, c, t) => editor.change_seat_type(&id(Deck::Lower, *r, *c), *t),
            Op::Column(c, t) => editor.update_column_type(*c, *t),
            Op::Renumber => editor.auto_renumber(),
        };
        result.expect("operation on a valid seat")
    }

    proptest! {
        #[test]
        fn edits_keep_invariants_and_undo_exactly(ops in prop::collection::vec(op(), 1..30)) {
            let mut editor = LayoutEditor::new(seater_config(6)).unwrap();
            for op in &ops {
                let before = editor.layout().clone();
                let outcome = apply(&mut editor, op);
                let after = editor.layout().clone();
                prop_assert!(check_layout(editor.layout()).is_empty(), "{:?}", op);

                if outcome.is_applied() {
                    prop_assert!(editor.undo());
                    prop_assert_eq!(editor.layout(), &before);
                    prop_assert!(editor.redo());
                    prop_assert_eq!(editor.layout(), &after);
                } else {
                    prop_assert_eq!(&after, &before);
                }
            }
        }

        #[test]
        fn renumber_is_contiguous(ops in prop::collection::vec(op(), 0..20)) {
            let mut editor = LayoutEditor::new(seater_config(6)).unwrap();
            for op in &ops {
                apply(&mut editor, op);
            }
            editor.auto_renumber().unwrap();
            let expected = (1..=editor.total_seats()).map(|n| n.to_string()).collect::<Vec<_>>();
            prop_assert_eq!(numbers(&editor), expected);
        }

        #[test]
        fn sleeper_column_pairs_top_to_bottom(ops in prop::collection::vec(op(), 0..20), col in prop_oneof![Just(0usize), Just(1), Just(3), Just(4)]) {
            let mut editor = LayoutEditor::new(seater_config(6)).unwrap();
            for op in &ops {
                apply(&mut editor, op);
            }
            editor.update_column_type(col, SeatType::Sleeper).unwrap();
            let live = (0..6)
                .filter_map(|row| editor.layout().lower_deck.cell(row, col))
                .filter(|seat| !seat.removed)
                .collect::<Vec<_>>();
            for (index, seat) in live.iter().enumerate() {
                prop_assert_eq!(seat.seat_type, SeatType::Sleeper);
                prop_assert_eq!(seat.merged, index % 2 == 1);
            }

            editor.update_column_type(col, SeatType::Seater).unwrap();
            prop_assert!((0..6)
                .filter_map(|row| editor.layout().lower_deck.cell(row, col))
                .all(|seat| !seat.merged));
        }
    }
}
