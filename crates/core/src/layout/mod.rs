//! Layout template generation and editing.

/// Grid generation from a layout configuration.
pub mod builder;
/// Structural invariant checks.
pub mod check;
/// Template editing session.
pub mod editor;
/// Snapshot-based undo/redo.
pub mod history;
/// Sleeper berth pairing.
pub mod merge;

pub use builder::{build_layout, validate_config};
pub use check::{check_layout, Violation};
pub use editor::{EditOutcome, LayoutEditor, SeatProperty};
pub use history::HistoryManager;
