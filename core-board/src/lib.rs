//! # Core Board
//!
//! Tier list boards:
//! - [`TierListState`] and its tier definitions ([`state`])
//! - The [`reduce`] function and [`BoardAction`]s ([`reducer`])
//! - Per-board undo/redo in [`BoardSession`] ([`store`], [`history`])
//! - Generation-stamped drag handling in [`DragController`] ([`dnd`])
//! - The portable import/export envelope ([`io`])

pub mod dnd;
pub mod error;
pub mod history;
pub mod io;
pub mod reducer;
pub mod state;
pub mod store;

pub use dnd::{ActiveDrag, DragController, DragKind, PointerGeometry};
pub use error::{BoardError, Result, INVALID_FORMAT_MESSAGE};
pub use history::History;
pub use io::{export_json, generate_export_data, parse_import_data, ExportData, ExportTier, EXPORT_VERSION};
pub use reducer::{reduce, BoardAction};
pub use state::{TierColor, TierDefinition, TierListState, DEFAULT_TITLE, MAX_TIERS, MAX_TITLE_LENGTH};
pub use store::{BoardSession, DEFAULT_HISTORY_LIMIT};
