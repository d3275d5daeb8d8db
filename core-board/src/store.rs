//! Board sessions
//!
//! A [`BoardSession`] owns one board's state together with its undo/redo
//! history. Every mutation goes through [`BoardSession::dispatch`] (recorded
//! in history) or [`BoardSession::apply_transient`] (covered by an earlier
//! checkpoint, used during drags).

use bridge_traits::time::Clock;
use core_media::{from_search_id, MediaItem};
use core_registry::MediaRegistry;
use core_runtime::events::{BoardEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::history::History;
use crate::io::{generate_export_data, parse_import_data, ExportData};
use crate::reducer::{reduce, BoardAction};
use crate::state::TierListState;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

pub struct BoardSession {
    board_id: String,
    state: TierListState,
    history: History<TierListState>,
    revision: u64,
    event_bus: Option<EventBus>,
    registry: Option<Arc<MediaRegistry>>,
}

impl BoardSession {
    pub fn new(board_id: impl Into<String>, state: TierListState, history_limit: usize) -> Self {
        Self {
            board_id: board_id.into(),
            state,
            history: History::new(history_limit),
            revision: 0,
            event_bus: None,
            registry: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Items whose data changes are mirrored into `registry`.
    pub fn with_registry(mut self, registry: Arc<MediaRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub fn state(&self) -> &TierListState {
        &self.state
    }

    /// Bumped on every change, including undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Apply a user action as its own undo step.
    pub fn dispatch(&mut self, action: BoardAction) -> bool {
        let snapshot = self.state.clone();
        let changed = self.apply(action);
        if changed {
            self.history.push(snapshot);
        }
        changed
    }

    /// Apply an action without recording history.
    ///
    /// Callers take a [`checkpoint`](Self::checkpoint) first so the whole
    /// gesture undoes as one step.
    pub fn apply_transient(&mut self, action: BoardAction) -> bool {
        self.apply(action)
    }

    fn apply(&mut self, action: BoardAction) -> bool {
        let name = action.name();
        let synced_id = match &action {
            BoardAction::UpdateMediaItem { item_id, .. } => Some(item_id.clone()),
            BoardAction::NormalizeItemId { to, .. } => Some(to.clone()),
            _ => None,
        };

        if !reduce(&mut self.state, action) {
            return false;
        }

        self.revision += 1;
        if let Some(id) = synced_id {
            self.sync_registry(&id);
        }
        self.emit(BoardEvent::Changed {
            board_id: self.board_id.clone(),
            action: name.to_string(),
            revision: self.revision,
        });
        true
    }

    fn sync_registry(&self, item_id: &str) {
        let (Some(registry), Some(item)) = (&self.registry, self.state.get_item(item_id)) else {
            return;
        };
        registry.register_item(item.clone());
    }

    /// Snapshot the current state as an undo step without changing it.
    pub fn checkpoint(&mut self) {
        self.history.checkpoint(self.state.clone());
    }

    /// Drop the latest checkpoint when the board ended up identical to it,
    /// restoring any redo steps it displaced. Otherwise the checkpoint
    /// becomes a regular undo step.
    pub fn discard_checkpoint_if_unchanged(&mut self) -> bool {
        if self.history.peek_undo() == Some(&self.state) {
            self.history.discard_checkpoint();
            debug!(board_id = %self.board_id, "Discarded no-op checkpoint");
            return true;
        }
        self.history.commit_checkpoint();
        false
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(&self.state) else {
            return false;
        };
        self.state = previous;
        self.revision += 1;
        self.emit(BoardEvent::Undone {
            board_id: self.board_id.clone(),
        });
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(&self.state) else {
            return false;
        };
        self.state = next;
        self.revision += 1;
        self.emit(BoardEvent::Redone {
            board_id: self.board_id.clone(),
        });
        true
    }

    /// Replace the board with an import.
    ///
    /// A rejected payload leaves the board untouched and is reported through
    /// an `ImportFailed` event as well as the returned error.
    #[instrument(skip(self, json), fields(board_id = %self.board_id))]
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let fallback_title = self.state.title.clone();
        let imported = match parse_import_data(json, &fallback_title) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Board import rejected");
                self.emit(BoardEvent::ImportFailed {
                    board_id: self.board_id.clone(),
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let tier_count = imported.tier_defs.len();
        if let Some(registry) = &self.registry {
            registry.register_items(imported.all_items().cloned());
        }
        self.dispatch(BoardAction::Import { state: imported });

        info!(tier_count, items = self.state.item_count(), "Board imported");
        self.emit(BoardEvent::Imported {
            board_id: self.board_id.clone(),
            tier_count,
        });
        Ok(())
    }

    pub fn export(&self, clock: &dyn Clock) -> ExportData {
        generate_export_data(&self.state, clock)
    }

    /// Registry view of an item, falling back to the board's copy.
    pub fn resolve_item(&self, item_id: &str) -> Option<MediaItem> {
        let local = self.state.get_item(item_id)?;
        let canonical = from_search_id(item_id);
        self.registry
            .as_ref()
            .and_then(|registry| registry.get_item(canonical))
            .map(|entry| {
                let mut item = entry.as_ref().clone();
                item.id = local.id.clone();
                item
            })
            .or_else(|| Some(local.clone()))
    }

    fn emit(&self, event: BoardEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Board(event));
        }
    }
}
