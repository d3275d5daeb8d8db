//! Drag-and-drop controller
//!
//! Drag-over notifications can arrive in floods. Instead of mutating the
//! board on each one, the controller queues a move intent stamped with the
//! current drag generation and applies the queue once per frame in
//! [`DragController::flush`]. Ending or cancelling a drag bumps the
//! generation, so intents queued by a finished gesture are dropped rather
//! than applied late.
//!
//! A checkpoint is taken at drag start. Moves during the drag are transient,
//! so the whole gesture undoes as one step.

use core_media::{from_search_id, is_search_id, MediaItem};
use std::collections::VecDeque;
use tracing::{debug, trace};

use crate::reducer::BoardAction;
use crate::store::BoardSession;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragKind {
    /// A media item. `source_tier` is `None` for items dragged in from
    /// search results.
    Item {
        item: MediaItem,
        source_tier: Option<String>,
    },
    Tier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDrag {
    pub active_id: String,
    pub kind: DragKind,
}

/// Pointer position relative to the element under it, in host pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerGeometry {
    pub pointer_y: f64,
    pub over_top: f64,
    pub over_height: f64,
}

impl PointerGeometry {
    /// Past the vertical midpoint of the target means "insert below".
    pub fn is_below_midpoint(&self) -> bool {
        self.pointer_y > self.over_top + self.over_height / 2.0
    }
}

#[derive(Debug, Clone)]
struct MoveIntent {
    generation: u64,
    action: BoardAction,
}

#[derive(Debug, Default)]
pub struct DragController {
    active: Option<ActiveDrag>,
    generation: u64,
    queue: VecDeque<MoveIntent>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActiveDrag> {
        self.active.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Begin a drag and checkpoint the board.
    pub fn drag_start(&mut self, session: &mut BoardSession, active_id: impl Into<String>, kind: DragKind) {
        if self.active.is_some() {
            self.end_session();
        }

        let active_id = active_id.into();
        debug!(board_id = session.board_id(), active_id = %active_id, "Drag started");
        session.checkpoint();
        self.active = Some(ActiveDrag { active_id, kind });
    }

    /// Queue a move for the element currently under the pointer.
    ///
    /// Returns whether an intent was queued. Tier drags never queue; their
    /// reorder happens once at drag end.
    pub fn drag_over(
        &mut self,
        session: &BoardSession,
        over_id: &str,
        geometry: Option<PointerGeometry>,
    ) -> bool {
        let Some(ActiveDrag {
            active_id,
            kind: DragKind::Item { .. },
        }) = &self.active
        else {
            return false;
        };
        if over_id == active_id {
            return false;
        }

        let Some(action) = self.move_action(session, over_id, geometry) else {
            return false;
        };

        if self.queue.back().is_some_and(|last| last.action == action) {
            trace!(over_id, "Coalesced duplicate drag-over");
            return false;
        }

        self.queue.push_back(MoveIntent {
            generation: self.generation,
            action,
        });
        true
    }

    fn move_action(
        &self,
        session: &BoardSession,
        over_id: &str,
        geometry: Option<PointerGeometry>,
    ) -> Option<BoardAction> {
        let ActiveDrag {
            active_id,
            kind: DragKind::Item { item, source_tier },
        } = self.active.as_ref()?
        else {
            return None;
        };

        let state = session.state();
        let target = state.resolve_container(over_id)?;
        let current = state.find_item_container(active_id);

        let insert_below = geometry.is_some_and(|g| g.is_below_midpoint());
        if current == Some(target) {
            let items = state.items_in(target);
            let from = items.iter().position(|i| &i.id == active_id);
            let to = items.iter().position(|i| i.id == over_id);
            if from.is_some() && from == to {
                return None;
            }
        }

        Some(BoardAction::MoveItem {
            active_id: active_id.clone(),
            over_id: over_id.to_string(),
            source_tier_hint: current.map(str::to_string).or_else(|| source_tier.clone()),
            item: current.is_none().then(|| item.clone()),
            insert_below,
        })
    }

    /// Apply queued intents from the live drag. Returns how many changed the
    /// board.
    pub fn flush(&mut self, session: &mut BoardSession) -> usize {
        let mut applied = 0;
        while let Some(intent) = self.queue.pop_front() {
            if intent.generation != self.generation || self.active.is_none() {
                trace!(
                    intent_generation = intent.generation,
                    generation = self.generation,
                    "Dropping stale drag intent"
                );
                continue;
            }
            if session.apply_transient(intent.action) {
                applied += 1;
            }
        }
        applied
    }

    /// Finish the drag on `over_id` (or outside any droppable when `None`).
    ///
    /// Returns whether the board differs from its state at drag start.
    pub fn drag_end(
        &mut self,
        session: &mut BoardSession,
        over_id: Option<&str>,
        geometry: Option<PointerGeometry>,
    ) -> bool {
        let Some(active) = self.active.clone() else {
            return false;
        };
        let final_move = match (&active.kind, over_id) {
            (DragKind::Item { .. }, Some(over)) if over != active.active_id => {
                self.move_action(session, over, geometry)
            }
            _ => None,
        };
        self.end_session();

        match active.kind {
            DragKind::Tier => {
                if let Some(over) = over_id.filter(|over| *over != active.active_id) {
                    self.reorder_tier(session, &active.active_id, over);
                }
            }
            DragKind::Item { .. } => {
                if let Some(action) = final_move {
                    session.apply_transient(action);
                }
                // The move is keyed by the transient id, so rename after it.
                let canonical = from_search_id(&active.active_id);
                if is_search_id(&active.active_id)
                    && canonical != active.active_id
                    && session.state().contains_item(&active.active_id)
                {
                    session.apply_transient(BoardAction::NormalizeItemId {
                        from: active.active_id.clone(),
                        to: canonical.to_string(),
                    });
                }
            }
        }

        let changed = !session.discard_checkpoint_if_unchanged();
        debug!(board_id = session.board_id(), active_id = %active.active_id, changed, "Drag ended");
        changed
    }

    fn reorder_tier(&self, session: &mut BoardSession, active_id: &str, over_id: &str) {
        let state = session.state();
        let from = state.tier_index(active_id);
        let to = state
            .resolve_container(over_id)
            .and_then(|tier_id| state.tier_index(tier_id));
        if let (Some(from), Some(to)) = (from, to) {
            session.apply_transient(BoardAction::ReorderTiers { from, to });
        }
    }

    /// Abandon the drag. Moves already applied stay and undo back to the
    /// drag-start checkpoint.
    pub fn drag_cancel(&mut self, session: &mut BoardSession) {
        if self.active.is_none() {
            return;
        }
        self.end_session();
        session.discard_checkpoint_if_unchanged();
        debug!(board_id = session.board_id(), "Drag cancelled");
    }

    fn end_session(&mut self) {
        self.active = None;
        self.generation += 1;
        if !self.queue.is_empty() {
            trace!(dropped = self.queue.len(), "Discarding queued drag intents");
            self.queue.clear();
        }
    }
}
