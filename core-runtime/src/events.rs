//! # Event Bus System
//!
//! Provides an event-driven architecture for the tier board core using `tokio::sync::broadcast`.
//! Board sessions, the media registry and the search service publish typed events;
//! views subscribe and re-render from the latest state snapshot.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     emit      ┌───────────┐
//! │ Board Session├──────────────>│           │
//! └──────────────┘               │           │
//!                                │ EventBus  │     subscribe    ┌────────────┐
//! ┌──────────────┐     emit      │ (broadcast├─────────────────>│    View    │
//! │ Media Registry├─────────────>│  channel) │                  └────────────┘
//! └──────────────┘               │           │
//! ┌──────────────┐     emit      │           │     subscribe    ┌────────────┐
//! │ Search/Storage├─────────────>│           ├─────────────────>│  Notifier  │
//! └──────────────┘               └───────────┘                  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{BoardEvent, CoreEvent, EventBus};
//!
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Board(BoardEvent::Undone {
//!         board_id: "default".to_string(),
//!     }))
//!     .ok();
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   Non-fatal; views simply re-read the latest snapshot.
//! - **`RecvError::Closed`**: All senders have been dropped. Treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Board state changes
    Board(BoardEvent),
    /// Media registry changes
    Registry(RegistryEvent),
    /// Search outcomes worth surfacing
    Search(SearchEvent),
    /// Persistence failures
    Storage(StorageEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Board(e) => e.description(),
            CoreEvent::Registry(e) => e.description(),
            CoreEvent::Search(e) => e.description(),
            CoreEvent::Storage(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Board(BoardEvent::ImportFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Search(SearchEvent::Failed { .. }) => EventSeverity::Warning,
            CoreEvent::Storage(StorageEvent::WriteFailed { .. }) => EventSeverity::Error,
            CoreEvent::Board(BoardEvent::Imported { .. }) => EventSeverity::Info,
            CoreEvent::Registry(RegistryEvent::Evicted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Board Events
// ============================================================================

/// Events emitted by a board session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum BoardEvent {
    /// The board state changed.
    Changed {
        board_id: String,
        /// Name of the action that produced the change.
        action: String,
        /// Monotonic revision of the board state.
        revision: u64,
    },
    /// Undo restored a previous snapshot.
    Undone { board_id: String },
    /// Redo re-applied a snapshot.
    Redone { board_id: String },
    /// A board was replaced by imported data.
    Imported { board_id: String, tier_count: usize },
    /// An import was rejected; the board is unchanged.
    ImportFailed { board_id: String, message: String },
}

impl BoardEvent {
    fn description(&self) -> &str {
        match self {
            BoardEvent::Changed { .. } => "Board changed",
            BoardEvent::Undone { .. } => "Board change undone",
            BoardEvent::Redone { .. } => "Board change redone",
            BoardEvent::Imported { .. } => "Board imported",
            BoardEvent::ImportFailed { .. } => "Board import failed",
        }
    }
}

// ============================================================================
// Registry Events
// ============================================================================

/// Events emitted by the media registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    /// One or more entries were inserted or enriched.
    Updated { changed: usize, size: usize },
    /// Oldest entries were evicted after crossing the ceiling.
    Evicted { count: usize, size: usize },
    /// The registry was emptied.
    Cleared,
}

impl RegistryEvent {
    fn description(&self) -> &str {
        match self {
            RegistryEvent::Updated { .. } => "Media registry updated",
            RegistryEvent::Evicted { .. } => "Media registry entries evicted",
            RegistryEvent::Cleared => "Media registry cleared",
        }
    }
}

// ============================================================================
// Search Events
// ============================================================================

/// Events emitted by the search service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SearchEvent {
    /// A search failed and returned an empty page.
    Failed {
        /// User-facing message.
        message: String,
        rate_limited: bool,
    },
}

impl SearchEvent {
    fn description(&self) -> &str {
        match self {
            SearchEvent::Failed { .. } => "Search failed",
        }
    }
}

// ============================================================================
// Storage Events
// ============================================================================

/// Events emitted by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum StorageEvent {
    /// Write failed; in-memory state remains authoritative.
    WriteFailed { key: String, message: String },
}

impl StorageEvent {
    fn description(&self) -> &str {
        match self {
            StorageEvent::WriteFailed { .. } => "Storage write failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally: multiple producers (clone the
/// bus), multiple consumers (one receiver per `subscribe()`), non-blocking sends.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let board_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Board(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
