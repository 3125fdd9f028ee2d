//! The in-process event bus for block-import lifecycle events.

use tokio::sync::broadcast;

/// A block-import lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    /// A `sync` call started importing a block. The read path blocks until a terminal
    /// event.
    NewBlockImportStarted {
        /// Unix timestamp of the broadcast.
        timestamp: u64,
    },
    /// The import completed and was persisted.
    NewBlockImportFinished {
        /// Unix timestamp of the broadcast.
        timestamp: u64,
    },
    /// The import was aborted; nothing was persisted.
    NewBlockImportCanceled {
        /// Unix timestamp of the broadcast.
        timestamp: u64,
        /// The failure cause.
        reason: String,
    },
}

/// A cloneable handle to the in-process event bus.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChainEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a bus with a bounded backlog.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    /// Fire-and-forget broadcast. Events with no listeners are dropped.
    pub fn broadcast(&self, event: ChainEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribes to the bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ChainEvent> {
        self.sender.subscribe()
    }
}

/// The current unix time, for event stamps.
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
