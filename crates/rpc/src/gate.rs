//! The import gate: a "write in progress" flag that pauses the read path.

use crate::errors::RpcError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// How many times a read request re-checks the gate before giving up.
const READY_ATTEMPTS: u32 = 5;

/// How long a read request sleeps between gate checks.
const READY_BACKOFF: Duration = Duration::from_millis(200);

/// Pauses read-RPC handling while a block import is in flight, so a reader can never
/// observe a half-committed chain between receipt insertion and header commit.
///
/// The sync path raises the gate on `NewBlockImportStarted` and lowers it on either
/// terminal event. Readers wait with a bounded retry before returning a busy error.
#[derive(Debug, Clone)]
pub struct ImportGate {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for ImportGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportGate {
    /// Creates an open gate.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender: Arc::new(sender) }
    }

    /// Raises the gate: a block import is in progress.
    pub fn block(&self) {
        self.sender.send_replace(true);
    }

    /// Lowers the gate: the import finished or was canceled.
    pub fn resume(&self) {
        self.sender.send_replace(false);
    }

    /// Returns `true` if an import is in progress.
    pub fn is_blocked(&self) -> bool {
        *self.sender.borrow()
    }

    /// Waits until the gate is open, with a bounded number of retries.
    pub async fn ready(&self) -> Result<(), RpcError> {
        for _ in 0..READY_ATTEMPTS {
            if !self.is_blocked() {
                return Ok(());
            }
            tokio::time::sleep(READY_BACKOFF).await;
        }
        Err(RpcError::Busy)
    }
}
