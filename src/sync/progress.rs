use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Status sink and cancellation source polled during a sync
pub trait Progress {
    fn set_status(&self, status: &str, substatus: &str);
    fn is_cancelled(&self) -> bool;
}

/// Stock progress reporter. Clones share the cancel flag and status.
#[derive(Debug, Clone, Default)]
pub struct SyncProgress {
    cancelled: Arc<AtomicBool>,
    status: Arc<Mutex<(String, String)>>,
}

impl SyncProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the running sync
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }

    /// Last status and substatus reported
    pub fn status(&self) -> (String, String) {
        self.status.lock().clone()
    }
}

impl Progress for SyncProgress {
    fn set_status(&self, status: &str, substatus: &str) {
        log::debug!("{} {}", status, substatus);
        let mut current = self.status.lock();
        current.0 = status.to_string();
        current.1 = substatus.to_string();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_shared_between_clones() {
        let progress = SyncProgress::new();
        let handle = progress.clone();
        assert!(!progress.is_cancelled());

        handle.cancel();
        assert!(progress.is_cancelled());

        progress.reset();
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_status_recorded() {
        let progress = SyncProgress::new();
        progress.set_status("Loading Meshes to render-server", "Movable: Crate");
        assert_eq!(progress.status().1, "Movable: Crate");
    }
}
