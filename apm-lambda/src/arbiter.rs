use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::outcome::Signal;

/// The per-invocation gate that unifies all completion channels.
///
/// All channels of one invocation hold clones of the same [`SignalHandle`].
/// The first signal submitted through any of them decides the invocation's
/// outcome; every later signal finds the gate consumed and is swallowed.
/// Duplicates are not an error: legacy handler code may call more than one
/// completion API for the same invocation, and must not double-report.
pub struct CompletionArbiter;

impl CompletionArbiter {
    /// Creates the channel for one invocation.
    ///
    /// Returns the handle completion channels signal through and the future
    /// that resolves with the winning signal.
    pub fn channel() -> (SignalHandle, Settled) {
        let (tx, rx) = oneshot::channel();

        let handle = SignalHandle {
            tx: Arc::new(Mutex::new(Some(tx))),
        };

        (handle, Settled { rx })
    }
}

/// A channel's handle onto the invocation's completion gate.
#[derive(Clone, Debug)]
pub struct SignalHandle {
    tx: Arc<Mutex<Option<oneshot::Sender<Signal>>>>,
}

impl SignalHandle {
    /// Submits a completion signal.
    ///
    /// The first signal per invocation wins; every later call is a silent
    /// no-op with no observable side effect.
    pub fn signal(&self, signal: Signal) {
        let Some(tx) = self.tx.lock().take() else {
            return;
        };

        // The receiver going away means the invocation was dropped; nothing
        // left to report to.
        tx.send(signal).ok();
    }
}

/// Resolves with the invocation's winning completion signal.
pub struct Settled {
    rx: oneshot::Receiver<Signal>,
}

impl Settled {
    /// Waits for the first completion signal.
    ///
    /// Returns `None` if every [`SignalHandle`] was dropped without firing;
    /// such an invocation can never complete.
    pub async fn wait(self) -> Option<Signal> {
        self.rx.await.ok()
    }
}
