use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::{Agent, AgentError, HandlerError, TransactionHandle, TransactionOutcome};

/// An agent call observed by the [`RecordingAgent`], in call order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AgentEvent {
    /// A transaction was started with this name.
    TransactionStarted(String),
    /// An error with this message was captured.
    ErrorCaptured(String),
    /// A transaction was ended.
    TransactionEnded {
        /// Name of the ended transaction.
        name: String,
        /// Outcome it was ended with.
        outcome: TransactionOutcome,
    },
    /// A flush attempt settled successfully.
    Flushed,
    /// A flush attempt settled with an error.
    FlushFailed,
}

/// A transaction observed by the [`RecordingAgent`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedTransaction {
    /// The name the transaction was started with.
    pub name: String,
    /// The outcome the transaction was ended with, if it was ended.
    pub outcome: Option<TransactionOutcome>,
}

#[derive(Debug, Default)]
struct RecordingState {
    events: Vec<AgentEvent>,
    transactions: Vec<RecordedTransaction>,
    errors: Vec<String>,
    flushes: usize,
    flush_gate: Option<oneshot::Receiver<()>>,
}

/// An in-memory [`Agent`] double for tests.
///
/// Records every call in a single ordered event log so tests can assert both
/// counts and ordering, most importantly that the flush settled before the
/// host saw the invocation's outcome.
#[derive(Debug, Default)]
pub struct RecordingAgent {
    state: Mutex<RecordingState>,
    disabled: bool,
    fail_flush: bool,
}

impl RecordingAgent {
    /// Creates a recording agent that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unavailable agent: `start_transaction` returns `None`.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Creates an agent whose flush attempts fail.
    pub fn with_failing_flush() -> Self {
        Self {
            fail_flush: true,
            ..Self::default()
        }
    }

    /// Holds the next flush until the returned sender fires.
    ///
    /// Lets tests observe that the caller has not been notified while the
    /// flush is still in flight.
    pub fn gate_flush(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().flush_gate = Some(rx);
        tx
    }

    /// All recorded agent calls, in call order.
    pub fn events(&self) -> Vec<AgentEvent> {
        self.state.lock().events.clone()
    }

    /// All transactions started so far.
    pub fn transactions(&self) -> Vec<RecordedTransaction> {
        self.state.lock().transactions.clone()
    }

    /// The messages of all captured errors.
    pub fn errors(&self) -> Vec<String> {
        self.state.lock().errors.clone()
    }

    /// The number of settled flush attempts.
    pub fn flush_count(&self) -> usize {
        self.state.lock().flushes
    }
}

#[async_trait]
impl Agent for RecordingAgent {
    fn start_transaction(&self, name: &str) -> Option<TransactionHandle> {
        if self.disabled {
            return None;
        }

        let mut state = self.state.lock();
        let id = state.transactions.len() as u64;
        state.transactions.push(RecordedTransaction {
            name: name.to_owned(),
            outcome: None,
        });
        state
            .events
            .push(AgentEvent::TransactionStarted(name.to_owned()));

        Some(TransactionHandle::new(id, name))
    }

    fn capture_error(&self, error: &HandlerError) {
        let mut state = self.state.lock();
        state.errors.push(error.message());
        state.events.push(AgentEvent::ErrorCaptured(error.message()));
    }

    fn end_transaction(&self, handle: TransactionHandle, outcome: TransactionOutcome) {
        let mut state = self.state.lock();
        if let Some(transaction) = state.transactions.get_mut(handle.id() as usize) {
            transaction.outcome = Some(outcome);
        }
        state.events.push(AgentEvent::TransactionEnded {
            name: handle.name().to_owned(),
            outcome,
        });
    }

    async fn flush(&self) -> Result<(), AgentError> {
        let gate = self.state.lock().flush_gate.take();
        if let Some(gate) = gate {
            gate.await.ok();
        }

        let mut state = self.state.lock();
        if self.fail_flush {
            state.events.push(AgentEvent::FlushFailed);
            return Err(AgentError::Flush("backend unreachable".to_owned()));
        }

        state.flushes += 1;
        state.events.push(AgentEvent::Flushed);
        Ok(())
    }
}
