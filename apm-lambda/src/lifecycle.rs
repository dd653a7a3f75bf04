use std::sync::Arc;

use apm_agent::{Agent, TransactionHandle, TransactionOutcome};
use apm_log::LogError;

use crate::outcome::{Outcome, Signal};

/// Orchestrates the transaction lifecycle of one invocation: open on entry,
/// close with the recorded outcome, then flush before the host regains
/// control.
#[derive(Clone)]
pub(crate) struct Lifecycle {
    agent: Arc<dyn Agent>,
}

impl Lifecycle {
    pub(crate) fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }

    /// Opens the invocation's transaction.
    ///
    /// Never fails: when the agent is unavailable, the invocation proceeds
    /// uninstrumented. Instrumentation failures must never break the user's
    /// function.
    pub(crate) fn start(&self, name: &str) -> Option<TransactionHandle> {
        let transaction = self.agent.start_transaction(name);

        match &transaction {
            Some(handle) => apm_log::trace!("transaction {} started: {}", handle.id(), name),
            None => apm_log::debug!("agent unavailable, running handler uninstrumented"),
        }

        transaction
    }

    /// Ends the transaction and flushes buffered telemetry.
    ///
    /// Returns only once the flush has settled; the caller must not notify
    /// the host before that. Flush failures are logged and swallowed so that
    /// telemetry problems never surface as application failures.
    pub(crate) async fn finish(&self, transaction: Option<TransactionHandle>, signal: &Signal) {
        let Some(transaction) = transaction else {
            return;
        };

        let outcome = match &signal.outcome {
            Outcome::Success(_) => TransactionOutcome::Success,
            Outcome::Failure(error) => {
                // Capture before the transaction ends so the error is linked
                // to the still-open transaction context.
                self.agent.capture_error(error);
                TransactionOutcome::Failure(signal.channel.failure_origin())
            }
        };

        apm_log::trace!(
            "ending transaction {} with outcome {}",
            transaction.id(),
            outcome
        );
        self.agent.end_transaction(transaction, outcome);

        if let Err(error) = self.agent.flush().await {
            apm_log::error!("failed to flush telemetry: {}", LogError(&error));
        }
    }
}
