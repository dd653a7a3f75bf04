//! Agent facade contract for serverless invocation instrumentation.
//!
//! The monitoring agent itself (transaction and error object creation,
//! sampling, serialization, network transport) lives outside of this
//! workspace. This crate pins down the minimal surface the instrumentation
//! core requires of it: starting and ending transactions, capturing errors,
//! and flushing buffered telemetry.
//!
//! The agent is always an injected dependency, held as an `Arc<dyn Agent>`,
//! never a process global. This keeps every consumer substitutable in tests;
//! the `RecordingAgent` double behind the `test` feature exists for exactly
//! that.

#![warn(missing_docs)]

use async_trait::async_trait;

mod error;
pub use error::*;

mod transaction;
pub use transaction::*;

#[cfg(feature = "test")]
mod recording;
#[cfg(feature = "test")]
pub use recording::*;

/// The outbound contract toward the monitoring agent.
///
/// All operations except [`flush`](Self::flush) are synchronous bookkeeping
/// on the agent's buffers. `flush` forces buffered telemetry out to the
/// backend and resolves only once the attempt has settled; callers depend on
/// this to order the flush strictly before they hand control back to an
/// execution environment that may freeze the process.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Begins a transaction for one invocation.
    ///
    /// Returns `None` when the agent is unavailable or disabled. Callers must
    /// treat that as "run uninstrumented" and never as a failure.
    fn start_transaction(&self, name: &str) -> Option<TransactionHandle>;

    /// Captures an error event.
    ///
    /// Invoked while the invocation's transaction is still open, so the agent
    /// can link the error to the transaction context.
    fn capture_error(&self, error: &HandlerError);

    /// Ends a transaction with its recorded outcome.
    ///
    /// Each handle is ended at most once.
    fn end_transaction(&self, handle: TransactionHandle, outcome: TransactionOutcome);

    /// Flushes buffered telemetry to the backend.
    ///
    /// Resolves once the flush attempt has settled, successfully or not.
    async fn flush(&self) -> Result<(), AgentError>;
}
