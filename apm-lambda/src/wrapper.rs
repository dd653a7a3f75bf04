use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use apm_agent::{Agent, HandlerError};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::arbiter::CompletionArbiter;
use crate::context::{Callback, Context, InvocationMetadata};
use crate::lifecycle::Lifecycle;
use crate::outcome::{CompletionChannel, Outcome, Signal};

/// The result a handler future resolves to.
///
/// `Ok(Some(value))` completes the invocation through the return-value
/// channel. `Ok(None)` means the handler does not complete through its return
/// value and leaves completion to the context or callback channels. `Err`
/// completes the invocation as a failure.
pub type HandlerResult = Result<Option<Value>, HandlerError>;

/// An invocation handler in the host runtime's calling convention
/// `(payload, context, callback)`.
///
/// Implemented for any `Fn` closure of that shape returning a future; only
/// implement it manually for stateful handlers.
pub trait Handler: Send + Sync + 'static {
    /// Runs the handler for one invocation.
    fn call(
        &self,
        event: Value,
        context: Context,
        callback: Callback,
    ) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Value, Context, Callback) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(
        &self,
        event: Value,
        context: Context,
        callback: Callback,
    ) -> BoxFuture<'static, HandlerResult> {
        self(event, context, callback).boxed()
    }
}

/// Factory that wraps handlers with invocation instrumentation for a given
/// agent.
///
/// The agent is an injected collaborator; the factory never touches process
/// globals.
pub struct AwsLambda {
    agent: Arc<dyn Agent>,
}

impl AwsLambda {
    /// Creates a wrapper factory reporting to the given agent.
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }

    /// Wraps a handler so each of its invocations is traced and flushed.
    pub fn wrap<H>(&self, handler: H) -> WrappedHandler<H>
    where
        H: Handler,
    {
        WrappedHandler {
            lifecycle: Lifecycle::new(Arc::clone(&self.agent)),
            handler,
        }
    }
}

/// An instrumented handler.
///
/// Exposes the same calling convention as the handler it wraps; the only
/// observable difference toward the host is the bounded latency of the
/// telemetry flush before completion.
pub struct WrappedHandler<H> {
    lifecycle: Lifecycle,
    handler: H,
}

impl<H> WrappedHandler<H>
where
    H: Handler,
{
    /// Runs one invocation.
    ///
    /// The returned future is the host runtime's completion channel: it
    /// resolves with the invocation's outcome strictly after the agent's
    /// flush has settled. The host may freeze the execution environment the
    /// moment this future resolves without losing telemetry.
    pub async fn invoke(
        &self,
        event: Value,
        metadata: InvocationMetadata,
    ) -> Result<Value, HandlerError> {
        let transaction = self.lifecycle.start(&metadata.function_name);

        let (handle, settled) = CompletionArbiter::channel();
        let context = Context::new(metadata, handle.clone());
        let callback = Callback::new(handle.clone());

        let future = AssertUnwindSafe(self.handler.call(event, context, callback)).catch_unwind();

        // Drive the handler in its own task: a legacy channel may fire long
        // before the handler future returns, and handler code is free to keep
        // running after it signaled completion.
        tokio::spawn(async move {
            let signal = match future.await {
                Ok(Ok(Some(value))) => Some(Signal::success(value, CompletionChannel::Return)),
                Ok(Ok(None)) => None,
                Ok(Err(error)) => Some(Signal::failure(error, CompletionChannel::Rejection)),
                Err(panic) => Some(Signal::failure(
                    describe_panic(panic),
                    CompletionChannel::Panic,
                )),
            };

            if let Some(signal) = signal {
                handle.signal(signal);
            }
        });

        let Some(signal) = settled.wait().await else {
            // The handler returned without completing through any channel and
            // no channel handle is left alive. Terminating the invocation is
            // the host's job.
            apm_log::warn!("handler finished without signaling completion");
            return futures::future::pending().await;
        };

        self.lifecycle.finish(transaction, &signal).await;

        match signal.outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

/// Renders a panic payload as an application failure.
///
/// The host observes a panicking handler as an invocation error carrying the
/// panic message, the same shape unwrapped Rust serverless handlers report.
fn describe_panic(panic: Box<dyn Any + Send>) -> HandlerError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_owned());

    HandlerError::msg(message)
}
