//! AWS Lambda invocation instrumentation.
//!
//! This crate wraps a Lambda handler function so that every invocation is
//! recorded as one transaction on the monitoring agent and every failure as
//! one error event, while keeping the handler's observable behavior toward
//! the host runtime unchanged.
//!
//! The hard part is that historically a handler can signal completion through
//! several APIs at once: the value its future resolves to, the callback
//! argument, and the legacy `succeed`/`done`/`fail` methods on the invocation
//! context. Application code may legitimately use more than one of them for
//! the same invocation. The wrapper unifies all of these into a single
//! exactly-once lifecycle:
//!
//! 1. Every invocation opens one transaction before the handler runs.
//! 2. All completion channels feed a first-write-wins [`CompletionArbiter`];
//!    the first signal decides the [`Outcome`], later signals are silently
//!    discarded.
//! 3. The transaction is ended exactly once, a failure is captured as one
//!    error event, and buffered telemetry is flushed.
//! 4. Only after the flush has settled is the outcome delivered to the host.
//!
//! Step 4 is the core correctness property. The execution environment may
//! freeze or recycle the process the instant the handler's completion channel
//! fires, which would otherwise race with the in-flight telemetry flush.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use apm_lambda::{AwsLambda, Callback, Context, HandlerResult, InvocationMetadata};
//! use serde_json::{json, Value};
//!
//! async fn hello(payload: Value, context: Context, _callback: Callback) -> HandlerResult {
//!     let name = payload["name"].as_str().unwrap_or("world");
//!     context.succeed(json!(format!("Hello, {name}!")));
//!     Ok(None)
//! }
//!
//! # async fn example(agent: Arc<dyn apm_agent::Agent>) {
//! let handler = AwsLambda::new(agent).wrap(hello);
//!
//! let result = handler
//!     .invoke(json!({"name": "world"}), InvocationMetadata::named("greet.hello"))
//!     .await;
//! # }
//! ```

#![warn(missing_docs)]

mod arbiter;
pub use arbiter::*;

mod context;
pub use context::*;

mod lifecycle;

mod outcome;
pub use outcome::*;

mod wrapper;
pub use wrapper::*;

// The error type handlers produce is part of this crate's surface.
pub use apm_agent::HandlerError;
