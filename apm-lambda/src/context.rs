use apm_agent::HandlerError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::arbiter::SignalHandle;
use crate::outcome::{CompletionChannel, Outcome, Signal};

/// Identifying values the host runtime exposes for one invocation.
///
/// Consumed for transaction naming and tagging only; none of these fields are
/// behaviorally load-bearing for the instrumentation.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvocationMetadata {
    /// The name of the invoked function; used as the transaction name.
    pub function_name: String,
    /// The version of the invoked function.
    pub function_version: String,
    /// Unique request identifier.
    pub request_id: String,
    /// The invoked function's full resource name.
    pub invoked_function_arn: String,
    /// The time when the invocation times out, in Unix time milliseconds.
    pub deadline_ms: u64,
    /// The execution environment tag.
    pub execution_env: String,
    /// The region the function runs in.
    pub region: String,
}

impl InvocationMetadata {
    /// Creates metadata carrying only a function name.
    pub fn named(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            ..Self::default()
        }
    }

    /// Fills execution environment and region from the conventional host
    /// environment variables.
    pub fn with_host_env(mut self) -> Self {
        if let Ok(env) = std::env::var("AWS_EXECUTION_ENV") {
            self.execution_env = env;
        }
        if let Ok(region) = std::env::var("AWS_REGION") {
            self.region = region;
        }
        self
    }
}

/// The context value passed to a wrapped handler.
///
/// Carries the invocation metadata and the legacy completion methods
/// `succeed`, `done` and `fail`. The methods are pre-bound over this
/// invocation's completion gate when the context is constructed; no shared
/// object is ever patched. Calling any of them after the invocation has
/// settled is a no-op.
#[derive(Clone, Debug)]
pub struct Context {
    metadata: InvocationMetadata,
    handle: SignalHandle,
}

impl Context {
    pub(crate) fn new(metadata: InvocationMetadata, handle: SignalHandle) -> Self {
        Self { metadata, handle }
    }

    /// The host-provided metadata of this invocation.
    pub fn metadata(&self) -> &InvocationMetadata {
        &self.metadata
    }

    /// Completes the invocation successfully with the given value.
    pub fn succeed(&self, value: impl Into<Value>) {
        self.handle.signal(Signal::success(
            value.into(),
            CompletionChannel::ContextSucceed,
        ));
    }

    /// Completes the invocation with a failure.
    pub fn fail(&self, error: impl Into<HandlerError>) {
        self.handle.signal(Signal::failure(
            error.into(),
            CompletionChannel::ContextFail,
        ));
    }

    /// Completes the invocation with `(error, value)` semantics.
    ///
    /// An error takes precedence over the value; without either, the
    /// invocation succeeds with a null result.
    pub fn done(&self, error: Option<HandlerError>, value: Option<Value>) {
        let outcome = match error {
            Some(error) => Outcome::Failure(error),
            None => Outcome::Success(value.unwrap_or(Value::Null)),
        };

        self.handle.signal(Signal {
            outcome,
            channel: CompletionChannel::ContextDone,
        });
    }
}

/// The callback argument of the `(payload, context, callback)` calling
/// convention.
///
/// Like the legacy context methods, the callback is bound to the invocation's
/// completion gate and subject to the same first-write-wins rule.
#[derive(Clone, Debug)]
pub struct Callback {
    handle: SignalHandle,
}

impl Callback {
    pub(crate) fn new(handle: SignalHandle) -> Self {
        Self { handle }
    }

    /// Invokes the callback with `(error, result)` semantics.
    pub fn call(&self, error: Option<HandlerError>, result: Option<Value>) {
        let outcome = match error {
            Some(error) => Outcome::Failure(error),
            None => Outcome::Success(result.unwrap_or(Value::Null)),
        };

        self.handle.signal(Signal {
            outcome,
            channel: CompletionChannel::Callback,
        });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::arbiter::CompletionArbiter;

    #[tokio::test]
    async fn test_done_error_takes_precedence() {
        let (handle, settled) = CompletionArbiter::channel();
        let context = Context::new(InvocationMetadata::default(), handle);

        context.done(Some("fail".into()), Some(json!("ignored")));

        let signal = settled.wait().await.unwrap();
        assert_eq!(signal.channel, CompletionChannel::ContextDone);
        match signal.outcome {
            Outcome::Failure(error) => assert_eq!(error.message(), "fail"),
            Outcome::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_done_without_value_is_null() {
        let (handle, settled) = CompletionArbiter::channel();
        let context = Context::new(InvocationMetadata::default(), handle);

        context.done(None, None);

        let signal = settled.wait().await.unwrap();
        assert!(matches!(signal.outcome, Outcome::Success(Value::Null)));
    }

    #[tokio::test]
    async fn test_succeed_then_fail_keeps_first() {
        let (handle, settled) = CompletionArbiter::channel();
        let context = Context::new(InvocationMetadata::default(), handle);

        context.succeed(json!(42));
        context.fail("late failure");

        let signal = settled.wait().await.unwrap();
        assert_eq!(signal.channel, CompletionChannel::ContextSucceed);
    }

    #[test]
    fn test_metadata_from_host_env() {
        std::env::set_var("AWS_EXECUTION_ENV", "AWS_Lambda_rust");
        std::env::set_var("AWS_REGION", "us-east-1");

        let metadata = InvocationMetadata::named("greet.hello").with_host_env();
        assert_eq!(metadata.execution_env, "AWS_Lambda_rust");
        assert_eq!(metadata.region, "us-east-1");
    }

    #[test]
    fn test_metadata_deserializes_camel_case() {
        let metadata: InvocationMetadata = serde_json::from_value(json!({
            "functionName": "greet.hello",
            "requestId": "3da1f2dc",
            "deadlineMs": 676051u64,
        }))
        .unwrap();

        assert_eq!(metadata.function_name, "greet.hello");
        assert_eq!(metadata.request_id, "3da1f2dc");
        assert_eq!(metadata.deadline_ms, 676051);
        assert_eq!(metadata.region, "");
    }
}
