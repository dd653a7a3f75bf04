use apm_agent::{FailureOrigin, HandlerError};
use serde_json::Value;

/// The result of one invocation.
///
/// Produced by exactly one completion channel and immutable once set.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// The invocation produced a result value.
    Success(Value),
    /// The invocation failed.
    Failure(HandlerError),
}

/// An API surface through which application code signals that an invocation
/// has finished.
///
/// Several channels may be wired for the same invocation; the first one to
/// fire wins. A handler future resolving to a value covers both the direct
/// return and the resolved-future completion styles, so they share the
/// [`Return`](Self::Return) channel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompletionChannel {
    /// The handler future resolved to a value.
    Return,
    /// The handler future resolved to an error.
    Rejection,
    /// The handler panicked.
    Panic,
    /// The callback argument was invoked.
    Callback,
    /// `done` was called on the invocation context.
    ContextDone,
    /// `succeed` was called on the invocation context.
    ContextSucceed,
    /// `fail` was called on the invocation context.
    ContextFail,
}

impl CompletionChannel {
    /// How a failure on this channel is recorded on the transaction.
    pub fn failure_origin(self) -> FailureOrigin {
        match self {
            Self::Panic => FailureOrigin::Thrown,
            Self::Return | Self::Rejection => FailureOrigin::Rejected,
            Self::Callback | Self::ContextDone | Self::ContextSucceed | Self::ContextFail => {
                FailureOrigin::Explicit
            }
        }
    }
}

/// A completion submitted by one of the wired channels.
#[derive(Clone, Debug)]
pub struct Signal {
    /// The outcome the channel reported.
    pub outcome: Outcome,
    /// The channel that reported it.
    pub channel: CompletionChannel,
}

impl Signal {
    /// Creates a success signal.
    pub fn success(value: Value, channel: CompletionChannel) -> Self {
        Self {
            outcome: Outcome::Success(value),
            channel,
        }
    }

    /// Creates a failure signal.
    pub fn failure(error: HandlerError, channel: CompletionChannel) -> Self {
        Self {
            outcome: Outcome::Failure(error),
            channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_origins() {
        assert_eq!(
            CompletionChannel::Panic.failure_origin(),
            FailureOrigin::Thrown
        );
        assert_eq!(
            CompletionChannel::Rejection.failure_origin(),
            FailureOrigin::Rejected
        );
        assert_eq!(
            CompletionChannel::ContextFail.failure_origin(),
            FailureOrigin::Explicit
        );
        assert_eq!(
            CompletionChannel::Callback.failure_origin(),
            FailureOrigin::Explicit
        );
    }
}
