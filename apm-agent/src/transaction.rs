use std::fmt;

/// A handle to a transaction opened by the agent.
///
/// The handle identifies the transaction toward the agent; its data is owned
/// by the agent. Each handle is scoped to exactly one invocation and must be
/// passed back to [`end_transaction`](crate::Agent::end_transaction) exactly
/// once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionHandle {
    id: u64,
    name: String,
}

impl TransactionHandle {
    /// Creates a handle for the transaction with the given agent-side id.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// The agent-side identifier of the transaction.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The name the transaction was started with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// How a failed invocation came to fail.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureOrigin {
    /// The handler threw, that is, it panicked.
    Thrown,
    /// The handler's future resolved to an error.
    Rejected,
    /// The handler reported failure through an explicit completion call.
    Explicit,
}

/// The recorded outcome of a transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionOutcome {
    /// The invocation completed successfully.
    Success,
    /// The invocation failed.
    Failure(FailureOrigin),
}

impl TransactionOutcome {
    /// The agent-side result string for this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure(_) => "failure",
        }
    }
}

impl fmt::Display for TransactionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_result_string() {
        assert_eq!(TransactionOutcome::Success.to_string(), "success");
        assert_eq!(
            TransactionOutcome::Failure(FailureOrigin::Explicit).to_string(),
            "failure"
        );
    }
}
