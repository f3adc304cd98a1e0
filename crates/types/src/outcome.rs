use serde_json::Value;

/// Classified result of a single outbound call.
///
/// Constructed per call by the dispatcher and consumed by the result projector.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A 2xx response whose body parsed as JSON.
    Success { payload: Value },
    /// Any other outcome: non-2xx status, transport failure, timeout, or unparsable body.
    Failure {
        /// Best-effort human-readable message, already redacted.
        diagnostic: String,
        /// HTTP status when a response was received.
        status: Option<u16>,
        /// Error body, when one was received and parsed.
        raw: Option<Value>,
    },
}

impl DispatchOutcome {
    pub fn success(payload: Value) -> Self {
        Self::Success { payload }
    }

    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self::Failure {
            diagnostic: diagnostic.into(),
            status: None,
            raw: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
