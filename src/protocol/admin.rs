//! Administrative requests and replies: phase control, market-state
//! store/recover and the order-flow generator lifecycle.

use std::fmt;

/// Outcome of an administrative operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminResult {
    Success,
    Error {
        /// Short machine-readable code.
        code: String,
        /// Human-readable reason.
        reason: String,
    },
}

impl AdminResult {
    /// Builds an error result from a code and reason.
    #[must_use]
    pub fn error(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            reason: reason.into(),
        }
    }

    /// True for a successful outcome.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl Default for AdminResult {
    fn default() -> Self {
        Self::Success
    }
}

impl fmt::Display for AdminResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("Success"),
            Self::Error { code, reason } => write!(f, "Error[{code}]: {reason}"),
        }
    }
}

/// Requests trading status `Halt` on every instrument.
#[derive(Debug, Clone, Copy)]
pub struct HaltPhaseRequest {
    /// When set, cancellation of resting orders stays allowed during the
    /// halt.
    pub allow_cancels: bool,
}

impl Default for HaltPhaseRequest {
    fn default() -> Self {
        Self {
            allow_cancels: true,
        }
    }
}

/// Reply to a halt request.
#[derive(Debug, Clone, Default)]
pub struct HaltPhaseReply {
    pub result: AdminResult,
}

/// Requests trading status `Resume` on every instrument.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResumePhaseRequest;

/// Reply to a resume request.
#[derive(Debug, Clone, Default)]
pub struct ResumePhaseReply {
    pub result: AdminResult,
}

/// Requests a persisted market-state snapshot of the whole venue.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreMarketStateRequest;

/// Reply to a store request.
#[derive(Debug, Clone, Default)]
pub struct StoreMarketStateReply {
    pub result: AdminResult,
}

/// Requests recovery of the venue from the persisted snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoverMarketStateRequest;

/// Reply to a recover request.
#[derive(Debug, Clone, Default)]
pub struct RecoverMarketStateReply {
    pub result: AdminResult,
}

/// Lifecycle state of the order-flow generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationStatus {
    #[default]
    Stopped,
    Running,
}

/// Queries the generator status.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationStatusRequest;

/// Reply to a generator status query.
#[derive(Debug, Clone, Default)]
pub struct GenerationStatusReply {
    pub status: GenerationStatus,
    pub result: AdminResult,
}

/// Starts the generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartGenerationRequest;

/// Reply to a generator start request.
#[derive(Debug, Clone, Default)]
pub struct StartGenerationReply {
    pub result: AdminResult,
}

/// Stops the generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopGenerationRequest;

/// Reply to a generator stop request.
#[derive(Debug, Clone, Default)]
pub struct StopGenerationReply {
    pub result: AdminResult,
}
