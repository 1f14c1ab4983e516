// ABOUTME: Explicit result type for stages that may be bypassed
// ABOUTME: A skipped stage still yields a structurally valid sentinel value

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a stage did not call the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The document was a general question or greeting
    ConversationalInput,
    /// The upstream assessment touched no components
    NoImpact,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ConversationalInput => f.write_str("input was conversational"),
            SkipReason::NoImpact => f.write_str("no components are affected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome<T> {
    Proceed(T),
    Skipped { reason: SkipReason, sentinel: T },
}

impl<T> StageOutcome<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, StageOutcome::Skipped { .. })
    }

    pub fn reason(&self) -> Option<SkipReason> {
        match self {
            StageOutcome::Proceed(_) => None,
            StageOutcome::Skipped { reason, .. } => Some(*reason),
        }
    }

    pub fn as_inner(&self) -> &T {
        match self {
            StageOutcome::Proceed(value) => value,
            StageOutcome::Skipped { sentinel, .. } => sentinel,
        }
    }

    /// The produced value, or the sentinel when skipped
    pub fn into_inner(self) -> T {
        match self {
            StageOutcome::Proceed(value) => value,
            StageOutcome::Skipped { sentinel, .. } => sentinel,
        }
    }
}
