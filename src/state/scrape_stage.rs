/// Stage definitions for a single scrape request
///
/// This module defines every stage a scrape passes through between URL
/// validation and the persisted record.
use std::fmt;

/// Represents the current stage of one scrape request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapeStage {
    // ===== Active Stages =====
    /// The URL passed caller-side validation
    Validated,

    /// The outbound request is in flight
    Fetching,

    /// The body is being parsed into metadata
    Extracting,

    /// The result is being written to the store
    Persisting,

    // ===== Terminal Stages =====
    /// The record was persisted and returned
    Done,

    /// A stage failed; the request produced no record
    Failed,
}

impl ScrapeStage {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the request is still progressing
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns the stage that follows this one on success
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Validated => Some(Self::Fetching),
            Self::Fetching => Some(Self::Extracting),
            Self::Extracting => Some(Self::Persisting),
            Self::Persisting => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Checks whether moving from this stage to `to` is allowed
    ///
    /// Stages advance strictly in order; any active stage may fail.
    pub fn can_transition_to(&self, to: Self) -> bool {
        if to == Self::Failed {
            return self.is_active();
        }
        self.next() == Some(to)
    }

    /// Returns the short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validated => "validated",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns all stages in pipeline order
    pub fn all_stages() -> Vec<Self> {
        vec![
            Self::Validated,
            Self::Fetching,
            Self::Extracting,
            Self::Persisting,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for ScrapeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
