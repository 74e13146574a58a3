/// Item state definitions for tracking one identifier through a batch
///
/// Every identifier handed to the coordinator walks
/// `Queued → Fetching → Assembling → Completed`, or drops into `Failed`
/// from any non-terminal state.
use crate::HarvestError;
use std::fmt;

/// Represents the current state of one identifier in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    // ===== Active States =====
    /// Waiting for a free worker slot
    Queued,

    /// Pacing delay observed, document fetch in flight
    Fetching,

    /// Document received, field extractors running
    Assembling,

    // ===== Terminal States =====
    /// A record was produced
    Completed,

    /// Fetch or assembly failed; no record
    Failed,
}

impl ItemState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if this is an active state
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the transition `self -> next` is allowed
    pub fn can_transition_to(&self, next: ItemState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Fetching)
                | (Self::Fetching, Self::Assembling)
                | (Self::Assembling, Self::Completed)
                | (Self::Queued, Self::Failed)
                | (Self::Fetching, Self::Failed)
                | (Self::Assembling, Self::Failed)
        )
    }

    /// Applies a transition, rejecting any edge the state machine does not have
    pub fn transition(self, next: ItemState) -> Result<ItemState, HarvestError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Assembling => "assembling",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible item states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Queued,
            Self::Fetching,
            Self::Assembling,
            Self::Completed,
            Self::Failed,
        ]
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
