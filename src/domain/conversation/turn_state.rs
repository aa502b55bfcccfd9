//! Turn lifecycle of a session: `Idle → AwaitingResponse → Idle`.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ChatError;

/// Whether a session currently has a turn in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// Ready to accept a submission.
    #[default]
    Idle,
    /// A dispatcher call is outstanding; new submissions are refused.
    AwaitingResponse,
}

impl TurnState {
    /// Returns true if transition from self to target is valid.
    pub fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (TurnState::Idle, TurnState::AwaitingResponse)
                | (TurnState::AwaitingResponse, TurnState::Idle)
        )
    }

    /// Enters `AwaitingResponse`.
    ///
    /// # Errors
    ///
    /// - `Busy` if a turn is already in flight
    pub fn begin(&mut self) -> Result<(), ChatError> {
        if !self.can_transition_to(&TurnState::AwaitingResponse) {
            return Err(ChatError::Busy);
        }
        *self = TurnState::AwaitingResponse;
        Ok(())
    }

    /// Returns to `Idle` after commit or rollback.
    pub fn finish(&mut self) {
        *self = TurnState::Idle;
    }

    pub fn is_busy(&self) -> bool {
        *self == TurnState::AwaitingResponse
    }
}
