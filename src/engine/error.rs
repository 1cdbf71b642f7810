use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything that can go wrong while processing a command.
///
/// A rejected command never mutates game state; the error is returned to the
/// caller and mirrored into the snapshot's `last_error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    /// Command is not legal in the current machine state.
    #[error("command is not legal in the current state")]
    PhaseMismatch,
    /// Acting player does not match the player the machine is waiting on.
    #[error("it is not this player's turn")]
    NotYourTurn,
    /// Proposed meld violates the set or run invariants.
    #[error("proposed meld violates set or run rules")]
    IllegalMeld,
    /// Lay-down does not match the round's required meld shapes.
    #[error("lay-down does not match the round's contract")]
    ContractNotMet,
    /// A referenced card id is not held by the acting player.
    #[error("referenced card is not in hand")]
    CardNotInHand,
    /// Wild count exceeds naturals, or a joker swap against the rules.
    #[error("wild cards used against the rules")]
    WildMisuse,
    /// Deal, draw or penalty against an exhausted pile with no recovery.
    #[error("not enough cards to complete the operation")]
    NotEnoughCards,
    /// Player registration outside the 3..=8 bound, or an early start.
    #[error("player count must stay between 3 and 8")]
    PlayerCountOutOfRange,
}
