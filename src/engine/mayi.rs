use crate::engine::card::Card;
use crate::engine::error::GameError;
use crate::engine::game::PlayerId;
use serde::{Deserialize, Serialize};

/// The out-of-turn claim window on the face-up discard.
///
/// One window exists per claimable discard: it opens atomically with the
/// discard (or the initial flip at deal) and lives until the current player
/// takes the card themselves (veto), a claim resolves, or the next discard
/// replaces it. Claimants are kept in seat-priority order, so the outcome is
/// the same no matter what order claim events arrive in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MayIWindow {
    /// The card up for grabs (the discard top when the window opened).
    pub discarded: Card,
    /// Seat that threw the card; `None` for the initial flip.
    pub discarder: Option<usize>,
    /// Seat whose turn it is; they veto by drawing the card themselves.
    pub current_player: usize,
    /// Claiming seats in priority order, not arrival order.
    pub claimants: Vec<usize>,
    /// Once the current player has drawn from stock, a claim resolves on the
    /// spot instead of waiting on them.
    pub current_has_drawn: bool,
    /// Winner named by `AllowMayI`, awaiting their `ClaimMayI`.
    pub granted_to: Option<usize>,
}

impl MayIWindow {
    pub fn open(discarded: Card, discarder: Option<usize>, current_player: usize) -> Self {
        Self {
            discarded,
            discarder,
            current_player,
            claimants: Vec::new(),
            current_has_drawn: false,
            granted_to: None,
        }
    }

    /// Distance in seats from the player immediately left of the current
    /// player, clockwise. Lower wins.
    pub fn seat_priority(&self, seat: usize, player_count: usize) -> usize {
        let start = (self.current_player + 1) % player_count;
        (seat + player_count - start) % player_count
    }

    /// Registers a claim, keeping the claimant list in priority order.
    /// The discarder, the current player, down players, and duplicate claims
    /// are all turned away.
    pub fn register_claim(
        &mut self,
        seat: usize,
        player_count: usize,
        claimant_is_down: bool,
    ) -> Result<(), GameError> {
        if self.granted_to.is_some()
            || seat == self.current_player
            || Some(seat) == self.discarder
            || claimant_is_down
            || self.claimants.contains(&seat)
        {
            return Err(GameError::PhaseMismatch);
        }

        let priority = self.seat_priority(seat, player_count);
        let position = self
            .claimants
            .iter()
            .position(|&s| self.seat_priority(s, player_count) > priority)
            .unwrap_or(self.claimants.len());
        self.claimants.insert(position, seat);
        Ok(())
    }

    pub fn first_claimant(&self) -> Option<usize> {
        self.claimants.first().copied()
    }

    /// The current player waives the card before drawing: the top-priority
    /// claimant is named winner and the engine waits on their `ClaimMayI`.
    pub fn grant(&mut self) -> Result<usize, GameError> {
        if self.granted_to.is_some() || self.current_has_drawn {
            return Err(GameError::PhaseMismatch);
        }
        let winner = self.first_claimant().ok_or(GameError::PhaseMismatch)?;
        self.granted_to = Some(winner);
        Ok(winner)
    }
}

/// How the last window closed; stays visible in the snapshot until the next
/// window opens so embedders can narrate the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MayIResolution {
    /// `None` on a veto (the current player kept the card for themselves).
    pub winner_id: Option<PlayerId>,
    pub card: Card,
    /// The penalty card that came with the grant; `None` if the stock was dry.
    pub penalty: Option<Card>,
    pub vetoed: bool,
}
