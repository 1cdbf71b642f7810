use crate::engine::card::{Card, CardId};
use crate::engine::contract::{Contract, FINAL_ROUND};
use crate::engine::error::GameError;
use crate::engine::events::{LayOffSpec, MeldSpec};
use crate::engine::game::PlayerId;
use crate::engine::meld::{Meld, MeldId};
use crate::engine::round::replenish_stock;
use rand::rngs::StdRng;
use std::collections::HashSet;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingDraw,
    Drawn,
    AwaitingDiscard,
    TurnComplete,
    WentOut,
}

/// The acting player's micro-machine: draw, optional melding actions, then
/// discard or go out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub state: TurnState,
    /// Lay-off is blocked on the same turn a player laid down.
    pub laid_down_this_turn: bool,
}

impl Default for Turn {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a turn event needs to touch, borrowed from the round and the
/// acting player. The machines never share state through aliases; this is the
/// one mutation path.
pub struct TurnCtx<'a> {
    pub round_number: u8,
    pub player_id: PlayerId,
    pub hand: &'a mut Vec<Card>,
    pub is_down: &'a mut bool,
    pub stock: &'a mut Vec<Card>,
    pub discard: &'a mut Vec<Card>,
    pub table: &'a mut Vec<Meld>,
    pub rng: &'a mut StdRng,
}

impl TurnCtx<'_> {
    fn hand_index(&self, card_id: CardId) -> Result<usize, GameError> {
        self.hand
            .iter()
            .position(|c| c.id == card_id)
            .ok_or(GameError::CardNotInHand)
    }

    fn meld_mut<'m>(table: &'m mut [Meld], meld_id: MeldId) -> Result<&'m mut Meld, GameError> {
        table
            .iter_mut()
            .find(|m| m.id == meld_id)
            .ok_or(GameError::IllegalMeld)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    /// The stock is empty and the discard holds only its visible top card:
    /// the round ends immediately.
    RoundExhausted,
}

impl Turn {
    pub fn new() -> Self {
        Self {
            state: TurnState::AwaitingDraw,
            laid_down_this_turn: false,
        }
    }

    pub fn went_out(&self) -> bool {
        self.state == TurnState::WentOut
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, TurnState::TurnComplete | TurnState::WentOut)
    }

    pub fn draw_from_stock(&mut self, ctx: &mut TurnCtx) -> Result<DrawOutcome, GameError> {
        if self.state != TurnState::AwaitingDraw {
            return Err(GameError::PhaseMismatch);
        }
        if ctx.stock.is_empty() && !replenish_stock(ctx.stock, ctx.discard, ctx.rng) {
            return Ok(DrawOutcome::RoundExhausted);
        }
        let card = ctx.stock.pop().ok_or(GameError::NotEnoughCards)?;
        ctx.hand.push(card);
        self.state = TurnState::Drawn;
        Ok(DrawOutcome::Drawn)
    }

    /// Taking the face-up discard. Not available once down (house rule), and
    /// never opens a May I? window, since the player took the card themselves.
    pub fn draw_from_discard(&mut self, ctx: &mut TurnCtx) -> Result<Card, GameError> {
        if self.state != TurnState::AwaitingDraw {
            return Err(GameError::PhaseMismatch);
        }
        if *ctx.is_down {
            return Err(GameError::PhaseMismatch);
        }
        if ctx.discard.is_empty() {
            return Err(GameError::NotEnoughCards);
        }
        let card = ctx.discard.pop().ok_or(GameError::NotEnoughCards)?;
        ctx.hand.push(card);
        self.state = TurnState::Drawn;
        Ok(card)
    }

    /// One-shot contract lay-down. Validates every proposed meld and the
    /// contract counts before anything moves; on success the player is down
    /// and stays in the action phase for swaps or going out.
    ///
    /// Returns `true` when the lay-down consumed the whole hand (the round-6
    /// winning path), which goes out without a discard.
    pub fn lay_down(&mut self, ctx: &mut TurnCtx, specs: &[MeldSpec]) -> Result<bool, GameError> {
        if self.state != TurnState::Drawn || *ctx.is_down {
            return Err(GameError::PhaseMismatch);
        }

        let mut used = HashSet::new();
        let mut melds = Vec::with_capacity(specs.len());
        let mut sets = 0;
        let mut runs = 0;
        for spec in specs {
            let mut cards = Vec::with_capacity(spec.card_ids.len());
            for &card_id in &spec.card_ids {
                if !used.insert(card_id) {
                    return Err(GameError::CardNotInHand);
                }
                let idx = ctx.hand_index(card_id)?;
                cards.push(ctx.hand[idx]);
            }
            let meld = Meld::new(ctx.player_id, spec.kind, cards)?;
            match spec.kind {
                crate::engine::meld::MeldKind::Set => sets += 1,
                crate::engine::meld::MeldKind::Run => runs += 1,
            }
            melds.push(meld);
        }

        let contract = Contract::for_round(ctx.round_number);
        if !contract.matches(sets, runs) {
            return Err(GameError::ContractNotMet);
        }

        ctx.hand.retain(|c| !used.contains(&c.id));
        ctx.table.extend(melds);
        *ctx.is_down = true;
        self.laid_down_this_turn = true;
        info!(player = %ctx.player_id, round = ctx.round_number, "contract laid down");

        if ctx.hand.is_empty() {
            self.state = TurnState::WentOut;
            return Ok(true);
        }
        Ok(false)
    }

    /// Lays a single hand card onto any table meld. Requires being down, not
    /// on the lay-down turn, and never in round 6.
    ///
    /// Returns `true` when the last card left the hand, which goes out.
    pub fn lay_off(
        &mut self,
        ctx: &mut TurnCtx,
        card_id: CardId,
        meld_id: MeldId,
    ) -> Result<bool, GameError> {
        if self.state != TurnState::Drawn
            || !*ctx.is_down
            || self.laid_down_this_turn
            || ctx.round_number == FINAL_ROUND
        {
            return Err(GameError::PhaseMismatch);
        }

        let idx = ctx.hand_index(card_id)?;
        let card = ctx.hand[idx];
        TurnCtx::meld_mut(ctx.table, meld_id)?.lay_off(card)?;
        ctx.hand.remove(idx);

        if ctx.hand.is_empty() {
            self.state = TurnState::WentOut;
            return Ok(true);
        }
        Ok(false)
    }

    /// Trades a natural hand card for a joker in any run on the table. Only
    /// players who have not laid down may swap.
    pub fn swap_joker(
        &mut self,
        ctx: &mut TurnCtx,
        meld_id: MeldId,
        position: usize,
        hand_card_id: CardId,
    ) -> Result<(), GameError> {
        if self.state != TurnState::Drawn || *ctx.is_down {
            return Err(GameError::PhaseMismatch);
        }

        let idx = ctx.hand_index(hand_card_id)?;
        let card = ctx.hand[idx];
        let freed = TurnCtx::meld_mut(ctx.table, meld_id)?.swap_joker(position, card)?;
        ctx.hand.remove(idx);
        ctx.hand.push(freed);
        Ok(())
    }

    pub fn skip_lay_down(&mut self) -> Result<(), GameError> {
        if self.state != TurnState::Drawn {
            return Err(GameError::PhaseMismatch);
        }
        self.state = TurnState::AwaitingDiscard;
        Ok(())
    }

    /// Returns `true` when the discard emptied the hand (went out).
    pub fn discard(&mut self, ctx: &mut TurnCtx, card_id: CardId) -> Result<bool, GameError> {
        if self.state != TurnState::AwaitingDiscard {
            return Err(GameError::PhaseMismatch);
        }
        let idx = ctx.hand_index(card_id)?;

        // In round 6 a down player may not discard their last card; the hand
        // must leave through melds (GoOut) or the turn ends Stuck.
        if ctx.round_number == FINAL_ROUND && *ctx.is_down && ctx.hand.len() == 1 {
            return Err(GameError::PhaseMismatch);
        }

        let card = ctx.hand.remove(idx);
        ctx.discard.push(card);

        if ctx.hand.is_empty() {
            self.state = TurnState::WentOut;
            Ok(true)
        } else {
            self.state = TurnState::TurnComplete;
            Ok(false)
        }
    }

    /// Goes out by laying off every remaining hand card in one declared
    /// sequence. Requires being down; unlike `lay_off` it is legal in round 6
    /// and on the lay-down turn, because it is the declared way to win.
    pub fn go_out(&mut self, ctx: &mut TurnCtx, lay_offs: &[LayOffSpec]) -> Result<(), GameError> {
        if self.state != TurnState::Drawn || !*ctx.is_down {
            return Err(GameError::PhaseMismatch);
        }

        let mut used = HashSet::new();
        for spec in lay_offs {
            if !used.insert(spec.card_id) {
                return Err(GameError::CardNotInHand);
            }
            ctx.hand_index(spec.card_id)?;
        }
        if lay_offs.len() != ctx.hand.len() {
            return Err(GameError::PhaseMismatch);
        }

        // Dry-run against a copy so a failing lay-off rejects without mutating.
        let mut table = ctx.table.clone();
        for spec in lay_offs {
            let idx = ctx.hand_index(spec.card_id)?;
            TurnCtx::meld_mut(&mut table, spec.meld_id)?.lay_off(ctx.hand[idx])?;
        }

        *ctx.table = table;
        ctx.hand.clear();
        self.state = TurnState::WentOut;
        info!(player = %ctx.player_id, "went out on final lay-offs");
        Ok(())
    }

    /// Round-6 escape hatch: a down player holding one undiscardable card
    /// ends the turn keeping it.
    pub fn stuck(&mut self, ctx: &mut TurnCtx) -> Result<(), GameError> {
        if !matches!(self.state, TurnState::Drawn | TurnState::AwaitingDiscard) {
            return Err(GameError::PhaseMismatch);
        }
        if ctx.round_number != FINAL_ROUND || !*ctx.is_down || ctx.hand.len() != 1 {
            return Err(GameError::PhaseMismatch);
        }
        self.state = TurnState::TurnComplete;
        Ok(())
    }
}
