use crate::engine::card::{Card, CardId};
use crate::engine::deck::{Deck, DeckConfig};
use crate::engine::error::GameError;
use crate::engine::events::{LayOffSpec, MeldSpec};
use crate::engine::game::{Player, PlayerId};
use crate::engine::mayi::{MayIResolution, MayIWindow};
use crate::engine::meld::{Meld, MeldId};
use crate::engine::points::hand_points;
use crate::engine::turn::{DrawOutcome, Turn, TurnCtx};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Takes everything buried under the visible discard top, shuffles it, and
/// installs it as the new stock. Returns `false` when only the top is left;
/// the caller must end the round (house rule).
pub fn replenish_stock(stock: &mut Vec<Card>, discard: &mut Vec<Card>, rng: &mut StdRng) -> bool {
    if discard.len() <= 1 {
        return false;
    }
    let Some(top) = discard.pop() else {
        return false;
    };
    let mut buried = std::mem::take(discard);
    buried.shuffle(rng);
    *stock = buried;
    discard.push(top);
    debug!(stock = stock.len(), "stock replenished from discard");
    true
}

/// What a processed command did to the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Continue,
    /// The seat that emptied their hand; the round moves to scoring.
    WentOut(usize),
    /// Stock and discard are both spent; the round ends with no winner.
    Exhausted,
}

/// Scores for one finished round. `winner_id` is `None` when the round ended
/// by exhaustion and nobody went out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_number: u8,
    pub winner_id: Option<PlayerId>,
    pub scores: HashMap<PlayerId, u32>,
}

/// One contracted round: the three public zones, the seat rotation, the
/// acting player's turn machine, and at most one May I? window.
#[derive(Debug, Clone)]
pub struct Round {
    pub number: u8,
    pub stock: Vec<Card>,
    pub discard: Vec<Card>,
    pub table: Vec<Meld>,
    pub current_player: usize,
    pub turn: Turn,
    pub window: Option<MayIWindow>,
    pub last_resolution: Option<MayIResolution>,
    /// Seat that threw the current discard top, while known.
    pub last_discarder: Option<usize>,
}

impl Round {
    /// Deals a fresh round: shoe by player count, shuffle, 11 cards each,
    /// one face-up discard (which immediately opens the first claim window),
    /// first seat left of the dealer.
    pub fn deal(
        number: u8,
        players: &mut [Player],
        dealer_index: usize,
        rng: &mut StdRng,
    ) -> Result<Self, GameError> {
        let config = DeckConfig::for_players(players.len())?;
        let mut deck = Deck::build(config);
        deck.shuffle(rng);
        let dealt = deck.deal(players.len())?;

        for (player, hand) in players.iter_mut().zip(dealt.hands) {
            player.hand = hand;
            player.is_down = false;
        }

        let current_player = (dealer_index + 1) % players.len();
        let top = dealt.discard.last().copied().ok_or(GameError::NotEnoughCards)?;

        info!(
            round = number,
            players = players.len(),
            shoe = config.total_cards(),
            "round dealt"
        );

        Ok(Self {
            number,
            stock: dealt.stock,
            discard: dealt.discard,
            table: Vec::new(),
            current_player,
            turn: Turn::new(),
            window: Some(MayIWindow::open(top, None, current_player)),
            last_resolution: None,
            last_discarder: None,
        })
    }

    fn granted(&self) -> Option<usize> {
        self.window.as_ref().and_then(|w| w.granted_to)
    }

    /// Rejects gameplay while a granted window waits on its winner.
    fn guard_not_resolving(&self) -> Result<(), GameError> {
        if self.granted().is_some() {
            return Err(GameError::PhaseMismatch);
        }
        Ok(())
    }

    pub fn handle_draw_from_stock(
        &mut self,
        players: &mut [Player],
        rng: &mut StdRng,
    ) -> Result<RoundOutcome, GameError> {
        self.guard_not_resolving()?;

        let seat = self.current_player;
        let Round {
            number,
            stock,
            discard,
            table,
            turn,
            ..
        } = self;
        let player = &mut players[seat];
        let mut ctx = TurnCtx {
            round_number: *number,
            player_id: player.id,
            hand: &mut player.hand,
            is_down: &mut player.is_down,
            stock,
            discard,
            table,
            rng,
        };
        if turn.draw_from_stock(&mut ctx)? == DrawOutcome::RoundExhausted {
            return Ok(RoundOutcome::Exhausted);
        }

        // The previous discard stays claimable, but from here on a claim
        // resolves on the spot. Anyone already waiting gets served now.
        if let Some(window) = &mut self.window {
            window.current_has_drawn = true;
        }
        if self
            .window
            .as_ref()
            .is_some_and(|w| w.first_claimant().is_some())
        {
            self.resolve_window(players);
        }
        Ok(RoundOutcome::Continue)
    }

    pub fn handle_draw_from_discard(
        &mut self,
        players: &mut [Player],
        rng: &mut StdRng,
    ) -> Result<RoundOutcome, GameError> {
        self.guard_not_resolving()?;

        let seat = self.current_player;
        let Round {
            number,
            stock,
            discard,
            table,
            turn,
            ..
        } = self;
        let player = &mut players[seat];
        let mut ctx = TurnCtx {
            round_number: *number,
            player_id: player.id,
            hand: &mut player.hand,
            is_down: &mut player.is_down,
            stock,
            discard,
            table,
            rng,
        };
        turn.draw_from_discard(&mut ctx)?;

        // Taking the card yourself is the veto: claimants get nothing.
        if let Some(window) = self.window.take() {
            if !window.claimants.is_empty() {
                info!(seat, "may-i vetoed by the current player");
                self.last_resolution = Some(MayIResolution {
                    winner_id: None,
                    card: window.discarded,
                    penalty: None,
                    vetoed: true,
                });
            }
        }
        Ok(RoundOutcome::Continue)
    }

    pub fn handle_call_may_i(
        &mut self,
        players: &mut [Player],
        caller: PlayerId,
    ) -> Result<RoundOutcome, GameError> {
        let seat = players
            .iter()
            .position(|p| p.id == caller)
            .ok_or(GameError::NotYourTurn)?;
        let window = self.window.as_mut().ok_or(GameError::PhaseMismatch)?;
        let is_down = players[seat].is_down;
        window.register_claim(seat, players.len(), is_down)?;
        debug!(seat, "may-i called");

        // After the current player has drawn from stock, the card is no
        // longer theirs to defend; the claim resolves immediately.
        if window.current_has_drawn {
            self.resolve_window(players);
        }
        Ok(RoundOutcome::Continue)
    }

    pub fn handle_allow_may_i(&mut self, players: &[Player]) -> Result<RoundOutcome, GameError> {
        let window = self.window.as_mut().ok_or(GameError::PhaseMismatch)?;
        let winner = window.grant()?;
        info!(
            winner,
            player = %players[winner].id,
            "may-i allowed, waiting on the claim"
        );
        Ok(RoundOutcome::Continue)
    }

    pub fn handle_claim_may_i(
        &mut self,
        players: &mut [Player],
    ) -> Result<RoundOutcome, GameError> {
        if self.granted().is_none() {
            return Err(GameError::PhaseMismatch);
        }
        self.resolve_window(players);
        Ok(RoundOutcome::Continue)
    }

    /// Awards the window to its winner: the discarded card plus one penalty
    /// card off the stock top (or none, without error, if the stock is dry).
    fn resolve_window(&mut self, players: &mut [Player]) {
        let Some(window) = self.window.take() else {
            return;
        };
        let Some(winner) = window.granted_to.or_else(|| window.first_claimant()) else {
            return;
        };

        if let Some(card) = self.discard.pop() {
            players[winner].hand.push(card);
        }
        let penalty = self.stock.pop();
        if let Some(card) = penalty {
            players[winner].hand.push(card);
        }

        info!(
            winner,
            player = %players[winner].id,
            card = %window.discarded,
            penalty = penalty.is_some(),
            "may-i granted"
        );
        self.last_resolution = Some(MayIResolution {
            winner_id: Some(players[winner].id),
            card: window.discarded,
            penalty,
            vetoed: false,
        });
    }

    pub fn handle_lay_down(
        &mut self,
        players: &mut [Player],
        rng: &mut StdRng,
        melds: &[MeldSpec],
    ) -> Result<RoundOutcome, GameError> {
        self.guard_not_resolving()?;
        let seat = self.current_player;
        let Round {
            number,
            stock,
            discard,
            table,
            turn,
            ..
        } = self;
        let player = &mut players[seat];
        let mut ctx = TurnCtx {
            round_number: *number,
            player_id: player.id,
            hand: &mut player.hand,
            is_down: &mut player.is_down,
            stock,
            discard,
            table,
            rng,
        };
        if turn.lay_down(&mut ctx, melds)? {
            return Ok(RoundOutcome::WentOut(seat));
        }
        Ok(RoundOutcome::Continue)
    }

    pub fn handle_lay_off(
        &mut self,
        players: &mut [Player],
        rng: &mut StdRng,
        card_id: CardId,
        meld_id: MeldId,
    ) -> Result<RoundOutcome, GameError> {
        self.guard_not_resolving()?;
        let seat = self.current_player;
        let Round {
            number,
            stock,
            discard,
            table,
            turn,
            ..
        } = self;
        let player = &mut players[seat];
        let mut ctx = TurnCtx {
            round_number: *number,
            player_id: player.id,
            hand: &mut player.hand,
            is_down: &mut player.is_down,
            stock,
            discard,
            table,
            rng,
        };
        if turn.lay_off(&mut ctx, card_id, meld_id)? {
            return Ok(RoundOutcome::WentOut(seat));
        }
        Ok(RoundOutcome::Continue)
    }

    pub fn handle_swap_joker(
        &mut self,
        players: &mut [Player],
        rng: &mut StdRng,
        meld_id: MeldId,
        position: usize,
        hand_card_id: CardId,
    ) -> Result<RoundOutcome, GameError> {
        self.guard_not_resolving()?;
        let seat = self.current_player;
        let Round {
            number,
            stock,
            discard,
            table,
            turn,
            ..
        } = self;
        let player = &mut players[seat];
        let mut ctx = TurnCtx {
            round_number: *number,
            player_id: player.id,
            hand: &mut player.hand,
            is_down: &mut player.is_down,
            stock,
            discard,
            table,
            rng,
        };
        turn.swap_joker(&mut ctx, meld_id, position, hand_card_id)?;
        Ok(RoundOutcome::Continue)
    }

    pub fn handle_skip_lay_down(&mut self) -> Result<RoundOutcome, GameError> {
        self.guard_not_resolving()?;
        self.turn.skip_lay_down()?;
        Ok(RoundOutcome::Continue)
    }

    pub fn handle_discard(
        &mut self,
        players: &mut [Player],
        rng: &mut StdRng,
        card_id: CardId,
    ) -> Result<RoundOutcome, GameError> {
        self.guard_not_resolving()?;
        let seat = self.current_player;
        let Round {
            number,
            stock,
            discard,
            table,
            turn,
            ..
        } = self;
        let player = &mut players[seat];
        let mut ctx = TurnCtx {
            round_number: *number,
            player_id: player.id,
            hand: &mut player.hand,
            is_down: &mut player.is_down,
            stock,
            discard,
            table,
            rng,
        };
        if turn.discard(&mut ctx, card_id)? {
            return Ok(RoundOutcome::WentOut(seat));
        }

        // Discard, window open and seat advance are one atomic step.
        self.last_discarder = Some(seat);
        self.advance_turn(players);
        self.window = self
            .discard
            .last()
            .copied()
            .map(|top| MayIWindow::open(top, self.last_discarder, self.current_player));
        Ok(RoundOutcome::Continue)
    }

    pub fn handle_go_out(
        &mut self,
        players: &mut [Player],
        rng: &mut StdRng,
        lay_offs: &[LayOffSpec],
    ) -> Result<RoundOutcome, GameError> {
        self.guard_not_resolving()?;
        let seat = self.current_player;
        let Round {
            number,
            stock,
            discard,
            table,
            turn,
            ..
        } = self;
        let player = &mut players[seat];
        let mut ctx = TurnCtx {
            round_number: *number,
            player_id: player.id,
            hand: &mut player.hand,
            is_down: &mut player.is_down,
            stock,
            discard,
            table,
            rng,
        };
        turn.go_out(&mut ctx, lay_offs)?;
        Ok(RoundOutcome::WentOut(seat))
    }

    pub fn handle_stuck(
        &mut self,
        players: &mut [Player],
        rng: &mut StdRng,
    ) -> Result<RoundOutcome, GameError> {
        self.guard_not_resolving()?;
        let seat = self.current_player;
        let Round {
            number,
            stock,
            discard,
            table,
            turn,
            ..
        } = self;
        let player = &mut players[seat];
        let mut ctx = TurnCtx {
            round_number: *number,
            player_id: player.id,
            hand: &mut player.hand,
            is_down: &mut player.is_down,
            stock,
            discard,
            table,
            rng,
        };
        turn.stuck(&mut ctx)?;

        // Stuck is the no-discard way out, so the next seat gets no claim
        // window; whatever window survived the stuck player's own turn is
        // spent and closes unresolved.
        self.window = None;
        self.advance_turn(players);
        Ok(RoundOutcome::Continue)
    }

    pub fn handle_reshuffle(&mut self, rng: &mut StdRng) -> Result<RoundOutcome, GameError> {
        if !self.stock.is_empty() {
            return Err(GameError::PhaseMismatch);
        }
        if replenish_stock(&mut self.stock, &mut self.discard, rng) {
            Ok(RoundOutcome::Continue)
        } else {
            Ok(RoundOutcome::Exhausted)
        }
    }

    /// Seats the next player with a fresh turn machine. Claim windows are not
    /// touched here: only an actual discard opens one.
    fn advance_turn(&mut self, players: &[Player]) {
        self.current_player = (self.current_player + 1) % players.len();
        self.turn = Turn::new();
    }

    /// Final tally: the winner scores zero, everyone else the points left in
    /// hand. With no winner (exhaustion) everyone pays.
    pub fn score(&self, players: &[Player], winner: Option<usize>) -> RoundRecord {
        let scores = players
            .iter()
            .enumerate()
            .map(|(seat, player)| {
                let points = if Some(seat) == winner {
                    0
                } else {
                    hand_points(&player.hand)
                };
                (player.id, points)
            })
            .collect();

        RoundRecord {
            round_number: self.number,
            winner_id: winner.map(|seat| players[seat].id),
            scores,
        }
    }
}
