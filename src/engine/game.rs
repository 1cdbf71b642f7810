use crate::engine::card::{Card, CardId};
use crate::engine::contract::{Contract, FINAL_ROUND};
use crate::engine::error::GameError;
use crate::engine::events::{Command, MayIView, Phase, PlayerView, Snapshot, TurnPhase};
use crate::engine::round::{Round, RoundOutcome, RoundRecord};
use crate::engine::turn::TurnState;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

pub type PlayerId = Uuid;

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    /// Has satisfied the contract this round. Monotone within a round.
    pub is_down: bool,
    /// Cumulative across rounds; only ever grows.
    pub total_score: u32,
}

#[derive(Debug, Clone)]
pub enum GamePhase {
    Setup,
    Playing(Round),
    GameEnd { winners: Vec<PlayerId> },
}

/// The outer machine and the engine handle. All mutation flows through
/// [`Game::send`]; a rejected command leaves everything but `last_error`
/// untouched.
#[derive(Debug, Clone)]
pub struct Game {
    pub players: Vec<Player>,
    pub phase: GamePhase,
    pub current_round: u8,
    pub dealer_index: usize,
    pub history: Vec<RoundRecord>,
    pub last_error: Option<GameError>,
    pub rng: StdRng,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A fresh game in Setup, shuffling with OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// A fresh game with a deterministic generator, for reproducible play.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            players: Vec::new(),
            phase: GamePhase::Setup,
            current_round: 1,
            dealer_index: 0,
            history: Vec::new(),
            last_error: None,
            rng,
        }
    }

    /// Processes one command synchronously. On success the fresh snapshot
    /// comes back; on rejection the state is untouched apart from
    /// `last_error`, and `snapshot()` shows the unchanged game.
    pub fn send(&mut self, command: Command) -> Result<Snapshot, GameError> {
        match self.handle(&command) {
            Ok(()) => {
                self.last_error = None;
                Ok(self.snapshot())
            }
            Err(err) => {
                self.last_error = Some(err);
                Err(err)
            }
        }
    }

    fn handle(&mut self, command: &Command) -> Result<(), GameError> {
        match command {
            Command::AddPlayer { name } => self.add_player(name),
            Command::StartGame => self.start_game(),
            Command::ReorderHand {
                player_id,
                new_order,
            } => self.reorder_hand(*player_id, new_order),
            _ => self.handle_round_command(command),
        }
    }

    fn add_player(&mut self, name: &str) -> Result<(), GameError> {
        if !matches!(self.phase, GamePhase::Setup) {
            return Err(GameError::PhaseMismatch);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::PlayerCountOutOfRange);
        }
        let player = Player {
            id: Uuid::new_v4(),
            name: name.to_string(),
            hand: Vec::new(),
            is_down: false,
            total_score: 0,
        };
        info!(player = %player.id, name, "player joined");
        self.players.push(player);
        Ok(())
    }

    fn start_game(&mut self) -> Result<(), GameError> {
        if !matches!(self.phase, GamePhase::Setup) {
            return Err(GameError::PhaseMismatch);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::PlayerCountOutOfRange);
        }

        self.current_round = 1;
        self.dealer_index = 0;
        let round = Round::deal(
            self.current_round,
            &mut self.players,
            self.dealer_index,
            &mut self.rng,
        )?;
        self.phase = GamePhase::Playing(round);
        info!(players = self.players.len(), "game started");
        Ok(())
    }

    /// Any player may rearrange their own hand at any point of a live round;
    /// the new order must be the same multiset of card ids.
    fn reorder_hand(
        &mut self,
        player_id: PlayerId,
        new_order: &[CardId],
    ) -> Result<(), GameError> {
        if !matches!(self.phase, GamePhase::Playing(_)) {
            return Err(GameError::PhaseMismatch);
        }
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(GameError::NotYourTurn)?;

        if new_order.len() != player.hand.len() {
            return Err(GameError::CardNotInHand);
        }
        let mut by_id: HashMap<CardId, Card> =
            player.hand.iter().map(|c| (c.id, *c)).collect();
        let mut reordered = Vec::with_capacity(new_order.len());
        for card_id in new_order {
            reordered.push(by_id.remove(card_id).ok_or(GameError::CardNotInHand)?);
        }
        player.hand = reordered;
        Ok(())
    }

    fn handle_round_command(&mut self, command: &Command) -> Result<(), GameError> {
        let Game {
            phase,
            players,
            rng,
            ..
        } = self;
        let GamePhase::Playing(round) = phase else {
            return Err(GameError::PhaseMismatch);
        };

        let outcome = match command {
            Command::DrawFromStock => round.handle_draw_from_stock(players, rng)?,
            Command::DrawFromDiscard => round.handle_draw_from_discard(players, rng)?,
            Command::LayDown { melds } => round.handle_lay_down(players, rng, melds)?,
            Command::LayOff { card_id, meld_id } => {
                round.handle_lay_off(players, rng, *card_id, *meld_id)?
            }
            Command::SwapJoker {
                meld_id,
                joker_position,
                hand_card_id,
            } => round.handle_swap_joker(players, rng, *meld_id, *joker_position, *hand_card_id)?,
            Command::SkipLayDown => round.handle_skip_lay_down()?,
            Command::Discard { card_id } => round.handle_discard(players, rng, *card_id)?,
            Command::GoOut { final_lay_offs } => {
                round.handle_go_out(players, rng, final_lay_offs)?
            }
            Command::Stuck => round.handle_stuck(players, rng)?,
            Command::CallMayI { player_id } => round.handle_call_may_i(players, *player_id)?,
            Command::AllowMayI => round.handle_allow_may_i(players)?,
            Command::ClaimMayI => round.handle_claim_may_i(players)?,
            Command::Reshuffle => round.handle_reshuffle(rng)?,
            // Setup commands were routed before we got here.
            _ => return Err(GameError::PhaseMismatch),
        };

        match outcome {
            RoundOutcome::Continue => Ok(()),
            RoundOutcome::WentOut(seat) => self.finish_round(Some(seat)),
            RoundOutcome::Exhausted => self.finish_round(None),
        }
    }

    /// Scores the finished round and immediately either deals the next one
    /// (dealer rotates left) or, after round 6, ends the game.
    fn finish_round(&mut self, winner_seat: Option<usize>) -> Result<(), GameError> {
        let GamePhase::Playing(round) = &self.phase else {
            return Err(GameError::PhaseMismatch);
        };
        let record = round.score(&self.players, winner_seat);
        for player in &mut self.players {
            player.total_score += record.scores.get(&player.id).copied().unwrap_or(0);
        }
        info!(
            round = record.round_number,
            winner = ?record.winner_id,
            "round scored"
        );
        self.history.push(record);

        if self.current_round == FINAL_ROUND {
            let winners = self.compute_winners();
            info!(?winners, "game over");
            self.phase = GamePhase::GameEnd { winners };
            return Ok(());
        }

        self.current_round += 1;
        self.dealer_index = (self.dealer_index + 1) % self.players.len();
        let round = Round::deal(
            self.current_round,
            &mut self.players,
            self.dealer_index,
            &mut self.rng,
        )?;
        self.phase = GamePhase::Playing(round);
        Ok(())
    }

    /// Everyone sharing the minimum total wins; ties produce several winners.
    fn compute_winners(&self) -> Vec<PlayerId> {
        let Some(best) = self.players.iter().map(|p| p.total_score).min() else {
            return Vec::new();
        };
        self.players
            .iter()
            .filter(|p| p.total_score == best)
            .map(|p| p.id)
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        let round = match &self.phase {
            GamePhase::Playing(round) => Some(round),
            _ => None,
        };

        let phase = match &self.phase {
            GamePhase::Setup => Phase::Setup,
            GamePhase::Playing(round) => {
                if round.window.as_ref().is_some_and(|w| w.granted_to.is_some()) {
                    Phase::ResolvingMayI
                } else {
                    Phase::RoundActive
                }
            }
            GamePhase::GameEnd { .. } => Phase::GameEnd,
        };

        let turn_phase = round.and_then(|r| match r.turn.state {
            TurnState::AwaitingDraw => Some(TurnPhase::AwaitingDraw),
            TurnState::Drawn => Some(TurnPhase::AwaitingAction),
            TurnState::AwaitingDiscard => Some(TurnPhase::AwaitingDiscard),
            TurnState::TurnComplete | TurnState::WentOut => None,
        });

        let current_player_index = round.map_or(0, |r| r.current_player);
        let players = self
            .players
            .iter()
            .enumerate()
            .map(|(seat, player)| PlayerView {
                id: player.id,
                name: player.name.clone(),
                hand: player.hand.clone(),
                hand_count: player.hand.len(),
                is_down: player.is_down,
                laid_down_this_turn: round
                    .is_some_and(|r| seat == r.current_player && r.turn.laid_down_this_turn),
                total_score: player.total_score,
            })
            .collect();

        let may_i = round.and_then(|r| {
            r.window.as_ref().map(|w| MayIView {
                discarded: w.discarded,
                discarder_id: w.discarder.map(|seat| self.players[seat].id),
                current_player_id: self.players[w.current_player].id,
                claimants: w.claimants.iter().map(|&s| self.players[s].id).collect(),
                current_player_has_drawn: w.current_has_drawn,
                granted_to: w.granted_to.map(|seat| self.players[seat].id),
            })
        });

        let winners = match &self.phase {
            GamePhase::GameEnd { winners } => winners.clone(),
            _ => Vec::new(),
        };

        Snapshot {
            phase,
            turn_phase,
            current_round: self.current_round,
            contract: Contract::for_round(self.current_round),
            dealer_index: self.dealer_index,
            current_player_index,
            players,
            stock_count: round.map_or(0, |r| r.stock.len()),
            discard_top: round.and_then(|r| r.discard.last().copied()),
            discard_count: round.map_or(0, |r| r.discard.len()),
            table: round.map_or_else(Vec::new, |r| r.table.clone()),
            may_i,
            last_may_i: round.and_then(|r| r.last_resolution.clone()),
            round_history: self.history.clone(),
            winners,
            last_error: self.last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_game(player_count: usize) -> Game {
        let mut game = Game::with_seed(1234);
        for i in 0..player_count {
            game.send(Command::AddPlayer {
                name: format!("p{i}"),
            })
            .unwrap();
        }
        game
    }

    #[test]
    fn test_setup_bounds() {
        let mut game = Game::with_seed(0);
        assert_eq!(
            game.send(Command::StartGame).unwrap_err(),
            GameError::PlayerCountOutOfRange
        );

        for i in 0..MAX_PLAYERS {
            game.send(Command::AddPlayer {
                name: format!("p{i}"),
            })
            .unwrap();
        }
        assert_eq!(
            game.send(Command::AddPlayer { name: "nine".into() })
                .unwrap_err(),
            GameError::PlayerCountOutOfRange
        );
        assert_eq!(game.players.len(), MAX_PLAYERS);

        // The rejection is observable but nothing moved.
        let snapshot = game.snapshot();
        assert_eq!(
            snapshot.last_error,
            Some(GameError::PlayerCountOutOfRange)
        );
        assert_eq!(snapshot.players.len(), MAX_PLAYERS);
    }

    #[test]
    fn test_start_deals_round_one_left_of_dealer() {
        let mut game = setup_game(4);
        let snapshot = game.send(Command::StartGame).unwrap();

        assert_eq!(snapshot.phase, Phase::RoundActive);
        assert_eq!(snapshot.current_round, 1);
        assert_eq!(snapshot.dealer_index, 0);
        assert_eq!(snapshot.current_player_index, 1);
        assert_eq!(snapshot.turn_phase, Some(TurnPhase::AwaitingDraw));
        assert_eq!(snapshot.contract, Contract { sets: 2, runs: 0 });
        for player in &snapshot.players {
            assert_eq!(player.hand_count, 11);
        }
        assert_eq!(snapshot.stock_count, 108 - 44 - 1);
        assert_eq!(snapshot.discard_count, 1);

        // Gameplay commands now, setup commands never.
        assert_eq!(
            game.send(Command::AddPlayer { name: "late".into() })
                .unwrap_err(),
            GameError::PhaseMismatch
        );
        assert_eq!(
            game.send(Command::StartGame).unwrap_err(),
            GameError::PhaseMismatch
        );
    }

    #[test]
    fn test_gameplay_commands_rejected_in_setup() {
        let mut game = setup_game(3);
        assert_eq!(
            game.send(Command::DrawFromStock).unwrap_err(),
            GameError::PhaseMismatch
        );
        assert_eq!(
            game.send(Command::Stuck).unwrap_err(),
            GameError::PhaseMismatch
        );
    }

    #[test]
    fn test_rejected_command_is_a_no_op_apart_from_last_error() {
        let mut game = setup_game(4);
        game.send(Command::StartGame).unwrap();
        let before = game.snapshot();

        // Not in the discard phase yet.
        let err = game
            .send(Command::Discard {
                card_id: CardId(0),
            })
            .unwrap_err();
        assert_eq!(err, GameError::PhaseMismatch);

        let mut after = game.snapshot();
        assert_eq!(after.last_error, Some(GameError::PhaseMismatch));
        after.last_error = before.last_error;
        assert_eq!(after, before);
    }

    #[test]
    fn test_turn_rotation_on_plain_turns() {
        let mut game = setup_game(4);
        game.send(Command::StartGame).unwrap();

        for expected_seat in [1usize, 2, 3, 0, 1] {
            let snapshot = game.snapshot();
            assert_eq!(snapshot.current_player_index, expected_seat);

            game.send(Command::DrawFromStock).unwrap();
            game.send(Command::SkipLayDown).unwrap();
            let seat = game.snapshot().current_player_index;
            let card_id = game.players[seat].hand[0].id;
            game.send(Command::Discard { card_id }).unwrap();
        }
    }

    #[test]
    fn test_reorder_hand_checks_multiset() {
        let mut game = setup_game(4);
        game.send(Command::StartGame).unwrap();

        let player_id = game.players[2].id;
        let mut order: Vec<CardId> = game.players[2].hand.iter().map(|c| c.id).collect();
        order.reverse();
        game.send(Command::ReorderHand {
            player_id,
            new_order: order.clone(),
        })
        .unwrap();
        let ids: Vec<CardId> = game.players[2].hand.iter().map(|c| c.id).collect();
        assert_eq!(ids, order);

        // Dropping a card is not a reorder.
        order.pop();
        assert_eq!(
            game.send(Command::ReorderHand {
                player_id,
                new_order: order,
            })
            .unwrap_err(),
            GameError::CardNotInHand
        );

        let ghost = Uuid::new_v4();
        assert_eq!(
            game.send(Command::ReorderHand {
                player_id: ghost,
                new_order: Vec::new(),
            })
            .unwrap_err(),
            GameError::NotYourTurn
        );
    }
}
