use crate::engine::card::{Card, CardId};
use crate::engine::contract::Contract;
use crate::engine::error::GameError;
use crate::engine::game::PlayerId;
use crate::engine::mayi::MayIResolution;
use crate::engine::meld::{Meld, MeldId, MeldKind};
use crate::engine::round::RoundRecord;
use serde::{Deserialize, Serialize};

/// Everything an embedder can ask the engine to do. Commands that can be sent
/// out of turn carry the acting player's id; the rest act for the player the
/// engine is currently waiting on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    AddPlayer { name: String },
    StartGame,
    DrawFromStock,
    DrawFromDiscard,
    LayDown { melds: Vec<MeldSpec> },
    LayOff { card_id: CardId, meld_id: MeldId },
    SwapJoker {
        meld_id: MeldId,
        joker_position: usize,
        hand_card_id: CardId,
    },
    SkipLayDown,
    Discard { card_id: CardId },
    GoOut { final_lay_offs: Vec<LayOffSpec> },
    Stuck,
    CallMayI { player_id: PlayerId },
    AllowMayI,
    ClaimMayI,
    Reshuffle,
    ReorderHand {
        player_id: PlayerId,
        new_order: Vec<CardId>,
    },
}

/// One proposed meld in a lay-down: the declared shape plus the hand cards
/// composing it, in the order they should read on the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeldSpec {
    pub kind: MeldKind,
    pub card_ids: Vec<CardId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayOffSpec {
    pub card_id: CardId,
    pub meld_id: MeldId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    RoundActive,
    /// A granted May I? waits on the winner's `ClaimMayI`.
    ResolvingMayI,
    RoundEnd,
    GameEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    AwaitingDraw,
    AwaitingAction,
    AwaitingDiscard,
}

/// Public view of one player. The engine's own snapshot carries full hands;
/// `Snapshot::redacted_for` trims them per recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    pub hand_count: usize,
    pub is_down: bool,
    pub laid_down_this_turn: bool,
    pub total_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MayIView {
    pub discarded: Card,
    pub discarder_id: Option<PlayerId>,
    pub current_player_id: PlayerId,
    /// Priority order, best claim first.
    pub claimants: Vec<PlayerId>,
    pub current_player_has_drawn: bool,
    pub granted_to: Option<PlayerId>,
}

/// The observable state of the whole game. Cheap to build, fully serializable,
/// and the only thing availability derivation is allowed to look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub turn_phase: Option<TurnPhase>,
    pub current_round: u8,
    pub contract: Contract,
    pub dealer_index: usize,
    pub current_player_index: usize,
    pub players: Vec<PlayerView>,
    pub stock_count: usize,
    pub discard_top: Option<Card>,
    pub discard_count: usize,
    pub table: Vec<Meld>,
    pub may_i: Option<MayIView>,
    pub last_may_i: Option<MayIResolution>,
    pub round_history: Vec<RoundRecord>,
    pub winners: Vec<PlayerId>,
    pub last_error: Option<GameError>,
}

impl Snapshot {
    /// The view one player is allowed to see: their own cards, everyone
    /// else's hand reduced to a count.
    pub fn redacted_for(&self, player_id: PlayerId) -> Snapshot {
        let mut snapshot = self.clone();
        for player in &mut snapshot.players {
            if player.id != player_id {
                player.hand.clear();
            }
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::card::{Suit, Value};
    use uuid::Uuid;

    #[test]
    fn test_command_wire_shape() {
        let json = serde_json::to_value(&Command::Discard {
            card_id: CardId(12),
        })
        .unwrap();
        assert_eq!(json["type"], "Discard");
        assert_eq!(json["card_id"], 12);

        let round_trip: Command = serde_json::from_value(json).unwrap();
        assert!(matches!(
            round_trip,
            Command::Discard {
                card_id: CardId(12)
            }
        ));

        let json = serde_json::to_value(&Command::StartGame).unwrap();
        assert_eq!(json["type"], "StartGame");
    }

    #[test]
    fn test_redaction_keeps_counts_and_own_hand() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let card = Card::standard(CardId(0), Suit::Hearts, Value::Nine);
        let snapshot = Snapshot {
            phase: Phase::RoundActive,
            turn_phase: Some(TurnPhase::AwaitingDraw),
            current_round: 1,
            contract: Contract::for_round(1),
            dealer_index: 0,
            current_player_index: 0,
            players: vec![
                PlayerView {
                    id: me,
                    name: "me".into(),
                    hand: vec![card],
                    hand_count: 1,
                    is_down: false,
                    laid_down_this_turn: false,
                    total_score: 0,
                },
                PlayerView {
                    id: other,
                    name: "other".into(),
                    hand: vec![card],
                    hand_count: 1,
                    is_down: false,
                    laid_down_this_turn: false,
                    total_score: 0,
                },
            ],
            stock_count: 0,
            discard_top: None,
            discard_count: 0,
            table: Vec::new(),
            may_i: None,
            last_may_i: None,
            round_history: Vec::new(),
            winners: Vec::new(),
            last_error: None,
        };

        let mine = snapshot.redacted_for(me);
        assert_eq!(mine.players[0].hand.len(), 1);
        assert!(mine.players[1].hand.is_empty());
        assert_eq!(mine.players[1].hand_count, 1);
    }
}
