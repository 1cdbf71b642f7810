use crate::engine::card::{Card, Suit, Value};
use crate::engine::error::GameError;
use crate::engine::game::PlayerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MeldId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeldKind {
    Set,
    Run,
}

/// A meld on the table. `owner_id` records who laid it down; any down player
/// may later lay off onto it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meld {
    pub id: MeldId,
    pub owner_id: PlayerId,
    pub body: MeldBody,
}

/// Runs keep the implied value of every position alongside the cards, so a
/// wild's meaning is fixed at construction and joker-swap is an index lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeldBody {
    Set {
        cards: Vec<Card>,
    },
    Run {
        suit: Suit,
        cards: Vec<Card>,
        values: Vec<Value>,
    },
}

fn wild_count(cards: &[Card]) -> usize {
    cards.iter().filter(|c| c.is_wild()).count()
}

/// Validates a set: size ≥ 3, all naturals share one value, wilds ≤ naturals.
fn build_set(cards: Vec<Card>) -> Result<MeldBody, GameError> {
    if cards.len() < 3 {
        return Err(GameError::IllegalMeld);
    }

    let mut set_value: Option<Value> = None;
    for card in &cards {
        if let Some((_, value)) = card.natural() {
            match set_value {
                Some(v) if v != value => return Err(GameError::IllegalMeld),
                Some(_) => {}
                None => set_value = Some(value),
            }
        }
    }

    let wilds = wild_count(&cards);
    if set_value.is_none() || wilds > cards.len() - wilds {
        return Err(GameError::WildMisuse);
    }

    Ok(MeldBody::Set { cards })
}

/// Validates a run in the order given: size ≥ 4, one suit across naturals,
/// strictly consecutive values inside A..K (Ace low, no wrap), wilds ≤
/// naturals. The first natural anchors the sequence; every position's implied
/// value follows from its offset to the anchor.
fn build_run(cards: Vec<Card>) -> Result<MeldBody, GameError> {
    if cards.len() < 4 {
        return Err(GameError::IllegalMeld);
    }

    let naturals: Vec<(usize, Suit, Value)> = cards
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.natural().map(|(s, v)| (i, s, v)))
        .collect();

    let wilds = cards.len() - naturals.len();
    if naturals.is_empty() || wilds > naturals.len() {
        return Err(GameError::WildMisuse);
    }

    let (anchor_idx, suit, anchor_value) = naturals[0];
    if naturals.iter().any(|(_, s, _)| *s != suit) {
        return Err(GameError::IllegalMeld);
    }

    let start_ord = anchor_value.ord() - anchor_idx as i32;
    let mut values = Vec::with_capacity(cards.len());
    for i in 0..cards.len() {
        let value = Value::from_ord(start_ord + i as i32).ok_or(GameError::IllegalMeld)?;
        values.push(value);
    }

    for (i, _, value) in &naturals {
        if values[*i] != *value {
            return Err(GameError::IllegalMeld);
        }
    }

    Ok(MeldBody::Run {
        suit,
        cards,
        values,
    })
}

impl Meld {
    /// Validates `cards` as the declared kind and wraps them in a fresh meld.
    pub fn new(owner_id: PlayerId, kind: MeldKind, cards: Vec<Card>) -> Result<Self, GameError> {
        let body = match kind {
            MeldKind::Set => build_set(cards)?,
            MeldKind::Run => build_run(cards)?,
        };
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            body,
        })
    }

    pub fn kind(&self) -> MeldKind {
        match self.body {
            MeldBody::Set { .. } => MeldKind::Set,
            MeldBody::Run { .. } => MeldKind::Run,
        }
    }

    pub fn cards(&self) -> &[Card] {
        match &self.body {
            MeldBody::Set { cards } => cards,
            MeldBody::Run { cards, .. } => cards,
        }
    }

    /// The shared value of a set's naturals.
    pub fn set_value(&self) -> Option<Value> {
        match &self.body {
            MeldBody::Set { cards } => cards.iter().find_map(|c| c.natural().map(|(_, v)| v)),
            MeldBody::Run { .. } => None,
        }
    }

    /// True for a run holding at least one joker (a swap candidate).
    pub fn has_swappable_joker(&self) -> bool {
        match &self.body {
            MeldBody::Run { cards, .. } => cards.iter().any(|c| c.is_joker()),
            MeldBody::Set { .. } => false,
        }
    }

    /// Whether `lay_off` would accept this card, without mutating.
    pub fn accepts_lay_off(&self, card: Card) -> bool {
        let mut probe = self.clone();
        probe.lay_off(card).is_ok()
    }

    /// Extends the meld by one card. Sets grow by matching value (or a wild
    /// inside the ratio); runs grow at either end only, never reordering the
    /// existing cards and never past Ace or King.
    pub fn lay_off(&mut self, card: Card) -> Result<(), GameError> {
        match &mut self.body {
            MeldBody::Set { cards } => {
                if card.is_wild() {
                    let wilds = wild_count(cards) + 1;
                    if wilds > cards.len() + 1 - wilds {
                        return Err(GameError::WildMisuse);
                    }
                    cards.push(card);
                    return Ok(());
                }
                let set_value = cards
                    .iter()
                    .find_map(|c| c.natural().map(|(_, v)| v))
                    .ok_or(GameError::IllegalMeld)?;
                match card.natural() {
                    Some((_, value)) if value == set_value => {
                        cards.push(card);
                        Ok(())
                    }
                    _ => Err(GameError::IllegalMeld),
                }
            }
            MeldBody::Run {
                suit,
                cards,
                values,
            } => {
                let low = values.first().ok_or(GameError::IllegalMeld)?.ord();
                let high = values.last().ok_or(GameError::IllegalMeld)?.ord();

                if let Some((card_suit, card_value)) = card.natural() {
                    if card_suit != *suit {
                        return Err(GameError::IllegalMeld);
                    }
                    if card_value.ord() == low - 1 {
                        cards.insert(0, card);
                        values.insert(0, card_value);
                        Ok(())
                    } else if card_value.ord() == high + 1 {
                        cards.push(card);
                        values.push(card_value);
                        Ok(())
                    } else {
                        Err(GameError::IllegalMeld)
                    }
                } else {
                    let wilds = wild_count(cards) + 1;
                    if wilds > cards.len() + 1 - wilds {
                        return Err(GameError::WildMisuse);
                    }
                    if let Some(value) = Value::from_ord(high + 1) {
                        cards.push(card);
                        values.push(value);
                        Ok(())
                    } else if let Some(value) = Value::from_ord(low - 1) {
                        cards.insert(0, card);
                        values.insert(0, value);
                        Ok(())
                    } else {
                        Err(GameError::IllegalMeld)
                    }
                }
            }
        }
    }

    /// Replaces the joker at `position` in a run with a matching natural card
    /// from hand, returning the freed joker. Twos are wild but never
    /// swappable, and sets never release their wilds.
    pub fn swap_joker(&mut self, position: usize, replacement: Card) -> Result<Card, GameError> {
        match &mut self.body {
            MeldBody::Set { .. } => Err(GameError::WildMisuse),
            MeldBody::Run {
                suit,
                cards,
                values,
            } => {
                let slot = cards.get(position).ok_or(GameError::IllegalMeld)?;
                if !slot.is_joker() {
                    return Err(GameError::WildMisuse);
                }
                let (card_suit, card_value) =
                    replacement.natural().ok_or(GameError::WildMisuse)?;
                if card_suit != *suit || card_value != values[position] {
                    return Err(GameError::WildMisuse);
                }
                Ok(std::mem::replace(&mut cards[position], replacement))
            }
        }
    }
}
