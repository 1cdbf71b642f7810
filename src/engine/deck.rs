use crate::engine::card::{Card, CardId, Suit, Value};
use crate::engine::error::GameError;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Cards dealt to each player at the start of a round.
pub const HAND_SIZE: usize = 11;

/// Shoe composition, derived from the player count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckConfig {
    pub decks: usize,
    pub jokers: usize,
}

impl DeckConfig {
    /// 3–5 players play with two decks and 4 jokers (108 cards),
    /// 6–8 players with three decks and 6 jokers (162 cards).
    pub fn for_players(player_count: usize) -> Result<Self, GameError> {
        match player_count {
            3..=5 => Ok(Self { decks: 2, jokers: 4 }),
            6..=8 => Ok(Self { decks: 3, jokers: 6 }),
            _ => Err(GameError::PlayerCountOutOfRange),
        }
    }

    pub fn total_cards(&self) -> usize {
        self.decks * 52 + self.jokers
    }
}

/// The shoe. The top of the deck is the last element, so drawing is a pop.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

/// Result of dealing a fresh round.
#[derive(Debug, Clone)]
pub struct Dealt {
    pub hands: Vec<Vec<Card>>,
    pub stock: Vec<Card>,
    pub discard: Vec<Card>,
}

impl Deck {
    /// Builds the shoe for a config: `decks` copies of the 52 standard cards,
    /// then the jokers. Every physical card gets a fresh sequential id.
    pub fn build(config: DeckConfig) -> Self {
        let mut cards = Vec::with_capacity(config.total_cards());
        let mut next_id = 0u16;

        for _ in 0..config.decks {
            for suit in Suit::ALL {
                for value in Value::ALL {
                    cards.push(Card::standard(CardId(next_id), suit, value));
                    next_id += 1;
                }
            }
        }
        for _ in 0..config.jokers {
            cards.push(Card::joker(CardId(next_id)));
            next_id += 1;
        }

        Self { cards }
    }

    /// Fisher–Yates against the injected generator; no global RNG.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Deals the shoe: 11 cards per player, round-robin from the top, then one
    /// face-up discard. The remainder becomes the stock in post-shuffle order.
    pub fn deal(mut self, player_count: usize) -> Result<Dealt, GameError> {
        if self.cards.len() < player_count * HAND_SIZE + 1 {
            return Err(GameError::NotEnoughCards);
        }

        let mut hands: Vec<Vec<Card>> = vec![Vec::with_capacity(HAND_SIZE); player_count];
        for i in 0..player_count * HAND_SIZE {
            let card = self.draw().ok_or(GameError::NotEnoughCards)?;
            hands[i % player_count].push(card);
        }

        let discard = vec![self.draw().ok_or(GameError::NotEnoughCards)?];

        Ok(Dealt {
            hands,
            stock: self.cards,
            discard,
        })
    }
}
