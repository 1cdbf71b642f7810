use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suit::Hearts => write!(f, "♥"),
            Suit::Diamonds => write!(f, "♦"),
            Suit::Clubs => write!(f, "♣"),
            Suit::Spades => write!(f, "♠"),
        }
    }
}

/// Card values with Ace low: runs read A,2,3,…,K and never wrap around King.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    Ace = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
}

impl Value {
    pub const ALL: [Value; 13] = [
        Value::Ace,
        Value::Two,
        Value::Three,
        Value::Four,
        Value::Five,
        Value::Six,
        Value::Seven,
        Value::Eight,
        Value::Nine,
        Value::Ten,
        Value::Jack,
        Value::Queen,
        Value::King,
    ];

    /// Position in the A..K ordering, 1 through 13.
    pub fn ord(self) -> i32 {
        self as i32
    }

    pub fn from_ord(ord: i32) -> Option<Value> {
        match ord {
            1..=13 => Some(Value::ALL[(ord - 1) as usize]),
            _ => None,
        }
    }

    /// Values mapped to their points when left in hand.
    pub fn points(&self) -> u32 {
        match self {
            Value::Ace => 15,
            Value::Two => 20,
            Value::Three => 3,
            Value::Four => 4,
            Value::Five => 5,
            Value::Six => 6,
            Value::Seven => 7,
            Value::Eight => 8,
            Value::Nine => 9,
            Value::Ten => 10,
            Value::Jack => 10,
            Value::Queen => 10,
            Value::King => 10,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Ace => write!(f, "A"),
            Value::Two => write!(f, "2"),
            Value::Three => write!(f, "3"),
            Value::Four => write!(f, "4"),
            Value::Five => write!(f, "5"),
            Value::Six => write!(f, "6"),
            Value::Seven => write!(f, "7"),
            Value::Eight => write!(f, "8"),
            Value::Nine => write!(f, "9"),
            Value::Ten => write!(f, "10"),
            Value::Jack => write!(f, "J"),
            Value::Queen => write!(f, "Q"),
            Value::King => write!(f, "K"),
        }
    }
}

/// Identity of one physical card in the shoe. Two decks hold two 9♣ with
/// different ids; commands and zones always refer to cards by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u16);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardFace {
    Standard { suit: Suit, value: Value },
    Joker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub face: CardFace,
}

impl Card {
    pub fn standard(id: CardId, suit: Suit, value: Value) -> Self {
        Self {
            id,
            face: CardFace::Standard { suit, value },
        }
    }

    pub fn joker(id: CardId) -> Self {
        Self {
            id,
            face: CardFace::Joker,
        }
    }

    pub fn points(&self) -> u32 {
        match self.face {
            CardFace::Standard { value, .. } => value.points(),
            CardFace::Joker => 50,
        }
    }

    pub fn is_joker(&self) -> bool {
        matches!(self.face, CardFace::Joker)
    }

    /// Jokers and every Two substitute for any value in a meld.
    pub fn is_wild(&self) -> bool {
        match self.face {
            CardFace::Joker => true,
            CardFace::Standard { value, .. } => value == Value::Two,
        }
    }

    pub fn suit(&self) -> Option<Suit> {
        match self.face {
            CardFace::Standard { suit, .. } => Some(suit),
            CardFace::Joker => None,
        }
    }

    pub fn value(&self) -> Option<Value> {
        match self.face {
            CardFace::Standard { value, .. } => Some(value),
            CardFace::Joker => None,
        }
    }

    /// Suit and value of a non-wild card; `None` for jokers and Twos.
    pub fn natural(&self) -> Option<(Suit, Value)> {
        match self.face {
            CardFace::Standard { suit, value } if value != Value::Two => Some((suit, value)),
            _ => None,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.face {
            CardFace::Standard { suit, value } => write!(f, "{}{}", value, suit),
            CardFace::Joker => write!(f, "🃏"),
        }
    }
}
