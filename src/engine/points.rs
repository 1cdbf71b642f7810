use crate::engine::card::Card;

pub fn hand_points(hand: &[Card]) -> u32 {
    hand.iter().map(|card| card.points()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::card::{CardId, Suit, Value};

    #[test]
    fn test_hand_points() {
        let hand = vec![
            Card::standard(CardId(0), Suit::Hearts, Value::Two), // 20
            Card::standard(CardId(1), Suit::Spades, Value::Ten), // 10
            Card::joker(CardId(2)),                              // 50
            Card::standard(CardId(3), Suit::Diamonds, Value::Ace), // 15
            Card::standard(CardId(4), Suit::Clubs, Value::Seven), // 7
        ];

        assert_eq!(hand_points(&hand), 102);
        assert_eq!(hand_points(&[]), 0);
    }
}
