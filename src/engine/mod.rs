pub mod availability;
pub mod card;
pub mod contract;
pub mod deck;
pub mod error;
pub mod events;
pub mod game;
pub mod mayi;
pub mod meld;
pub mod points;
pub mod round;
pub mod turn;
