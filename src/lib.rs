//! Rule-accurate engine for **May I?**, a contract rummy variant.
//!
//! The engine is authoritative and synchronous: embedders feed [`Command`]s
//! into [`Game::send`] and read back [`Snapshot`]s. It enforces the six-round
//! contract ladder, the meld algebra (sets, runs, wilds, joker swaps), and the
//! out-of-turn "May I?" claim protocol with seat-priority resolution. No UI,
//! transport, persistence format or AI lives here.
//!
//! ```
//! use mayi_engine::{Command, Game};
//!
//! let mut game = Game::with_seed(42);
//! for name in ["ana", "ben", "cal"] {
//!     game.send(Command::AddPlayer { name: name.into() }).unwrap();
//! }
//! let snapshot = game.send(Command::StartGame).unwrap();
//! assert_eq!(snapshot.players.len(), 3);
//! ```

pub mod engine;

pub use engine::availability::{Availability, availability};
pub use engine::card::{Card, CardFace, CardId, Suit, Value};
pub use engine::contract::{Contract, FINAL_ROUND};
pub use engine::deck::{Deck, DeckConfig, HAND_SIZE};
pub use engine::error::GameError;
pub use engine::events::{
    Command, LayOffSpec, MayIView, MeldSpec, Phase, PlayerView, Snapshot, TurnPhase,
};
pub use engine::game::{Game, GamePhase, MAX_PLAYERS, MIN_PLAYERS, Player, PlayerId};
pub use engine::mayi::{MayIResolution, MayIWindow};
pub use engine::meld::{Meld, MeldBody, MeldId, MeldKind};
pub use engine::points::hand_points;
pub use engine::round::{Round, RoundOutcome, RoundRecord};
pub use engine::turn::{Turn, TurnState};
