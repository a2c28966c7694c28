pub mod card;
pub mod deck;
pub mod hand;
pub mod rank;
pub mod strength;
pub mod suit;

pub use card::Card;
pub use deck::Deck;
pub use hand::Hand;
pub use rank::Rank;
pub use strength::Strength;
pub use suit::Suit;
