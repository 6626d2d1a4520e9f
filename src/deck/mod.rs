pub mod card;
pub mod catalog;
pub mod engine;

pub use card::{Card, CardKind, CardRef};
pub use catalog::Catalog;
pub use engine::{draw_next, DeckState};
