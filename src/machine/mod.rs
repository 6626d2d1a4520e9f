pub mod reveal;
pub mod selection;

pub use reveal::{Face, FlipMode, RevealMachine, RevealState, RevealTiming, Settled, TapOutcome};
pub use selection::{DrawMode, SelectOutcome, Selection, SelectionPhase};
