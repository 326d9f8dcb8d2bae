pub mod cards;
pub mod identifier;
pub mod judger;
pub mod session;

pub use cards::{Card, Deck, Suit};
pub use identifier::{identify, Pattern};
pub use judger::{compare, Verdict};
pub use session::{PlayError, PlayOutcome, Seat, Session, SessionError, SessionState};
