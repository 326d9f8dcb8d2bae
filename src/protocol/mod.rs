pub mod codec;
pub mod frames;
pub mod wire;

pub use codec::Codec;
pub use frames::{ClientFrame, FrameError, ServerFrame};
pub use wire::{decode_cards, decode_pattern, encode_cards, encode_pattern};
