//! Wire-format knowledge for the D6T thermal array: protocol constants,
//! frame integrity checking, sample decoding, line rendering.

pub mod pec;
pub mod protocol;
pub mod render;
pub mod sample;

pub use pec::{frame_checksum, PecMismatch};
pub use render::render_line;
pub use sample::DecodedSample;
