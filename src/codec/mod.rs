//! Noun wire format: a self-delimiting atom codec and a whole-noun codec
//! built on top of it.

mod atom;
mod noun;

pub use noun::{decode, encode};
