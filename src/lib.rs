//! A combinator virtual machine over nouns, with a self-delimiting binary
//! codec.
//!
//! The public surface is deliberately small: [`Arena`] allocates and shares
//! nouns, [`codec`] turns nouns into bytes and back, and [`eval`] interprets
//! formulas against a subject.

pub mod arena;
pub mod codec;
pub mod entropy;
pub mod error;
pub mod eval;
pub mod memo;
mod number;
pub mod surface;

pub use arena::{Arena, NodePtr};
pub use codec::{decode, encode};
pub use entropy::{EntropySource, OsEntropy, SeededEntropy};
pub use error::{CodecError, EvalErr};
pub use eval::{nock, Evaluator};
