//! Error types for the codec and the evaluator. Codec failures get their own
//! small enum since they can occur before any noun exists.

use thiserror::Error;

/// Failures from the byte-level atom and noun codecs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of input")]
    Truncated,
    #[error("varint length prefix never terminated")]
    UnterminatedVarint,
    #[error("structure bitstream or atom stream ran out before the tree was complete")]
    StructureUnderflow,
    #[error("structure bitstream did not consume every atom")]
    StructureOverflow,
    #[error("trailing non-zero padding bits")]
    NonZeroPadding,
    #[error("trailing bytes after a complete noun")]
    TrailingBytes,
    #[error("atom length prefix exceeds remaining input")]
    AtomTooLong,
}

/// Failures from noun evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalErr {
    #[error("malformed codec input: {0}")]
    Codec(#[from] CodecError),

    #[error("formula has an unknown opcode")]
    UnknownOpcode,
    #[error("formula is ill-formed for its opcode (wrong arity)")]
    BadArity,
    #[error("expected an atom, found a cell")]
    ExpectedAtomGotCell,
    #[error("expected a cell, found an atom")]
    ExpectedCellGotAtom,
    #[error("axis selection walked into an atom before exhausting its path")]
    AxisIntoAtom,
    #[error("axis must be a positive integer")]
    InvalidAxis,
    #[error("splice length exceeds the remaining byte buffer")]
    SpliceOverrun,
    #[error("opcode 6 condition reduced to neither 0 nor 1")]
    NotABoolean,

    #[error("entropy source could not supply the requested number of bytes")]
    EntropyExhausted,
    #[error("host-imposed resource bound exceeded")]
    ResourceExceeded,
}
