//! Noun codec. An encoded noun is a header atom carrying the byte length of
//! the concatenated atom stream, that atom stream itself, and a
//! low-bit-first packed structure bitstream (`0` = atom, `1` = cell) in the
//! same preorder traversal.
//!
//! Both directions walk the tree with an explicit stack rather than native
//! recursion, so a noun with a deep right spine doesn't overflow the call
//! stack. The structure bitstream is packed with `bitvec`'s `Lsb0` order.

use bitvec::prelude::{BitVec, Lsb0};
use num_bigint::BigUint;
use num_traits::ToPrimitive;

use super::atom::{decode_atom, encode_atom};
use crate::arena::{Arena, NodePtr, Noun};
use crate::error::CodecError;
use crate::number::{atom_to_biguint, biguint_to_atom};

/// Encodes the noun at `root` to its self-delimiting wire form.
pub fn encode(arena: &Arena, root: NodePtr) -> Vec<u8> {
    let mut atom_body = Vec::new();
    let mut bits: BitVec<u8, Lsb0> = BitVec::new();

    let mut stack = vec![root];
    while let Some(ptr) = stack.pop() {
        match arena.view(ptr) {
            Noun::Atom(bytes) => {
                bits.push(false);
                atom_body.extend(encode_atom(bytes));
            }
            Noun::Cell(left, right) => {
                bits.push(true);
                stack.push(right);
                stack.push(left);
            }
        }
    }

    let header = encode_atom(&biguint_to_atom(&BigUint::from(atom_body.len())));

    let mut out = header;
    out.extend(atom_body);
    out.extend(bits.into_vec());
    out
}

/// Decodes a single noun from `input`. Rejects trailing bytes after the
/// structure stream and any non-zero padding bits.
pub fn decode(arena: &mut Arena, input: &[u8]) -> Result<NodePtr, CodecError> {
    let mut pos = 0usize;
    let header = decode_atom(input, &mut pos)?;
    let atom_body_len: usize = atom_to_biguint(&header)
        .to_usize()
        .ok_or(CodecError::AtomTooLong)?;

    let body_end = pos
        .checked_add(atom_body_len)
        .ok_or(CodecError::AtomTooLong)?;
    if body_end > input.len() {
        return Err(CodecError::Truncated);
    }
    let atom_body = &input[pos..body_end];

    let mut atoms = Vec::new();
    let mut apos = 0usize;
    while apos < atom_body.len() {
        atoms.push(decode_atom(atom_body, &mut apos)?);
    }
    let mut atoms = atoms.into_iter();

    let structure = &input[body_end..];
    let bits: &bitvec::slice::BitSlice<u8, Lsb0> = bitvec::slice::BitSlice::from_slice(structure);
    let mut bit_pos = 0usize;

    let root = parse_tree(arena, bits, &mut bit_pos, &mut atoms)?;

    if atoms.next().is_some() {
        return Err(CodecError::StructureOverflow);
    }

    // remaining bits in the final partial byte must be zero padding; any
    // further whole bytes beyond that are rejected as trailing bytes.
    let consumed_bytes = bit_pos.div_ceil(8);
    if bit_pos % 8 != 0 {
        let padding = &bits[bit_pos..consumed_bytes * 8];
        if padding.any() {
            return Err(CodecError::NonZeroPadding);
        }
    }
    if consumed_bytes < structure.len() {
        return Err(CodecError::TrailingBytes);
    }

    Ok(root)
}

/// Rebuilds a noun from the structure bitstream and atom stream using an
/// explicit work stack rather than native recursion, for the same reason
/// `encode`'s traversal does: a right spine thousands of cells deep must
/// not recurse the call stack.
///
/// Each stack frame is either a pending subtree to parse (`Parse`) or a
/// marker that pairs up the two results its two `Parse` frames just pushed
/// (`Pair`).
fn parse_tree(
    arena: &mut Arena,
    bits: &bitvec::slice::BitSlice<u8, Lsb0>,
    bit_pos: &mut usize,
    atoms: &mut std::vec::IntoIter<Vec<u8>>,
) -> Result<NodePtr, CodecError> {
    enum Frame {
        Parse,
        Pair,
    }

    let mut stack = vec![Frame::Parse];
    let mut results: Vec<NodePtr> = Vec::new();

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Parse => {
                let bit = *bits.get(*bit_pos).ok_or(CodecError::StructureUnderflow)?;
                *bit_pos += 1;
                if bit {
                    stack.push(Frame::Pair);
                    stack.push(Frame::Parse);
                    stack.push(Frame::Parse);
                } else {
                    let bytes = atoms.next().ok_or(CodecError::StructureUnderflow)?;
                    results.push(arena.atom(&bytes));
                }
            }
            Frame::Pair => {
                let right = results.pop().expect("right child parsed before Pair frame runs");
                let left = results.pop().expect("left child parsed before Pair frame runs");
                results.push(arena.cell(left, right));
            }
        }
    }

    Ok(results.pop().expect("exactly one root remains"))
}
