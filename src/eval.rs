//! The evaluator. Dispatches the 17 opcodes plus the autocons rule over a
//! subject/formula pair.
//!
//! Opcodes 2, 7, 8, and 9 are tail positions (the formula after them is
//! itself evaluated against a new subject), so this function updates
//! `subject`/`formula` in place and loops instead of recursing, so a long
//! chain of tail calls doesn't grow the native stack. Axis selection
//! (`axis_select`, serving opcode 0's `/[b a]` and opcode 9's "axis b of
//! k") walks the axis's binary representation bit by bit instead of
//! building an intermediate path vector.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::arena::{Arena, NodePtr, Noun};
use crate::entropy::EntropySource;
use crate::error::EvalErr;
use crate::memo::MemoCaches;
use crate::number::{atom_to_biguint, biguint_to_atom};

/// Evaluates `*[subject formula]`.
pub fn nock<E: EntropySource>(
    arena: &mut Arena,
    memo: &mut MemoCaches,
    entropy: &mut E,
    subject: NodePtr,
    formula: NodePtr,
) -> Result<NodePtr, EvalErr> {
    let mut subject = subject;
    let mut formula = formula;

    loop {
        let (head, tail) = match arena.view(formula) {
            Noun::Cell(h, t) => (h, t),
            Noun::Atom(_) => return Err(EvalErr::ExpectedCellGotAtom),
        };

        if arena.is_cell(head) {
            // autocons: *[a [[b c] d]] = [*[a [b c]] *[a d]]
            let l = nock(arena, memo, entropy, subject, head)?;
            let r = nock(arena, memo, entropy, subject, tail)?;
            return Ok(arena.cell(l, r));
        }

        let opcode = atom_to_biguint(arena.atom_bytes(head))
            .to_u8()
            .ok_or(EvalErr::UnknownOpcode)?;

        match opcode {
            0 => return axis_select(arena, subject, tail),
            1 => return Ok(tail),
            2 => {
                let (b, c) = expect_pair(arena, tail)?;
                let new_subject = nock(arena, memo, entropy, subject, b)?;
                let new_formula = nock(arena, memo, entropy, subject, c)?;
                subject = new_subject;
                formula = new_formula;
            }
            3 => {
                let r = nock(arena, memo, entropy, subject, tail)?;
                return Ok(bool_atom(arena, arena.is_cell(r)));
            }
            4 => {
                let r = nock(arena, memo, entropy, subject, tail)?;
                let bytes = expect_atom(arena, r)?.to_vec();
                let incremented = atom_to_biguint(&bytes) + BigUint::from(1u32);
                return Ok(arena.atom(&biguint_to_atom(&incremented)));
            }
            5 => {
                let r = nock(arena, memo, entropy, subject, tail)?;
                let (x, y) = expect_pair(arena, r)?;
                return Ok(bool_atom(arena, arena.equal(x, y)));
            }
            6 => {
                let (b, rest1) = expect_pair(arena, tail)?;
                let (c, d) = expect_pair(arena, rest1)?;
                let cond = nock(arena, memo, entropy, subject, b)?;
                let cond_bytes = expect_atom(arena, cond)?;
                let n = atom_to_biguint(cond_bytes);
                formula = if n.is_zero() {
                    c
                } else if n == BigUint::from(1u32) {
                    d
                } else {
                    return Err(EvalErr::NotABoolean);
                };
            }
            7 => {
                let (b, c) = expect_pair(arena, tail)?;
                subject = nock(arena, memo, entropy, subject, b)?;
                formula = c;
            }
            8 => {
                let (b, c) = expect_pair(arena, tail)?;
                let computed = nock(arena, memo, entropy, subject, b)?;
                subject = arena.cell(computed, subject);
                formula = c;
            }
            9 => {
                let (b, c) = expect_pair(arena, tail)?;
                let core = nock(arena, memo, entropy, subject, c)?;
                formula = axis_select(arena, core, b)?;
                subject = core;
            }
            10 => {
                let r = nock(arena, memo, entropy, subject, tail)?;
                let h = arena.hash_of(r);
                return Ok(arena.atom(&h));
            }
            11 => {
                let r = nock(arena, memo, entropy, subject, tail)?;
                let h = arena.hash_of(r);
                memo.hash_insert(h.to_vec(), r);
                return Ok(arena.atom(&[]));
            }
            12 => {
                let r = nock(arena, memo, entropy, subject, tail)?;
                let key = expect_atom(arena, r)?.to_vec();
                return Ok(match memo.hash_get(&key) {
                    Some(x) => {
                        let zero = arena.atom(&[]);
                        arena.cell(zero, x)
                    }
                    None => arena.atom(&[1]),
                });
            }
            13 => {
                let (b, c) = expect_pair(arena, tail)?;
                let key = nock(arena, memo, entropy, subject, b)?;
                let value = nock(arena, memo, entropy, subject, c)?;
                memo.key_insert(key, value);
                return Ok(arena.atom(&[]));
            }
            14 => {
                let key = nock(arena, memo, entropy, subject, tail)?;
                return Ok(match memo.key_get(key) {
                    Some(x) => {
                        let zero = arena.atom(&[]);
                        arena.cell(zero, x)
                    }
                    None => arena.atom(&[1]),
                });
            }
            15 => {
                let r = nock(arena, memo, entropy, subject, tail)?;
                let bytes = expect_atom(arena, r)?;
                let n = atom_to_biguint(bytes)
                    .to_usize()
                    .ok_or(EvalErr::ResourceExceeded)?;
                let random = entropy.fill(n);
                return Ok(arena.atom(&random));
            }
            16 => {
                let (b, c) = expect_pair(arena, tail)?;
                let rb = nock(arena, memo, entropy, subject, b)?;
                let rc = nock(arena, memo, entropy, subject, c)?;
                return splice(arena, rb, rc);
            }
            _ => return Err(EvalErr::UnknownOpcode),
        }
    }
}

fn expect_pair(arena: &Arena, ptr: NodePtr) -> Result<(NodePtr, NodePtr), EvalErr> {
    match arena.view(ptr) {
        Noun::Cell(l, r) => Ok((l, r)),
        Noun::Atom(_) => Err(EvalErr::BadArity),
    }
}

fn expect_atom(arena: &Arena, ptr: NodePtr) -> Result<&[u8], EvalErr> {
    match arena.view(ptr) {
        Noun::Atom(bytes) => Ok(bytes),
        Noun::Cell(_, _) => Err(EvalErr::ExpectedAtomGotCell),
    }
}

fn bool_atom(arena: &mut Arena, is_cell: bool) -> NodePtr {
    // `?` maps a cell to 0, an atom to 1.
    if is_cell {
        arena.atom(&[])
    } else {
        arena.atom(&[1])
    }
}

// return a bitmask with a single bit set, for the most significant set bit
// in the input byte.
fn msb_mask(byte: u8) -> u8 {
    let mut byte = (byte | (byte >> 1)) as u32;
    byte |= byte >> 2;
    byte |= byte >> 4;
    ((byte + 1) >> 1) as u8
}

/// `/[axis subject]`: walks the binary path encoded by `axis` (most
/// significant set bit is a sentinel, each subsequent bit selects left (0)
/// or right (1)).
fn axis_select(arena: &Arena, subject: NodePtr, axis_ptr: NodePtr) -> Result<NodePtr, EvalErr> {
    let axis_bytes = expect_atom(arena, axis_ptr)?;
    let n = atom_to_biguint(axis_bytes);
    if n.is_zero() {
        return Err(EvalErr::InvalidAxis);
    }
    let be = n.to_bytes_be();

    let mut node = subject;
    let mut byte_idx = 0usize;
    let mut bitmask = msb_mask(be[0]) >> 1;

    loop {
        if bitmask == 0 {
            byte_idx += 1;
            if byte_idx >= be.len() {
                break;
            }
            bitmask = 0x80;
        }
        let bit_set = be[byte_idx] & bitmask != 0;
        match arena.view(node) {
            Noun::Atom(_) => return Err(EvalErr::AxisIntoAtom),
            Noun::Cell(l, r) => node = if bit_set { r } else { l },
        }
        bitmask >>= 1;
    }
    Ok(node)
}

/// `_x`: flattens a noun to its concatenated atom bytes, left before right.
fn flatten(arena: &Arena, root: NodePtr) -> Vec<u8> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(ptr) = stack.pop() {
        match arena.view(ptr) {
            Noun::Atom(bytes) => out.extend_from_slice(bytes),
            Noun::Cell(l, r) => {
                stack.push(r);
                stack.push(l);
            }
        }
    }
    out
}

/// Partitions `buf` according to the shape of `shape`: an atom leaf
/// consumes that many bytes as a fresh atom; a cell recurses left then
/// right. Returns the shaped result and the number of bytes consumed.
fn partition(arena: &mut Arena, buf: &[u8], shape: NodePtr) -> Result<(NodePtr, usize), EvalErr> {
    match arena.view(shape) {
        Noun::Atom(len_bytes) => {
            let n = atom_to_biguint(len_bytes)
                .to_usize()
                .ok_or(EvalErr::SpliceOverrun)?;
            if n > buf.len() {
                return Err(EvalErr::SpliceOverrun);
            }
            let x = arena.atom(&buf[..n]);
            Ok((x, n))
        }
        Noun::Cell(b, c) => {
            let (x, consumed1) = partition(arena, buf, b)?;
            let (y, consumed2) = partition(arena, &buf[consumed1..], c)?;
            let pair = arena.cell(x, y);
            Ok((pair, consumed1 + consumed2))
        }
    }
}

/// `^[a b]`: splits atom `a` by the shape of `b`, returning `[shaped tail]`.
fn carat(arena: &mut Arena, a: NodePtr, b: NodePtr) -> Result<NodePtr, EvalErr> {
    let buf = expect_atom(arena, a)?.to_vec();
    let (shaped, consumed) = partition(arena, &buf, b)?;
    let suffix = arena.atom(&buf[consumed..]);
    Ok(arena.cell(shaped, suffix))
}

/// `@[a b]`: the first component of `^[_a b]`.
fn splice(arena: &mut Arena, a: NodePtr, b: NodePtr) -> Result<NodePtr, EvalErr> {
    let flat = flatten(arena, a);
    let (shaped, _consumed) = partition(arena, &flat, b)?;
    Ok(shaped)
}

/// Owns an arena, the memo caches, and an entropy source for a sequence of
/// evaluations.
pub struct Evaluator<E: EntropySource> {
    pub arena: Arena,
    memo: MemoCaches,
    entropy: E,
}

impl<E: EntropySource> Evaluator<E> {
    pub fn new(entropy: E) -> Self {
        Self {
            arena: Arena::new(),
            memo: MemoCaches::new(),
            entropy,
        }
    }

    /// Evaluates a `[subject formula]` cell.
    pub fn eval(&mut self, subject_and_formula: NodePtr) -> Result<NodePtr, EvalErr> {
        let (subject, formula) = expect_pair(&self.arena, subject_and_formula)?;
        nock(
            &mut self.arena,
            &mut self.memo,
            &mut self.entropy,
            subject,
            formula,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::SeededEntropy;

    fn run(arena: &mut Arena, subject: NodePtr, formula: NodePtr) -> Result<NodePtr, EvalErr> {
        let mut memo = MemoCaches::new();
        let mut entropy = SeededEntropy::new(1);
        nock(arena, &mut memo, &mut entropy, subject, formula)
    }

    #[test]
    fn quote_returns_literal() {
        let mut arena = Arena::new();
        let a = arena.atom(&[9]);
        let b = arena.atom(&[42]);
        let one = arena.atom(&[1]);
        let formula = arena.cell(one, b);
        let result = run(&mut arena, a, formula).unwrap();
        assert!(arena.equal(result, b));
    }

    #[test]
    fn axis_one_is_identity() {
        let mut arena = Arena::new();
        let a = arena.atom(&[7]);
        let zero = arena.atom(&[]);
        let one = arena.atom(&[1]);
        let formula = arena.cell(zero, one);
        let result = run(&mut arena, a, formula).unwrap();
        assert!(arena.equal(result, a));
    }

    #[test]
    fn increment_literal() {
        let mut arena = Arena::new();
        let a = arena.atom(&[]);
        let four = arena.atom(&[4]);
        let one = arena.atom(&[1]);
        let n = arena.atom(&[40]);
        let quote_n = arena.cell(one, n);
        let formula = arena.cell(four, quote_n);
        let result = run(&mut arena, a, formula).unwrap();
        assert_eq!(arena.atom_bytes(result), &[41]);
    }

    #[test]
    fn opcode_zero_selects_axis() {
        let mut arena = Arena::new();
        let x = arena.atom(&[2]);
        let y = arena.atom(&[3]);
        let subject = arena.cell(x, y);
        let zero = arena.atom(&[]);
        let axis3 = arena.atom(&[3]);
        let formula = arena.cell(zero, axis3);
        let result = run(&mut arena, subject, formula).unwrap();
        assert!(arena.equal(result, y));
    }

    #[test]
    fn opcode_six_truth_table() {
        let mut arena = Arena::new();
        let subject = arena.atom(&[]);
        let zero = arena.atom(&[]);
        let one_op = arena.atom(&[1]);
        let six = arena.atom(&[6]);

        let cond_true = arena.cell(one_op, zero); // [1 0] => quote 0
        let then_branch = arena.cell(one_op, arena.atom(&[100]));
        let else_branch = arena.cell(one_op, arena.atom(&[200]));
        let branches = arena.cell(then_branch, else_branch);
        let tail = arena.cell(cond_true, branches);
        let formula = arena.cell(six, tail);

        let result = run(&mut arena, subject, formula).unwrap();
        assert_eq!(arena.atom_bytes(result), &[100]);
    }

    #[test]
    fn autocons_pairs_independent_evaluations() {
        let mut arena = Arena::new();
        let x = arena.atom(&[10]);
        let y = arena.atom(&[20]);
        let subject = arena.cell(x, y);

        let zero = arena.atom(&[]);
        let axis2 = arena.atom(&[2]);
        let axis3 = arena.atom(&[3]);
        let left_formula = arena.cell(zero, axis2);
        let right_formula = arena.cell(zero, axis3);
        let formula = arena.cell(left_formula, right_formula);

        let result = run(&mut arena, subject, formula).unwrap();
        assert!(arena.equal(result, subject));
    }

    #[test]
    fn memo_hash_round_trip_via_opcodes_ten_eleven_twelve() {
        let mut arena = Arena::new();
        let mut memo = MemoCaches::new();
        let mut entropy = SeededEntropy::new(1);

        let subject = arena.atom(&[]);
        let payload = arena.atom(&[55]);
        let one_op = arena.atom(&[1]);
        let quote_payload = arena.cell(one_op, payload);

        let eleven = arena.atom(&[11]);
        let store_formula = arena.cell(eleven, quote_payload);
        let zero_result = nock(&mut arena, &mut memo, &mut entropy, subject, store_formula).unwrap();
        assert_eq!(arena.atom_bytes(zero_result), &[] as &[u8]);

        let ten = arena.atom(&[10]);
        let hash_formula = arena.cell(ten, quote_payload);
        let hash_result = nock(&mut arena, &mut memo, &mut entropy, subject, hash_formula).unwrap();
        let hash_bytes = arena.atom_bytes(hash_result).to_vec();

        let twelve = arena.atom(&[12]);
        let hash_literal = arena.atom(&hash_bytes);
        let quote_hash = arena.cell(one_op, hash_literal);
        let lookup_formula = arena.cell(twelve, quote_hash);
        let lookup_result = nock(&mut arena, &mut memo, &mut entropy, subject, lookup_formula).unwrap();

        let (tag, value) = expect_pair(&arena, lookup_result).unwrap();
        assert_eq!(arena.atom_bytes(tag), &[] as &[u8]);
        assert!(arena.equal(value, payload));
    }

    #[test]
    fn key_table_miss_returns_one() {
        let mut arena = Arena::new();
        let mut memo = MemoCaches::new();
        let mut entropy = SeededEntropy::new(1);

        let subject = arena.atom(&[]);
        let one_op = arena.atom(&[1]);
        let missing_key = arena.atom(&[99]);
        let quote_key = arena.cell(one_op, missing_key);
        let fourteen = arena.atom(&[14]);
        let formula = arena.cell(fourteen, quote_key);

        let result = nock(&mut arena, &mut memo, &mut entropy, subject, formula).unwrap();
        assert_eq!(arena.atom_bytes(result), &[1]);
    }

    #[test]
    fn splice_partitions_bytes_by_tree_shape() {
        let mut arena = Arena::new();
        let buf = arena.atom(&[1, 2, 3, 4, 5]);
        let two = arena.atom(&[2]);
        let three = arena.atom(&[3]);
        let shape = arena.cell(two, three);

        let result = carat(&mut arena, buf, shape).unwrap();
        let (shaped, tail) = expect_pair(&arena, result).unwrap();
        assert_eq!(arena.atom_bytes(tail), &[] as &[u8]);

        let (x, y) = expect_pair(&arena, shaped).unwrap();
        assert_eq!(arena.atom_bytes(x), &[1, 2]);
        assert_eq!(arena.atom_bytes(y), &[3, 4, 5]);
    }

    #[test]
    fn flatten_concatenates_left_before_right() {
        let mut arena = Arena::new();
        let x = arena.atom(&[1, 2]);
        let y = arena.atom(&[3]);
        let cell = arena.cell(x, y);
        assert_eq!(flatten(&arena, cell), vec![1, 2, 3]);
    }

    #[test]
    fn axis_into_atom_errors() {
        let mut arena = Arena::new();
        let subject = arena.atom(&[5]);
        let zero = arena.atom(&[]);
        let axis2 = arena.atom(&[2]);
        let formula = arena.cell(zero, axis2);
        let err = run(&mut arena, subject, formula).unwrap_err();
        assert_eq!(err, EvalErr::AxisIntoAtom);
    }

    #[test]
    fn deep_axis_selection_does_not_overflow() {
        // 5000 nested right-hand cells; axis_select walks this iteratively,
        // so it must not overflow the native stack the way a naive
        // recursive path-walker would.
        let mut arena = Arena::new();
        let base = arena.atom(&[0xAB]);
        let mut subject = base;
        for i in (1u32..5000).rev() {
            let n = arena.atom(&biguint_to_atom(&BigUint::from(i)));
            subject = arena.cell(n, subject);
        }

        let depth = 4999u32;
        let axis = (BigUint::from(1u32) << (depth + 1)) - BigUint::from(1u32);
        let axis_ptr = arena.atom(&biguint_to_atom(&axis));
        let zero = arena.atom(&[]);
        let formula = arena.cell(zero, axis_ptr);

        let result = run(&mut arena, subject, formula).unwrap();
        assert!(arena.equal(result, base));
    }
}
