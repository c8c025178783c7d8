//! Unsigned little-endian bigint conversions for atoms that the evaluator
//! treats numerically (increment, entropy length, and splice length
//! arguments).

use num_bigint::BigUint;
use num_traits::Zero;

/// Interprets atom bytes as an unsigned little-endian integer.
pub fn atom_to_biguint(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_le(bytes)
}

/// Converts an unsigned integer back to its minimal little-endian atom
/// encoding (no superfluous trailing zero bytes beyond what's needed to
/// hold the value; the zero value encodes as the empty atom).
pub fn biguint_to_atom(n: &BigUint) -> Vec<u8> {
    if n.is_zero() {
        return Vec::new();
    }
    n.to_bytes_le()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_round_trips_to_empty_atom() {
        let n = atom_to_biguint(&[]);
        assert!(n.is_zero());
        assert_eq!(biguint_to_atom(&n), Vec::<u8>::new());
    }

    #[test]
    fn little_endian_round_trip() {
        let bytes = [0x2a, 0x01];
        let n = atom_to_biguint(&bytes);
        assert_eq!(n, BigUint::from(298u32));
        assert_eq!(biguint_to_atom(&n), vec![0x2a, 0x01]);
    }

    #[test]
    fn incrementing_an_atom_adds_one() {
        let n = atom_to_biguint(&[40]);
        let incremented = n + BigUint::from(1u32);
        assert_eq!(biguint_to_atom(&incremented), vec![41]);
    }
}
