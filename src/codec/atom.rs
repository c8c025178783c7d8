//! Atom codec. Bytes < 190 are a one-byte atom; `190+n` (n = 0..64) is a
//! short length-prefixed form; `0xFF` is the sentinel for the varint regime
//! used by atoms longer than 64 bytes.

use crate::error::CodecError;

const SHORT_FORM_BASE: u8 = 190;
const MAX_SHORT_LEN: usize = 64;
const VARINT_SENTINEL: u8 = 255;

/// Encodes a single atom's bytes.
pub fn encode_atom(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() == 1 && bytes[0] < SHORT_FORM_BASE {
        return vec![bytes[0]];
    }
    if bytes.len() <= MAX_SHORT_LEN {
        let mut out = Vec::with_capacity(1 + bytes.len());
        out.push(SHORT_FORM_BASE + bytes.len() as u8);
        out.extend_from_slice(bytes);
        return out;
    }
    let mut out = vec![VARINT_SENTINEL];
    out.extend(encode_varint(bytes.len() as u64));
    out.extend_from_slice(bytes);
    out
}

/// Decodes one atom starting at `*pos` in `input`, advancing `*pos` past it.
pub fn decode_atom(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, CodecError> {
    let b0 = *input.get(*pos).ok_or(CodecError::Truncated)?;
    *pos += 1;

    if b0 < SHORT_FORM_BASE {
        return Ok(vec![b0]);
    }
    if b0 < VARINT_SENTINEL {
        let n = (b0 - SHORT_FORM_BASE) as usize;
        return take(input, pos, n);
    }
    let n = decode_varint(input, pos)? as usize;
    take(input, pos, n)
}

fn take(input: &[u8], pos: &mut usize, n: usize) -> Result<Vec<u8>, CodecError> {
    let end = pos.checked_add(n).ok_or(CodecError::AtomTooLong)?;
    if end > input.len() {
        return Err(CodecError::AtomTooLong);
    }
    let bytes = input[*pos..end].to_vec();
    *pos = end;
    Ok(bytes)
}

/// 7-bit groups, least-significant group first; every non-terminal byte has
/// its high bit set, the terminal byte does not.
fn encode_varint(mut n: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let mut byte = (n & 0x7f) as u8;
        n >>= 7;
        if n != 0 {
            byte |= 0x80;
            out.push(byte);
        } else {
            out.push(byte);
            break;
        }
    }
    out
}

fn decode_varint(input: &[u8], pos: &mut usize) -> Result<u64, CodecError> {
    let mut n: u64 = 0;
    let mut shift = 0u32;
    loop {
        let b = *input.get(*pos).ok_or(CodecError::UnterminatedVarint)?;
        *pos += 1;
        n |= ((b & 0x7f) as u64) << shift;
        if b & 0x80 == 0 {
            return Ok(n);
        }
        shift += 7;
        if shift >= 64 {
            return Err(CodecError::UnterminatedVarint);
        }
    }
}
