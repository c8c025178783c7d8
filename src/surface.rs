//! A small pretty-printer for bracketed surface notation (`[a b c]` for
//! `[a [b c]]`): flattens a right spine into a space-separated list and
//! prints every element explicitly, including the final tail, so there's
//! no ambiguity to resolve.

use crate::arena::{Arena, Noun, NodePtr};

pub fn to_string(arena: &Arena, root: NodePtr) -> String {
    let mut out = String::new();
    write_noun(arena, root, &mut out);
    out
}

fn write_noun(arena: &Arena, ptr: NodePtr, out: &mut String) {
    match arena.view(ptr) {
        Noun::Atom(bytes) => out.push_str(&atom_to_string(bytes)),
        Noun::Cell(left, right) => {
            out.push('[');
            write_noun(arena, left, out);
            let mut cur = right;
            loop {
                out.push(' ');
                match arena.view(cur) {
                    Noun::Cell(l, r) => {
                        write_noun(arena, l, out);
                        cur = r;
                    }
                    Noun::Atom(bytes) => {
                        out.push_str(&atom_to_string(bytes));
                        break;
                    }
                }
            }
            out.push(']');
        }
    }
}

fn atom_to_string(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        "0".to_string()
    } else {
        format!("0x{}", hex::encode(bytes))
    }
}
