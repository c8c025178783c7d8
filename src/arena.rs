//! Noun arena: a grow-only, index-addressed store for atoms and cells.
//!
//! Atoms get negative `NodePtr` values, cells get non-negative ones, and
//! atom bytes live in one contiguous backing buffer. Structural interning
//! on top of that lets equal nouns share one slot, so structural equality
//! and content-hash lookups both reduce to a `NodePtr` comparison after
//! interning.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

/// A handle into an [`Arena`]. Negative values address atoms, non-negative
/// values address cells. Stable for the lifetime of the arena that produced
/// it; never dereferenced across two different arenas.
pub type NodePtr = i32;

#[derive(Clone, Copy)]
struct AtomBuf {
    start: u32,
    end: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct Pair {
    left: NodePtr,
    right: NodePtr,
}

/// The shape of a noun at a given `NodePtr`, as returned by [`Arena::view`].
pub enum Noun<'a> {
    Atom(&'a [u8]),
    Cell(NodePtr, NodePtr),
}

pub struct Arena {
    bytes: Vec<u8>,
    atoms: Vec<AtomBuf>,
    pairs: Vec<Pair>,

    // structural interning: byte-exact atom content -> NodePtr
    atom_intern: HashMap<Vec<u8>, NodePtr>,
    // structural interning: (left, right) -> NodePtr
    pair_intern: HashMap<Pair, NodePtr>,
    // content hash -> NodePtr, populated lazily by `hash_of`
    hash_cache: HashMap<NodePtr, [u8; 32]>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        let mut a = Arena {
            bytes: Vec::with_capacity(4096),
            atoms: Vec::with_capacity(256),
            pairs: Vec::with_capacity(256),
            atom_intern: HashMap::new(),
            pair_intern: HashMap::new(),
            hash_cache: HashMap::new(),
        };
        // NodePtr -1 is always the empty atom.
        a.atom(&[]);
        a
    }

    /// The empty atom, `0`.
    pub fn null(&self) -> NodePtr {
        -1
    }

    /// Interns `bytes` as an atom, returning the (possibly shared) pointer.
    pub fn atom(&mut self, bytes: &[u8]) -> NodePtr {
        if let Some(ptr) = self.atom_intern.get(bytes) {
            return *ptr;
        }
        let start = self.bytes.len() as u32;
        self.bytes.extend_from_slice(bytes);
        let end = self.bytes.len() as u32;
        self.atoms.push(AtomBuf { start, end });
        let ptr = -(self.atoms.len() as NodePtr);
        self.atom_intern.insert(bytes.to_vec(), ptr);
        ptr
    }

    /// Interns `(left, right)` as a cell, returning the (possibly shared)
    /// pointer.
    pub fn cell(&mut self, left: NodePtr, right: NodePtr) -> NodePtr {
        let key = Pair { left, right };
        if let Some(ptr) = self.pair_intern.get(&key) {
            return *ptr;
        }
        let ptr = self.pairs.len() as NodePtr;
        self.pairs.push(key);
        self.pair_intern.insert(key, ptr);
        ptr
    }

    pub fn is_cell(&self, ptr: NodePtr) -> bool {
        ptr >= 0
    }

    pub fn atom_bytes(&self, ptr: NodePtr) -> &[u8] {
        debug_assert!(ptr < 0, "expected atom, got cell");
        let buf = self.atoms[(-ptr - 1) as usize];
        &self.bytes[buf.start as usize..buf.end as usize]
    }

    pub fn left(&self, ptr: NodePtr) -> NodePtr {
        self.pairs[ptr as usize].left
    }

    pub fn right(&self, ptr: NodePtr) -> NodePtr {
        self.pairs[ptr as usize].right
    }

    pub fn view(&self, ptr: NodePtr) -> Noun<'_> {
        if ptr >= 0 {
            let p = self.pairs[ptr as usize];
            Noun::Cell(p.left, p.right)
        } else {
            Noun::Atom(self.atom_bytes(ptr))
        }
    }

    /// Structural equality. Since both atoms and cells are interned,
    /// equal nouns always share one `NodePtr`.
    pub fn equal(&self, a: NodePtr, b: NodePtr) -> bool {
        a == b
    }

    /// Deterministic content hash over a noun's structural-equality class:
    /// `H_atom(bytes)` for an atom, `H_cell(hash(left), hash(right))` for a
    /// cell.
    pub fn hash_of(&mut self, ptr: NodePtr) -> [u8; 32] {
        if let Some(h) = self.hash_cache.get(&ptr) {
            return *h;
        }
        let h = match self.view(ptr) {
            Noun::Atom(bytes) => {
                let mut hasher = Sha256::new();
                hasher.update([0u8]); // atom tag, domain-separates from cells
                hasher.update(bytes);
                hasher.finalize().into()
            }
            Noun::Cell(l, r) => {
                let lh = self.hash_of(l);
                let rh = self.hash_of(r);
                let mut hasher = Sha256::new();
                hasher.update([1u8]); // cell tag
                hasher.update(lh);
                hasher.update(rh);
                hasher.finalize().into()
            }
        };
        self.hash_cache.insert(ptr, h);
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atoms_intern() {
        let mut a = Arena::new();
        let x = a.atom(&[1, 2, 3]);
        let y = a.atom(&[1, 2, 3]);
        assert_eq!(x, y);
    }

    #[test]
    fn distinct_atoms_differ() {
        let mut a = Arena::new();
        let x = a.atom(&[1, 2, 3]);
        let y = a.atom(&[1, 2, 4]);
        assert_ne!(x, y);
    }

    #[test]
    fn cells_intern() {
        let mut a = Arena::new();
        let x = a.atom(&[1]);
        let y = a.atom(&[2]);
        let c1 = a.cell(x, y);
        let c2 = a.cell(x, y);
        assert_eq!(c1, c2);
    }

    #[test]
    fn equal_nouns_hash_equal() {
        let mut a = Arena::new();
        let x1 = a.atom(&[9, 9]);
        let x2 = a.atom(&[9, 9]);
        assert_eq!(a.hash_of(x1), a.hash_of(x2));

        let c1 = a.cell(x1, x1);
        let c2 = a.cell(x2, x2);
        assert_eq!(a.hash_of(c1), a.hash_of(c2));
    }

    #[test]
    fn atom_and_cell_hashes_dont_collide_trivially() {
        let mut a = Arena::new();
        let atom = a.atom(&[1]);
        let one = a.atom(&[1]);
        let cell = a.cell(one, a.null());
        assert_ne!(a.hash_of(atom), a.hash_of(cell));
    }
}
