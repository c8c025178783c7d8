//! Memo caches backing the evaluator's content-hash and structural-key
//! lookup opcodes. Structural-equality lookups reduce to `NodePtr` equality
//! once a noun is interned, following the arena's own intern-table
//! pattern.

use std::collections::HashMap;

use crate::arena::NodePtr;

#[derive(Default)]
pub struct MemoCaches {
    /// content hash bytes -> noun. Keyed on raw bytes rather than a
    /// fixed-size array since a lookup key is whatever atom the formula
    /// produces, not necessarily the arena's own hash width.
    hash_table: HashMap<Vec<u8>, NodePtr>,
    /// structural key (by interned `NodePtr`) -> noun.
    key_table: HashMap<NodePtr, NodePtr>,
}

impl MemoCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash_insert(&mut self, hash: Vec<u8>, value: NodePtr) {
        self.hash_table.insert(hash, value);
    }

    pub fn hash_get(&self, hash: &[u8]) -> Option<NodePtr> {
        self.hash_table.get(hash).copied()
    }

    /// Overwrites any existing value unconditionally.
    pub fn key_insert(&mut self, key: NodePtr, value: NodePtr) {
        self.key_table.insert(key, value);
    }

    pub fn key_get(&self, key: NodePtr) -> Option<NodePtr> {
        self.key_table.get(&key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_table_insert_then_get() {
        let mut m = MemoCaches::new();
        let h = vec![1u8; 32];
        assert_eq!(m.hash_get(&h), None);
        m.hash_insert(h.clone(), 7);
        assert_eq!(m.hash_get(&h), Some(7));
    }

    #[test]
    fn key_table_overwrites() {
        let mut m = MemoCaches::new();
        m.key_insert(3, 10);
        assert_eq!(m.key_get(3), Some(10));
        m.key_insert(3, 20);
        assert_eq!(m.key_get(3), Some(20));
    }
}
