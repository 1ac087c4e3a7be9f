use std::hash::Hash;

use indexmap::{IndexMap, map::Entry};

use crate::error::{ForgeError, block_element, block_index};

/// Outcome of pushing one old index through an [`IndexRemapper`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Remapped {
    pub index: usize,
    pub first_seen: bool,
}

/// First-seen-order map from an old index space to a compacted one.
///
/// The n-th distinct old index handed to [`IndexRemapper::remap`] becomes new
/// index n-1, and any later occurrence of it yields that same index. Iteration
/// runs in insertion order, so the new table can be rebuilt from the mappings.
#[derive(Clone, Debug, Default)]
pub struct IndexRemapper<K = i16> {
    map: IndexMap<K, usize>,
}

impl<K: Copy + Eq + Hash> IndexRemapper<K> {
    pub fn new() -> Self {
        Self {
            map: IndexMap::new(),
        }
    }

    pub fn remap(&mut self, old: K) -> Remapped {
        let next = self.map.len();
        match self.map.entry(old) {
            Entry::Occupied(occupied) => Remapped {
                index: *occupied.get(),
                first_seen: false,
            },
            Entry::Vacant(vacant) => {
                vacant.insert(next);
                Remapped {
                    index: next,
                    first_seen: true,
                }
            }
        }
    }

    pub fn get(&self, old: K) -> Option<usize> {
        self.map.get(&old).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// `(old, new)` pairs in the order the old indices were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (K, usize)> + '_ {
        self.map.iter().map(|(old, new)| (*old, *new))
    }
}

impl IndexRemapper<i16> {
    /// Remaps a block index, appending a copy of `global[old]` to `local` the
    /// first time `old` is seen. Returns the local block index.
    pub fn remap_into<T: Clone>(
        &mut self,
        old: i16,
        global: &[T],
        local: &mut Vec<T>,
        table: &'static str,
    ) -> Result<i16, ForgeError> {
        let slot = self.remap(old);
        if slot.first_seen {
            match block_element(global, old, table) {
                Ok(element) => local.push(element.clone()),
                Err(err) => {
                    self.map.pop();
                    return Err(err);
                }
            }
        }
        block_index(slot.index, table)
    }
}
