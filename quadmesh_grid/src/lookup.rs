// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-level sorted index from `(n, m)` to cell index.

use crate::table::CellTable;

/// Sorted `(key, cell)` pairs for one level, keyed by `m · stride + n`.
#[derive(Clone, Debug, Default)]
pub struct LevelIndex {
    entries: Vec<(u64, usize)>,
}

impl LevelIndex {
    /// Number of cells indexed at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this level has no cells.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cell index stored under the composite `key`, if any.
    pub fn binary_search(&self, key: u64) -> Option<usize> {
        self.entries
            .binary_search_by_key(&key, |&(k, _)| k)
            .ok()
            .map(|slot| self.entries[slot].1)
    }
}

/// Lookup of cells by `(level, n, m)`.
///
/// Composite keys use one stride for all levels, `1 + max n`, so distinct `(n, m)` pairs within a
/// level never collide.
#[derive(Clone, Debug)]
pub struct CellLookup {
    stride: u64,
    levels: Vec<LevelIndex>,
}

impl CellLookup {
    /// Index every cell of `cells`.
    pub fn new(cells: &CellTable) -> Self {
        let stride = cells.rows().iter().max().map_or(1, |&n| u64::from(n) + 1);
        let levels = (0..cells.nr_levels())
            .map(|level| {
                let mut entries: Vec<(u64, usize)> = cells
                    .level_range(level)
                    .map(|i| {
                        let key = cells.key(i);
                        (u64::from(key.m) * stride + u64::from(key.n), i)
                    })
                    .collect();
                entries.sort_unstable_by_key(|&(k, _)| k);
                LevelIndex { entries }
            })
            .collect();
        Self { stride, levels }
    }

    /// Stride of the composite key.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Index for one level, if the mesh has it.
    pub fn level(&self, level: u8) -> Option<&LevelIndex> {
        self.levels.get(usize::from(level))
    }

    /// Cell at `(level, n, m)`; `None` when no such cell exists.
    pub fn find(&self, level: u8, n: u32, m: u32) -> Option<usize> {
        let n = u64::from(n);
        if n >= self.stride {
            return None;
        }
        self.level(level)?
            .binary_search(u64::from(m) * self.stride + n)
    }
}
