// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat cell table: one entry per mesh cell, grouped by level.

use core::ops::Range;

use crate::error::GridError;
use crate::refine::RefinementMasks;
use crate::types::CellKey;

/// Parallel arrays of cell levels and indices, grouped by ascending level.
///
/// `first` holds one start offset per level plus a trailing end sentinel, so every level
/// (including empty ones) has a valid [`level_range`](Self::level_range).
#[derive(Clone, PartialEq, Eq)]
pub struct CellTable {
    level: Vec<u8>,
    n: Vec<u32>,
    m: Vec<u32>,
    first: Vec<usize>,
}

impl core::fmt::Debug for CellTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CellTable")
            .field("cells", &self.len())
            .field("first", &self.first)
            .finish_non_exhaustive()
    }
}

impl CellTable {
    /// Collect the used cells of every level.
    ///
    /// Within a level, columns are the outer loop and rows the inner one.
    pub fn from_masks(masks: &RefinementMasks) -> Self {
        let total = masks.used_count();
        let mut table = Self {
            level: Vec::with_capacity(total),
            n: Vec::with_capacity(total),
            m: Vec::with_capacity(total),
            first: Vec::with_capacity(masks.levels().len() + 1),
        };
        for (level, mask) in (0_u8..).zip(masks.levels()) {
            table.first.push(table.len());
            for m in 0..mask.cols() {
                for n in 0..mask.rows() {
                    if mask.is_used(n, m) {
                        table.push(CellKey::new(level, n, m));
                    }
                }
            }
        }
        table.first.push(table.len());
        table
    }

    /// Build a table from keys that are already grouped by ascending level.
    pub fn from_cells(
        nr_levels: u8,
        keys: impl IntoIterator<Item = CellKey>,
    ) -> Result<Self, GridError> {
        let mut table = Self {
            level: Vec::new(),
            n: Vec::new(),
            m: Vec::new(),
            first: Vec::with_capacity(usize::from(nr_levels) + 1),
        };
        let mut counts = vec![0_usize; usize::from(nr_levels)];
        for (index, key) in keys.into_iter().enumerate() {
            if key.level >= nr_levels {
                return Err(GridError::LevelOutOfRange {
                    index,
                    level: key.level,
                    nr_levels,
                });
            }
            if let Some(&previous) = table.level.last()
                && key.level < previous
            {
                return Err(GridError::UnsortedLevels {
                    index,
                    level: key.level,
                    previous,
                });
            }
            counts[usize::from(key.level)] += 1;
            table.push(key);
        }
        let mut start = 0;
        for count in counts {
            table.first.push(start);
            start += count;
        }
        table.first.push(start);
        Ok(table)
    }

    /// A new table holding only the cells where `keep` is true, with the same number of levels.
    pub fn retain(&self, keep: &[bool]) -> Result<Self, GridError> {
        if keep.len() != self.len() {
            return Err(GridError::LengthMismatch {
                what: "cell selection",
                expected: self.len(),
                actual: keep.len(),
            });
        }
        let kept = self
            .iter()
            .zip(keep)
            .filter_map(|(key, &k)| k.then_some(key));
        Self::from_cells(self.nr_levels(), kept)
    }

    fn push(&mut self, key: CellKey) {
        self.level.push(key.level);
        self.n.push(key.n);
        self.m.push(key.m);
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.level.len()
    }

    /// Whether the table has no cells.
    pub fn is_empty(&self) -> bool {
        self.level.is_empty()
    }

    /// Number of refinement levels, including empty ones.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Level count originates from a u8."
    )]
    pub fn nr_levels(&self) -> u8 {
        (self.first.len() - 1) as u8
    }

    /// Index range of the cells of `level`; empty for levels the table does not have.
    pub fn level_range(&self, level: u8) -> Range<usize> {
        let l = usize::from(level);
        match (self.first.get(l), self.first.get(l + 1)) {
            (Some(&start), Some(&end)) => start..end,
            _ => self.len()..self.len(),
        }
    }

    /// Index of the first cell of `level`.
    pub fn first_index(&self, level: u8) -> usize {
        self.level_range(level).start
    }

    /// Key of cell `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn key(&self, index: usize) -> CellKey {
        CellKey::new(self.level[index], self.n[index], self.m[index])
    }

    /// Levels of all cells.
    pub fn levels(&self) -> &[u8] {
        &self.level
    }

    /// Row indices of all cells.
    pub fn rows(&self) -> &[u32] {
        &self.n
    }

    /// Column indices of all cells.
    pub fn columns(&self) -> &[u32] {
        &self.m
    }

    /// Keys of all cells in table order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = CellKey> + '_ {
        (0..self.len()).map(|i| self.key(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cells_groups_levels() {
        let table = CellTable::from_cells(
            3,
            [
                CellKey::new(0, 0, 0),
                CellKey::new(0, 0, 1),
                CellKey::new(2, 0, 4),
            ],
        )
        .unwrap();
        assert_eq!(table.nr_levels(), 3);
        assert_eq!(table.level_range(0), 0..2);
        assert_eq!(table.level_range(1), 2..2);
        assert_eq!(table.level_range(2), 2..3);
        assert_eq!(table.first_index(2), 2);
        assert_eq!(table.level_range(7), 3..3);
        assert_eq!(table.key(2), CellKey::new(2, 0, 4));
    }

    #[test]
    fn from_cells_rejects_bad_levels() {
        let unsorted =
            CellTable::from_cells(2, [CellKey::new(1, 0, 0), CellKey::new(0, 0, 0)]).unwrap_err();
        assert!(matches!(
            unsorted,
            GridError::UnsortedLevels {
                index: 1,
                level: 0,
                previous: 1
            }
        ));

        let out_of_range = CellTable::from_cells(1, [CellKey::new(1, 0, 0)]).unwrap_err();
        assert!(matches!(out_of_range, GridError::LevelOutOfRange { .. }));
    }

    #[test]
    fn retain_keeps_levels_and_order() {
        let table = CellTable::from_cells(
            2,
            [
                CellKey::new(0, 0, 0),
                CellKey::new(1, 0, 2),
                CellKey::new(1, 1, 2),
            ],
        )
        .unwrap();
        let cut = table.retain(&[false, true, true]).unwrap();
        assert_eq!(cut.nr_levels(), 2);
        assert_eq!(cut.level_range(0), 0..0);
        assert_eq!(cut.level_range(1), 0..2);
        assert_eq!(
            cut.iter().collect::<Vec<_>>(),
            vec![CellKey::new(1, 0, 2), CellKey::new(1, 1, 2)]
        );

        let err = table.retain(&[true]).unwrap_err();
        assert!(matches!(err, GridError::LengthMismatch { expected: 3, .. }));
    }
}
