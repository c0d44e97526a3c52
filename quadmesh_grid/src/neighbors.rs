// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Neighbor topology across refinement levels.
//!
//! Each cell has one [`Neighbor`] per [`Direction`]. Because the mesh is 2:1 balanced, a side
//! faces nothing, one cell of the same level, one coarser cell, or up to two finer cells.

use tracing::debug;

use crate::lookup::CellLookup;
use crate::table::CellTable;
use crate::types::{CellKey, Direction};

/// What lies across one side of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Neighbor {
    /// Nothing: the side is on the mesh boundary.
    #[default]
    None,
    /// One cell of the same level.
    Same(usize),
    /// One cell one level coarser.
    Coarser(usize),
    /// Cells one level finer, in increasing `n` (for left/right sides) or `m` (for up/down).
    Finer(Option<usize>, Option<usize>),
}

impl Neighbor {
    /// Level difference of the neighbor relative to the cell: `-1` coarser, `0` same or none,
    /// `1` finer.
    pub const fn delta(self) -> i8 {
        match self {
            Self::None | Self::Same(_) => 0,
            Self::Coarser(_) => -1,
            Self::Finer(..) => 1,
        }
    }

    /// First neighbor index.
    pub const fn first(self) -> Option<usize> {
        match self {
            Self::None => None,
            Self::Same(i) | Self::Coarser(i) => Some(i),
            Self::Finer(a, _) => a,
        }
    }

    /// Second neighbor index; only finer neighbors have one.
    pub const fn second(self) -> Option<usize> {
        match self {
            Self::Finer(_, b) => b,
            _ => None,
        }
    }

    /// All neighbor indices on this side.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        self.first().into_iter().chain(self.second())
    }

    /// Whether the side faces nothing.
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None | Self::Finer(None, None))
    }

    /// Rebuild a neighbor from its `(delta, first, second)` form.
    ///
    /// Returns `None` for a delta outside `-1..=1`. A side without any index is [`Neighbor::None`].
    pub fn from_raw(delta: i8, first: Option<usize>, second: Option<usize>) -> Option<Self> {
        let neighbor = match (delta, first, second) {
            (-1 | 0, None, _) | (1, None, None) => Self::None,
            (0, Some(i), _) => Self::Same(i),
            (-1, Some(i), _) => Self::Coarser(i),
            (1, a, b) => Self::Finer(a, b),
            _ => return None,
        };
        Some(neighbor)
    }
}

/// Neighbors of one cell, one per direction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellNeighbors([Neighbor; 4]);

impl CellNeighbors {
    /// Neighbors in [`Direction::ALL`] order: up, right, down, left.
    pub const fn new(sides: [Neighbor; 4]) -> Self {
        Self(sides)
    }

    /// Neighbor across `direction`.
    pub const fn get(&self, direction: Direction) -> Neighbor {
        self.0[direction.index()]
    }

    /// Replace the neighbor across `direction`.
    pub fn set(&mut self, direction: Direction, neighbor: Neighbor) {
        self.0[direction.index()] = neighbor;
    }

    /// `(direction, neighbor)` for every side.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, Neighbor)> + '_ {
        Direction::ALL.into_iter().zip(self.0)
    }

    /// Record `cell` as one of the two finer neighbors across `direction`.
    fn attach_finer(&mut self, direction: Direction, second: bool, cell: usize) {
        let (mut a, mut b) = match self.get(direction) {
            Neighbor::Finer(a, b) => (a, b),
            _ => (None, None),
        };
        if second {
            b = Some(cell);
        } else {
            a = Some(cell);
        }
        self.set(direction, Neighbor::Finer(a, b));
    }
}

/// `2v + offset`, or `None` past the index space.
fn child(v: u32, offset: u32) -> Option<u32> {
    v.checked_mul(2)?.checked_add(offset)
}

/// Resolve the neighbors of every cell.
///
/// Per level, three passes fill each cell's right and up sides (and the matching left and down
/// sides of whatever they find): same level, then one level coarser, then one level finer.
#[tracing::instrument(skip_all, name = "quadtree::neighbors", fields(cells = cells.len()))]
pub fn find_neighbors(cells: &CellTable, lookup: &CellLookup) -> Vec<CellNeighbors> {
    let mut out = vec![CellNeighbors::default(); cells.len()];
    let nr_levels = cells.nr_levels();

    for level in 0..nr_levels {
        let range = cells.level_range(level);

        for ib in range.clone() {
            let CellKey { n, m, .. } = cells.key(ib);
            if let Some(j) = m.checked_add(1).and_then(|m1| lookup.find(level, n, m1)) {
                out[ib].set(Direction::Right, Neighbor::Same(j));
                out[j].set(Direction::Left, Neighbor::Same(ib));
            }
            if let Some(j) = n.checked_add(1).and_then(|n1| lookup.find(level, n1, m)) {
                out[ib].set(Direction::Up, Neighbor::Same(j));
                out[j].set(Direction::Down, Neighbor::Same(ib));
            }
        }

        if level > 0 {
            let coarse = level - 1;
            for ib in range.clone() {
                let CellKey { n, m, .. } = cells.key(ib);
                if m % 2 == 1
                    && out[ib].get(Direction::Right).is_none()
                    && let Some(c) = lookup.find(coarse, n / 2, m / 2 + 1)
                {
                    out[ib].set(Direction::Right, Neighbor::Coarser(c));
                    out[c].attach_finer(Direction::Left, n % 2 == 1, ib);
                }
                if n % 2 == 1
                    && out[ib].get(Direction::Up).is_none()
                    && let Some(c) = lookup.find(coarse, n / 2 + 1, m / 2)
                {
                    out[ib].set(Direction::Up, Neighbor::Coarser(c));
                    out[c].attach_finer(Direction::Down, m % 2 == 1, ib);
                }
            }
        }

        if level + 1 < nr_levels {
            let fine = level + 1;
            for ib in range {
                let CellKey { n, m, .. } = cells.key(ib);
                if out[ib].get(Direction::Right).is_none() {
                    let mf = child(m, 2);
                    let a = mf.zip(child(n, 0)).and_then(|(mf, nf)| lookup.find(fine, nf, mf));
                    let b = mf.zip(child(n, 1)).and_then(|(mf, nf)| lookup.find(fine, nf, mf));
                    if a.is_some() || b.is_some() {
                        out[ib].set(Direction::Right, Neighbor::Finer(a, b));
                        for f in a.into_iter().chain(b) {
                            out[f].set(Direction::Left, Neighbor::Coarser(ib));
                        }
                    }
                }
                if out[ib].get(Direction::Up).is_none() {
                    let nf = child(n, 2);
                    let a = nf.zip(child(m, 0)).and_then(|(nf, mf)| lookup.find(fine, nf, mf));
                    let b = nf.zip(child(m, 1)).and_then(|(nf, mf)| lookup.find(fine, nf, mf));
                    if a.is_some() || b.is_some() {
                        out[ib].set(Direction::Up, Neighbor::Finer(a, b));
                        for f in a.into_iter().chain(b) {
                            out[f].set(Direction::Down, Neighbor::Coarser(ib));
                        }
                    }
                }
            }
        }

        debug!(level, "resolved neighbors");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(nr_levels: u8, keys: &[CellKey]) -> (CellTable, Vec<CellNeighbors>) {
        let cells = CellTable::from_cells(nr_levels, keys.iter().copied()).unwrap();
        let lookup = CellLookup::new(&cells);
        let nbrs = find_neighbors(&cells, &lookup);
        (cells, nbrs)
    }

    #[test]
    fn raw_form_round_trips_each_variant() {
        for nb in [
            Neighbor::None,
            Neighbor::Same(3),
            Neighbor::Coarser(7),
            Neighbor::Finer(Some(1), Some(2)),
            Neighbor::Finer(None, Some(2)),
        ] {
            assert_eq!(
                Neighbor::from_raw(nb.delta(), nb.first(), nb.second()),
                Some(nb)
            );
        }
        assert_eq!(Neighbor::from_raw(1, None, None), Some(Neighbor::None));
        assert_eq!(Neighbor::from_raw(2, Some(0), None), None);
    }

    #[test]
    fn same_level_row() {
        let (_, nbrs) = resolve(1, &[CellKey::new(0, 0, 0), CellKey::new(0, 0, 1)]);
        assert_eq!(nbrs[0].get(Direction::Right), Neighbor::Same(1));
        assert_eq!(nbrs[1].get(Direction::Left), Neighbor::Same(0));
        assert_eq!(nbrs[0].get(Direction::Left), Neighbor::None);
        assert_eq!(nbrs[0].get(Direction::Up), Neighbor::None);
    }

    #[test]
    fn coarse_cell_beside_four_fine_cells() {
        // Coarse cell (0, 0) at level 0, refined cell (0, 1) split into four level-1 cells.
        let (_, nbrs) = resolve(
            2,
            &[
                CellKey::new(0, 0, 0),
                CellKey::new(1, 0, 2),
                CellKey::new(1, 1, 2),
                CellKey::new(1, 0, 3),
                CellKey::new(1, 1, 3),
            ],
        );
        assert_eq!(
            nbrs[0].get(Direction::Right),
            Neighbor::Finer(Some(1), Some(2))
        );
        assert_eq!(nbrs[1].get(Direction::Left), Neighbor::Coarser(0));
        assert_eq!(nbrs[2].get(Direction::Left), Neighbor::Coarser(0));
        assert_eq!(nbrs[1].get(Direction::Right), Neighbor::Same(3));
        assert_eq!(nbrs[1].get(Direction::Up), Neighbor::Same(2));
        assert_eq!(nbrs[4].get(Direction::Right), Neighbor::None);
    }

    #[test]
    fn fine_cells_left_of_coarse_cell() {
        // Refined cell (0, 0) split into four level-1 cells, coarse cell (0, 1) on the right.
        let (_, nbrs) = resolve(
            2,
            &[
                CellKey::new(0, 0, 1),
                CellKey::new(1, 0, 0),
                CellKey::new(1, 1, 0),
                CellKey::new(1, 0, 1),
                CellKey::new(1, 1, 1),
            ],
        );
        assert_eq!(nbrs[3].get(Direction::Right), Neighbor::Coarser(0));
        assert_eq!(nbrs[4].get(Direction::Right), Neighbor::Coarser(0));
        assert_eq!(
            nbrs[0].get(Direction::Left),
            Neighbor::Finer(Some(3), Some(4))
        );
    }

    #[test]
    fn fine_cells_below_coarse_cell() {
        let (_, nbrs) = resolve(
            2,
            &[
                CellKey::new(0, 1, 0),
                CellKey::new(1, 0, 0),
                CellKey::new(1, 1, 0),
                CellKey::new(1, 0, 1),
                CellKey::new(1, 1, 1),
            ],
        );
        assert_eq!(nbrs[2].get(Direction::Up), Neighbor::Coarser(0));
        assert_eq!(nbrs[4].get(Direction::Up), Neighbor::Coarser(0));
        assert_eq!(
            nbrs[0].get(Direction::Down),
            Neighbor::Finer(Some(2), Some(4))
        );
    }

    #[test]
    fn fine_cells_above_coarse_cell() {
        let (_, nbrs) = resolve(
            2,
            &[
                CellKey::new(0, 0, 0),
                CellKey::new(1, 2, 0),
                CellKey::new(1, 3, 0),
                CellKey::new(1, 2, 1),
                CellKey::new(1, 3, 1),
            ],
        );
        assert_eq!(nbrs[0].get(Direction::Up), Neighbor::Finer(Some(1), Some(3)));
        assert_eq!(nbrs[1].get(Direction::Down), Neighbor::Coarser(0));
        assert_eq!(nbrs[3].get(Direction::Down), Neighbor::Coarser(0));
    }
}
