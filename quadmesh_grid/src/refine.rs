// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Refinement masks: which cells exist at each level of the quadtree.
//!
//! Each level is a dense mask over that level's full `rows × cols` index space.
//! Polygons tagged with a target level select cells at that level, and selection propagates
//! from finest to coarsest so that edge-adjacent cells never differ by more than one level.

use bitflags::bitflags;
use kurbo::Point;
use tracing::debug;

use crate::error::GridError;
use crate::polygon::Polygon;
use crate::types::{BaseGrid, CellKey, GridGeometry};

bitflags! {
    /// Per-cell state while building refinement masks.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CellMarks: u8 {
        /// Initially selected: inside a refinement polygon of this level (or level 0).
        const SELECTED = 0b0000_0001;
        /// Subdivided: a descendant exists, so this cell is not part of the mesh.
        const REFINED  = 0b0000_0010;
        /// Part of the mesh.
        const USED     = 0b0000_0100;
    }
}

/// A polygon requesting refinement down to `level` for every cell with a corner strictly inside it.
#[derive(Clone, Debug, PartialEq)]
pub struct RefinementPolygon {
    /// Region to refine, in world coordinates.
    pub outline: Polygon,
    /// Target refinement level (0 is the base grid).
    pub level: u8,
}

impl RefinementPolygon {
    /// Create a refinement polygon.
    pub fn new(outline: Polygon, level: u8) -> Self {
        Self { outline, level }
    }
}

/// Dense marks for one refinement level.
#[derive(Clone, Debug)]
pub struct LevelMask {
    rows: u32,
    cols: u32,
    marks: Vec<CellMarks>,
}

impl LevelMask {
    fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            marks: vec![CellMarks::empty(); rows as usize * cols as usize],
        }
    }

    /// Rows in this level's index space.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Columns in this level's index space.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Marks of cell `(n, m)`; empty outside the level.
    pub fn marks(&self, n: u32, m: u32) -> CellMarks {
        if n >= self.rows || m >= self.cols {
            return CellMarks::empty();
        }
        self.marks[self.slot(n, m)]
    }

    /// Whether cell `(n, m)` is part of the mesh.
    pub fn is_used(&self, n: u32, m: u32) -> bool {
        self.marks(n, m).contains(CellMarks::USED)
    }

    /// Number of cells of this level that are part of the mesh.
    pub fn used_count(&self) -> usize {
        self.marks
            .iter()
            .filter(|m| m.contains(CellMarks::USED))
            .count()
    }

    fn insert(&mut self, n: u32, m: u32, flags: CellMarks) {
        if n < self.rows && m < self.cols {
            let slot = self.slot(n, m);
            self.marks[slot] |= flags;
        }
    }

    fn is_refined(&self, n: u32, m: u32) -> bool {
        self.marks(n, m).contains(CellMarks::REFINED)
    }

    fn has_refined_neighbor(&self, n: u32, m: u32) -> bool {
        (m > 0 && self.is_refined(n, m - 1))
            || self.is_refined(n, m + 1)
            || (n > 0 && self.is_refined(n - 1, m))
            || self.is_refined(n + 1, m)
    }

    #[inline]
    fn slot(&self, n: u32, m: u32) -> usize {
        n as usize * self.cols as usize + m as usize
    }
}

/// Refinement masks for every level, coarsest first.
#[derive(Clone, Debug)]
pub struct RefinementMasks {
    levels: Vec<LevelMask>,
}

impl RefinementMasks {
    /// Number of refinement levels.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Level count is bounded by MAX_REFINEMENT_LEVELS at construction."
    )]
    pub fn nr_levels(&self) -> u8 {
        self.levels.len() as u8
    }

    /// All level masks, coarsest first.
    pub fn levels(&self) -> &[LevelMask] {
        &self.levels
    }

    /// Total number of cells in the mesh across all levels.
    pub fn used_count(&self) -> usize {
        self.levels.iter().map(LevelMask::used_count).sum()
    }
}

/// Decide which cells exist at each level.
///
/// The number of levels is one more than the deepest polygon level. Polygons whose index box
/// collapses to a single row or column are skipped.
#[tracing::instrument(skip_all, name = "quadtree::refine")]
pub fn build_refinement_masks(
    base: &BaseGrid,
    polygons: &[RefinementPolygon],
) -> Result<RefinementMasks, GridError> {
    let max_level = polygons.iter().map(|p| p.level).max().unwrap_or(0);
    base.validate(max_level)?;

    let mut levels = Vec::with_capacity(usize::from(max_level) + 1);
    for level in 0..=max_level {
        let (rows, cols) = base.level_shape(level).ok_or(GridError::LevelTooDeep {
            level,
            max: crate::types::MAX_REFINEMENT_LEVELS - 1,
        })?;
        levels.push(LevelMask::new(rows, cols));
    }
    levels[0].marks.fill(CellMarks::SELECTED);

    for level in (0..=max_level).rev() {
        let mask = &mut levels[usize::from(level)];
        for polygon in polygons.iter().filter(|p| p.level == level) {
            select_in_polygon(&base.geometry, level, &polygon.outline, mask);
        }
    }

    for level in (0..=max_level).rev() {
        let finest = level == max_level;
        let (rows, cols) = (
            levels[usize::from(level)].rows,
            levels[usize::from(level)].cols,
        );
        for m in 0..cols {
            for n in 0..rows {
                let mask = &levels[usize::from(level)];
                let marks = mask.marks(n, m);
                if marks.contains(CellMarks::REFINED) {
                    continue;
                }
                let used = marks.contains(CellMarks::SELECTED)
                    || (!finest && mask.has_refined_neighbor(n, m));
                if used {
                    use_cell(&mut levels, CellKey::new(level, n, m));
                }
            }
        }
        debug!(
            level,
            cells = levels[usize::from(level)].used_count(),
            "refined level"
        );
    }

    Ok(RefinementMasks { levels })
}

/// Mark `key` as used, every ancestor as refined, and the remaining quadrants of its parent as used.
fn use_cell(levels: &mut [LevelMask], key: CellKey) {
    levels[usize::from(key.level)].insert(key.n, key.m, CellMarks::USED);

    let mut ancestor = key;
    while let Some(parent) = ancestor.parent() {
        levels[usize::from(parent.level)].insert(parent.n, parent.m, CellMarks::REFINED);
        ancestor = parent;
    }

    if key.level > 0 {
        let mask = &mut levels[usize::from(key.level)];
        for sibling in key.siblings() {
            if !mask.is_refined(sibling.n, sibling.m) {
                mask.insert(sibling.n, sibling.m, CellMarks::USED);
            }
        }
    }
}

/// Select the cells of `level` with at least one corner strictly inside `outline`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Index boxes are clamped to the level's u32 shape before use."
)]
fn select_in_polygon(geometry: &GridGeometry, level: u8, outline: &Polygon, mask: &mut LevelMask) {
    if outline.vertices().is_empty() {
        return;
    }
    let size = geometry.cell_size(level);

    let (mut n0, mut n1, mut m0, mut m1) = (i64::MAX, i64::MIN, i64::MAX, i64::MIN);
    for v in outline.vertices() {
        let local = geometry.to_local(*v);
        n0 = n0.min((local.y / size.y).floor() as i64);
        n1 = n1.max((local.y / size.y).ceil() as i64);
        m0 = m0.min((local.x / size.x).floor() as i64);
        m1 = m1.max((local.x / size.x).ceil() as i64);
    }
    let clamp_n = |v: i64| v.clamp(0, i64::from(mask.rows) - 1);
    let clamp_m = |v: i64| v.clamp(0, i64::from(mask.cols) - 1);
    let (n0, n1, m0, m1) = (clamp_n(n0), clamp_n(n1), clamp_m(m0), clamp_m(m1));
    if n0 == n1 || m0 == m1 {
        debug!(level, "skipping degenerate refinement polygon");
        return;
    }

    let to_world = geometry.to_world();
    let corner = |n: i64, m: i64| to_world * Point::new(m as f64 * size.x, n as f64 * size.y);
    for m in m0..=m1 {
        for n in n0..=n1 {
            let touched = [(n, m), (n, m + 1), (n + 1, m + 1), (n + 1, m)]
                .into_iter()
                .any(|(cn, cm)| outline.contains_interior(corner(cn, cm)));
            if touched {
                mask.insert(n as u32, m as u32, CellMarks::SELECTED);
            }
        }
    }
}
