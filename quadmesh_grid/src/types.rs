// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive grid types: geometry of the base grid, cell keys, and directions.

use kurbo::{Affine, Point, Vec2};

use crate::error::GridError;

/// Deepest refinement supported. Level indices are persisted as `level + 1` in a signed byte and
/// row/column indices in 32 bits, so the practical limit is far below either.
pub const MAX_REFINEMENT_LEVELS: u8 = 24;

/// Placement of the base grid in world coordinates.
///
/// The grid is rotated counter-clockwise by `rotation` degrees about its origin `(x0, y0)`.
/// Cell `(n, m)` at level 0 covers `[m·dx, (m+1)·dx] × [n·dy, (n+1)·dy]` in grid-local space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridGeometry {
    /// World x of the grid origin (lower-left corner of cell `(0, 0)`).
    pub x0: f64,
    /// World y of the grid origin.
    pub y0: f64,
    /// Cell width at level 0.
    pub dx: f64,
    /// Cell height at level 0.
    pub dy: f64,
    /// Rotation in degrees, counter-clockwise.
    pub rotation: f64,
}

impl GridGeometry {
    /// Create a grid geometry.
    pub const fn new(x0: f64, y0: f64, dx: f64, dy: f64, rotation: f64) -> Self {
        Self {
            x0,
            y0,
            dx,
            dy,
            rotation,
        }
    }

    /// Grid-local to world transform: rotate about the origin, then translate.
    pub fn to_world(&self) -> Affine {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        Affine::new([cos, sin, -sin, cos, self.x0, self.y0])
    }

    /// Map a world point into grid-local coordinates (inverse of [`to_world`](Self::to_world)).
    pub fn to_local(&self, world: Point) -> Point {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let x = world.x - self.x0;
        let y = world.y - self.y0;
        Point::new(cos * x + sin * y, -sin * x + cos * y)
    }

    /// Cell size at `level`; each level halves both sides.
    pub fn cell_size(&self, level: u8) -> Vec2 {
        let scale = level_scale(level);
        Vec2::new(self.dx / scale, self.dy / scale)
    }

    pub(crate) fn validate(&self) -> Result<(), GridError> {
        let finite = [self.x0, self.y0, self.rotation]
            .iter()
            .all(|v| v.is_finite());
        if !(self.dx.is_finite() && self.dx > 0.0 && self.dy.is_finite() && self.dy > 0.0)
            || !finite
        {
            return Err(GridError::InvalidGeometry {
                dx: self.dx,
                dy: self.dy,
            });
        }
        Ok(())
    }
}

/// The coarsest (level 0) grid a quadtree is refined from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BaseGrid {
    /// World placement and level-0 cell size.
    pub geometry: GridGeometry,
    /// Number of rows at level 0.
    pub nmax: u32,
    /// Number of columns at level 0.
    pub mmax: u32,
}

impl BaseGrid {
    /// Create a base grid of `nmax` rows by `mmax` columns.
    pub const fn new(geometry: GridGeometry, nmax: u32, mmax: u32) -> Self {
        Self {
            geometry,
            nmax,
            mmax,
        }
    }

    /// Rows and columns of the full index space at `level`, or `None` on overflow.
    pub fn level_shape(&self, level: u8) -> Option<(u32, u32)> {
        let rows = self.nmax.checked_mul(1_u32.checked_shl(u32::from(level))?)?;
        let cols = self.mmax.checked_mul(1_u32.checked_shl(u32::from(level))?)?;
        Some((rows, cols))
    }

    pub(crate) fn validate(&self, max_level: u8) -> Result<(), GridError> {
        self.geometry.validate()?;
        if self.nmax == 0 || self.mmax == 0 {
            return Err(GridError::EmptyGrid {
                nmax: self.nmax,
                mmax: self.mmax,
            });
        }
        if max_level >= MAX_REFINEMENT_LEVELS || self.level_shape(max_level).is_none() {
            return Err(GridError::LevelTooDeep {
                level: max_level,
                max: MAX_REFINEMENT_LEVELS - 1,
            });
        }
        Ok(())
    }
}

/// Address of a cell: refinement level plus row `n` and column `m` within that level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    /// Refinement level, 0 is coarsest.
    pub level: u8,
    /// Row index within the level.
    pub n: u32,
    /// Column index within the level.
    pub m: u32,
}

impl CellKey {
    /// Create a cell key.
    pub const fn new(level: u8, n: u32, m: u32) -> Self {
        Self { level, n, m }
    }

    /// The cell one level coarser that contains this one. `None` at level 0.
    pub const fn parent(self) -> Option<Self> {
        if self.level == 0 {
            return None;
        }
        Some(Self::new(self.level - 1, self.n >> 1, self.m >> 1))
    }

    /// The three other quadrants of this cell's parent.
    pub const fn siblings(self) -> [Self; 3] {
        let (l, n, m) = (self.level, self.n, self.m);
        [
            Self::new(l, n ^ 1, m),
            Self::new(l, n, m ^ 1),
            Self::new(l, n ^ 1, m ^ 1),
        ]
    }
}

/// Cardinal direction of a cell side.
///
/// The discriminants follow the on-disk order of neighbor blocks: up, right, down, left.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards `n + 1` (`nu`).
    Up = 0,
    /// Towards `m + 1` (`mu`).
    Right = 1,
    /// Towards `n - 1` (`nd`).
    Down = 2,
    /// Towards `m - 1` (`md`).
    Left = 3,
}

impl Direction {
    /// All directions in on-disk order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// The direction pointing the other way.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// `2^level` as a float.
#[inline]
pub(crate) fn level_scale(level: u8) -> f64 {
    f64::from(1_u32 << level)
}
