// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-cell mask values.

use kurbo::Point;
use quadmesh_grid::QuadtreeMesh;

use crate::error::MaskError;

/// Classification of one cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MaskValue {
    /// Excluded from the computation.
    #[default]
    Inactive = 0,
    /// Computed.
    Active = 1,
    /// Computed, with water levels prescribed at the boundary.
    OpenBoundary = 2,
    /// Computed, with outflow allowed at the boundary.
    OutflowBoundary = 3,
}

impl MaskValue {
    /// Whether the cell takes part in the computation (any value but inactive).
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Inactive)
    }

    /// Stored byte.
    pub const fn to_raw(self) -> i8 {
        self as i8
    }

    /// Parse a stored byte; `None` outside `0..=3`.
    pub const fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            0 => Some(Self::Inactive),
            1 => Some(Self::Active),
            2 => Some(Self::OpenBoundary),
            3 => Some(Self::OutflowBoundary),
            _ => None,
        }
    }
}

/// Which cells [`CellMask::select`] returns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MaskSelection {
    /// Every cell.
    All,
    /// Every active cell, boundaries included.
    Active,
    /// Active cells that are not boundary cells.
    Interior,
    /// Open-boundary cells.
    OpenBoundary,
    /// Outflow-boundary cells.
    OutflowBoundary,
}

impl MaskSelection {
    /// Whether `value` belongs to this selection.
    pub const fn matches(self, value: MaskValue) -> bool {
        match self {
            Self::All => true,
            Self::Active => value.is_active(),
            Self::Interior => matches!(value, MaskValue::Active),
            Self::OpenBoundary => matches!(value, MaskValue::OpenBoundary),
            Self::OutflowBoundary => matches!(value, MaskValue::OutflowBoundary),
        }
    }
}

/// One [`MaskValue`] per mesh cell, in cell table order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellMask(Vec<MaskValue>);

impl CellMask {
    /// A mask with every one of `len` cells inactive.
    pub fn inactive(len: usize) -> Self {
        Self(vec![MaskValue::Inactive; len])
    }

    /// Wrap existing values.
    pub fn from_values(values: Vec<MaskValue>) -> Self {
        Self(values)
    }

    /// All values.
    pub fn values(&self) -> &[MaskValue] {
        &self.0
    }

    pub(crate) fn values_mut(&mut self) -> &mut [MaskValue] {
        &mut self.0
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mask covers no cells.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of cell `index`.
    pub fn get(&self, index: usize) -> Option<MaskValue> {
        self.0.get(index).copied()
    }

    /// Number of cells with `value`.
    pub fn count(&self, value: MaskValue) -> usize {
        self.0.iter().filter(|&&v| v == value).count()
    }

    /// Whether any cell is an open boundary.
    pub fn has_open_boundaries(&self) -> bool {
        self.0.contains(&MaskValue::OpenBoundary)
    }

    /// Indices of the cells in `selection`.
    pub fn select(&self, selection: MaskSelection) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| selection.matches(v).then_some(i))
            .collect()
    }

    /// Centres of the cells of `mesh` in `selection`.
    pub fn selected_points(
        &self,
        mesh: &QuadtreeMesh,
        selection: MaskSelection,
    ) -> Result<Vec<Point>, MaskError> {
        self.check_len(mesh.len())?;
        let centres = mesh.cell_centres();
        Ok(self
            .select(selection)
            .into_iter()
            .map(|i| centres[i])
            .collect())
    }

    /// The values at the positions where `keep` is true.
    pub(crate) fn filtered(&self, keep: &[bool]) -> Self {
        Self(
            self.0
                .iter()
                .zip(keep)
                .filter_map(|(&v, &k)| k.then_some(v))
                .collect(),
        )
    }

    pub(crate) fn check_len(&self, expected: usize) -> Result<(), MaskError> {
        if self.len() == expected {
            Ok(())
        } else {
            Err(MaskError::Length {
                expected,
                actual: self.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values() {
        for v in [
            MaskValue::Inactive,
            MaskValue::Active,
            MaskValue::OpenBoundary,
            MaskValue::OutflowBoundary,
        ] {
            assert_eq!(MaskValue::from_raw(v.to_raw()), Some(v));
        }
        assert_eq!(MaskValue::from_raw(4), None);
        assert_eq!(MaskValue::from_raw(-1), None);
    }

    #[test]
    fn selections() {
        let mask = CellMask::from_values(vec![
            MaskValue::Inactive,
            MaskValue::Active,
            MaskValue::OpenBoundary,
            MaskValue::OutflowBoundary,
            MaskValue::Active,
        ]);
        assert_eq!(mask.select(MaskSelection::All).len(), 5);
        assert_eq!(mask.select(MaskSelection::Active), vec![1, 2, 3, 4]);
        assert_eq!(mask.select(MaskSelection::Interior), vec![1, 4]);
        assert_eq!(mask.select(MaskSelection::OpenBoundary), vec![2]);
        assert_eq!(mask.select(MaskSelection::OutflowBoundary), vec![3]);
        assert!(mask.has_open_boundaries());
        assert!(!CellMask::inactive(3).has_open_boundaries());
        assert_eq!(mask.count(MaskValue::Active), 2);
    }
}
