// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Removing cells that no mask needs.

use quadmesh_grid::QuadtreeMesh;
use tracing::info;

use crate::error::MaskError;
use crate::mask::CellMask;

/// A mesh reduced to the cells some mask uses, with the masks filtered to match.
#[derive(Clone, Debug)]
pub struct CutCells {
    /// The reduced mesh; neighbors are recomputed.
    pub mesh: QuadtreeMesh,
    /// Flow mask over the reduced mesh.
    pub flow: CellMask,
    /// Wave mask over the reduced mesh, if one was given.
    pub wave: Option<CellMask>,
}

/// Keep only the cells that are active in `flow` or in `wave`.
#[tracing::instrument(skip_all, name = "quadtree::cut", fields(cells = mesh.len()))]
pub fn cut_inactive_cells(
    mesh: &QuadtreeMesh,
    flow: &CellMask,
    wave: Option<&CellMask>,
) -> Result<CutCells, MaskError> {
    flow.check_len(mesh.len())?;
    if let Some(wave) = wave {
        wave.check_len(mesh.len())?;
    }

    let keep: Vec<bool> = (0..mesh.len())
        .map(|i| {
            let used = |mask: &CellMask| mask.values()[i].is_active();
            used(flow) || wave.is_some_and(used)
        })
        .collect();

    let cut = mesh.retain_cells(&keep)?;
    info!(kept = cut.len(), removed = mesh.len() - cut.len(), "cut inactive cells");
    Ok(CutCells {
        mesh: cut,
        flow: flow.filtered(&keep),
        wave: wave.map(|w| w.filtered(&keep)),
    })
}
