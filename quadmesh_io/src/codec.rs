// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed little-endian binary layout of a quadtree mesh.
//!
//! Header (30 bytes):
//!
//! | field       | type  |
//! |-------------|-------|
//! | version     | `i8`  |
//! | EPSG code   | `i32` (0 = unknown) |
//! | cell count  | `i32` |
//! | level count | `i8`  |
//! | x0, y0, dx, dy, rotation | `f32` each |
//!
//! followed by whole columns of `cell count` entries: levels (`i8`), `n` and `m` (`i32`), then for
//! each side in up, right, down, left order a level difference (`i8`) and two neighbor indices
//! (`i32`), and finally elevations (`f32`). Levels, `n`, `m` and neighbor indices are stored one
//! based; a stored neighbor index of 0 means no neighbor.

use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use quadmesh_grid::{
    CellKey, CellNeighbors, CellTable, Direction, GridGeometry, Neighbor, QuadtreeMesh,
};
use tracing::debug;

use crate::error::CodecError;

/// Newest format version this crate reads, and the version it writes.
pub const FORMAT_VERSION: i8 = 0;

const HEADER_LEN: usize = 30;
const BYTES_PER_CELL: usize = 49;

/// Total file size for `nr_cells` cells.
pub fn encoded_len(nr_cells: usize) -> usize {
    HEADER_LEN + BYTES_PER_CELL * nr_cells
}

fn to_i32(what: &'static str, value: usize) -> Result<i32, CodecError> {
    i32::try_from(value).map_err(|_| CodecError::TooLarge { what, value })
}

fn stored_neighbor(index: Option<usize>) -> Result<i32, CodecError> {
    index.map_or(Ok(0), |i| to_i32("neighbor index", i + 1))
}

/// Write `mesh` in the binary layout.
#[allow(
    clippy::cast_possible_truncation,
    reason = "The file format stores single precision coordinates and elevations."
)]
pub fn encode<W: Write>(mesh: &QuadtreeMesh, mut w: W) -> Result<(), CodecError> {
    let cells = mesh.cells();
    let geometry = mesh.geometry();
    let nr_levels = i8::try_from(mesh.nr_levels()).map_err(|_| CodecError::TooLarge {
        what: "level count",
        value: usize::from(mesh.nr_levels()),
    })?;

    w.write_all(&FORMAT_VERSION.to_le_bytes())?;
    w.write_all(&mesh.epsg().unwrap_or(0).to_le_bytes())?;
    w.write_all(&to_i32("cell count", cells.len())?.to_le_bytes())?;
    w.write_all(&nr_levels.to_le_bytes())?;
    for v in [
        geometry.x0,
        geometry.y0,
        geometry.dx,
        geometry.dy,
        geometry.rotation,
    ] {
        w.write_all(&(v as f32).to_le_bytes())?;
    }

    for &level in cells.levels() {
        // Level count fits an i8, so level + 1 does too.
        w.write_all(&[level + 1])?;
    }
    for column in [cells.rows(), cells.columns()] {
        for &v in column {
            let stored = i64::from(v) + 1;
            let stored = i32::try_from(stored).map_err(|_| CodecError::TooLarge {
                what: "cell index",
                value: v as usize,
            })?;
            w.write_all(&stored.to_le_bytes())?;
        }
    }

    let neighbors = mesh.neighbors();
    for direction in Direction::ALL {
        for nbrs in neighbors {
            w.write_all(&nbrs.get(direction).delta().to_le_bytes())?;
        }
        for nbrs in neighbors {
            w.write_all(&stored_neighbor(nbrs.get(direction).first())?.to_le_bytes())?;
        }
        for nbrs in neighbors {
            w.write_all(&stored_neighbor(nbrs.get(direction).second())?.to_le_bytes())?;
        }
    }

    for &z in mesh.z() {
        w.write_all(&(z as f32).to_le_bytes())?;
    }
    Ok(())
}

/// Encode `mesh` into a new byte vector.
pub fn to_bytes(mesh: &QuadtreeMesh) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(encoded_len(mesh.len()));
    encode(mesh, &mut out)?;
    Ok(out)
}

/// Sequential little-endian reader over a length-checked buffer.
struct Columns<'a> {
    bytes: &'a [u8],
}

impl Columns<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let total = self.bytes.len();
        let (head, rest) = self
            .bytes
            .split_first_chunk::<N>()
            .ok_or(CodecError::Length {
                expected: N,
                actual: total,
            })?;
        self.bytes = rest;
        Ok(*head)
    }

    fn i8(&mut self) -> Result<i8, CodecError> {
        Ok(i8::from_le_bytes(self.take()?))
    }

    fn i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    fn f32(&mut self) -> Result<f32, CodecError> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    fn column<T>(
        &mut self,
        len: usize,
        mut read: impl FnMut(&mut Self) -> Result<T, CodecError>,
    ) -> Result<Vec<T>, CodecError> {
        (0..len).map(|_| read(self)).collect()
    }
}

/// Decode a mesh from the complete contents of a mesh file.
#[tracing::instrument(skip_all, name = "quadtree::decode", fields(bytes = bytes.len()))]
pub fn decode(bytes: &[u8]) -> Result<QuadtreeMesh, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::Length {
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }
    let mut r = Columns { bytes };

    let version = r.i8()?;
    if !(0..=FORMAT_VERSION).contains(&version) {
        return Err(CodecError::UnsupportedVersion(version));
    }
    let epsg = r.i32()?;
    let stored_cells = r.i32()?;
    let nr_cells = usize::try_from(stored_cells).map_err(|_| CodecError::Header {
        field: "cell count",
        value: i64::from(stored_cells),
    })?;
    let stored_levels = r.i8()?;
    let nr_levels = u8::try_from(stored_levels)
        .ok()
        .filter(|&l| l >= 1)
        .ok_or(CodecError::Header {
            field: "level count",
            value: i64::from(stored_levels),
        })?;

    let expected = nr_cells
        .checked_mul(BYTES_PER_CELL)
        .and_then(|b| b.checked_add(HEADER_LEN))
        .ok_or(CodecError::Header {
            field: "cell count",
            value: i64::from(stored_cells),
        })?;
    if bytes.len() != expected {
        return Err(CodecError::Length {
            expected,
            actual: bytes.len(),
        });
    }

    let mut header = [0.0_f64; 5];
    for v in &mut header {
        *v = f64::from(r.f32()?);
    }
    let [x0, y0, dx, dy, rotation] = header;
    let geometry = GridGeometry::new(x0, y0, dx, dy, rotation);

    let levels = r.column(nr_cells, Columns::i8)?;
    let rows = r.column(nr_cells, Columns::i32)?;
    let cols = r.column(nr_cells, Columns::i32)?;

    let mut keys = Vec::with_capacity(nr_cells);
    for index in 0..nr_cells {
        let level = u8::try_from(levels[index])
            .ok()
            .filter(|l| (1..=nr_levels).contains(l))
            .ok_or(CodecError::Level {
                index,
                value: levels[index],
            })?;
        let unbias = |what: &'static str, value: i32| {
            u32::try_from(value)
                .ok()
                .and_then(|v| v.checked_sub(1))
                .ok_or(CodecError::CellIndex { index, what, value })
        };
        keys.push(CellKey::new(
            level - 1,
            unbias("n", rows[index])?,
            unbias("m", cols[index])?,
        ));
    }
    let cells = CellTable::from_cells(nr_levels, keys)?;

    let mut neighbors = vec![CellNeighbors::default(); nr_cells];
    for direction in Direction::ALL {
        let deltas = r.column(nr_cells, Columns::i8)?;
        let firsts = r.column(nr_cells, Columns::i32)?;
        let seconds = r.column(nr_cells, Columns::i32)?;
        for index in 0..nr_cells {
            let slot = |value: i32| match value {
                0 => Ok(None),
                v if v > 0 && v as usize <= nr_cells => Ok(Some(v as usize - 1)),
                _ => Err(CodecError::NeighborIndex {
                    index,
                    direction,
                    value,
                }),
            };
            let neighbor = Neighbor::from_raw(
                deltas[index],
                slot(firsts[index])?,
                slot(seconds[index])?,
            )
            .ok_or(CodecError::Delta {
                index,
                direction,
                value: deltas[index],
            })?;
            neighbors[index].set(direction, neighbor);
        }
    }

    let z = r.column(nr_cells, |r| r.f32().map(f64::from))?;

    let epsg = if epsg == 0 {
        debug!("mesh file has no EPSG code");
        None
    } else {
        Some(epsg)
    };
    debug!(cells = nr_cells, levels = nr_levels, version, "decoded mesh");
    Ok(QuadtreeMesh::from_raw_parts(
        geometry, epsg, cells, neighbors, z,
    )?)
}

/// Read a whole mesh file from `reader` and decode it.
pub fn read_from<R: Read>(mut reader: R) -> Result<QuadtreeMesh, CodecError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode(&bytes)
}

/// Write `mesh` to the file at `path`, replacing it.
pub fn save(mesh: &QuadtreeMesh, path: impl AsRef<Path>) -> Result<(), CodecError> {
    let mut w = BufWriter::new(fs::File::create(path.as_ref())?);
    encode(mesh, &mut w)?;
    w.flush()?;
    debug!(path = %path.as_ref().display(), cells = mesh.len(), "saved mesh");
    Ok(())
}

/// Read and decode the mesh file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<QuadtreeMesh, CodecError> {
    decode(&fs::read(path)?)
}
