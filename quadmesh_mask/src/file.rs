// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mask file: one signed byte per cell, no header.

use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::MaskError;
use crate::mask::{CellMask, MaskValue};

/// Write one byte per cell.
pub fn write_mask<W: Write>(mask: &CellMask, mut w: W) -> Result<(), MaskError> {
    let bytes: Vec<u8> = mask
        .values()
        .iter()
        .flat_map(|v| v.to_raw().to_le_bytes())
        .collect();
    w.write_all(&bytes)?;
    Ok(())
}

/// Parse a mask for a mesh of `nr_cells` cells.
pub fn decode_mask(bytes: &[u8], nr_cells: usize) -> Result<CellMask, MaskError> {
    if bytes.len() != nr_cells {
        return Err(MaskError::Length {
            expected: nr_cells,
            actual: bytes.len(),
        });
    }
    bytes
        .iter()
        .enumerate()
        .map(|(index, &b)| {
            let value = i8::from_le_bytes([b]);
            MaskValue::from_raw(value).ok_or(MaskError::Value { index, value })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(CellMask::from_values)
}

/// Read a whole mask from `reader` for a mesh of `nr_cells` cells.
pub fn read_mask<R: Read>(mut reader: R, nr_cells: usize) -> Result<CellMask, MaskError> {
    let mut bytes = Vec::with_capacity(nr_cells);
    reader.read_to_end(&mut bytes)?;
    decode_mask(&bytes, nr_cells)
}

/// Write `mask` to the file at `path`, replacing it.
pub fn save_mask(mask: &CellMask, path: impl AsRef<Path>) -> Result<(), MaskError> {
    let mut w = BufWriter::new(fs::File::create(path.as_ref())?);
    write_mask(mask, &mut w)?;
    w.flush()?;
    debug!(path = %path.as_ref().display(), cells = mask.len(), "saved mask");
    Ok(())
}

/// Read the mask file at `path` for a mesh of `nr_cells` cells.
pub fn load_mask(path: impl AsRef<Path>, nr_cells: usize) -> Result<CellMask, MaskError> {
    decode_mask(&fs::read(path)?, nr_cells)
}
