// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadmesh IO: persistence for [`QuadtreeMesh`](quadmesh_grid::QuadtreeMesh).
//!
//! - [`codec`]: the fixed little-endian binary mesh file, read whole and validated before any
//!   mesh is constructed.
//! - [`config`]: a JSON description of the base grid and refinement polygons.
//!
//! ```rust
//! use quadmesh_io::{MeshConfig, codec};
//!
//! let config = MeshConfig::from_json(r#"{
//!     "x0": 0.0, "y0": 0.0, "dx": 50.0, "dy": 50.0, "nmax": 2, "mmax": 3
//! }"#).unwrap();
//! let mesh = config.build().unwrap();
//!
//! let bytes = codec::to_bytes(&mesh).unwrap();
//! assert_eq!(bytes.len(), codec::encoded_len(6));
//! let back = codec::decode(&bytes).unwrap();
//! assert_eq!(back.cells(), mesh.cells());
//! ```

pub mod codec;
pub mod config;
pub mod error;

pub use codec::{FORMAT_VERSION, decode, encode, load, read_from, save};
pub use config::{MeshConfig, RefinementConfig};
pub use error::{CodecError, ConfigError};
