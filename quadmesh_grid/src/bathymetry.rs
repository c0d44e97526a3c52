// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Elevation sampling collaborator.

use kurbo::Point;

/// Source of bed elevations for cell centres.
///
/// Implementations may interpolate a raster, merge several datasets, or call out to a service.
/// `resolution` is the cell size of the points being sampled, for sources that average or pick
/// a dataset by scale.
pub trait BathymetrySource {
    /// Error produced by the source.
    type Error: core::error::Error + Send + Sync + 'static;

    /// One elevation per point, in order. Unknown elevations are `NaN`.
    fn elevations(&self, points: &[Point], resolution: f64) -> Result<Vec<f64>, Self::Error>;
}

/// A source that returns the same elevation everywhere.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlatBathymetry(pub f64);

impl BathymetrySource for FlatBathymetry {
    type Error = core::convert::Infallible;

    fn elevations(&self, points: &[Point], _resolution: f64) -> Result<Vec<f64>, Self::Error> {
        Ok(vec![self.0; points.len()])
    }
}

impl<F> BathymetrySource for F
where
    F: Fn(Point) -> f64,
{
    type Error = core::convert::Infallible;

    fn elevations(&self, points: &[Point], _resolution: f64) -> Result<Vec<f64>, Self::Error> {
        Ok(points.iter().map(|&p| self(p)).collect())
    }
}
