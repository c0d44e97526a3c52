// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simple polygons with inclusive and strict containment.

use kurbo::{Point, Rect};

/// Relative tolerance for treating a point as lying on a polygon edge.
const EDGE_EPS: f64 = 1e-9;

/// A simple closed ring in world coordinates.
///
/// The ring is implicitly closed; a repeated first vertex at the end is dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Create a polygon from its ring of vertices.
    pub fn new(vertices: impl IntoIterator<Item = Point>) -> Self {
        let mut vertices: Vec<Point> = vertices.into_iter().collect();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        Self { vertices }
    }

    /// Axis-aligned rectangle polygon, counter-clockwise from the lower-left corner.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new([
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ])
    }

    /// The ring vertices, without the closing duplicate.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Bounding box of the ring. `None` when the polygon has no vertices.
    pub fn bounding_box(&self) -> Option<Rect> {
        let (first, rest) = self.vertices.split_first()?;
        Some(
            rest.iter()
                .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)),
        )
    }

    /// Whether `p` lies inside the polygon or on its boundary.
    ///
    /// Uses even-odd ray casting; points within a small relative tolerance of an edge count as inside.
    pub fn contains(&self, p: Point) -> bool {
        self.locate(p) != Location::Outside
    }

    /// Whether `p` lies strictly inside the polygon.
    ///
    /// Points within a small relative tolerance of an edge are outside.
    pub fn contains_interior(&self, p: Point) -> bool {
        self.locate(p) == Location::Inside
    }

    fn locate(&self, p: Point) -> Location {
        let n = self.vertices.len();
        if n < 3 {
            return Location::Outside;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if on_segment(p, a, b) {
                return Location::Boundary;
            }
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
        if inside {
            Location::Inside
        } else {
            Location::Outside
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Location {
    Inside,
    Boundary,
    Outside,
}

fn on_segment(p: Point, a: Point, b: Point) -> bool {
    let ab = b - a;
    let ap = p - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return ap.hypot2() == 0.0;
    }
    if ab.cross(ap).abs() > EDGE_EPS * len2 {
        return false;
    }
    let t = ap.dot(ab) / len2;
    (-EDGE_EPS..=1.0 + EDGE_EPS).contains(&t)
}
