// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Quantization transforms.
//!
//! A [`Quantizer`] maps floating-point coordinates onto an integer grid
//! derived from the overall bounds; the matching [`Transform`] is recorded on
//! the emitted topology so readers can map stored integers back with
//! `real = stored * scale + translate`.

use serde::{Deserialize, Serialize};

use crate::geojson::GeoJsonGeometry;
use crate::geometry::{Bbox, Point};

/// Affine mapping from stored (quantized) coordinates back to real ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    /// Maps an absolute stored position to real coordinates.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale[0] + self.translate[0],
            p.y * self.scale[1] + self.translate[1],
        )
    }
}

/// Rounds half away from zero, so `-0.5` becomes `-1` and `0.5` becomes `1`.
pub(crate) fn round_half_away(v: f64) -> f64 {
    if v >= 0.0 {
        (v + 0.5).floor()
    } else {
        (v - 0.5).ceil()
    }
}

/// Projects points onto an integer grid: `round((p + d) * k)` per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Quantizer {
    dx: f64,
    dy: f64,
    kx: f64,
    ky: f64,
}

impl Quantizer {
    /// Derives a grid from the bounds.
    ///
    /// Each axis of extent `Δ` gets the factor `(post - 1) / Δ * pre / post`,
    /// or `1` for a zero extent. With `pre == post` this is a plain
    /// `post`-step grid over the bounds.
    pub fn from_bounds(bbox: &Bbox, pre: f64, post: f64) -> Self {
        let factor = |extent: f64| {
            if extent == 0.0 {
                1.0
            } else {
                (post - 1.0) / extent * pre / post
            }
        };
        Self {
            dx: -bbox.min_x,
            dy: -bbox.min_y,
            kx: factor(bbox.width()),
            ky: factor(bbox.height()),
        }
    }

    /// A uniform rescale of already-quantized coordinates.
    pub fn scaled(k: f64) -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            kx: k,
            ky: k,
        }
    }

    /// The transform that undoes this projection.
    pub fn inverse(&self) -> Transform {
        Transform {
            scale: [1.0 / self.kx, 1.0 / self.ky],
            translate: [-self.dx, -self.dy],
        }
    }

    pub fn quantize_point(&self, p: Point) -> Point {
        Point::new(
            round_half_away((p.x + self.dx) * self.kx),
            round_half_away((p.y + self.dy) * self.ky),
        )
    }

    /// Quantizes every point, keeping duplicates.
    pub fn quantize_points(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.quantize_point(p)).collect()
    }

    /// Quantizes linework, collapsing consecutive duplicates.
    ///
    /// A non-empty result keeps at least two points; a line that collapses
    /// to a single position is padded with a copy of it.
    pub fn quantize_line(&self, points: &[Point]) -> Vec<Point> {
        let mut out: Vec<Point> = Vec::with_capacity(points.len());
        for &p in points {
            let q = self.quantize_point(p);
            if out.last() != Some(&q) {
                out.push(q);
            }
        }
        if out.len() == 1 {
            out.push(out[0]);
        }
        out
    }

    /// Quantizes a GeoJSON geometry in place.
    pub fn quantize_geometry(&self, geometry: &mut GeoJsonGeometry) {
        match geometry {
            GeoJsonGeometry::Point { coordinates } => {
                *coordinates = self.quantize_point(*coordinates);
            }
            GeoJsonGeometry::MultiPoint { coordinates } => {
                *coordinates = self.quantize_points(coordinates);
            }
            GeoJsonGeometry::LineString { coordinates } => {
                *coordinates = self.quantize_line(coordinates);
            }
            GeoJsonGeometry::MultiLineString { coordinates }
            | GeoJsonGeometry::Polygon { coordinates } => {
                for line in coordinates.iter_mut() {
                    *line = self.quantize_line(line);
                }
            }
            GeoJsonGeometry::MultiPolygon { coordinates } => {
                for ring in coordinates.iter_mut().flatten() {
                    *ring = self.quantize_line(ring);
                }
            }
            GeoJsonGeometry::GeometryCollection { geometries } => {
                for child in geometries.iter_mut() {
                    self.quantize_geometry(child);
                }
            }
        }
    }
}
