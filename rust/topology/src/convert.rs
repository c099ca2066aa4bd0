// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Converting a topology back to GeoJSON features.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::geojson::{Feature, FeatureCollection, GeoJsonGeometry};
use crate::geometry::Point;
use crate::keys::{resolve_arc_index, ArcIndex};
use crate::quantize::delta_decode;
use crate::topology::{Geometry, GeometryKind, Topology};
use crate::transform::Transform;

/// Arcs in absolute real coordinates, ready for stitching.
struct DecodedArcs {
    arcs: Vec<Vec<Point>>,
    transform: Option<Transform>,
}

impl DecodedArcs {
    fn new(topology: &Topology) -> Self {
        let arcs = match &topology.transform {
            Some(transform) => topology
                .arcs
                .iter()
                .map(|arc| {
                    let mut arc = arc.clone();
                    delta_decode(&mut arc);
                    arc.into_iter().map(|p| transform.apply(p)).collect()
                })
                .collect(),
            None => topology.arcs.clone(),
        };
        Self {
            arcs,
            transform: topology.transform,
        }
    }

    fn point(&self, p: Point) -> Point {
        match &self.transform {
            Some(transform) => transform.apply(p),
            None => p,
        }
    }

    /// Joins arcs end to end, dropping the point each pair shares.
    fn stitch(&self, indices: &[ArcIndex]) -> Result<Vec<Point>> {
        let mut points: Vec<Point> = Vec::new();
        for &index in indices {
            let (position, reversed) = resolve_arc_index(index);
            let arc = self
                .arcs
                .get(position)
                .ok_or(Error::ArcOutOfRange(index))?;
            points.pop();
            if reversed {
                points.extend(arc.iter().rev());
            } else {
                points.extend(arc.iter());
            }
        }
        Ok(points)
    }

    fn line(&self, indices: &[ArcIndex]) -> Result<Vec<Point>> {
        let mut points = self.stitch(indices)?;
        if points.len() == 1 {
            points.push(points[0]);
        }
        Ok(points)
    }

    fn ring(&self, indices: &[ArcIndex]) -> Result<Vec<Point>> {
        let mut points = self.stitch(indices)?;
        if let Some(&first) = points.first() {
            while points.len() < 4 {
                points.push(first);
            }
        }
        Ok(points)
    }

    fn rings(&self, rings: &[Vec<ArcIndex>]) -> Result<Vec<Vec<Point>>> {
        rings.iter().map(|ring| self.ring(ring)).collect()
    }

    fn geometry(&self, kind: &GeometryKind) -> Result<GeoJsonGeometry> {
        Ok(match kind {
            GeometryKind::Point { coordinates } => GeoJsonGeometry::Point {
                coordinates: self.point(*coordinates),
            },
            GeometryKind::MultiPoint { coordinates } => GeoJsonGeometry::MultiPoint {
                coordinates: coordinates.iter().map(|&p| self.point(p)).collect(),
            },
            GeometryKind::LineString { arcs } => GeoJsonGeometry::LineString {
                coordinates: self.line(arcs)?,
            },
            GeometryKind::MultiLineString { arcs } => GeoJsonGeometry::MultiLineString {
                coordinates: arcs
                    .iter()
                    .map(|line| self.line(line))
                    .collect::<Result<_>>()?,
            },
            GeometryKind::Polygon { arcs } => GeoJsonGeometry::Polygon {
                coordinates: self.rings(arcs)?,
            },
            GeometryKind::MultiPolygon { arcs } => GeoJsonGeometry::MultiPolygon {
                coordinates: arcs
                    .iter()
                    .map(|polygon| self.rings(polygon))
                    .collect::<Result<_>>()?,
            },
            GeometryKind::GeometryCollection { geometries } => {
                GeoJsonGeometry::GeometryCollection {
                    geometries: geometries
                        .iter()
                        .map(|child| self.geometry(&child.kind))
                        .collect::<Result<_>>()?,
                }
            }
        })
    }

    fn feature(&self, geometry: &Geometry) -> Result<Feature> {
        Ok(Feature {
            id: geometry.id.clone().map(Value::String),
            bbox: geometry.bbox,
            properties: geometry.properties.clone(),
            geometry: Some(self.geometry(&geometry.kind)?),
        })
    }
}

impl Topology {
    /// Converts the named objects back to GeoJSON features.
    ///
    /// An empty `ids` selects every object. Features come out in `ids`
    /// order (or object order when selecting everything); unknown ids are
    /// skipped. Delta encoding and the transform are undone, so coordinates
    /// are real again, though quantized output only recovers them to within
    /// one grid step.
    pub fn to_geojson<I, S>(&self, ids: I) -> Result<FeatureCollection>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: Vec<S> = ids.into_iter().collect();
        let selected: Vec<&Geometry> = if ids.is_empty() {
            self.objects.values().collect()
        } else {
            ids.iter()
                .filter_map(|id| self.objects.get(id.as_ref()))
                .collect()
        };

        let decoded = DecodedArcs::new(self);
        let features = selected
            .into_iter()
            .map(|geometry| decoded.feature(geometry))
            .collect::<Result<Vec<_>>>()?;

        Ok(FeatureCollection {
            bbox: self.bbox,
            features,
        })
    }
}
