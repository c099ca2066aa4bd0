// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extraction: flattening features into the shared coordinate buffer.
//!
//! Every line and ring is appended to the buffer in feature order and gets a
//! single descriptor covering its range. The feature itself is reduced to a
//! [`Shape`] tree that references those descriptors; points keep their
//! coordinates inline.

use serde_json::Value;

use crate::builder::TopologyBuilder;
use crate::geojson::{Feature, GeoJsonGeometry, Properties};
use crate::geometry::{Bbox, Point};
use crate::keys::ArcKey;

/// Head of a descriptor chain. `None` marks linework that had no points.
pub(crate) type ChainHead = Option<ArcKey>;

/// A feature geometry whose linework lives in the arc arena.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shape {
    Point(Point),
    MultiPoint(Vec<Point>),
    LineString(ChainHead),
    MultiLineString(Vec<ChainHead>),
    Polygon(Vec<ChainHead>),
    MultiPolygon(Vec<Vec<ChainHead>>),
    GeometryCollection(Vec<Shape>),
}

/// A top-level feature after extraction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtractedObject {
    pub id: String,
    pub properties: Option<Properties>,
    pub bbox: Option<Bbox>,
    pub shape: Shape,
}

impl TopologyBuilder {
    /// Stage 3: move every input feature into the arena.
    ///
    /// Features without a geometry are skipped. The input list is released.
    pub(crate) fn extract(&mut self) {
        let input = std::mem::take(&mut self.input);
        self.objects.reserve(input.len());

        for (position, feature) in input.into_iter().enumerate() {
            let id = feature_id(&feature, &self.options.id_property)
                .unwrap_or_else(|| format!("feature_{position}"));
            let Some(geometry) = feature.geometry else {
                tracing::debug!(id = %id, "Skipping feature without geometry");
                continue;
            };
            let shape = self.extract_geometry(&geometry);
            self.objects.push(ExtractedObject {
                id,
                properties: feature.properties,
                bbox: feature.bbox,
                shape,
            });
        }

        tracing::debug!(
            objects = self.objects.len(),
            coordinates = self.arena.coordinate_count(),
            lines = self.arena.line_count(),
            rings = self.arena.ring_count(),
            "Extracted linework"
        );
    }

    fn extract_geometry(&mut self, geometry: &GeoJsonGeometry) -> Shape {
        let arena = &mut self.arena;
        match geometry {
            GeoJsonGeometry::Point { coordinates } => Shape::Point(*coordinates),
            GeoJsonGeometry::MultiPoint { coordinates } => Shape::MultiPoint(coordinates.clone()),
            GeoJsonGeometry::LineString { coordinates } => {
                Shape::LineString(arena.push_line(coordinates))
            }
            GeoJsonGeometry::MultiLineString { coordinates } => Shape::MultiLineString(
                coordinates.iter().map(|line| arena.push_line(line)).collect(),
            ),
            GeoJsonGeometry::Polygon { coordinates } => Shape::Polygon(
                coordinates.iter().map(|ring| arena.push_ring(ring)).collect(),
            ),
            GeoJsonGeometry::MultiPolygon { coordinates } => Shape::MultiPolygon(
                coordinates
                    .iter()
                    .map(|polygon| polygon.iter().map(|ring| arena.push_ring(ring)).collect())
                    .collect(),
            ),
            GeoJsonGeometry::GeometryCollection { geometries } => Shape::GeometryCollection(
                geometries
                    .iter()
                    .map(|child| self.extract_geometry(child))
                    .collect(),
            ),
        }
    }
}

/// The id of a feature: its own id, else the configured id property.
fn feature_id(feature: &Feature, id_property: &str) -> Option<String> {
    feature
        .id
        .as_ref()
        .and_then(id_string)
        .or_else(|| feature.properties.as_ref()?.get(id_property).and_then(id_string))
}

/// Coerces a JSON id to a string. `null` counts as no id.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
