// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GeoJSON input model.
//!
//! Features consumed by the builder and produced by
//! [`Topology::to_geojson`](crate::Topology::to_geojson). The types derive
//! serde so a feature collection can be read straight from GeoJSON text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geometry::{Bbox, Point};

/// Free-form feature properties.
pub type Properties = serde_json::Map<String, Value>;

/// A GeoJSON geometry with planar coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point { coordinates: Point },
    MultiPoint { coordinates: Vec<Point> },
    LineString { coordinates: Vec<Point> },
    MultiLineString { coordinates: Vec<Vec<Point>> },
    Polygon { coordinates: Vec<Vec<Point>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Point>>> },
    GeometryCollection { geometries: Vec<GeoJsonGeometry> },
}

impl GeoJsonGeometry {
    /// Builds a `LineString` from coordinate pairs.
    pub fn line_string<P: Into<Point> + Copy>(coordinates: &[P]) -> Self {
        GeoJsonGeometry::LineString {
            coordinates: coordinates.iter().map(|&p| p.into()).collect(),
        }
    }

    /// Builds a `Polygon` from rings of coordinate pairs (outer ring first).
    pub fn polygon<P: Into<Point> + Copy>(rings: &[Vec<P>]) -> Self {
        GeoJsonGeometry::Polygon {
            coordinates: rings
                .iter()
                .map(|ring| ring.iter().map(|&p| p.into()).collect())
                .collect(),
        }
    }

    /// Computes the bound of every coordinate in the geometry.
    ///
    /// A collection reports the aggregate bound of its members.
    pub fn bound(&self) -> Option<Bbox> {
        match self {
            GeoJsonGeometry::Point { coordinates } => Some(Bbox::from_point(*coordinates)),
            GeoJsonGeometry::MultiPoint { coordinates }
            | GeoJsonGeometry::LineString { coordinates } => Bbox::from_points(coordinates),
            GeoJsonGeometry::MultiLineString { coordinates }
            | GeoJsonGeometry::Polygon { coordinates } => coordinates
                .iter()
                .map(|line| Bbox::from_points(line))
                .fold(None, Bbox::merge),
            GeoJsonGeometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .flatten()
                .map(|ring| Bbox::from_points(ring))
                .fold(None, Bbox::merge),
            GeoJsonGeometry::GeometryCollection { geometries } => geometries
                .iter()
                .map(GeoJsonGeometry::bound)
                .fold(None, Bbox::merge),
        }
    }
}

/// A GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Bbox>,
    #[serde(default)]
    pub properties: Option<Properties>,
    pub geometry: Option<GeoJsonGeometry>,
}

impl Feature {
    /// Creates a feature without id or properties.
    pub fn new(geometry: GeoJsonGeometry) -> Self {
        Self {
            id: None,
            bbox: None,
            properties: None,
            geometry: Some(geometry),
        }
    }

    /// Sets the feature id.
    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the feature properties.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// A GeoJSON feature collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Bbox>,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            bbox: None,
            features,
        }
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
