// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The emitted topology and its JSON form.
//!
//! ```json
//! { "type": "Topology",
//!   "bbox": [xmin, ymin, xmax, ymax],
//!   "transform": { "scale": [sx, sy], "translate": [tx, ty] },
//!   "objects": { "<id>": { "type": "Polygon", "arcs": [[0, -2]] } },
//!   "arcs": [[[x, y], [dx, dy]]] }
//! ```
//!
//! Serialization writes this shape directly; deserialization goes through
//! [`crate::decode`] so that malformed input is reported with the path of the
//! offending field.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::decode;
use crate::error::Result;
use crate::geojson::Properties;
use crate::geometry::{Bbox, Point};
use crate::keys::ArcIndex;
use crate::transform::Transform;

/// A topology: shared arcs plus objects that reference them by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    pub bbox: Option<Bbox>,
    pub transform: Option<Transform>,
    /// Top-level geometries keyed by feature id.
    pub objects: BTreeMap<String, Geometry>,
    /// Unique arcs. Delta-encoded when `transform` is set.
    pub arcs: Vec<Vec<Point>>,
}

/// An output geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub id: Option<String>,
    pub properties: Option<Properties>,
    pub bbox: Option<Bbox>,
    pub kind: GeometryKind,
}

/// The typed payload of a [`Geometry`].
///
/// Linear kinds hold signed arc indices nested like GeoJSON coordinates;
/// point kinds keep their coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryKind {
    Point { coordinates: Point },
    MultiPoint { coordinates: Vec<Point> },
    LineString { arcs: Vec<ArcIndex> },
    MultiLineString { arcs: Vec<Vec<ArcIndex>> },
    Polygon { arcs: Vec<Vec<ArcIndex>> },
    MultiPolygon { arcs: Vec<Vec<Vec<ArcIndex>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

impl GeometryKind {
    /// Returns the type tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            GeometryKind::Point { .. } => "Point",
            GeometryKind::MultiPoint { .. } => "MultiPoint",
            GeometryKind::LineString { .. } => "LineString",
            GeometryKind::MultiLineString { .. } => "MultiLineString",
            GeometryKind::Polygon { .. } => "Polygon",
            GeometryKind::MultiPolygon { .. } => "MultiPolygon",
            GeometryKind::GeometryCollection { .. } => "GeometryCollection",
        }
    }

    /// Visits every signed arc index, depth first.
    pub fn for_each_arc(&self, f: &mut impl FnMut(ArcIndex)) {
        match self {
            GeometryKind::Point { .. } | GeometryKind::MultiPoint { .. } => {}
            GeometryKind::LineString { arcs } => arcs.iter().copied().for_each(f),
            GeometryKind::MultiLineString { arcs } | GeometryKind::Polygon { arcs } => {
                arcs.iter().flatten().copied().for_each(f)
            }
            GeometryKind::MultiPolygon { arcs } => {
                arcs.iter().flatten().flatten().copied().for_each(f)
            }
            GeometryKind::GeometryCollection { geometries } => {
                for geometry in geometries {
                    geometry.kind.for_each_arc(f);
                }
            }
        }
    }
}

impl Geometry {
    /// A geometry without id, properties or bound.
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            id: None,
            properties: None,
            bbox: None,
            kind,
        }
    }

    /// Collects every signed arc index the geometry references.
    pub fn arc_indices(&self) -> Vec<ArcIndex> {
        let mut indices = Vec::new();
        self.kind.for_each_arc(&mut |index| indices.push(index));
        indices
    }
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind.type_name())?;
        match &self.kind {
            GeometryKind::Point { coordinates } => map.serialize_entry("coordinates", coordinates)?,
            GeometryKind::MultiPoint { coordinates } => {
                map.serialize_entry("coordinates", coordinates)?
            }
            GeometryKind::LineString { arcs } => map.serialize_entry("arcs", arcs)?,
            GeometryKind::MultiLineString { arcs } | GeometryKind::Polygon { arcs } => {
                map.serialize_entry("arcs", arcs)?
            }
            GeometryKind::MultiPolygon { arcs } => map.serialize_entry("arcs", arcs)?,
            GeometryKind::GeometryCollection { geometries } => {
                map.serialize_entry("geometries", geometries)?
            }
        }
        if let Some(id) = &self.id {
            map.serialize_entry("id", id)?;
        }
        if let Some(properties) = &self.properties {
            map.serialize_entry("properties", properties)?;
        }
        if let Some(bbox) = &self.bbox {
            map.serialize_entry("bbox", bbox)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode::geometry(&value, "geometry").map_err(D::Error::custom)
    }
}

impl Serialize for Topology {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", "Topology")?;
        if let Some(bbox) = &self.bbox {
            map.serialize_entry("bbox", bbox)?;
        }
        if let Some(transform) = &self.transform {
            map.serialize_entry("transform", transform)?;
        }
        map.serialize_entry("objects", &self.objects)?;
        map.serialize_entry("arcs", &self.arcs)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Topology {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode::topology(&value).map_err(D::Error::custom)
    }
}

impl Topology {
    /// Serializes to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a topology, reporting malformed fields as [`Error::Decode`].
    ///
    /// [`Error::Decode`]: crate::Error::Decode
    pub fn from_json(json: &str) -> Result<Topology> {
        let value: Value = serde_json::from_str(json)?;
        decode::topology(&value)
    }

    /// Decodes a topology from an already parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Topology> {
        decode::topology(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Topology {
        let mut objects = BTreeMap::new();
        objects.insert(
            "a".to_string(),
            Geometry {
                id: Some("a".into()),
                properties: json!({ "name": "A" }).as_object().cloned(),
                bbox: None,
                kind: GeometryKind::Polygon {
                    arcs: vec![vec![0, -2]],
                },
            },
        );
        objects.insert(
            "p".to_string(),
            Geometry {
                id: Some("p".into()),
                properties: None,
                bbox: None,
                kind: GeometryKind::Point {
                    coordinates: Point::new(0.5, 2.0),
                },
            },
        );
        Topology {
            bbox: Some(Bbox::new(0.0, 0.0, 2.0, 2.0)),
            transform: None,
            objects,
            arcs: vec![
                vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
                vec![Point::new(1.0, 0.0), Point::new(0.0, 0.0)],
            ],
        }
    }

    #[test]
    fn serializes_canonical_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "Topology",
                "bbox": [0.0, 0.0, 2.0, 2.0],
                "objects": {
                    "a": { "type": "Polygon", "arcs": [[0, -2]], "id": "a", "properties": { "name": "A" } },
                    "p": { "type": "Point", "coordinates": [0.5, 2], "id": "p" }
                },
                "arcs": [[[0, 0], [1, 0]], [[1, 0], [0, 0]]]
            })
        );
    }

    #[test]
    fn empty_topology_emits_empty_containers() {
        let json = Topology::default().to_json().unwrap();
        assert_eq!(json, r#"{"type":"Topology","objects":{},"arcs":[]}"#);
    }

    #[test]
    fn json_round_trip() {
        let topology = sample();
        let decoded = Topology::from_json(&topology.to_json_pretty().unwrap()).unwrap();
        assert_eq!(decoded, topology);
    }

    #[test]
    fn serde_deserialize_uses_the_decoder() {
        let topology: Topology = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(topology, sample());

        let err = serde_json::from_str::<Geometry>(r#"{"arcs": [0]}"#).unwrap_err();
        assert!(err.to_string().contains("geometry.type"));
    }

    #[test]
    fn arc_indices_walk_collections() {
        let geometry = Geometry::new(GeometryKind::GeometryCollection {
            geometries: vec![
                Geometry::new(GeometryKind::LineString { arcs: vec![0, -3] }),
                Geometry::new(GeometryKind::MultiPolygon {
                    arcs: vec![vec![vec![1]], vec![vec![2, -1]]],
                }),
                Geometry::new(GeometryKind::Point {
                    coordinates: Point::new(1.0, 1.0),
                }),
            ],
        });
        assert_eq!(geometry.arc_indices(), vec![0, -3, 1, 2, -1]);
    }
}
