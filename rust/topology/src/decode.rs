// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding topologies from parsed JSON.
//!
//! Every error names the path of the offending field, e.g.
//! `objects.roads.arcs[2]`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::extract::id_string;
use crate::geojson::Properties;
use crate::geometry::{Bbox, Point};
use crate::keys::ArcIndex;
use crate::topology::{Geometry, GeometryKind, Topology};
use crate::transform::Transform;

/// Decodes a `{"type": "Topology", ...}` value.
pub(crate) fn topology(value: &Value) -> Result<Topology> {
    let object = as_object(value, "topology")?;
    match object.get("type") {
        None | Some(Value::Null) => return Err(Error::decode("type", "missing topology type")),
        Some(Value::String(tag)) if tag == "Topology" => {}
        Some(Value::String(tag)) => {
            return Err(Error::decode(
                "type",
                format!("expected \"Topology\", found \"{tag}\""),
            ))
        }
        Some(_) => return Err(Error::decode("type", "expected a string")),
    }

    let bbox = optional(object, "bbox")
        .map(|v| bbox(v, "bbox"))
        .transpose()?;
    let transform = optional(object, "transform")
        .map(|v| transform(v, "transform"))
        .transpose()?;

    let mut objects = BTreeMap::new();
    if let Some(value) = optional(object, "objects") {
        for (id, geometry_value) in as_object(value, "objects")? {
            let path = format!("objects.{id}");
            objects.insert(id.clone(), geometry(geometry_value, &path)?);
        }
    }

    let arcs = match optional(object, "arcs") {
        Some(value) => nested(value, "arcs", positions)?,
        None => Vec::new(),
    };

    Ok(Topology {
        bbox,
        transform,
        objects,
        arcs,
    })
}

/// Decodes one geometry found at `path`.
pub(crate) fn geometry(value: &Value, path: &str) -> Result<Geometry> {
    let object = as_object(value, path)?;
    let type_path = format!("{path}.type");
    let tag = match object.get("type") {
        None | Some(Value::Null) => return Err(Error::decode(type_path, "missing geometry type")),
        Some(Value::String(tag)) => tag.as_str(),
        Some(_) => return Err(Error::decode(type_path, "expected a string")),
    };

    let member = |key: &str| {
        let member_path = format!("{path}.{key}");
        optional(object, key)
            .ok_or_else(|| Error::decode(member_path.clone(), "missing member"))
            .map(|v| (v, member_path))
    };

    let kind = match tag {
        "Point" => {
            let (v, p) = member("coordinates")?;
            GeometryKind::Point {
                coordinates: position(v, &p)?,
            }
        }
        "MultiPoint" => {
            let (v, p) = member("coordinates")?;
            GeometryKind::MultiPoint {
                coordinates: positions(v, &p)?,
            }
        }
        "LineString" => {
            let (v, p) = member("arcs")?;
            GeometryKind::LineString {
                arcs: arc_list(v, &p)?,
            }
        }
        "MultiLineString" => {
            let (v, p) = member("arcs")?;
            GeometryKind::MultiLineString {
                arcs: nested(v, &p, arc_list)?,
            }
        }
        "Polygon" => {
            let (v, p) = member("arcs")?;
            GeometryKind::Polygon {
                arcs: nested(v, &p, arc_list)?,
            }
        }
        "MultiPolygon" => {
            let (v, p) = member("arcs")?;
            GeometryKind::MultiPolygon {
                arcs: nested(v, &p, |v, p| nested(v, p, arc_list))?,
            }
        }
        "GeometryCollection" => {
            let (v, p) = member("geometries")?;
            GeometryKind::GeometryCollection {
                geometries: nested(v, &p, geometry)?,
            }
        }
        other => return Err(Error::UnsupportedGeometry(other.to_string())),
    };

    let properties = optional(object, "properties")
        .map(|v| properties(v, &format!("{path}.properties")))
        .transpose()?;
    let bbox = optional(object, "bbox")
        .map(|v| bbox(v, &format!("{path}.bbox")))
        .transpose()?;

    Ok(Geometry {
        id: object.get("id").and_then(id_string),
        properties,
        bbox,
        kind,
    })
}

/// A member value, treating an explicit `null` as absent.
fn optional<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::decode(path, "expected an object"))
}

fn as_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::decode(path, "expected an array"))
}

fn number(value: &Value, path: &str) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::decode(path, "expected a number"))
}

/// Decodes an array element-wise, extending the path with `[i]`.
fn nested<T>(
    value: &Value,
    path: &str,
    element: impl Fn(&Value, &str) -> Result<T>,
) -> Result<Vec<T>> {
    as_array(value, path)?
        .iter()
        .enumerate()
        .map(|(i, v)| element(v, &format!("{path}[{i}]")))
        .collect()
}

fn position(value: &Value, path: &str) -> Result<Point> {
    let values = as_array(value, path)?;
    if values.len() < 2 {
        return Err(Error::decode(path, "a position needs at least two numbers"));
    }
    Ok(Point::new(
        number(&values[0], &format!("{path}[0]"))?,
        number(&values[1], &format!("{path}[1]"))?,
    ))
}

fn positions(value: &Value, path: &str) -> Result<Vec<Point>> {
    nested(value, path, position)
}

fn arc_list(value: &Value, path: &str) -> Result<Vec<ArcIndex>> {
    nested(value, path, |v, p| {
        v.as_i64()
            .ok_or_else(|| Error::decode(p, "expected an integer arc index"))
    })
}

fn pair(value: &Value, path: &str) -> Result<[f64; 2]> {
    let values = nested(value, path, number)?;
    match values.as_slice() {
        &[a, b] => Ok([a, b]),
        _ => Err(Error::decode(path, "expected two numbers")),
    }
}

fn bbox(value: &Value, path: &str) -> Result<Bbox> {
    let values = nested(value, path, number)?;
    match values.as_slice() {
        &[min_x, min_y, max_x, max_y] => Ok(Bbox::new(min_x, min_y, max_x, max_y)),
        _ => Err(Error::decode(path, "expected four numbers")),
    }
}

fn transform(value: &Value, path: &str) -> Result<Transform> {
    let object = as_object(value, path)?;
    let member = |key: &str| -> Result<[f64; 2]> {
        let member_path = format!("{path}.{key}");
        let v = optional(object, key)
            .ok_or_else(|| Error::decode(member_path.clone(), "missing member"))?;
        pair(v, &member_path)
    };
    Ok(Transform {
        scale: member("scale")?,
        translate: member("translate")?,
    })
}

fn properties(value: &Value, path: &str) -> Result<Properties> {
    as_object(value, path).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode_error(value: Value) -> (String, String) {
        match topology(&value) {
            Err(Error::Decode { field, message }) => (field, message),
            other => panic!("expected a decode error, got {other:?}"),
        }
    }

    #[test]
    fn decodes_every_geometry_kind() {
        let value = json!({
            "type": "Topology",
            "transform": { "scale": [0.5, 0.25], "translate": [10, 20] },
            "objects": {
                "p": { "type": "Point", "coordinates": [1, 2] },
                "mp": { "type": "MultiPoint", "coordinates": [[1, 2], [3, 4.5]] },
                "l": { "type": "LineString", "arcs": [0, -1] },
                "ml": { "type": "MultiLineString", "arcs": [[0], [1]] },
                "pg": { "type": "Polygon", "arcs": [[0, 1]], "id": 7 },
                "mpg": { "type": "MultiPolygon", "arcs": [[[0]], [[1], [-2]]] },
                "gc": { "type": "GeometryCollection", "geometries": [
                    { "type": "LineString", "arcs": [1] }
                ]}
            },
            "arcs": [[[0, 0], [1, 1]], [[1, 1], [-1, 0]]]
        });
        let topology = topology(&value).unwrap();
        assert_eq!(topology.objects.len(), 7);
        assert_eq!(
            topology.transform,
            Some(Transform {
                scale: [0.5, 0.25],
                translate: [10.0, 20.0]
            })
        );
        assert_eq!(
            topology.objects["mpg"].kind,
            GeometryKind::MultiPolygon {
                arcs: vec![vec![vec![0]], vec![vec![1], vec![-2]]]
            }
        );
        assert_eq!(topology.objects["pg"].id.as_deref(), Some("7"));
        assert_eq!(
            topology.objects["mp"].kind,
            GeometryKind::MultiPoint {
                coordinates: vec![Point::new(1.0, 2.0), Point::new(3.0, 4.5)]
            }
        );
        assert_eq!(topology.arcs[1][1], Point::new(-1.0, 0.0));
    }

    #[test]
    fn missing_members_default_to_empty() {
        let topology = topology(&json!({ "type": "Topology" })).unwrap();
        assert!(topology.objects.is_empty());
        assert!(topology.arcs.is_empty());
        assert!(topology.bbox.is_none());
    }

    #[test]
    fn missing_type_is_reported() {
        let (field, _) = decode_error(json!({ "objects": {} }));
        assert_eq!(field, "type");

        let (field, message) = decode_error(json!({
            "type": "Topology",
            "objects": { "a": { "arcs": [0] } }
        }));
        assert_eq!(field, "objects.a.type");
        assert_eq!(message, "missing geometry type");
    }

    #[test]
    fn non_string_type_is_reported() {
        let (field, message) = decode_error(json!({
            "type": "Topology",
            "objects": { "a": { "type": 3, "arcs": [0] } }
        }));
        assert_eq!(field, "objects.a.type");
        assert_eq!(message, "expected a string");
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let err = topology(&json!({
            "type": "Topology",
            "objects": { "a": { "type": "Circle", "arcs": [0] } }
        }))
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedGeometry(ref t) if t == "Circle"));
    }

    #[test]
    fn non_integer_arc_index_names_its_position() {
        let (field, message) = decode_error(json!({
            "type": "Topology",
            "objects": { "a": { "type": "LineString", "arcs": [0, 1.5] } }
        }));
        assert_eq!(field, "objects.a.arcs[1]");
        assert_eq!(message, "expected an integer arc index");
    }

    #[test]
    fn malformed_nesting_is_reported() {
        let (field, message) = decode_error(json!({
            "type": "Topology",
            "objects": { "a": { "type": "Polygon", "arcs": [0, 1] } }
        }));
        assert_eq!(field, "objects.a.arcs[0]");
        assert_eq!(message, "expected an array");

        let (field, _) = decode_error(json!({
            "type": "Topology",
            "objects": { "c": { "type": "GeometryCollection", "geometries": [{ "type": "Point" }] } }
        }));
        assert_eq!(field, "objects.c.geometries[0].coordinates");
    }

    #[test]
    fn non_numeric_coordinate_is_reported() {
        let (field, message) = decode_error(json!({
            "type": "Topology",
            "arcs": [[[0, 0], [1, "x"]]]
        }));
        assert_eq!(field, "arcs[0][1][1]");
        assert_eq!(message, "expected a number");
    }

    #[test]
    fn wrong_topology_tag_is_reported() {
        let (field, message) = decode_error(json!({ "type": "FeatureCollection" }));
        assert_eq!(field, "type");
        assert!(message.contains("FeatureCollection"));
    }
}
