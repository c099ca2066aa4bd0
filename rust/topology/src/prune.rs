// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pruning geometries left without arcs.

use crate::builder::TopologyBuilder;
use crate::keys::ArcIndex;
use crate::topology::{Geometry, GeometryKind};

impl TopologyBuilder {
    /// Stage 10: remove geometries whose arc lists became empty.
    pub(crate) fn remove_empty(&mut self) {
        let before = self.geometries.len();
        let geometries = std::mem::take(&mut self.geometries);
        self.geometries = geometries.into_iter().filter_map(prune_geometry).collect();
        tracing::debug!(
            removed = before - self.geometries.len(),
            remaining = self.geometries.len(),
            "Removed empty geometries"
        );
    }
}

/// Prunes a geometry, returning `None` if nothing of it remains.
pub(crate) fn prune_geometry(geometry: Geometry) -> Option<Geometry> {
    let Geometry {
        id,
        properties,
        bbox,
        kind,
    } = geometry;
    prune_kind(kind).map(|kind| Geometry {
        id,
        properties,
        bbox,
        kind,
    })
}

fn prune_kind(kind: GeometryKind) -> Option<GeometryKind> {
    match kind {
        GeometryKind::Point { .. } | GeometryKind::MultiPoint { .. } => Some(kind),
        GeometryKind::LineString { arcs } => {
            (!arcs.is_empty()).then_some(GeometryKind::LineString { arcs })
        }
        GeometryKind::MultiLineString { arcs } => {
            let mut lines: Vec<Vec<ArcIndex>> =
                arcs.into_iter().filter(|line| !line.is_empty()).collect();
            match lines.len() {
                0 => None,
                1 => lines.pop().map(|arcs| GeometryKind::LineString { arcs }),
                _ => Some(GeometryKind::MultiLineString { arcs: lines }),
            }
        }
        GeometryKind::Polygon { arcs } => prune_rings(arcs).map(|arcs| GeometryKind::Polygon { arcs }),
        GeometryKind::MultiPolygon { arcs } => {
            let mut polygons: Vec<Vec<Vec<ArcIndex>>> =
                arcs.into_iter().filter_map(prune_rings).collect();
            match polygons.len() {
                0 => None,
                1 => polygons.pop().map(|arcs| GeometryKind::Polygon { arcs }),
                _ => Some(GeometryKind::MultiPolygon { arcs: polygons }),
            }
        }
        GeometryKind::GeometryCollection { geometries } => {
            let geometries: Vec<Geometry> =
                geometries.into_iter().filter_map(prune_geometry).collect();
            (!geometries.is_empty()).then_some(GeometryKind::GeometryCollection { geometries })
        }
    }
}

/// A polygon without its outer ring is gone; empty holes are dropped.
fn prune_rings(rings: Vec<Vec<ArcIndex>>) -> Option<Vec<Vec<ArcIndex>>> {
    match rings.first() {
        Some(outer) if !outer.is_empty() => {
            Some(rings.into_iter().filter(|ring| !ring.is_empty()).collect())
        }
        _ => None,
    }
}
