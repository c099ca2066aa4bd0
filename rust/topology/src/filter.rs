// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extracting a sub-topology by feature id.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::keys::{arc_index, resolve_arc_index, ArcIndex};
use crate::topology::{Geometry, GeometryKind, Topology};

/// Assigns dense new positions to old arc positions in encounter order.
#[derive(Debug, Default)]
struct ArcRemapper {
    positions: FxHashMap<usize, usize>,
    /// Old positions, indexed by new position.
    order: Vec<usize>,
    arc_count: usize,
}

impl ArcRemapper {
    fn new(arc_count: usize) -> Self {
        Self {
            arc_count,
            ..Self::default()
        }
    }

    fn remap(&mut self, index: ArcIndex) -> Result<ArcIndex> {
        let (old, reversed) = resolve_arc_index(index);
        if old >= self.arc_count {
            return Err(Error::ArcOutOfRange(index));
        }
        let new = match self.positions.get(&old) {
            Some(&new) => new,
            None => {
                let new = self.order.len();
                self.positions.insert(old, new);
                self.order.push(old);
                new
            }
        };
        Ok(arc_index(new, reversed))
    }

    fn remap_list(&mut self, indices: &[ArcIndex]) -> Result<Vec<ArcIndex>> {
        indices.iter().map(|&index| self.remap(index)).collect()
    }

    fn remap_lists(&mut self, lists: &[Vec<ArcIndex>]) -> Result<Vec<Vec<ArcIndex>>> {
        lists.iter().map(|list| self.remap_list(list)).collect()
    }

    fn remap_kind(&mut self, kind: &GeometryKind) -> Result<GeometryKind> {
        Ok(match kind {
            GeometryKind::Point { .. } | GeometryKind::MultiPoint { .. } => kind.clone(),
            GeometryKind::LineString { arcs } => GeometryKind::LineString {
                arcs: self.remap_list(arcs)?,
            },
            GeometryKind::MultiLineString { arcs } => GeometryKind::MultiLineString {
                arcs: self.remap_lists(arcs)?,
            },
            GeometryKind::Polygon { arcs } => GeometryKind::Polygon {
                arcs: self.remap_lists(arcs)?,
            },
            GeometryKind::MultiPolygon { arcs } => GeometryKind::MultiPolygon {
                arcs: arcs
                    .iter()
                    .map(|polygon| self.remap_lists(polygon))
                    .collect::<Result<_>>()?,
            },
            GeometryKind::GeometryCollection { geometries } => GeometryKind::GeometryCollection {
                geometries: geometries
                    .iter()
                    .map(|child| self.remap_geometry(child))
                    .collect::<Result<_>>()?,
            },
        })
    }

    fn remap_geometry(&mut self, geometry: &Geometry) -> Result<Geometry> {
        Ok(Geometry {
            kind: self.remap_kind(&geometry.kind)?,
            ..geometry.clone()
        })
    }
}

impl Topology {
    /// Returns a topology with only the named objects and the arcs they use.
    ///
    /// Arcs are renumbered densely in the order the selected objects first
    /// reference them, walking `ids` in order. Unknown ids are ignored. The
    /// transform and bbox are copied unchanged, and an object that references
    /// no arcs (such as an empty collection) is kept as is.
    ///
    /// # Errors
    ///
    /// [`Error::ArcOutOfRange`] if a selected object references an arc past
    /// the end of [`Topology::arcs`].
    pub fn filter<I, S>(&self, ids: I) -> Result<Topology>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut remapper = ArcRemapper::new(self.arcs.len());
        let mut objects = BTreeMap::new();

        for id in ids {
            let id = id.as_ref();
            if objects.contains_key(id) {
                continue;
            }
            let Some(geometry) = self.objects.get(id) else {
                continue;
            };
            objects.insert(id.to_string(), remapper.remap_geometry(geometry)?);
        }

        let arcs: Vec<_> = remapper
            .order
            .iter()
            .map(|&old| self.arcs[old].clone())
            .collect();

        tracing::debug!(
            objects = objects.len(),
            kept = arcs.len(),
            total = self.arcs.len(),
            "Filtered topology"
        );

        Ok(Topology {
            bbox: self.bbox,
            transform: self.transform,
            objects,
            arcs,
        })
    }
}
