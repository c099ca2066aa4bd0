// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Materializing arcs and rewriting objects as signed arc indices.

use crate::arena::ArcArena;
use crate::builder::TopologyBuilder;
use crate::error::{Error, Result};
use crate::extract::{ChainHead, ExtractedObject, Shape};
use crate::keys::{arc_index, ArcIndex};
use crate::topology::{Geometry, GeometryKind};

impl TopologyBuilder {
    /// Stage 7: copy every unique arc out of the coordinate buffer.
    ///
    /// Records `(start, end) -> position` for each arc and releases the
    /// buffer afterwards. Descriptors are kept for [`Self::unpack_objects`].
    pub(crate) fn unpack_arcs(&mut self) {
        let unique = std::mem::take(&mut self.unique);
        self.arcs = Vec::with_capacity(unique.len());
        self.arc_index.clear();
        self.arc_index.reserve(unique.len());

        for key in unique {
            let Some(&arc) = self.arena.arc(key) else {
                continue;
            };
            self.arc_index.insert((arc.start, arc.end), self.arcs.len());
            self.arcs.push(self.arena.points(&arc).to_vec());
        }

        self.arena.release_coordinates();
        tracing::debug!(arcs = self.arcs.len(), "Unpacked arcs");
    }

    /// Stage 9: rewrite every extracted object as an output geometry.
    ///
    /// Arcs deleted by simplification are skipped and the remaining indices
    /// are shifted down to match the compacted arc array.
    pub(crate) fn unpack_objects(&mut self) -> Result<()> {
        let objects = std::mem::take(&mut self.objects);
        let mut geometries = Vec::with_capacity(objects.len());
        for ExtractedObject {
            id,
            properties,
            bbox,
            shape,
        } in objects
        {
            geometries.push(Geometry {
                id: Some(id),
                properties,
                bbox,
                kind: self.unpack_shape(&shape)?,
            });
        }
        self.geometries = geometries;

        // Descriptors and the arc index are no longer needed.
        self.arena = ArcArena::new();
        self.arc_index.clear();
        tracing::debug!(geometries = self.geometries.len(), "Unpacked objects");
        Ok(())
    }

    fn unpack_shape(&self, shape: &Shape) -> Result<GeometryKind> {
        Ok(match shape {
            Shape::Point(p) => GeometryKind::Point { coordinates: *p },
            Shape::MultiPoint(points) => GeometryKind::MultiPoint {
                coordinates: points.clone(),
            },
            Shape::LineString(head) => GeometryKind::LineString {
                arcs: self.unpack_chain(*head)?,
            },
            Shape::MultiLineString(heads) => GeometryKind::MultiLineString {
                arcs: self.unpack_chains(heads)?,
            },
            Shape::Polygon(heads) => GeometryKind::Polygon {
                arcs: self.unpack_chains(heads)?,
            },
            Shape::MultiPolygon(polygons) => GeometryKind::MultiPolygon {
                arcs: polygons
                    .iter()
                    .map(|rings| self.unpack_chains(rings))
                    .collect::<Result<_>>()?,
            },
            Shape::GeometryCollection(children) => GeometryKind::GeometryCollection {
                geometries: children
                    .iter()
                    .map(|child| self.unpack_shape(child).map(Geometry::new))
                    .collect::<Result<_>>()?,
            },
        })
    }

    fn unpack_chains(&self, heads: &[ChainHead]) -> Result<Vec<Vec<ArcIndex>>> {
        heads.iter().map(|&head| self.unpack_chain(head)).collect()
    }

    /// Signed indices of one descriptor chain.
    fn unpack_chain(&self, head: ChainHead) -> Result<Vec<ArcIndex>> {
        let Some(head) = head else {
            return Ok(Vec::new());
        };
        let mut indices = Vec::new();
        for (_, arc) in self.arena.chain(head) {
            let reversed = arc.is_reversed();
            let position = *self
                .arc_index
                .get(&arc.span())
                .ok_or(Error::InvalidArcReference {
                    start: arc.start,
                    end: arc.end,
                })?;
            if self.deleted.get(position).copied().unwrap_or(false) {
                continue;
            }
            let shift = self.shift.get(position).copied().unwrap_or(0);
            indices.push(arc_index(position - shift, reversed));
        }
        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::{Feature, GeoJsonGeometry};
    use crate::geometry::Point;
    use crate::options::TopologyOptions;
    use crate::test_support::{deduplicated, line, polygon, pts};

    fn unpacked(features: Vec<Feature>) -> TopologyBuilder {
        let mut builder = deduplicated(features);
        builder.unpack_arcs();
        builder.simplify_arcs();
        builder.unpack_objects().unwrap();
        builder
    }

    fn kinds(builder: &TopologyBuilder) -> Vec<GeometryKind> {
        builder.geometries.iter().map(|g| g.kind.clone()).collect()
    }

    #[test]
    fn arcs_are_materialized_in_dedup_order() {
        let mut builder = deduplicated(vec![
            line(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]),
            line(&[[0.0, 0.0], [1.0, 0.0]]),
        ]);
        builder.unpack_arcs();
        assert_eq!(
            builder.arcs,
            vec![pts(&[[0.0, 0.0], [1.0, 0.0]]), pts(&[[1.0, 0.0], [2.0, 0.0]])]
        );
        assert_eq!(builder.arc_index.get(&(0, 1)), Some(&0));
        assert_eq!(builder.arc_index.get(&(1, 2)), Some(&1));
        assert_eq!(builder.arena.coordinate_count(), 0);
    }

    #[test]
    fn lines_reference_signed_indices() {
        let builder = unpacked(vec![
            line(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]),
            line(&[[2.0, 0.0], [1.0, 0.0], [0.0, 0.0]]),
            line(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]),
        ]);
        assert_eq!(
            kinds(&builder),
            vec![
                GeometryKind::LineString { arcs: vec![0] },
                GeometryKind::LineString { arcs: vec![!0] },
                GeometryKind::LineString { arcs: vec![0] },
            ]
        );
    }

    #[test]
    fn polygons_unpack_ring_by_ring() {
        let builder = unpacked(vec![
            polygon(&[&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]),
            polygon(&[&[[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 0.0]]]),
        ]);
        assert_eq!(
            kinds(&builder),
            vec![
                GeometryKind::Polygon {
                    arcs: vec![vec![0, 1]]
                },
                GeometryKind::Polygon {
                    arcs: vec![vec![2, !0]]
                },
            ]
        );
    }

    #[test]
    fn points_and_collections_carry_through() {
        let builder = unpacked(vec![
            Feature::new(GeoJsonGeometry::Point {
                coordinates: Point::new(3.0, 4.0),
            })
            .with_id("pt"),
            Feature::new(GeoJsonGeometry::GeometryCollection {
                geometries: vec![
                    GeoJsonGeometry::MultiPoint {
                        coordinates: pts(&[[1.0, 1.0]]),
                    },
                    GeoJsonGeometry::MultiLineString {
                        coordinates: vec![pts(&[[0.0, 0.0], [1.0, 0.0]])],
                    },
                ],
            }),
        ]);
        assert_eq!(builder.geometries[0].id.as_deref(), Some("pt"));
        assert_eq!(
            builder.geometries[1].kind,
            GeometryKind::GeometryCollection {
                geometries: vec![
                    Geometry::new(GeometryKind::MultiPoint {
                        coordinates: pts(&[[1.0, 1.0]])
                    }),
                    Geometry::new(GeometryKind::MultiLineString {
                        arcs: vec![vec![0]]
                    }),
                ]
            }
        );
    }

    #[test]
    fn deleted_arcs_are_skipped_and_later_ones_shift() {
        let mut builder = deduplicated(vec![
            line(&[[0.0, 0.0], [1.0, 0.0]]),
            line(&[[1.0, 0.0], [2.0, 0.0]]),
            line(&[[2.0, 0.0], [3.0, 0.0]]),
        ]);
        builder.unpack_arcs();
        builder.deleted = vec![false, true, false];
        builder.shift = vec![0, 1, 1];
        builder.unpack_objects().unwrap();
        assert_eq!(
            kinds(&builder),
            vec![
                GeometryKind::LineString { arcs: vec![0] },
                GeometryKind::LineString { arcs: vec![] },
                GeometryKind::LineString { arcs: vec![1] },
            ]
        );
    }

    #[test]
    fn missing_arc_index_entry_is_an_error() {
        let mut builder = deduplicated(vec![line(&[[0.0, 0.0], [1.0, 0.0]])]);
        builder.unpack_arcs();
        builder.arc_index.clear();
        let err = builder.unpack_objects().unwrap_err();
        assert!(matches!(err, Error::InvalidArcReference { start: 0, end: 1 }));
    }

    #[test]
    fn empty_linework_unpacks_to_empty_lists() {
        let mut builder = TopologyBuilder::new(TopologyOptions::default());
        builder.input = vec![Feature::new(GeoJsonGeometry::LineString {
            coordinates: Vec::new(),
        })];
        builder.extract();
        builder.unpack_objects().unwrap();
        assert_eq!(kinds(&builder), vec![GeometryKind::LineString { arcs: vec![] }]);
    }
}
