// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Quantization stages and delta encoding.

use crate::builder::TopologyBuilder;
use crate::geometry::Point;
use crate::topology::GeometryKind;
use crate::transform::Quantizer;

impl TopologyBuilder {
    /// Stage 2: snap the input to the pre-quantization grid.
    ///
    /// Without an output grid the input grid doubles as one.
    pub(crate) fn pre_quantize(&mut self) {
        let pre = self.options.pre_quantize;
        if pre == 0.0 {
            return;
        }
        let post = match self.options.post_quantize {
            post if post > 0.0 => post,
            _ => pre,
        };
        let Some(bbox) = self.bbox else {
            return;
        };
        let quantizer = Quantizer::from_bounds(&bbox, pre, post);
        for geometry in self.input.iter_mut().filter_map(|f| f.geometry.as_mut()) {
            quantizer.quantize_geometry(geometry);
        }
        self.transform = Some(quantizer.inverse());
        tracing::debug!(pre, post, transform = ?self.transform, "Pre-quantized input");
    }

    /// Stage 11: bring the arcs onto the output grid.
    ///
    /// With pre-quantization the arcs are rescaled by `post / pre` and the
    /// transform scale shrinks to match; otherwise the arcs are quantized
    /// from the bounds now. Point coordinates follow the same mapping.
    pub(crate) fn post_quantize(&mut self) {
        let (pre, post) = (self.options.pre_quantize, self.options.post_quantize);
        if post == 0.0 {
            return;
        }

        let quantizer = if pre > 0.0 {
            if pre == post {
                return;
            }
            let k = post / pre;
            if let Some(transform) = self.transform.as_mut() {
                transform.scale[0] /= k;
                transform.scale[1] /= k;
            }
            Quantizer::scaled(k)
        } else {
            let Some(bbox) = self.bbox else {
                return;
            };
            let quantizer = Quantizer::from_bounds(&bbox, post, post);
            self.transform = Some(quantizer.inverse());
            quantizer
        };

        for arc in self.arcs.iter_mut() {
            *arc = quantizer.quantize_line(arc);
        }
        for geometry in self.geometries.iter_mut() {
            quantize_point_kinds(&mut geometry.kind, &quantizer);
        }
        tracing::debug!(pre, post, transform = ?self.transform, "Post-quantized arcs");
    }

    /// Stage 12: store every arc point after the first as an offset from its
    /// predecessor.
    pub(crate) fn delta_encode(&mut self) {
        if self.options.post_quantize == 0.0 {
            return;
        }
        for arc in self.arcs.iter_mut() {
            delta_encode(arc);
        }
        tracing::debug!(arcs = self.arcs.len(), "Delta-encoded arcs");
    }
}

/// Delta-encodes one arc in place. Zero-length steps are kept.
pub(crate) fn delta_encode(arc: &mut [Point]) {
    let Some(&first) = arc.first() else {
        return;
    };
    let mut previous = first;
    for p in arc.iter_mut().skip(1) {
        let current = *p;
        *p = Point::new(current.x - previous.x, current.y - previous.y);
        previous = current;
    }
}

/// Undoes [`delta_encode`].
pub(crate) fn delta_decode(arc: &mut [Point]) {
    let mut sum = Point::new(0.0, 0.0);
    for p in arc.iter_mut() {
        sum = Point::new(sum.x + p.x, sum.y + p.y);
        *p = sum;
    }
}

fn quantize_point_kinds(kind: &mut GeometryKind, quantizer: &Quantizer) {
    match kind {
        GeometryKind::Point { coordinates } => *coordinates = quantizer.quantize_point(*coordinates),
        GeometryKind::MultiPoint { coordinates } => {
            *coordinates = quantizer.quantize_points(coordinates)
        }
        GeometryKind::GeometryCollection { geometries } => {
            for child in geometries.iter_mut() {
                quantize_point_kinds(&mut child.kind, quantizer);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::{Feature, GeoJsonGeometry};
    use crate::geometry::Bbox;
    use crate::options::TopologyOptions;
    use crate::test_support::{line, pts};
    use crate::topology::Geometry;
    use crate::transform::Transform;
    use approx::assert_relative_eq;

    fn loaded(options: TopologyOptions, features: Vec<Feature>) -> TopologyBuilder {
        let mut builder = TopologyBuilder::new(options);
        builder.input = features;
        builder.compute_bounds();
        builder
    }

    #[test]
    fn pre_quantize_snaps_input_to_the_grid() {
        let mut builder = loaded(
            TopologyOptions::new().with_quantization(11.0),
            vec![line(&[[0.0, 0.0], [0.04, 0.0], [5.0, 2.5], [10.0, 5.0]])],
        );
        builder.pre_quantize();
        assert_eq!(
            builder.input[0].geometry,
            Some(GeoJsonGeometry::LineString {
                coordinates: pts(&[[0.0, 0.0], [5.0, 5.0], [10.0, 10.0]])
            })
        );
        let transform = builder.transform.unwrap();
        assert_relative_eq!(transform.scale[0], 1.0);
        assert_relative_eq!(transform.scale[1], 0.5);
        assert_eq!(transform.translate, [0.0, 0.0]);
    }

    #[test]
    fn pre_quantize_alone_keeps_arcs_absolute() {
        let features = vec![line(&[[0.0, 0.0], [5.0, 2.5], [10.0, 5.0]])];
        let topology = TopologyBuilder::new(TopologyOptions::new().with_pre_quantize(11.0))
            .build(features)
            .unwrap();
        assert_eq!(topology.arcs, vec![pts(&[[0.0, 0.0], [5.0, 5.0], [10.0, 10.0]])]);
        assert!(topology.transform.is_some());
    }

    #[test]
    fn pre_quantize_disabled_leaves_input_alone() {
        let mut builder = loaded(
            TopologyOptions::default(),
            vec![line(&[[0.0, 0.0], [0.04, 0.0]])],
        );
        builder.pre_quantize();
        assert!(builder.transform.is_none());
        assert_eq!(
            builder.input[0].geometry,
            Some(GeoJsonGeometry::line_string(&[[0.0, 0.0], [0.04, 0.0]]))
        );
    }

    #[test]
    fn post_quantize_rescales_pre_quantized_arcs() {
        let mut builder = TopologyBuilder::new(
            TopologyOptions::new()
                .with_pre_quantize(100.0)
                .with_post_quantize(10.0),
        );
        builder.transform = Some(Transform {
            scale: [0.5, 0.5],
            translate: [1.0, 2.0],
        });
        builder.arcs = vec![pts(&[[0.0, 0.0], [4.0, 0.0], [20.0, 99.0]])];
        builder.geometries = vec![Geometry::new(GeometryKind::Point {
            coordinates: Point::new(44.0, 55.0),
        })];
        builder.post_quantize();

        assert_eq!(builder.arcs[0], pts(&[[0.0, 0.0], [2.0, 10.0]]));
        assert_eq!(
            builder.geometries[0].kind,
            GeometryKind::Point {
                coordinates: Point::new(4.0, 6.0)
            }
        );
        let transform = builder.transform.unwrap();
        assert_relative_eq!(transform.scale[0], 5.0);
        assert_eq!(transform.translate, [1.0, 2.0]);
    }

    #[test]
    fn post_quantize_without_pre_quantize_uses_the_bounds() {
        let mut builder = TopologyBuilder::new(TopologyOptions::new().with_post_quantize(3.0));
        builder.bbox = Some(Bbox::new(0.0, 0.0, 4.0, 4.0));
        builder.arcs = vec![pts(&[[0.0, 0.0], [1.9, 0.0], [4.0, 4.0]])];
        builder.post_quantize();
        assert_eq!(builder.arcs[0], pts(&[[0.0, 0.0], [1.0, 0.0], [2.0, 2.0]]));
        let transform = builder.transform.unwrap();
        assert_relative_eq!(transform.scale[0], 2.0);
        assert_relative_eq!(transform.scale[1], 2.0);
    }

    #[test]
    fn matching_grids_skip_post_quantize() {
        let mut builder = TopologyBuilder::new(TopologyOptions::new().with_quantization(10.0));
        builder.arcs = vec![pts(&[[0.0, 0.0], [3.0, 3.0]])];
        builder.post_quantize();
        assert_eq!(builder.arcs[0], pts(&[[0.0, 0.0], [3.0, 3.0]]));
    }

    #[test]
    fn delta_keeps_first_point_and_zero_steps() {
        let mut arc = pts(&[[5.0, 5.0], [7.0, 4.0], [7.0, 4.0], [6.0, 9.0]]);
        delta_encode(&mut arc);
        assert_eq!(arc, pts(&[[5.0, 5.0], [2.0, -1.0], [0.0, 0.0], [-1.0, 5.0]]));
        delta_decode(&mut arc);
        assert_eq!(arc, pts(&[[5.0, 5.0], [7.0, 4.0], [7.0, 4.0], [6.0, 9.0]]));
    }

    #[test]
    fn delta_stage_only_runs_with_an_output_grid() {
        let mut builder = TopologyBuilder::new(TopologyOptions::default());
        builder.arcs = vec![pts(&[[1.0, 1.0], [2.0, 2.0]])];
        builder.delta_encode();
        assert_eq!(builder.arcs[0], pts(&[[1.0, 1.0], [2.0, 2.0]]));

        let mut builder = TopologyBuilder::new(TopologyOptions::new().with_post_quantize(10.0));
        builder.arcs = vec![pts(&[[1.0, 1.0], [2.0, 2.0]])];
        builder.delta_encode();
        assert_eq!(builder.arcs[0], pts(&[[1.0, 1.0], [1.0, 1.0]]));
    }
}
