// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixtures shared by the unit tests.

use crate::builder::TopologyBuilder;
use crate::geojson::{Feature, GeoJsonGeometry};
use crate::geometry::Point;
use crate::options::TopologyOptions;

pub(crate) fn pts(coords: &[[f64; 2]]) -> Vec<Point> {
    coords.iter().map(|&c| c.into()).collect()
}

pub(crate) fn line(coords: &[[f64; 2]]) -> Feature {
    Feature::new(GeoJsonGeometry::line_string(coords))
}

pub(crate) fn polygon(rings: &[&[[f64; 2]]]) -> Feature {
    Feature::new(GeoJsonGeometry::Polygon {
        coordinates: rings.iter().map(|ring| pts(ring)).collect(),
    })
}

/// A builder with `features` loaded and extracted, ready for `join`.
pub(crate) fn extracted(features: Vec<Feature>) -> TopologyBuilder {
    let mut builder = TopologyBuilder::new(TopologyOptions::default());
    builder.input = features;
    builder.compute_bounds();
    builder.pre_quantize();
    builder.extract();
    builder
}

/// A builder that has run every stage up to and including dedup.
pub(crate) fn deduplicated(features: Vec<Feature>) -> TopologyBuilder {
    let mut builder = extracted(features);
    let junctions = builder.join();
    builder.cut(&junctions);
    builder.dedup();
    builder
}
