// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The topology builder and its pipeline.
//!
//! [`TopologyBuilder::build`] runs the stages in a fixed order, each one
//! mutating the builder state and handing off to the next:
//!
//! 1. bounds, 2. pre-quantize, 3. extract, 4. join, 5. cut, 6. dedup,
//! 7. unpack arcs, 8. simplify, 9. unpack objects, 10. remove empty,
//! 11. post-quantize, 12. delta.
//!
//! The stages live in their own modules as `impl TopologyBuilder` blocks.
//! The builder is single-threaded and consumed by `build`; independent
//! builds share nothing.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::arena::ArcArena;
use crate::error::Result;
use crate::extract::ExtractedObject;
use crate::geojson::{Feature, FeatureCollection};
use crate::geometry::{Bbox, Point};
use crate::keys::ArcKey;
use crate::options::TopologyOptions;
use crate::simplify::{Simplifier, Visvalingam};
use crate::topology::{Geometry, Topology};
use crate::transform::Transform;

/// Staged state of one topology build.
pub struct TopologyBuilder {
    pub(crate) options: TopologyOptions,
    pub(crate) simplifier: Box<dyn Simplifier>,

    // Input, released by extract
    pub(crate) input: Vec<Feature>,

    pub(crate) bbox: Option<Bbox>,
    pub(crate) transform: Option<Transform>,

    // Linework and extracted feature trees
    pub(crate) arena: ArcArena,
    pub(crate) objects: Vec<ExtractedObject>,

    // Dedup output: descriptors of the unique arcs, in first-encounter order
    pub(crate) unique: Vec<ArcKey>,

    // Materialized arcs and their bookkeeping
    pub(crate) arcs: Vec<Vec<Point>>,
    pub(crate) arc_index: FxHashMap<(usize, usize), usize>,
    pub(crate) deleted: Vec<bool>,
    pub(crate) shift: Vec<usize>,

    // Emitted geometries, in feature order
    pub(crate) geometries: Vec<Geometry>,
}

impl TopologyBuilder {
    /// Creates a builder with the default Visvalingam simplifier.
    pub fn new(options: TopologyOptions) -> Self {
        Self {
            options: options.normalized(),
            simplifier: Box::new(Visvalingam),
            input: Vec::new(),
            bbox: None,
            transform: None,
            arena: ArcArena::new(),
            objects: Vec::new(),
            unique: Vec::new(),
            arcs: Vec::new(),
            arc_index: FxHashMap::default(),
            deleted: Vec::new(),
            shift: Vec::new(),
            geometries: Vec::new(),
        }
    }

    /// Replaces the line simplifier used when `simplify > 0`.
    pub fn with_simplifier(mut self, simplifier: impl Simplifier + 'static) -> Self {
        self.simplifier = Box::new(simplifier);
        self
    }

    /// The effective options (after normalization).
    pub fn options(&self) -> &TopologyOptions {
        &self.options
    }

    /// Runs the full pipeline over `features`.
    pub fn build(mut self, features: Vec<Feature>) -> Result<Topology> {
        self.input = features;
        tracing::debug!(features = self.input.len(), "Building topology");

        self.compute_bounds();
        self.pre_quantize();
        self.extract();
        let junctions = self.join();
        self.cut(&junctions);
        self.dedup();
        self.unpack_arcs();
        self.simplify_arcs();
        self.unpack_objects()?;
        self.remove_empty();
        self.post_quantize();
        self.delta_encode();

        let topology = self.finish();
        tracing::info!(
            objects = topology.objects.len(),
            arcs = topology.arcs.len(),
            quantized = topology.transform.is_some(),
            "Topology built"
        );
        Ok(topology)
    }

    /// Stage 1: the bounding box over every input coordinate.
    pub(crate) fn compute_bounds(&mut self) {
        self.bbox = self
            .input
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .map(|g| g.bound())
            .fold(None, Bbox::merge);
        tracing::debug!(bbox = ?self.bbox, "Computed bounds");
    }

    /// Assembles the output structure and drops all internal state.
    fn finish(self) -> Topology {
        let mut objects = BTreeMap::new();
        for geometry in self.geometries {
            // Every top-level geometry carries the id assigned by extract.
            if let Some(id) = geometry.id.clone() {
                if objects.insert(id.clone(), geometry).is_some() {
                    tracing::warn!(id = %id, "Duplicate feature id, keeping the later feature");
                }
            }
        }
        Topology {
            bbox: self.bbox,
            transform: self.transform,
            objects,
            arcs: self.arcs,
        }
    }
}

impl Topology {
    /// Builds a topology from a feature collection.
    ///
    /// # Example
    ///
    /// ```
    /// use topo_lite_topology::{Feature, FeatureCollection, GeoJsonGeometry, Topology, TopologyOptions};
    ///
    /// let line = GeoJsonGeometry::line_string(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]);
    /// let collection = FeatureCollection::new(vec![
    ///     Feature::new(line.clone()).with_id("a"),
    ///     Feature::new(line).with_id("b"),
    /// ]);
    ///
    /// let topology = Topology::new(&collection, &TopologyOptions::default()).unwrap();
    /// assert_eq!(topology.arcs.len(), 1);
    /// ```
    pub fn new(collection: &FeatureCollection, options: &TopologyOptions) -> Result<Topology> {
        TopologyBuilder::new(options.clone()).build(collection.features.clone())
    }
}
