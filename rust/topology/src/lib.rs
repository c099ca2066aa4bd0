// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Topo-Lite Topology
//!
//! Builds TopoJSON-style topologies from GeoJSON features.
//!
//! Line strings and polygon rings are broken into arcs at the points where
//! linework meets or diverges, and each shared arc is stored once. Features
//! then reference arcs by signed index, where `!i` walks arc `i` backwards.
//! Optional quantization snaps coordinates to an integer grid and delta-encodes
//! the output arcs; optional Visvalingam-Whyatt simplification thins them.
//!
//! ```
//! use topo_lite_topology::{Feature, FeatureCollection, GeoJsonGeometry, Topology, TopologyOptions};
//!
//! let left = GeoJsonGeometry::polygon(&[vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]);
//! let right = GeoJsonGeometry::polygon(&[vec![[1.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 0.0]]]);
//! let collection = FeatureCollection::new(vec![
//!     Feature::new(left).with_id("left"),
//!     Feature::new(right).with_id("right"),
//! ]);
//!
//! let topology = Topology::new(&collection, &TopologyOptions::default()).unwrap();
//! // The shared edge is stored once.
//! assert_eq!(topology.arcs.len(), 3);
//!
//! let features = topology.to_geojson(["right"]).unwrap();
//! assert_eq!(features.features.len(), 1);
//! ```
//!
//! The builder is single-threaded. Independent builds share no state and can
//! run on separate threads.

pub mod arena;
pub mod builder;
mod convert;
mod cut;
mod decode;
mod dedup;
pub mod error;
mod extract;
mod filter;
pub mod geojson;
pub mod geometry;
mod join;
pub mod keys;
pub mod options;
mod prune;
mod quantize;
pub mod simplify;
pub mod topology;
pub mod transform;
mod unpack;

#[cfg(test)]
mod test_support;

pub use arena::{ArcArena, ArcDescriptor};
pub use builder::TopologyBuilder;
pub use error::{Error, Result};
pub use geojson::{Feature, FeatureCollection, GeoJsonGeometry, Properties};
pub use geometry::{Bbox, Point};
pub use keys::{arc_index, resolve_arc_index, ArcIndex, ArcKey};
pub use options::TopologyOptions;
pub use simplify::{Simplifier, Visvalingam};
pub use topology::{Geometry, GeometryKind, Topology};
pub use transform::Transform;
