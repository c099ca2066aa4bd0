// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Junction detection.
//!
//! A junction is a position whose neighbourhood differs between the arcs
//! passing through it. Every physical copy of a coordinate is first mapped to
//! one canonical buffer index; the neighbour bookkeeping then runs per
//! canonical index, so coincident copies share one record.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::builder::TopologyBuilder;
use crate::geometry::Point;

/// Coordinates at which linework must be cut.
pub(crate) type Junctions = FxHashSet<Point>;

/// Per-index scratch state of the junction scan.
struct JunctionScan {
    /// Canonical index of every buffer position.
    indexes: Vec<usize>,
    /// Last arc that touched each canonical index.
    visited: Vec<Option<usize>>,
    /// First recorded `(previous, next)` neighbours of each canonical index.
    neighbours: Vec<Option<(usize, usize)>>,
    junction: Vec<bool>,
}

impl JunctionScan {
    fn new(coordinates: &[Point]) -> Self {
        let n = coordinates.len();
        let mut first_index: FxHashMap<Point, usize> = FxHashMap::default();
        first_index.reserve(n);
        let indexes = coordinates
            .iter()
            .enumerate()
            .map(|(i, p)| *first_index.entry(*p).or_insert(i))
            .collect();
        Self {
            indexes,
            visited: vec![None; n],
            neighbours: vec![None; n],
            junction: vec![false; n],
        }
    }

    fn sequence(&mut self, arc: usize, previous: usize, current: usize, next: usize) {
        // A self-intersection of the same arc says nothing about sharing.
        if self.visited[current] == Some(arc) {
            return;
        }
        self.visited[current] = Some(arc);
        match self.neighbours[current] {
            None => self.neighbours[current] = Some((previous, next)),
            Some((left, right)) => {
                let same = (left == previous && right == next) || (left == next && right == previous);
                if !same {
                    self.junction[current] = true;
                }
            }
        }
    }

    fn scan_line(&mut self, arc: usize, start: usize, end: usize) {
        let (first, last) = (self.indexes[start], self.indexes[end]);
        if end > start {
            let mut current = first;
            let mut next = self.indexes[start + 1];
            for i in start + 2..=end {
                let previous = current;
                current = next;
                next = self.indexes[i];
                self.sequence(arc, previous, current, next);
            }
        }
        self.junction[first] = true;
        self.junction[last] = true;
    }

    fn scan_ring(&mut self, arc: usize, start: usize, end: usize) {
        if end <= start {
            return;
        }
        let mut previous = self.indexes[end - 1];
        let mut current = self.indexes[start];
        let mut next = self.indexes[start + 1];
        self.sequence(arc, previous, current, next);
        for i in start + 2..=end {
            previous = current;
            current = next;
            next = self.indexes[i];
            self.sequence(arc, previous, current, next);
        }
    }

    fn reset_visited(&mut self) {
        self.visited.fill(None);
    }
}

impl TopologyBuilder {
    /// Stage 4: find every coordinate at which linework must be cut.
    pub(crate) fn join(&self) -> Junctions {
        let arena = &self.arena;
        let mut scan = JunctionScan::new(&arena.coordinates);

        for (id, &key) in arena.lines.iter().enumerate() {
            if let Some(arc) = arena.arc(key) {
                scan.scan_line(id, arc.start, arc.end);
            }
        }

        scan.reset_visited();

        for (id, &key) in arena.rings.iter().enumerate() {
            if let Some(arc) = arena.arc(key) {
                scan.scan_ring(id, arc.start, arc.end);
            }
        }

        let junctions: Junctions = scan
            .junction
            .iter()
            .zip(&arena.coordinates)
            .filter(|(&is_junction, _)| is_junction)
            .map(|(_, &p)| p)
            .collect();

        tracing::debug!(junctions = junctions.len(), "Joined linework");
        junctions
    }
}
