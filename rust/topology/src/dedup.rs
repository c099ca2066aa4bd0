// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deduplication of cut arcs.
//!
//! Each descriptor is compared against the arcs already kept that start or
//! end at the same coordinate. A match redirects the descriptor onto the kept
//! arc's range (swapping `start` and `end` for a reversed match); anything
//! else becomes a new unique arc. Uncut rings are compared modulo rotation,
//! anchored at their lexicographically smallest point.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::arena::ArcDescriptor;
use crate::builder::TopologyBuilder;
use crate::geometry::Point;
use crate::keys::ArcKey;

impl TopologyBuilder {
    /// Stage 6: unify descriptors that trace the same points.
    ///
    /// Unique arcs are collected in first-encounter order: every line chain
    /// first, then every ring chain.
    pub(crate) fn dedup(&mut self) {
        let arena = &mut self.arena;
        let lines = std::mem::take(&mut arena.lines);
        let rings = std::mem::take(&mut arena.rings);

        let mut dedup = Deduplicator::new(&arena.coordinates, &mut arena.arcs);

        for &head in &lines {
            for key in chain_keys(&*dedup.arcs, head) {
                dedup.dedup_line(key);
            }
        }
        for &head in &rings {
            let keys = chain_keys(&*dedup.arcs, head);
            if keys.len() > 1 {
                // A cut ring is a sequence of open arcs.
                for key in keys {
                    dedup.dedup_line(key);
                }
            } else {
                dedup.dedup_ring(head);
            }
        }

        self.unique = dedup.unique;
        tracing::debug!(
            descriptors = self.arena.arc_count(),
            unique = self.unique.len(),
            "Deduplicated arcs"
        );
    }
}

fn chain_keys(arcs: &SlotMap<ArcKey, ArcDescriptor>, head: ArcKey) -> Vec<ArcKey> {
    let mut keys = Vec::new();
    let mut next = Some(head);
    while let Some(key) = next {
        let Some(arc) = arcs.get(key) else {
            break;
        };
        keys.push(key);
        next = arc.next;
    }
    keys
}

/// Matching state over one coordinate buffer.
pub(crate) struct Deduplicator<'a> {
    coordinates: &'a [Point],
    arcs: &'a mut SlotMap<ArcKey, ArcDescriptor>,
    /// Kept arcs by the coordinates they are registered under.
    arcs_by_end: FxHashMap<Point, Vec<ArcKey>>,
    pub(crate) unique: Vec<ArcKey>,
}

impl<'a> Deduplicator<'a> {
    pub(crate) fn new(
        coordinates: &'a [Point],
        arcs: &'a mut SlotMap<ArcKey, ArcDescriptor>,
    ) -> Self {
        let mut arcs_by_end = FxHashMap::default();
        arcs_by_end.reserve(arcs.len() * 2);
        Self {
            coordinates,
            arcs,
            arcs_by_end,
            unique: Vec::new(),
        }
    }

    fn candidates(&self, p: &Point) -> Vec<ArcKey> {
        self.arcs_by_end.get(p).cloned().unwrap_or_default()
    }

    fn register(&mut self, p: Point, key: ArcKey) {
        self.arcs_by_end.entry(p).or_default().push(key);
    }

    fn redirect(&mut self, key: ArcKey, start: usize, end: usize) {
        let arc = &mut self.arcs[key];
        arc.start = start;
        arc.end = end;
    }

    /// Deduplicates an open arc. Returns `true` if it was redirected.
    pub(crate) fn dedup_line(&mut self, key: ArcKey) -> bool {
        let arc = self.arcs[key];
        let start_point = self.coordinates[arc.start];
        let end_point = self.coordinates[arc.end];

        for candidate in self.candidates(&start_point) {
            let other = self.arcs[candidate];
            if self.equal_line(&other, &arc) {
                self.redirect(key, other.start, other.end);
                return true;
            }
        }

        for candidate in self.candidates(&end_point) {
            let other = self.arcs[candidate];
            if self.reverse_equal_line(&other, &arc) {
                self.redirect(key, other.end, other.start);
                return true;
            }
        }

        self.register(start_point, key);
        self.register(end_point, key);
        self.unique.push(key);
        false
    }

    /// Deduplicates an uncut ring. Returns `true` if it was redirected.
    pub(crate) fn dedup_ring(&mut self, key: ArcKey) -> bool {
        let ring = self.arcs[key];

        let first = self.coordinates[ring.start];
        if self.match_ring(key, &ring, first) {
            return true;
        }

        let anchor = self.coordinates[ring.start + self.minimum_offset(&ring)];
        if self.match_ring(key, &ring, anchor) {
            return true;
        }

        self.register(anchor, key);
        self.unique.push(key);
        false
    }

    fn match_ring(&mut self, key: ArcKey, ring: &ArcDescriptor, at: Point) -> bool {
        for candidate in self.candidates(&at) {
            let other = self.arcs[candidate];
            if self.equal_ring(&other, ring) {
                self.redirect(key, other.start, other.end);
                return true;
            }
            if self.reverse_equal_ring(&other, ring) {
                self.redirect(key, other.end, other.start);
                return true;
            }
        }
        false
    }

    fn equal_line(&self, a: &ArcDescriptor, b: &ArcDescriptor) -> bool {
        if a.end - a.start != b.end - b.start {
            return false;
        }
        self.coordinates[a.start..=a.end] == self.coordinates[b.start..=b.end]
    }

    fn reverse_equal_line(&self, a: &ArcDescriptor, b: &ArcDescriptor) -> bool {
        if a.end - a.start != b.end - b.start {
            return false;
        }
        self.coordinates[a.start..=a.end]
            .iter()
            .eq(self.coordinates[b.start..=b.end].iter().rev())
    }

    fn equal_ring(&self, a: &ArcDescriptor, b: &ArcDescriptor) -> bool {
        let n = a.end - a.start;
        if n != b.end - b.start {
            return false;
        }
        let ka = self.minimum_offset(a);
        let kb = self.minimum_offset(b);
        (0..n).all(|i| {
            self.coordinates[a.start + (i + ka) % n] == self.coordinates[b.start + (i + kb) % n]
        })
    }

    fn reverse_equal_ring(&self, a: &ArcDescriptor, b: &ArcDescriptor) -> bool {
        let n = a.end - a.start;
        if n != b.end - b.start {
            return false;
        }
        let ka = self.minimum_offset(a);
        let kb = n - self.minimum_offset(b);
        (0..n).all(|i| {
            self.coordinates[a.start + (i + ka) % n] == self.coordinates[b.end - (i + kb) % n]
        })
    }

    /// Offset from `start` of the lexicographically smallest ring point.
    ///
    /// The closing coordinate is excluded since it repeats the first.
    fn minimum_offset(&self, ring: &ArcDescriptor) -> usize {
        let mut minimum = ring.start;
        for mid in ring.start + 1..ring.end {
            if self.coordinates[mid].lex_lt(&self.coordinates[minimum]) {
                minimum = mid;
            }
        }
        minimum - ring.start
    }
}
