// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for linework while a topology is being built.
//!
//! The [`ArcArena`] owns the shared coordinate buffer and every arc
//! descriptor. Each line or ring is appended to the buffer once and described
//! by an inclusive `[start, end]` range. Cutting splits a descriptor into a
//! singly-linked chain of abutting sub-ranges (the cut point is shared: one
//! piece's `end` is the next piece's `start`); descriptors link by
//! [`ArcKey`], so no chain owns another.

use slotmap::SlotMap;

use crate::geometry::Point;
use crate::keys::ArcKey;

/// An inclusive range of the coordinate buffer, optionally followed by the
/// next piece of the same cut line or ring.
///
/// After deduplication a descriptor may point at a range in reverse
/// (`start > end`), meaning "the arc at `[end, start]` traversed backwards".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcDescriptor {
    pub start: usize,
    pub end: usize,
    pub next: Option<ArcKey>,
}

impl ArcDescriptor {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            next: None,
        }
    }

    /// Returns `true` if the descriptor references its range backwards.
    pub fn is_reversed(&self) -> bool {
        self.start > self.end
    }

    /// The range in buffer order, regardless of direction.
    pub fn span(&self) -> (usize, usize) {
        if self.is_reversed() {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        }
    }
}

/// Owner of the coordinate buffer and arc descriptors.
#[derive(Debug, Default)]
pub struct ArcArena {
    pub(crate) coordinates: Vec<Point>,
    pub(crate) arcs: SlotMap<ArcKey, ArcDescriptor>,
    /// Heads of the descriptor chains of open lines, in extraction order.
    pub(crate) lines: Vec<ArcKey>,
    /// Heads of the descriptor chains of polygon rings, in extraction order.
    pub(crate) rings: Vec<ArcKey>,
}

impl ArcArena {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Extraction ---

    /// Appends an open line to the buffer and registers its descriptor.
    ///
    /// Returns `None` for an empty line.
    pub fn push_line(&mut self, points: &[Point]) -> Option<ArcKey> {
        let key = self.push_range(points)?;
        self.lines.push(key);
        Some(key)
    }

    /// Appends a closed ring to the buffer and registers its descriptor.
    ///
    /// Returns `None` for an empty ring.
    pub fn push_ring(&mut self, points: &[Point]) -> Option<ArcKey> {
        let key = self.push_range(points)?;
        self.rings.push(key);
        Some(key)
    }

    fn push_range(&mut self, points: &[Point]) -> Option<ArcKey> {
        if points.is_empty() {
            return None;
        }
        let start = self.coordinates.len();
        self.coordinates.extend_from_slice(points);
        let end = self.coordinates.len() - 1;
        Some(self.arcs.insert(ArcDescriptor::new(start, end)))
    }

    // --- Access ---

    /// Returns the descriptor for the given key, or `None` if not found.
    pub fn arc(&self, key: ArcKey) -> Option<&ArcDescriptor> {
        self.arcs.get(key)
    }

    /// Returns the coordinates of a descriptor in buffer order.
    pub fn points(&self, arc: &ArcDescriptor) -> &[Point] {
        let (start, end) = arc.span();
        &self.coordinates[start..=end]
    }

    /// Iterates a descriptor chain starting at `head`.
    pub fn chain(&self, head: ArcKey) -> Chain<'_> {
        Chain {
            arcs: &self.arcs,
            next: Some(head),
        }
    }

    /// Collects the keys of a descriptor chain.
    pub fn chain_keys(&self, head: ArcKey) -> Vec<ArcKey> {
        self.chain(head).map(|(key, _)| key).collect()
    }

    pub fn coordinate_count(&self) -> usize {
        self.coordinates.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// Number of descriptors, including every piece of every chain.
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    // --- Mutation ---

    /// Cuts a descriptor at buffer index `at`.
    ///
    /// The descriptor is truncated to `[start, at]` and a new descriptor
    /// `[at, end]` is linked after it. Returns the key of the new piece.
    pub(crate) fn split(&mut self, key: ArcKey, at: usize) -> ArcKey {
        let arc = self.arcs[key];
        let tail = self.arcs.insert(ArcDescriptor {
            start: at,
            end: arc.end,
            next: arc.next,
        });
        let head = &mut self.arcs[key];
        head.end = at;
        head.next = Some(tail);
        tail
    }

    /// Rotates the closed ring stored at `[start, end]` so it begins at `mid`.
    ///
    /// The open part `[start, end)` is rotated in place with three reversals,
    /// then the closing coordinate is restored from the new first one.
    pub(crate) fn rotate_ring(&mut self, start: usize, end: usize, mid: usize) {
        let offset = end - mid;
        let ring = &mut self.coordinates[start..end];
        ring.reverse();
        ring[..offset].reverse();
        ring[offset..].reverse();
        self.coordinates[end] = self.coordinates[start];
    }

    /// Releases the coordinate buffer once arcs have been materialized.
    pub(crate) fn release_coordinates(&mut self) {
        self.coordinates = Vec::new();
    }
}

/// Iterator over the pieces of a cut line or ring.
pub struct Chain<'a> {
    arcs: &'a SlotMap<ArcKey, ArcDescriptor>,
    next: Option<ArcKey>,
}

impl Iterator for Chain<'_> {
    type Item = (ArcKey, ArcDescriptor);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.next?;
        let arc = *self.arcs.get(key)?;
        self.next = arc.next;
        Some((key, arc))
    }
}
