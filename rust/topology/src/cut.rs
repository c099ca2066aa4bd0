// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cutting lines and rings at junctions.

use crate::builder::TopologyBuilder;
use crate::join::Junctions;
use crate::keys::ArcKey;

impl TopologyBuilder {
    /// Stage 5: split every descriptor at its interior junctions.
    ///
    /// A ring that does not start on a junction is first rotated in place so
    /// that it does, which saves one cut.
    pub(crate) fn cut(&mut self, junctions: &Junctions) {
        for i in 0..self.arena.lines.len() {
            let head = self.arena.lines[i];
            self.cut_line(head, junctions);
        }
        for i in 0..self.arena.rings.len() {
            let head = self.arena.rings[i];
            self.cut_ring(head, junctions);
        }
        tracing::debug!(descriptors = self.arena.arc_count(), "Cut linework");
    }

    fn cut_line(&mut self, head: ArcKey, junctions: &Junctions) {
        let Some(&arc) = self.arena.arc(head) else {
            return;
        };
        let mut current = head;
        for mid in arc.start + 1..arc.end {
            if junctions.contains(&self.arena.coordinates[mid]) {
                current = self.arena.split(current, mid);
            }
        }
    }

    fn cut_ring(&mut self, head: ArcKey, junctions: &Junctions) {
        let Some(&arc) = self.arena.arc(head) else {
            return;
        };
        let (start, end) = (arc.start, arc.end);
        let mut fixed = junctions.contains(&self.arena.coordinates[start]);
        let mut current = head;
        let mut mid = start + 1;
        while mid < end {
            if junctions.contains(&self.arena.coordinates[mid]) {
                if fixed {
                    current = self.arena.split(current, mid);
                } else {
                    self.arena.rotate_ring(start, end, mid);
                    fixed = true;
                    // Junctions before the old start may now lie ahead.
                    mid = start + 1;
                    continue;
                }
            }
            mid += 1;
        }
    }
}
