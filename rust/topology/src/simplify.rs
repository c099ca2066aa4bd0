// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line simplification of the unique arcs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::builder::TopologyBuilder;
use crate::geometry::Point;

/// Reduces the number of points in a polyline.
///
/// Implementations must keep the first and last point, since arcs meet other
/// arcs there.
pub trait Simplifier {
    fn simplify(&self, points: &[Point], threshold: f64) -> Vec<Point>;
}

/// Visvalingam-Whyatt simplification by effective triangle area.
///
/// Interior points are removed smallest area first until every remaining
/// point covers at least `threshold`. When a point is removed its neighbours
/// are re-weighted, and a neighbour never weighs less than the point that was
/// just removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Visvalingam;

impl Simplifier for Visvalingam {
    fn simplify(&self, points: &[Point], threshold: f64) -> Vec<Point> {
        let n = points.len();
        if n < 3 || threshold <= 0.0 {
            return points.to_vec();
        }

        let mut previous: Vec<usize> = (0..n).map(|i| i.saturating_sub(1)).collect();
        let mut next: Vec<usize> = (1..=n).collect();
        let mut area = vec![f64::INFINITY; n];
        let mut removed = vec![false; n];
        let mut heap = BinaryHeap::with_capacity(n);

        for i in 1..n - 1 {
            area[i] = triangle_area(points[i - 1], points[i], points[i + 1]);
            heap.push(Candidate {
                area: area[i],
                index: i,
            });
        }

        while let Some(Candidate { area: weight, index }) = heap.pop() {
            // Stale entry: the point was removed or re-weighted since.
            if removed[index] || weight != area[index] {
                continue;
            }
            if weight >= threshold {
                break;
            }
            removed[index] = true;
            let (before, after) = (previous[index], next[index]);
            next[before] = after;
            previous[after] = before;

            for neighbour in [before, after] {
                if neighbour == 0 || neighbour == n - 1 {
                    continue;
                }
                let recomputed = triangle_area(
                    points[previous[neighbour]],
                    points[neighbour],
                    points[next[neighbour]],
                )
                .max(weight);
                area[neighbour] = recomputed;
                heap.push(Candidate {
                    area: recomputed,
                    index: neighbour,
                });
            }
        }

        points
            .iter()
            .zip(&removed)
            .filter(|(_, &gone)| !gone)
            .map(|(&p, _)| p)
            .collect()
    }
}

/// Area of the triangle `abc`.
pub(crate) fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    ((a.x - c.x) * (b.y - a.y) - (a.x - b.x) * (c.y - a.y)).abs() / 2.0
}

/// Heap entry for a removable point (min-heap by area).
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    area: f64,
    index: usize,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; ties go to the earlier point.
        other
            .area
            .partial_cmp(&self.area)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl TopologyBuilder {
    /// Stage 8: simplify every unique arc and drop the ones that collapse.
    ///
    /// `deleted[i]` flags collapsed arcs and `shift[i]` counts the collapsed
    /// arcs up to and including `i`, so a surviving arc `i` ends up at
    /// `i - shift[i]` in the compacted arc array.
    pub(crate) fn simplify_arcs(&mut self) {
        let count = self.arcs.len();
        self.deleted = vec![false; count];
        self.shift = vec![0; count];

        let threshold = self.options.simplify;
        if threshold == 0.0 {
            return;
        }

        let mut shift = 0;
        for i in 0..count {
            let simplified = self.simplifier.simplify(&self.arcs[i], threshold);
            if simplified.len() <= 2 && simplified.first() == simplified.last() {
                self.deleted[i] = true;
                shift += 1;
            } else {
                self.arcs[i] = simplified;
            }
            self.shift[i] = shift;
        }

        let arcs = std::mem::take(&mut self.arcs);
        self.arcs = arcs
            .into_iter()
            .zip(&self.deleted)
            .filter(|(_, &deleted)| !deleted)
            .map(|(arc, _)| arc)
            .collect();

        tracing::debug!(
            threshold,
            arcs = self.arcs.len(),
            deleted = shift,
            "Simplified arcs"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TopologyOptions;
    use crate::test_support::pts;
    use approx::assert_relative_eq;

    #[test]
    fn triangle_area_is_half_the_cross_product() {
        let area = triangle_area(Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(0.0, 2.0));
        assert_relative_eq!(area, 2.0);
        let flat = triangle_area(Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0));
        assert_relative_eq!(flat, 0.0);
    }

    #[test]
    fn collinear_points_are_removed() {
        let line = pts(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]]);
        assert_eq!(
            Visvalingam.simplify(&line, 0.1),
            pts(&[[0.0, 0.0], [3.0, 0.0]])
        );
    }

    #[test]
    fn significant_points_survive() {
        let line = pts(&[[0.0, 0.0], [1.0, 0.1], [2.0, 0.0], [3.0, 5.0], [4.0, 0.0]]);
        assert_eq!(
            Visvalingam.simplify(&line, 1.0),
            pts(&[[0.0, 0.0], [2.0, 0.0], [3.0, 5.0], [4.0, 0.0]])
        );
    }

    #[test]
    fn endpoints_are_always_kept() {
        let line = pts(&[[0.0, 0.0], [1.0, 10.0], [2.0, 0.0]]);
        assert_eq!(
            Visvalingam.simplify(&line, 1e9),
            pts(&[[0.0, 0.0], [2.0, 0.0]])
        );
        let short = pts(&[[0.0, 0.0], [5.0, 5.0]]);
        assert_eq!(Visvalingam.simplify(&short, 1e9), short);
    }

    #[test]
    fn zero_threshold_keeps_everything() {
        let line = pts(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]);
        assert_eq!(Visvalingam.simplify(&line, 0.0), line);
    }

    #[test]
    fn neighbours_are_reweighted_after_removal() {
        // Removing (3, 0) grows the triangle at (2, 0) to 1.0, so it stays.
        let line = pts(&[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]]);
        let simplified = Visvalingam.simplify(&line, 1.0);
        assert_eq!(simplified, pts(&[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0], [4.0, 0.0]]));
    }

    fn builder_with_arcs(simplify: f64, arcs: Vec<Vec<Point>>) -> TopologyBuilder {
        let mut builder = TopologyBuilder::new(TopologyOptions::new().with_simplify(simplify));
        builder.arcs = arcs;
        builder
    }

    #[test]
    fn disabled_simplification_records_no_shift() {
        let mut builder = builder_with_arcs(0.0, vec![pts(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]])]);
        builder.simplify_arcs();
        assert_eq!(builder.deleted, vec![false]);
        assert_eq!(builder.shift, vec![0]);
        assert_eq!(builder.arcs[0].len(), 3);
    }

    #[test]
    fn collapsed_arcs_are_deleted_and_shift_later_ones() {
        let mut builder = builder_with_arcs(
            1.0,
            vec![
                pts(&[[0.0, 0.0], [5.0, 5.0], [10.0, 0.0]]),
                pts(&[[0.0, 0.0], [0.1, 0.1], [0.0, 0.0]]),
                pts(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]),
            ],
        );
        builder.simplify_arcs();
        assert_eq!(builder.deleted, vec![false, true, false]);
        assert_eq!(builder.shift, vec![0, 1, 1]);
        assert_eq!(
            builder.arcs,
            vec![
                pts(&[[0.0, 0.0], [5.0, 5.0], [10.0, 0.0]]),
                pts(&[[0.0, 0.0], [2.0, 0.0]]),
            ]
        );
    }
}
