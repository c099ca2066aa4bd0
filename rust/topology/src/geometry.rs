// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar primitives: points and axis-aligned bounding boxes.
//!
//! Points are compared by exact value. No tolerance is applied anywhere in
//! the pipeline; shared linework is only detected when coordinates are
//! bit-for-bit identical, which is why quantization runs first.

use std::hash::{Hash, Hasher};

use serde::de::Error as _;
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Deserializer, Serialize};

/// A 2D coordinate.
///
/// Equality and hashing use the bit patterns of both components, with
/// `-0.0` folded into `0.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a point from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn bits(&self) -> (u64, u64) {
        // Adding zero turns -0.0 into 0.0 and leaves everything else alone.
        ((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }

    /// Returns `true` if `self` sorts strictly before `other`, comparing `x`
    /// first and `y` second.
    pub fn lex_lt(&self, other: &Point) -> bool {
        self.x < other.x || (self.x == other.x && self.y < other.y)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl From<[f64; 2]> for Point {
    fn from(c: [f64; 2]) -> Self {
        Point::new(c[0], c[1])
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// A JSON number that is written as an integer whenever it has no fraction.
///
/// Quantized and delta-encoded coordinates are integral, and writing them as
/// `12` rather than `12.0` keeps emitted topologies compact.
pub(crate) struct JsonNumber(pub f64);

/// Largest magnitude that converts to `i64` without losing precision.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Serialize for JsonNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_EXACT_INTEGER {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&JsonNumber(self.x))?;
        tuple.serialize_element(&JsonNumber(self.y))?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Extra ordinates (altitude) are accepted and dropped.
        let values = Vec::<f64>::deserialize(deserializer)?;
        match values.as_slice() {
            [x, y, ..] => Ok(Point::new(*x, *y)),
            _ => Err(D::Error::custom("a position needs at least two numbers")),
        }
    }
}

/// An axis-aligned 2D bounding box, serialized as `[xmin, ymin, xmax, ymax]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bbox {
    /// Creates a box from its corners.
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// A degenerate box covering a single point.
    pub fn from_point(p: Point) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    /// The bound of a sequence of points, or `None` when it is empty.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Bbox::from_point(*first);
        for p in iter {
            bbox.extend(*p);
        }
        Some(bbox)
    }

    /// Grows the box to contain `p`.
    pub fn extend(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// Returns the smallest box containing both boxes.
    pub fn union(&self, other: &Bbox) -> Bbox {
        Bbox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Unions two optional bounds.
    pub fn merge(a: Option<Bbox>, b: Option<Bbox>) -> Option<Bbox> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns the box as `[xmin, ymin, xmax, ymax]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

impl Serialize for Bbox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bbox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        match values.as_slice() {
            [min_x, min_y, max_x, max_y] => Ok(Bbox::new(*min_x, *min_y, *max_x, *max_y)),
            _ => Err(D::Error::custom("a bbox needs exactly four numbers")),
        }
    }
}
