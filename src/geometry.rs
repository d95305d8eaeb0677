//! Flat 2d primitives backing sensing and collision. Everything here is a pure
//! function of its arguments; the simulation owns all state.

use serde::{Deserialize, Serialize};

/// Two segments closer to parallel than this are treated as never crossing.
const PARALLEL_EPSILON: f64 = 1e-12;

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A crossing of two segments: the point itself plus the normalized offsets
/// along segment a (`t`) and segment b (`u`), both in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub point: Point,
    pub t: f64,
    pub u: f64,
}

/// Where segments a1-a2 and b1-b2 cross, if they do. Parallel and collinear
/// pairs never cross, nor do lines whose crossing falls outside either
/// segment.
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Hit> {
    let denominator = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);
    if denominator.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = ((b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x)) / denominator;
    let u = ((a2.x - a1.x) * (a1.y - b1.y) - (a2.y - a1.y) * (a1.x - b1.x)) / denominator;
    if !(0. ..=1.).contains(&t) || !(0. ..=1.).contains(&u) {
        return None;
    }

    Some(Hit {
        point: Point::new(lerp(a1.x, a2.x, t), lerp(a1.y, a2.y, t)),
        t,
        u,
    })
}

/// A closed polygon: edge i joins point i and point (i + 1) % n, so a polygon
/// of n points has n edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon(pub Vec<Point>);

/// An open chain of segments: edge i joins point i and point i + 1, n points
/// make n - 1 edges. Road borders are chains, and the distinction matters: a
/// chain never closes back on itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain(pub Vec<Point>);

impl Polygon {
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.0.len();
        (0..n).map(move |i| (self.0[i], self.0[(i + 1) % n]))
    }

    pub fn intersects(&self, other: &Polygon) -> bool {
        self.edges().any(|(a1, a2)| {
            other
                .edges()
                .any(|(b1, b2)| segment_intersection(a1, a2, b1, b2).is_some())
        })
    }

    pub fn intersects_chain(&self, chain: &Chain) -> bool {
        self.edges().any(|(a1, a2)| {
            chain
                .edges()
                .any(|(b1, b2)| segment_intersection(a1, a2, b1, b2).is_some())
        })
    }
}

impl Chain {
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.0.windows(2).map(|w| (w[0], w[1]))
    }
}
