//! A fan of distance-probing rays. Each tick the fan is re-anchored to the
//! owning vehicle's pose and every ray keeps only its nearest crossing with
//! the road borders and the traffic polygons.

use crate::geometry::{lerp, segment_intersection, Chain, Hit, Point, Polygon};
use crate::vehicle::Pose;
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub start: Point,
    pub end: Point,
}

/// The nearest obstruction along one ray. `offset` is normalized along the
/// ray: 0 at the vehicle, 1 at the ray's tip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub point: Point,
    pub offset: f64,
}

#[derive(Debug, Clone)]
pub struct Sensor {
    ray_count: usize,
    ray_length: f64,
    spread: f64,
    pub rays: Vec<Ray>,
    pub readings: Vec<Option<Reading>>,
}

impl Sensor {
    pub fn new(ray_count: usize, ray_length: f64, spread: f64) -> Result<Self, Box<dyn Error>> {
        if ray_count == 0 {
            return Err("sensor needs at least one ray".into());
        }
        if ray_length <= 0. {
            return Err("ray length must be positive".into());
        }

        Ok(Self {
            ray_count,
            ray_length,
            spread,
            rays: Vec::new(),
            readings: Vec::new(),
        })
    }

    pub fn ray_count(&self) -> usize {
        self.ray_count
    }

    /// Recast the fan from `pose` and take one nearest-hit reading per ray.
    pub fn update(&mut self, pose: Pose, borders: &[Chain], traffic: &[Polygon]) {
        self.cast_rays(pose);
        self.readings = self
            .rays
            .iter()
            .map(|ray| Self::reading(ray, borders, traffic))
            .collect();
    }

    /// Network inputs: 1 - offset per ray, so a near hit excites toward 1 and
    /// an empty ray reads 0.
    pub fn excitations(&self) -> Vec<f64> {
        self.readings
            .iter()
            .map(|r| r.map_or(0., |r| 1. - r.offset))
            .collect()
    }

    fn cast_rays(&mut self, pose: Pose) {
        self.rays = (0..self.ray_count)
            .map(|i| {
                let f = if self.ray_count == 1 {
                    0.5
                } else {
                    i as f64 / (self.ray_count - 1) as f64
                };
                let angle = pose.angle + lerp(self.spread / 2., -self.spread / 2., f);

                let start = Point::new(pose.x, pose.y);
                let end = Point::new(
                    pose.x - angle.sin() * self.ray_length,
                    pose.y - angle.cos() * self.ray_length,
                );
                Ray { start, end }
            })
            .collect();
    }

    // closest hit wins; on an exact tie the first candidate found stays,
    // which is an accepted nondeterminism of the scan order
    fn reading(ray: &Ray, borders: &[Chain], traffic: &[Polygon]) -> Option<Reading> {
        let border_hits = borders
            .iter()
            .flat_map(|chain| chain.edges())
            .filter_map(|(b1, b2)| segment_intersection(ray.start, ray.end, b1, b2));
        let traffic_hits = traffic
            .iter()
            .flat_map(|poly| poly.edges())
            .filter_map(|(b1, b2)| segment_intersection(ray.start, ray.end, b1, b2));

        border_hits
            .chain(traffic_hits)
            .fold(None, |nearest: Option<Hit>, hit| match nearest {
                Some(n) if n.t <= hit.t => Some(n),
                _ => Some(hit),
            })
            .map(|hit| Reading {
                point: hit.point,
                offset: hit.t,
            })
    }
}
