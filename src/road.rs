//! A straight multi-lane road: lane geometry plus the two boundary chains
//! vehicles may not cross. Immutable once built.

use crate::constants::{BORDER_REACH, LANE_COUNT};
use crate::geometry::{Chain, Point};
use std::error::Error;

#[derive(Debug, Clone)]
pub struct Road {
    center: f64,
    width: f64,
    lane_count: usize,
    pub borders: [Chain; 2],
}

impl Road {
    pub fn new(center: f64, width: f64) -> Self {
        // LANE_COUNT >= 1, so with_lanes cannot fail here
        Self::with_lanes(center, width, LANE_COUNT).unwrap()
    }

    pub fn with_lanes(center: f64, width: f64, lane_count: usize) -> Result<Self, Box<dyn Error>> {
        if lane_count == 0 {
            return Err("road needs at least one lane".into());
        }

        let left = center - width / 2.;
        let right = center + width / 2.;
        let borders = [
            Chain(vec![
                Point::new(left, -BORDER_REACH),
                Point::new(left, BORDER_REACH),
            ]),
            Chain(vec![
                Point::new(right, -BORDER_REACH),
                Point::new(right, BORDER_REACH),
            ]),
        ];

        Ok(Self {
            center,
            width,
            lane_count,
            borders,
        })
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// The x coordinate of the center of lane `lane` (0-indexed from the
    /// left). Out-of-range indices clamp to the outermost lanes.
    pub fn lane_center(&self, lane: usize) -> f64 {
        let lane_width = self.width / self.lane_count as f64;
        let lane = lane.min(self.lane_count - 1);
        self.center - self.width / 2. + lane_width * (lane as f64 + 0.5)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_f64_approx;

    #[test]
    fn test_lane_centers_evenly_spaced() {
        let road = Road::with_lanes(100., 180., 3).unwrap();
        let lane_width = 180. / 3.;
        for i in 0..2 {
            assert_f64_approx!(
                road.lane_center(i + 1) - road.lane_center(i),
                lane_width
            );
        }
        assert!(road.lane_center(0) < road.lane_center(2));
        assert_f64_approx!(road.lane_center(1), 100.);
    }

    #[test]
    fn test_lane_index_clamps() {
        let road = Road::with_lanes(100., 180., 3).unwrap();
        assert_f64_approx!(road.lane_center(7), road.lane_center(2));
    }

    #[test]
    fn test_borders_offset_from_center() {
        let road = Road::new(100., 180.);
        assert_f64_approx!(road.borders[0].0[0].x, 10.);
        assert_f64_approx!(road.borders[1].0[0].x, 190.);
        // each border is an open chain of a single segment
        assert_eq!(road.borders[0].edges().count(), 1);
    }

    #[test]
    fn test_zero_lanes_rejected() {
        assert!(Road::with_lanes(100., 180., 0).is_err());
    }
}
