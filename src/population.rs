//! A generation of learners and the scripted traffic they dodge, all on one
//! road. Ticking the population advances traffic first, then every learner
//! against the traffic's fresh polygons, then refreshes a live best-so-far
//! pointer. Generations have no in-core boundary: the external driver decides
//! when to persist the champion's brain and reseed.

use crate::constants::{CAR_HEIGHT, CAR_WIDTH, CONTROL_OUTPUTS};
use crate::geometry::Polygon;
use crate::network::FeedForward;
use crate::road::Road;
use crate::vehicle::Vehicle;
use rand::RngCore;
use std::{error::Error, path::Path};

pub struct Population {
    pub road: Road,
    pub learners: Vec<Vehicle>,
    pub traffic: Vec<Vehicle>,
    best: usize,
}

impl Population {
    /// `count` freshly randomized learners sharing one start pose at
    /// `lane_center(lane)`, y = `start_y`. `layer_sizes` shapes every brain;
    /// its ends must match the learners' sensor and control widths.
    pub fn new(
        road: Road,
        count: usize,
        lane: usize,
        start_y: f64,
        layer_sizes: &[usize],
        rng: &mut impl RngCore,
    ) -> Result<Self, Box<dyn Error>> {
        if count == 0 {
            return Err("population needs at least one learner".into());
        }

        let x = road.lane_center(lane);
        let learners = (0..count)
            .map(|_| {
                let brain = FeedForward::new(layer_sizes, rng)?;
                Vehicle::learner(x, start_y, brain)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            road,
            learners,
            traffic: Vec::new(),
            best: 0,
        })
    }

    /// Add one scripted obstacle at `lane_center(lane)`, y = `y`.
    pub fn push_traffic(&mut self, lane: usize, y: f64, max_speed: f64) {
        let x = self.road.lane_center(lane);
        self.traffic
            .push(Vehicle::scripted(x, y, CAR_WIDTH, CAR_HEIGHT, max_speed));
    }

    /// Clone `brain` into every learner, then mutate all but learner 0 so
    /// the generation explores a neighborhood around the seed while keeping
    /// one unmutated elite. Rejects a brain whose widths do not fit the
    /// learners before touching any of them.
    pub fn seed(
        &mut self,
        brain: &FeedForward,
        amount: f64,
        rng: &mut impl RngCore,
    ) -> Result<(), Box<dyn Error>> {
        if brain.output_count() != CONTROL_OUTPUTS {
            return Err(format!(
                "seed brain emits {} outputs, controls need {CONTROL_OUTPUTS}",
                brain.output_count()
            )
            .into());
        }
        for learner in &self.learners {
            if let Some(sensor) = learner.sensor.as_ref() {
                if brain.input_count() != sensor.ray_count() {
                    return Err(format!(
                        "seed brain reads {} inputs but the sensor casts {} rays",
                        brain.input_count(),
                        sensor.ray_count()
                    )
                    .into());
                }
            }
        }

        for (idx, learner) in self.learners.iter_mut().enumerate() {
            let mut clone = brain.clone();
            if idx != 0 {
                clone.mutate(amount, rng);
            }
            learner.brain = Some(clone);
        }
        Ok(())
    }

    /// Seed the fleet from a brain persisted by [Population::save_best].
    pub fn seed_from_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        amount: f64,
        rng: &mut impl RngCore,
    ) -> Result<(), Box<dyn Error>> {
        let brain = FeedForward::from_file(path)?;
        self.seed(&brain, amount, rng)
    }

    /// Persist the current best learner's brain as JSON.
    pub fn save_best<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        match self.best().brain.as_ref() {
            Some(brain) => brain.to_file(path),
            None => Err("best learner carries no brain".into()),
        }
    }

    /// Advance the whole population by one tick. Traffic moves first, so
    /// learners sense and collide against every obstacle's polygon as of the
    /// end of this tick.
    pub fn tick(&mut self) -> Result<(), Box<dyn Error>> {
        for obstacle in self.traffic.iter_mut() {
            obstacle.update(&self.road.borders, &[])?;
        }

        let obstacle_polygons: Vec<Polygon> = self
            .traffic
            .iter()
            .map(|obstacle| obstacle.polygon.clone())
            .collect();

        for learner in self.learners.iter_mut() {
            learner.update(&self.road.borders, &obstacle_polygons)?;
        }

        // live leaderboard: minimum y wins, damaged or not, and on a tie the
        // earlier learner keeps the spot
        self.best = self
            .learners
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.y.total_cmp(&b.y))
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        Ok(())
    }

    pub fn best_index(&self) -> usize {
        self.best
    }

    pub fn best(&self) -> &Vehicle {
        &self.learners[self.best]
    }

    pub fn best_brain(&self) -> Option<&FeedForward> {
        self.best().brain.as_ref()
    }
}
