//! Centralized tunables for the simulation and the evolution loop.

use core::f64::consts::FRAC_PI_2;

// Road

/// Default lane count.
pub const LANE_COUNT: usize = 3;

/// How far each border chain extends in both y directions. Far enough that
/// no vehicle ever drives off the end.
pub const BORDER_REACH: f64 = 1e6;

// Vehicle

pub const CAR_WIDTH: f64 = 30.;
pub const CAR_HEIGHT: f64 = 50.;

/// Speed gained per tick of forward control.
pub const ACCELERATION: f64 = 0.2;

/// Top forward speed of a learner. Reverse tops out at half of this.
pub const MAX_SPEED: f64 = 3.;

/// Top speed of scripted obstacle traffic, slower than learners so they can
/// be overtaken.
pub const TRAFFIC_MAX_SPEED: f64 = 2.;

/// Per-tick speed decay toward rest.
pub const FRICTION: f64 = 0.05;

/// Radians of heading change per tick of steering input.
pub const STEER_STEP: f64 = 0.03;

// Sensor

pub const RAY_COUNT: usize = 5;
pub const RAY_LENGTH: f64 = 150.;
pub const RAY_SPREAD: f64 = FRAC_PI_2;

// Brain

/// Width of the single hidden level.
pub const HIDDEN_NEURONS: usize = 6;

/// Output neurons, one per control boolean.
pub const CONTROL_OUTPUTS: usize = 4;

/// Default blend factor applied when seeding a generation from the last
/// champion: each parameter moves 10% of the way toward a fresh draw.
pub const MUTATION_AMOUNT: f64 = 0.1;
