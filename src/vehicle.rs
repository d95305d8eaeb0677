//! Vehicle kinematics, the oriented collision polygon, and the sticky damage
//! state. A vehicle is a two-state machine: active until its polygon crosses
//! a border or another vehicle, then damaged and frozen forever.

use crate::constants::{
    ACCELERATION, CAR_HEIGHT, CAR_WIDTH, CONTROL_OUTPUTS, FRICTION, MAX_SPEED, RAY_COUNT,
    RAY_LENGTH, RAY_SPREAD, STEER_STEP,
};
use crate::controls::{ControlMode, Controls};
use crate::geometry::{Chain, Point, Polygon};
use crate::network::FeedForward;
use crate::sensor::Sensor;
use std::error::Error;

/// Position plus heading, in the convention where heading 0 points toward
/// negative y and positive headings rotate toward negative x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    pub speed: f64,
    acceleration: f64,
    max_speed: f64,
    friction: f64,
    pub damaged: bool,
    pub polygon: Polygon,
    pub controls: Controls,
    pub mode: ControlMode,
    pub sensor: Option<Sensor>,
    pub brain: Option<FeedForward>,
    /// Whether a damaged vehicle keeps recasting its sensor for observers.
    /// Motion and damage stay frozen either way, and the brain is never
    /// evaluated while damaged.
    pub refresh_sensor_when_damaged: bool,
}

impl Vehicle {
    fn base(x: f64, y: f64, width: f64, height: f64, max_speed: f64, mode: ControlMode) -> Self {
        let mut vehicle = Self {
            x,
            y,
            width,
            height,
            angle: 0.,
            speed: 0.,
            acceleration: ACCELERATION,
            max_speed,
            friction: FRICTION,
            damaged: false,
            polygon: Polygon(Vec::new()),
            controls: match mode {
                ControlMode::Scripted => Controls::forward_only(),
                _ => Controls::default(),
            },
            mode,
            sensor: None,
            brain: None,
            refresh_sensor_when_damaged: false,
        };
        vehicle.polygon = vehicle.make_polygon();
        vehicle
    }

    /// A vehicle steered by an external input source. Carries a sensor for
    /// observers but no brain.
    pub fn manual(x: f64, y: f64, width: f64, height: f64) -> Self {
        let mut vehicle = Self::base(x, y, width, height, MAX_SPEED, ControlMode::Manual);
        // default sensor configuration is always valid
        vehicle.sensor = Some(Sensor::new(RAY_COUNT, RAY_LENGTH, RAY_SPREAD).unwrap());
        vehicle
    }

    /// Obstacle traffic: constant forward, no sensor, no brain.
    pub fn scripted(x: f64, y: f64, width: f64, height: f64, max_speed: f64) -> Self {
        Self::base(x, y, width, height, max_speed, ControlMode::Scripted)
    }

    /// A learner steering itself from `brain`. The brain must read one input
    /// per sensor ray and emit the four control signals.
    pub fn autonomous(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        brain: FeedForward,
    ) -> Result<Self, Box<dyn Error>> {
        let sensor = Sensor::new(RAY_COUNT, RAY_LENGTH, RAY_SPREAD)?;
        if brain.input_count() != sensor.ray_count() {
            return Err(format!(
                "brain reads {} inputs but the sensor casts {} rays",
                brain.input_count(),
                sensor.ray_count()
            )
            .into());
        }
        if brain.output_count() != CONTROL_OUTPUTS {
            return Err(format!(
                "brain emits {} outputs, controls need {CONTROL_OUTPUTS}",
                brain.output_count()
            )
            .into());
        }

        let mut vehicle = Self::base(x, y, width, height, MAX_SPEED, ControlMode::Autonomous);
        vehicle.sensor = Some(sensor);
        vehicle.brain = Some(brain);
        Ok(vehicle)
    }

    /// A learner with the default chassis dimensions.
    pub fn learner(x: f64, y: f64, brain: FeedForward) -> Result<Self, Box<dyn Error>> {
        Self::autonomous(x, y, CAR_WIDTH, CAR_HEIGHT, brain)
    }

    pub fn pose(&self) -> Pose {
        Pose {
            x: self.x,
            y: self.y,
            angle: self.angle,
        }
    }

    /// One simulation tick: integrate controls into motion, rebuild the
    /// collision polygon, assess damage, then refresh perception and (for
    /// autonomous vehicles) rewrite the controls from the brain's output.
    /// Once damaged, motion, polygon and damage are frozen; this is a no-op
    /// by policy, not a failure.
    pub fn update(&mut self, borders: &[Chain], traffic: &[Polygon]) -> Result<(), Box<dyn Error>> {
        if !self.damaged {
            self.advance();
            self.polygon = self.make_polygon();
            self.damaged = self.assess_damage(borders, traffic);
        }

        if !self.damaged || self.refresh_sensor_when_damaged {
            let pose = self.pose();
            if let Some(sensor) = self.sensor.as_mut() {
                sensor.update(pose, borders, traffic);
            }
        }

        if self.damaged {
            return Ok(());
        }

        if let (ControlMode::Autonomous, Some(sensor), Some(brain)) =
            (self.mode, self.sensor.as_ref(), self.brain.as_mut())
        {
            brain.step(&sensor.excitations())?;
            let out = brain.output();
            self.controls = Controls {
                forward: out[0] > 0.5,
                left: out[1] > 0.5,
                right: out[2] > 0.5,
                reverse: out[3] > 0.5,
            };
        }

        Ok(())
    }

    fn advance(&mut self) {
        if self.controls.forward {
            self.speed += self.acceleration;
        }
        if self.controls.reverse {
            self.speed -= self.acceleration;
        }

        self.speed = self.speed.clamp(-self.max_speed / 2., self.max_speed);

        // friction decays toward rest and snaps to exactly zero; it never
        // flips the sign of the speed on its own
        if self.speed > 0. {
            self.speed -= self.friction;
        } else if self.speed < 0. {
            self.speed += self.friction;
        }
        if self.speed.abs() < self.friction {
            self.speed = 0.;
        }

        if self.speed != 0. {
            let flip = if self.speed > 0. { 1. } else { -1. };
            if self.controls.left {
                self.angle += STEER_STEP * flip;
            }
            if self.controls.right {
                self.angle -= STEER_STEP * flip;
            }
        }

        self.x -= self.angle.sin() * self.speed;
        self.y -= self.angle.cos() * self.speed;
    }

    /// The four oriented corners from position, heading and chassis size.
    fn make_polygon(&self) -> Polygon {
        let radius = self.width.hypot(self.height) / 2.;
        let spread = self.width.atan2(self.height);

        let corner = |angle: f64| {
            Point::new(
                self.x - angle.sin() * radius,
                self.y - angle.cos() * radius,
            )
        };

        Polygon(vec![
            corner(self.angle - spread),
            corner(self.angle + spread),
            corner(core::f64::consts::PI + self.angle - spread),
            corner(core::f64::consts::PI + self.angle + spread),
        ])
    }

    fn assess_damage(&self, borders: &[Chain], traffic: &[Polygon]) -> bool {
        borders
            .iter()
            .any(|border| self.polygon.intersects_chain(border))
            || traffic.iter().any(|poly| self.polygon.intersects(poly))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_f64_approx;
    use crate::random::WyRng;
    use rulinalg::matrix::Matrix;

    fn open_road() -> [Chain; 2] {
        [
            Chain(vec![Point::new(-1e6, -1e9), Point::new(-1e6, 1e9)]),
            Chain(vec![Point::new(1e6, -1e9), Point::new(1e6, 1e9)]),
        ]
    }

    /// A brain that always outputs exactly {forward}, whatever it senses.
    fn forward_brain() -> FeedForward {
        let level = crate::network::Level::from_parts(
            Matrix::new(RAY_COUNT, CONTROL_OUTPUTS, vec![0.; RAY_COUNT * CONTROL_OUTPUTS]),
            vec![-1., 1., 1., 1.],
        )
        .unwrap();
        FeedForward::from_levels(vec![level]).unwrap()
    }

    #[test]
    fn test_forward_accelerates_up_to_max() {
        let borders = open_road();
        let mut car = Vehicle::scripted(0., 0., CAR_WIDTH, CAR_HEIGHT, MAX_SPEED);
        for _ in 0..100 {
            car.update(&borders, &[]).unwrap();
        }
        assert_f64_approx!(car.speed, MAX_SPEED - FRICTION);
        assert!(car.y < -100.);
    }

    #[test]
    fn test_friction_reaches_exact_rest() {
        let borders = open_road();
        let mut car = Vehicle::manual(0., 0., CAR_WIDTH, CAR_HEIGHT);
        car.speed = 1.;
        for tick in 0..100 {
            car.update(&borders, &[]).unwrap();
            assert!(car.speed >= 0., "friction flipped speed at tick {tick}");
            if car.speed == 0. {
                return;
            }
        }
        panic!("never came to rest");
    }

    #[test]
    fn test_reverse_clamped_to_half_max() {
        let borders = open_road();
        let mut car = Vehicle::manual(0., 0., CAR_WIDTH, CAR_HEIGHT);
        car.controls.reverse = true;
        for _ in 0..100 {
            car.update(&borders, &[]).unwrap();
        }
        assert!(car.speed >= -MAX_SPEED / 2.);
        assert_f64_approx!(car.speed, -(MAX_SPEED / 2. - FRICTION));
        assert!(car.y > 0.);
    }

    #[test]
    fn test_steering_flips_in_reverse() {
        let borders = open_road();

        let mut fwd = Vehicle::manual(0., 0., CAR_WIDTH, CAR_HEIGHT);
        fwd.controls.forward = true;
        fwd.controls.left = true;
        fwd.update(&borders, &[]).unwrap();
        assert_f64_approx!(fwd.angle, STEER_STEP);

        let mut rev = Vehicle::manual(0., 0., CAR_WIDTH, CAR_HEIGHT);
        rev.controls.reverse = true;
        rev.controls.left = true;
        rev.update(&borders, &[]).unwrap();
        assert_f64_approx!(rev.angle, -STEER_STEP);
    }

    #[test]
    fn test_stationary_steering_does_nothing() {
        let borders = open_road();
        let mut car = Vehicle::manual(0., 0., CAR_WIDTH, CAR_HEIGHT);
        car.controls.left = true;
        car.update(&borders, &[]).unwrap();
        assert_f64_approx!(car.angle, 0.);
    }

    #[test]
    fn test_polygon_tracks_pose() {
        let borders = open_road();
        let mut car = Vehicle::scripted(0., 0., CAR_WIDTH, CAR_HEIGHT, MAX_SPEED);
        car.update(&borders, &[]).unwrap();

        assert_eq!(car.polygon.0.len(), 4);
        let cx = car.polygon.0.iter().map(|p| p.x).sum::<f64>() / 4.;
        let cy = car.polygon.0.iter().map(|p| p.y).sum::<f64>() / 4.;
        assert!((cx - car.x).abs() < 1e-9);
        assert!((cy - car.y).abs() < 1e-9);

        // at heading 0 the chassis is axis-aligned
        let xs: Vec<f64> = car.polygon.0.iter().map(|p| p.x).collect();
        let max_x = xs.iter().cloned().fold(f64::MIN, f64::max);
        assert!((max_x - (car.x + CAR_WIDTH / 2.)).abs() < 1e-9);
    }

    #[test]
    fn test_border_crossing_damages() {
        let border = Chain(vec![Point::new(10., -1e6), Point::new(10., 1e6)]);
        let mut car = Vehicle::manual(0., 0., CAR_WIDTH, CAR_HEIGHT);
        car.update(&[border], &[]).unwrap();
        assert!(car.damaged);
    }

    #[test]
    fn test_traffic_overlap_damages() {
        let borders = open_road();
        let mut car = Vehicle::manual(0., 0., CAR_WIDTH, CAR_HEIGHT);
        let overlapping = Vehicle::scripted(10., 10., CAR_WIDTH, CAR_HEIGHT, 0.);
        car.update(&borders, &[overlapping.polygon.clone()]).unwrap();
        assert!(car.damaged);
    }

    #[test]
    fn test_damaged_vehicle_freezes() {
        let border = Chain(vec![Point::new(10., -1e6), Point::new(10., 1e6)]);
        let mut car = Vehicle::manual(0., 0., CAR_WIDTH, CAR_HEIGHT);
        car.controls.forward = true;
        car.update(&[border.clone()], &[]).unwrap();
        assert!(car.damaged);

        let (x, y, speed, angle) = (car.x, car.y, car.speed, car.angle);
        let polygon = car.polygon.clone();
        for _ in 0..10 {
            car.update(&[border.clone()], &[]).unwrap();
        }
        assert_eq!(car.x.to_bits(), x.to_bits());
        assert_eq!(car.y.to_bits(), y.to_bits());
        assert_eq!(car.speed.to_bits(), speed.to_bits());
        assert_eq!(car.angle.to_bits(), angle.to_bits());
        assert_eq!(car.polygon, polygon);
    }

    #[test]
    fn test_damaged_sensor_refresh_is_opt_in() {
        let border = Chain(vec![Point::new(100., -1e6), Point::new(100., 1e6)]);

        let mut frozen = Vehicle::manual(0., 0., CAR_WIDTH, CAR_HEIGHT);
        frozen.update(&[border.clone()], &[]).unwrap();
        assert!(!frozen.damaged);
        let rays = frozen.sensor.as_ref().unwrap().rays.clone();
        assert!(!rays.is_empty());

        frozen.x = 95.; // shove the chassis into the border
        frozen.update(&[border.clone()], &[]).unwrap();
        assert!(frozen.damaged);
        // the fan was not recast, neither now nor on later ticks
        assert_eq!(frozen.sensor.as_ref().unwrap().rays, rays);
        frozen.update(&[border.clone()], &[]).unwrap();
        assert_eq!(frozen.sensor.as_ref().unwrap().rays, rays);

        let mut live = Vehicle::manual(0., 0., CAR_WIDTH, CAR_HEIGHT);
        live.refresh_sensor_when_damaged = true;
        live.x = 95.;
        live.update(&[border.clone()], &[]).unwrap();
        assert!(live.damaged);
        live.x += 5.;
        live.update(&[border], &[]).unwrap();
        assert!((live.sensor.as_ref().unwrap().rays[0].start.x - live.x).abs() < 1e-9);
    }

    #[test]
    fn test_autonomous_brain_drives_controls() {
        let borders = open_road();
        let mut car = Vehicle::learner(0., 0., forward_brain()).unwrap();
        car.update(&borders, &[]).unwrap();

        assert!(car.controls.forward);
        assert!(!car.controls.left && !car.controls.right && !car.controls.reverse);
        // second tick moves under the brain's forward command
        let y = car.y;
        car.update(&borders, &[]).unwrap();
        assert!(car.y < y);
    }

    #[test]
    fn test_autonomous_size_mismatch_rejected() {
        let mut rng = WyRng::seeded(11);
        let narrow = FeedForward::new(&[RAY_COUNT - 1, CONTROL_OUTPUTS], &mut rng).unwrap();
        assert!(Vehicle::autonomous(0., 0., CAR_WIDTH, CAR_HEIGHT, narrow).is_err());

        let wide_out = FeedForward::new(&[RAY_COUNT, 3], &mut rng).unwrap();
        assert!(Vehicle::autonomous(0., 0., CAR_WIDTH, CAR_HEIGHT, wide_out).is_err());
    }
}
