pub mod constants;
pub mod controls;
pub mod geometry;
pub mod macros;
pub mod network;
pub mod population;
pub mod random;
pub mod road;
pub mod sensor;
pub mod vehicle;

pub use controls::{ControlMode, Controls};
pub use geometry::{lerp, segment_intersection, Chain, Point, Polygon};
pub use network::{FeedForward, Level};
pub use population::Population;
pub use road::Road;
pub use sensor::{Reading, Sensor};
pub use vehicle::{Pose, Vehicle};
