//! Control signals and where they come from. A vehicle reads the same four
//! booleans every tick no matter who wrote them.

/// The active control booleans. Plain data: manual vehicles have these
/// mutated by an input collaborator, scripted traffic keeps them fixed, and
/// autonomous vehicles overwrite them from network output each tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub forward: bool,
    pub left: bool,
    pub right: bool,
    pub reverse: bool,
}

impl Controls {
    /// Constant-forward, as held by obstacle traffic.
    pub fn forward_only() -> Self {
        Self {
            forward: true,
            ..Self::default()
        }
    }
}

/// Who steers a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// An external input source flips the booleans; the core only reads them.
    Manual,
    /// Fixed forward-only controls, never rewritten.
    Scripted,
    /// Controls are overwritten from the brain's output every update.
    Autonomous,
}
