//! Cave game simulation modules

pub mod geometry;
pub mod session;
pub mod sim;

pub use geometry::{SharedGeometry, TunnelGeometry, WallSegment};
pub use session::{GameSession, SessionHandle, SessionSummary};
pub use sim::{Phase, Simulation};

/// Logical play field dimensions, in abstract pixel units
pub const CANVAS_WIDTH: f64 = 500.0;
pub const CANVAS_HEIGHT: f64 = 500.0;

/// Horizontal position of the tunnel center line
pub const CENTER_X: f64 = CANVAS_WIDTH / 2.0;

/// Drone collision box edge length
pub const DRONE_SIZE: f64 = 20.0;
/// Starting lateral position (centered)
pub const DRONE_START_X: f64 = CANVAS_WIDTH / 2.0 - DRONE_SIZE / 2.0;
/// Fixed vertical position of the drone's top edge
pub const DRONE_TOP_Y: f64 = 20.0;

/// Vertical extent of one tunnel segment
pub const SEGMENT_HEIGHT: f64 = 10.0;

/// Lateral speed magnitude while a steering key is held
pub const LATERAL_SPEED: f64 = 4.0;
/// Scroll speed set by the first speed-up input
pub const INITIAL_SCROLL_SPEED: f64 = 1.0;
/// Scroll speed ceiling
pub const MAX_SCROLL_SPEED: f64 = 10.0;

/// Per-tick score multiplier
pub const SCORE_MULTIPLIER: f64 = 10.0;

/// Distance from the last segment at which the run counts as won
pub const WIN_MARGIN: f64 = 20.0;

/// How far the drone may overlap a wall before the hit registers
pub const COLLISION_TOLERANCE: f64 = DRONE_SIZE;

/// Edge-triggered player input delivered to the simulation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Left arrow pressed: steer left
    LeftPressed,
    /// Left arrow released
    LeftReleased,
    /// Right arrow pressed: steer right
    RightPressed,
    /// Right arrow released
    RightReleased,
    /// Down arrow: increase scroll speed
    SpeedUp,
    /// Up arrow: decrease scroll speed
    SlowDown,
    /// Abandon the session
    Quit,
}
