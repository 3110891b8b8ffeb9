//! Drop Derby - deterministic obstacle-course ball race engine
//!
//! Core module:
//! - `sim`: Deterministic simulation (course layout, physics, runner)
//!
//! The engine is a pure function of `(seed, course spec, participants, step
//! count)`: the host drives it with wall-clock deltas or raw step counts and
//! reads back snapshots/events. Rendering, audio and networking live in the
//! host, not here.

pub mod sim;

pub use sim::{Participant, RoundPhase, SimEvent, Simulation, Winner};

/// Engine tuning constants
///
/// Integration constants are per fixed step, not per second; the fixed step
/// itself is 1/60 s of simulated time. These values are exact contracts:
/// changing any of them changes every trajectory.
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const STEP_MS: f64 = 1000.0 / 60.0;
    /// Cap on a single reported wall-clock delta (prevents runaway catch-up)
    pub const MAX_ELAPSED_MS: f64 = 1000.0;

    /// Ball radius (world units)
    pub const BALL_RADIUS: f32 = 24.0;
    /// Downward acceleration per step
    pub const GRAVITY: f32 = 0.08;
    /// Velocity damping per step (both axes)
    pub const DAMPING: f32 = 0.9998;

    /// Peg contact distance (peg radius + ball radius)
    pub const PEG_CONTACT_DIST: f32 = 36.0;
    /// Spinner contact distance (spinner footprint radius + ball radius)
    pub const SPINNER_CONTACT_DIST: f32 = 48.0;
    /// Ball-ball contact distance (two ball radii)
    pub const BALL_CONTACT_DIST: f32 = 48.0;

    /// Restitution for peg bounces
    pub const PEG_RESTITUTION: f32 = 0.95;
    /// Restitution for barrier/brick/polygon surfaces
    pub const SURFACE_RESTITUTION: f32 = 0.9;
    /// Restitution for world side walls
    pub const WALL_RESTITUTION: f32 = 0.95;
    /// Restitution for ball-ball impacts
    pub const BALL_RESTITUTION: f32 = 0.92;

    /// Rolling friction per step while on a surface
    pub const ROLL_FRICTION: f32 = 0.997;
    /// Horizontal speed below which rolling snaps to rest
    pub const ROLL_STOP_THRESHOLD: f32 = 0.03;
    /// Amplitude of the RNG nudge applied to a stalled rolling ball
    pub const ROLL_NUDGE: f32 = 2.4;
    /// Downward seed velocity when a ball leaves its supporting surface
    pub const FALL_SEED_VY: f32 = 2.0;

    /// Tangential impulse injected by a spinner hit
    pub const SPINNER_TANGENT_IMPULSE: f32 = 1.6;
    /// Radial damping applied by a spinner hit
    pub const SPINNER_RADIAL_DAMP: f32 = 0.75;
    /// Spinner rotation per step (radians)
    pub const SPINNER_SPIN_RATE: f32 = 0.08;
    /// Side-hit velocity bias per unit of obstacle motion
    pub const MOVING_HIT_BIAS: f32 = 0.5;

    /// Vertical gap between course blocks
    pub const BLOCK_GAP: f32 = 150.0;
    /// Height of the pre-round holding pit
    pub const START_PIT_HEIGHT: f32 = 260.0;
    /// Distance from the finish line to the start of the death band
    pub const DEATH_DROP: f32 = 200.0;
    /// Height of the death band
    pub const DEATH_BAND: f32 = 30.0;

    /// Default course width
    pub const DEFAULT_WORLD_WIDTH: f32 = 1200.0;
}
