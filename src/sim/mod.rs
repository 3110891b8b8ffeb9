//! Deterministic race simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, consumed in a defined order
//! - Stable iteration order (balls in spawn order, obstacles in layout order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod course;
pub mod rng;
pub mod runner;
pub mod state;
pub mod step;

pub use collision::{circle_circle, circle_polygon, circle_rect, reflect, Contact, RectFace};
pub use course::{build_course, BlockFn, BlockSection, BLOCK_LIBRARY};
pub use rng::SeededRng;
pub use runner::Simulation;
pub use state::{
    Ball, Course, Obstacle, ObstacleKind, Participant, RaceState, RoundPhase, SimEvent, Spinner,
    Winner,
};
pub use step::step;
