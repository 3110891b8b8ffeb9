//! Race state and core simulation types
//!
//! Everything the stepper mutates lives here. All types are serializable so a
//! host can snapshot or ship state across a wire.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::SeededRng;
use crate::consts::*;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No round in progress; the only legal start state
    Waiting,
    /// Balls are falling
    Playing,
    /// A winner was recorded (or the round voided); terminal for this round
    Finished,
}

/// Obstacle variants, dispatched exhaustively by the stepper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Circular bumper
    Peg,
    /// Rectangular block, destroyed on first contact
    Brick,
    /// Rectangular block, indestructible
    Barrier,
    /// Collision body paired 1:1 with a [`Spinner`]
    Spinner,
    /// Convex polygon (funnel walls, moving triangle)
    Polygon,
}

/// Bounded horizontal oscillation for a moving obstacle
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Oscillation {
    /// Center of the oscillation
    pub origin_x: f32,
    /// Maximum excursion from `origin_x`
    pub amplitude: f32,
    /// Distance moved per step
    pub speed: f32,
    /// Current direction, `1.0` or `-1.0`
    pub dir: f32,
}

/// A course obstacle
///
/// Geometry is immutable after layout; only `destroyed`, and for moving
/// obstacles `pos`/`vertices`/`prev_x`, change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Center position
    pub pos: Vec2,
    /// Bounding width (diameter for circular kinds)
    pub width: f32,
    /// Bounding height (diameter for circular kinds)
    pub height: f32,
    /// Monotonic: set on first brick contact, never cleared
    pub destroyed: bool,
    /// Reserved for multi-hit bricks; bricks are single-hit today
    pub hits: u32,
    /// World-space outline, polygon kind only
    pub vertices: Option<Vec<Vec2>>,
    /// Present only on moving obstacles
    pub motion: Option<Oscillation>,
    /// X position before the last motion update (side-hit bias source)
    pub prev_x: f32,
    /// Synthetic start-pit cap, removed when the round starts
    pub gate: bool,
}

impl Obstacle {
    pub fn peg(pos: Vec2) -> Self {
        let d = 2.0 * (PEG_CONTACT_DIST - BALL_RADIUS);
        Self::new(ObstacleKind::Peg, pos, d, d)
    }

    pub fn brick(pos: Vec2, width: f32, height: f32) -> Self {
        Self::new(ObstacleKind::Brick, pos, width, height)
    }

    pub fn barrier(pos: Vec2, width: f32, height: f32) -> Self {
        Self::new(ObstacleKind::Barrier, pos, width, height)
    }

    /// Collision body for a spinner; the paired [`Spinner`] carries rotation.
    pub fn spinner_body(pos: Vec2) -> Self {
        let d = 2.0 * (SPINNER_CONTACT_DIST - BALL_RADIUS);
        Self::new(ObstacleKind::Spinner, pos, d, d)
    }

    /// Polygon obstacle from a world-space outline. Center and bounds are the
    /// outline's bounding box.
    pub fn polygon(vertices: Vec<Vec2>) -> Self {
        let (min, max) = bounds(&vertices);
        let mut ob = Self::new(
            ObstacleKind::Polygon,
            (min + max) * 0.5,
            max.x - min.x,
            max.y - min.y,
        );
        ob.vertices = Some(vertices);
        ob
    }

    /// Full-width cap over the start pit. Exists only while `Waiting`.
    pub fn gate(pos: Vec2, width: f32) -> Self {
        let mut ob = Self::new(ObstacleKind::Barrier, pos, width, 20.0);
        ob.gate = true;
        ob
    }

    fn new(kind: ObstacleKind, pos: Vec2, width: f32, height: f32) -> Self {
        Self {
            kind,
            pos,
            width,
            height,
            destroyed: false,
            hits: 0,
            vertices: None,
            motion: None,
            prev_x: pos.x,
            gate: false,
        }
    }

    /// Attach a bounded oscillation centered on the current position.
    pub fn with_motion(mut self, amplitude: f32, speed: f32) -> Self {
        self.motion = Some(Oscillation {
            origin_x: self.pos.x,
            amplitude,
            speed,
            dir: 1.0,
        });
        self
    }

    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f32 {
        self.height / 2.0
    }

    /// Advance the oscillation by one step, flipping direction at the bounds.
    /// Records `prev_x` so side collisions can read the recent motion. No-op
    /// for static obstacles.
    pub fn advance_motion(&mut self) {
        let Some(osc) = &mut self.motion else {
            return;
        };
        self.prev_x = self.pos.x;
        if (self.pos.x + osc.speed * osc.dir - osc.origin_x).abs() > osc.amplitude {
            osc.dir = -osc.dir;
        }
        let dx = osc.speed * osc.dir;
        self.pos.x += dx;
        if let Some(verts) = &mut self.vertices {
            for v in verts {
                v.x += dx;
            }
        }
    }
}

fn bounds(vertices: &[Vec2]) -> (Vec2, Vec2) {
    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);
    for v in vertices {
        min = min.min(*v);
        max = max.max(*v);
    }
    (min, max)
}

/// Decorative cross paired with a `Spinner`-kind obstacle at the same spot
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Spinner {
    pub pos: Vec2,
    /// Radians; advances a fixed amount per step
    pub rotation: f32,
}

impl Spinner {
    pub fn new(pos: Vec2) -> Self {
        Self { pos, rotation: 0.0 }
    }

    pub fn spin(&mut self) {
        self.rotation += SPINNER_SPIN_RATE;
    }
}

/// A racing ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// Stable id derived from seed + spawn index
    pub id: String,
    /// Owning participant
    pub player_id: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub finished: bool,
    pub bounce_count: u32,
    /// Rolling mode: pinned atop the obstacle named by `surface`
    pub on_surface: bool,
    /// Index handle into the obstacle list, never a pointer. Cleared when the
    /// ball leaves the surface or the obstacle is destroyed.
    pub surface: Option<usize>,
}

impl Ball {
    pub fn new(id: String, player_id: String, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            player_id,
            pos,
            vel,
            finished: false,
            bounce_count: 0,
            on_surface: false,
            surface: None,
        }
    }

    /// Drop off the supporting surface and resume free flight.
    pub fn leave_surface(&mut self) {
        self.on_surface = false;
        self.surface = None;
        self.vel.y = FALL_SEED_VY;
    }
}

/// One entrant in the round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub player_id: String,
    pub ball_count: u32,
}

/// The round's outcome, immutable once recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub ball_id: String,
    pub player_id: String,
}

/// Events surfaced to the host (audio/FX/notification), drained each frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A ball struck an obstacle
    Collision {
        ball_id: String,
        /// Index into the course obstacle list
        obstacle_index: usize,
        kind: ObstacleKind,
    },
    /// A ball entered the death band
    BallDied { ball_id: String },
    /// First ball crossed the finish line
    RoundWon { ball_id: String, player_id: String },
    /// Every ball died with no winner
    RoundVoid,
}

/// Generated course geometry plus world dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub obstacles: Vec<Obstacle>,
    pub spinners: Vec<Spinner>,
    /// Checkerboard finish stripe tile centers (render-only, no collision)
    pub finish_tiles: Vec<Vec2>,
    pub width: f32,
    /// Total vertical extent
    pub height: f32,
    /// Finish threshold: first ball past this wins
    pub win_y: f32,
    /// Start of the death band (band height is fixed)
    pub death_y: f32,
    /// Height of the pre-round holding pit
    pub start_pit_height: f32,
}

impl Course {
    pub fn empty() -> Self {
        Self {
            obstacles: Vec::new(),
            spinners: Vec::new(),
            finish_tiles: Vec::new(),
            width: 0.0,
            height: 0.0,
            win_y: 0.0,
            death_y: 0.0,
            start_pit_height: 0.0,
        }
    }
}

/// Complete mutable world for one round (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceState {
    pub phase: RoundPhase,
    pub course: Course,
    /// Active balls in spawn order, plus the retained winner once finished
    pub balls: Vec<Ball>,
    pub winner: Option<Winner>,
    pub rng: SeededRng,
    /// Fixed steps executed this round
    pub step_count: u64,
    /// Pending events, drained by the host
    pub events: Vec<SimEvent>,
}

impl RaceState {
    pub fn new() -> Self {
        Self {
            phase: RoundPhase::Waiting,
            course: Course::empty(),
            balls: Vec::new(),
            winner: None,
            rng: SeededRng::new(""),
            step_count: 0,
            events: Vec::new(),
        }
    }

    /// Record the round's winner. First write wins; later calls are ignored
    /// so the outcome can never change once set.
    pub fn record_winner(&mut self, ball_id: &str, player_id: &str) {
        if self.winner.is_some() {
            return;
        }
        self.winner = Some(Winner {
            ball_id: ball_id.to_string(),
            player_id: player_id.to_string(),
        });
        self.phase = RoundPhase::Finished;
        self.events.push(SimEvent::RoundWon {
            ball_id: ball_id.to_string(),
            player_id: player_id.to_string(),
        });
    }
}

impl Default for RaceState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_is_write_once() {
        let mut state = RaceState::new();
        state.record_winner("b-0", "p1");
        state.record_winner("b-1", "p2");
        let winner = state.winner.expect("winner recorded");
        assert_eq!(winner.ball_id, "b-0");
        assert_eq!(winner.player_id, "p1");
        assert_eq!(state.phase, RoundPhase::Finished);
    }

    #[test]
    fn test_oscillation_flips_at_bounds() {
        let mut ob =
            Obstacle::polygon(vec![Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0), Vec2::new(10.0, 20.0)])
                .with_motion(5.0, 2.0);
        let origin = ob.pos.x;
        let mut above = false;
        let mut below = false;
        for _ in 0..100 {
            ob.advance_motion();
            assert!((ob.pos.x - origin).abs() <= 5.0 + 2.0);
            above |= ob.pos.x > origin;
            below |= ob.pos.x < origin;
        }
        // ±5 travel at 2/step must sweep both sides of the origin in 100 steps
        assert!(above && below);
    }

    #[test]
    fn test_polygon_bounds() {
        let ob = Obstacle::polygon(vec![
            Vec2::new(10.0, 10.0),
            Vec2::new(50.0, 10.0),
            Vec2::new(30.0, 40.0),
        ]);
        assert_eq!(ob.pos, Vec2::new(30.0, 25.0));
        assert_eq!(ob.width, 40.0);
        assert_eq!(ob.height, 30.0);
    }

    #[test]
    fn test_moving_vertices_track_position() {
        let mut ob =
            Obstacle::polygon(vec![Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0), Vec2::new(10.0, 20.0)])
                .with_motion(50.0, 3.0);
        let before = ob.vertices.clone().expect("polygon outline");
        ob.advance_motion();
        let after = ob.vertices.clone().expect("polygon outline");
        for (a, b) in before.iter().zip(&after) {
            assert!(((b.x - a.x) - 3.0).abs() < 1e-6);
            assert_eq!(a.y, b.y);
        }
        assert_eq!(ob.prev_x, 10.0);
        assert_eq!(ob.pos.x, 13.0);
    }
}
