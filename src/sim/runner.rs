//! Simulation runner
//!
//! Owns one round's state and drives the stepper at the cadence the host
//! asks for: wall-clock accumulated real time, or raw fixed-step batches for
//! fast-forward and headless prediction. Both paths execute the identical
//! stepping code; equal step counts from equal starting state always land on
//! the identical final state.
//!
//! A host that wants a live round and a prediction of the same round runs two
//! independent `Simulation` instances built from the same inputs; there is no
//! shared state to contaminate.

use glam::Vec2;

use super::course::build_course;
use super::rng::SeededRng;
use super::state::{Ball, Course, Participant, RaceState, RoundPhase, SimEvent, Winner};
use super::step::step;
use crate::consts::*;

/// Tolerance absorbing float residue when chunked wall-clock deltas sum to an
/// exact number of steps
const ACCUMULATOR_EPSILON: f64 = 1e-6;

/// One race round, `Waiting -> Playing -> Finished`
#[derive(Debug)]
pub struct Simulation {
    state: RaceState,
    world_width: f32,
    accumulator_ms: f64,
}

impl Simulation {
    pub fn new() -> Self {
        Self::with_width(DEFAULT_WORLD_WIDTH)
    }

    pub fn with_width(world_width: f32) -> Self {
        Self {
            state: RaceState::new(),
            world_width,
            accumulator_ms: 0.0,
        }
    }

    /// Start a round: build the course, spawn balls, open the gate.
    ///
    /// Starting while a round is in progress is an implicit reset-then-start;
    /// state never partially overlaps between rounds. Participants with a
    /// zero ball count are skipped.
    pub fn start(&mut self, seed: &str, course_spec: Option<&[usize]>, participants: &[Participant]) {
        if self.state.phase != RoundPhase::Waiting {
            self.reset();
        }

        let course = build_course(course_spec, self.world_width);
        let mut rng = SeededRng::new(seed);
        let mut balls = Vec::new();

        let mut index = 0u32;
        for participant in participants {
            if participant.ball_count == 0 {
                log::debug!("participant {} has no balls, skipping", participant.player_id);
                continue;
            }
            for _ in 0..participant.ball_count {
                // Draw order is contractual: offset first, then velocity
                let offset = (rng.next_f32() - 0.5) * course.width * 0.5;
                let vx = (rng.next_f32() - 0.5) * 6.0;
                let x = (course.width / 2.0 + offset).clamp(BALL_RADIUS, course.width - BALL_RADIUS);
                let row = index / 6;
                let y = course.start_pit_height - BALL_RADIUS - 8.0 - row as f32 * 52.0;
                balls.push(Ball::new(
                    format!("{seed}-{index}"),
                    participant.player_id.clone(),
                    Vec2::new(x, y),
                    Vec2::new(vx, 0.0),
                ));
                index += 1;
            }
        }

        log::info!(
            "round start: seed={seed} participants={} balls={}",
            participants.len(),
            balls.len()
        );

        self.state = RaceState {
            phase: RoundPhase::Playing,
            course,
            balls,
            winner: None,
            rng,
            step_count: 0,
            events: Vec::new(),
        };
        // The gate only ever caps the pre-round holding pit
        self.state.course.obstacles.retain(|ob| !ob.gate);
        self.accumulator_ms = 0.0;
    }

    /// Discard the round and return to `Waiting`.
    pub fn reset(&mut self) {
        self.state = RaceState::new();
        self.accumulator_ms = 0.0;
    }

    /// Real-time driving: accumulate host elapsed time and execute as many
    /// fixed steps as fit. A single delta is capped so a stalled host never
    /// triggers runaway catch-up. No-op unless `Playing`.
    pub fn advance_realtime(&mut self, elapsed_ms: f64) {
        if self.state.phase != RoundPhase::Playing {
            return;
        }
        self.accumulator_ms += elapsed_ms.clamp(0.0, MAX_ELAPSED_MS);
        while self.accumulator_ms + ACCUMULATOR_EPSILON >= STEP_MS {
            step(&mut self.state);
            self.accumulator_ms -= STEP_MS;
            if self.state.phase != RoundPhase::Playing {
                break;
            }
        }
    }

    /// Accelerated driving: execute `count` fixed steps back-to-back with no
    /// pacing. Stops early once the round finishes. No-op unless `Playing`.
    pub fn advance_fixed_steps(&mut self, count: u32) {
        for _ in 0..count {
            if self.state.phase != RoundPhase::Playing {
                return;
            }
            step(&mut self.state);
        }
    }

    /// Headless prediction: run until the round finishes or the cap is hit,
    /// returning the recorded winner if any.
    pub fn run_to_completion(&mut self, max_steps: u32) -> Option<Winner> {
        self.advance_fixed_steps(max_steps);
        if self.state.phase == RoundPhase::Playing {
            log::warn!("round still running after {max_steps} steps");
        }
        self.state.winner.clone()
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    pub fn balls(&self) -> &[Ball] {
        &self.state.balls
    }

    pub fn course(&self) -> &Course {
        &self.state.course
    }

    pub fn winner(&self) -> Option<&Winner> {
        self.state.winner.as_ref()
    }

    pub fn step_count(&self) -> u64 {
        self.state.step_count
    }

    /// Take all pending events (collision, death, win, void).
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.state.events)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participants() -> Vec<Participant> {
        vec![
            Participant {
                player_id: "p1".to_string(),
                ball_count: 1,
            },
            Participant {
                player_id: "p2".to_string(),
                ball_count: 2,
            },
        ]
    }

    fn snapshot(sim: &Simulation) -> String {
        serde_json::to_string(&(sim.balls(), sim.winner(), sim.step_count()))
            .expect("serialize snapshot")
    }

    #[test]
    fn test_start_spawns_per_ball_count() {
        let mut sim = Simulation::new();
        sim.start("abc123", Some(&[3, 4, 1]), &participants());

        assert_eq!(sim.phase(), RoundPhase::Playing);
        assert_eq!(sim.balls().len(), 3);
        let ids: Vec<_> = sim.balls().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["abc123-0", "abc123-1", "abc123-2"]);
        assert_eq!(sim.balls()[0].player_id, "p1");
        assert_eq!(sim.balls()[1].player_id, "p2");
        assert_eq!(sim.balls()[2].player_id, "p2");
        // Gate is gone once the round starts
        assert!(sim.course().obstacles.iter().all(|ob| !ob.gate));
    }

    #[test]
    fn test_zero_count_participants_skipped() {
        let mut sim = Simulation::new();
        let entrants = vec![
            Participant {
                player_id: "empty".to_string(),
                ball_count: 0,
            },
            Participant {
                player_id: "p1".to_string(),
                ball_count: 2,
            },
        ];
        sim.start("seed", Some(&[0]), &entrants);
        assert_eq!(sim.balls().len(), 2);
        assert!(sim.balls().iter().all(|b| b.player_id == "p1"));
    }

    #[test]
    fn test_drive_before_start_is_noop() {
        let mut sim = Simulation::new();
        sim.advance_realtime(100.0);
        sim.advance_fixed_steps(50);
        assert_eq!(sim.phase(), RoundPhase::Waiting);
        assert_eq!(sim.step_count(), 0);
    }

    #[test]
    fn test_start_while_playing_resets_first() {
        let mut sim = Simulation::new();
        sim.start("first", Some(&[0]), &participants());
        sim.advance_fixed_steps(100);
        assert!(sim.step_count() > 0);

        sim.start("second", Some(&[0]), &participants());
        assert_eq!(sim.step_count(), 0);
        assert!(sim.balls().iter().all(|b| b.id.starts_with("second-")));
    }

    #[test]
    fn test_elapsed_delta_is_capped() {
        let mut sim = Simulation::new();
        sim.start("cap", Some(&[0]), &participants());
        // A 5 s stall only advances one capped second of simulated time
        sim.advance_realtime(5000.0);
        assert_eq!(sim.step_count(), 60);
    }

    #[test]
    fn test_determinism_across_fresh_runs() {
        let mut a = Simulation::new();
        let mut b = Simulation::new();
        a.start("abc123", Some(&[3, 4, 1]), &participants());
        b.start("abc123", Some(&[3, 4, 1]), &participants());

        a.advance_fixed_steps(500);
        b.advance_fixed_steps(500);

        assert_eq!(snapshot(&a), snapshot(&b));
    }

    #[test]
    fn test_realtime_matches_fixed_steps() {
        let mut fixed = Simulation::new();
        let mut realtime = Simulation::new();
        fixed.start("abc123", Some(&[0, 1]), &participants());
        realtime.start("abc123", Some(&[0, 1]), &participants());

        fixed.advance_fixed_steps(300);
        // Same simulated span delivered in irregular wall-clock chunks, each
        // below the one-second delta cap so no time is discarded
        for chunk in [60u32, 1, 17, 30, 2, 50, 40, 50, 50] {
            realtime.advance_realtime(chunk as f64 * STEP_MS);
        }

        assert_eq!(realtime.step_count(), fixed.step_count());
        assert_eq!(snapshot(&fixed), snapshot(&realtime));
    }

    #[test]
    fn test_scenario_single_reproducible_winner() {
        let mut live = Simulation::new();
        live.start("abc123", Some(&[3, 4, 1]), &participants());
        let winner = live
            .run_to_completion(20_000)
            .expect("one ball reaches the finish line");

        let ids = ["abc123-0", "abc123-1", "abc123-2"];
        assert!(ids.contains(&winner.ball_id.as_str()));
        assert_eq!(live.phase(), RoundPhase::Finished);

        // Prediction instance built from identical inputs agrees
        let mut predicted = Simulation::new();
        predicted.start("abc123", Some(&[3, 4, 1]), &participants());
        let predicted_winner = predicted
            .run_to_completion(20_000)
            .expect("prediction finds the same outcome");
        assert_eq!(winner, predicted_winner);
    }

    #[test]
    fn test_winner_never_changes_after_finish() {
        let mut sim = Simulation::new();
        sim.start("abc123", Some(&[1]), &participants());
        let winner = sim.run_to_completion(20_000);
        let after = sim.run_to_completion(1_000);
        assert_eq!(winner, after);
    }

    #[test]
    fn test_events_are_drained() {
        let mut sim = Simulation::new();
        sim.start("abc123", Some(&[0]), &participants());
        sim.advance_fixed_steps(2_000);
        let events = sim.drain_events();
        assert!(!events.is_empty(), "a falling round produces collisions");
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn test_reset_returns_to_waiting() {
        let mut sim = Simulation::new();
        sim.start("abc123", Some(&[0]), &participants());
        sim.advance_fixed_steps(10);
        sim.reset();
        assert_eq!(sim.phase(), RoundPhase::Waiting);
        assert!(sim.balls().is_empty());
        assert_eq!(sim.step_count(), 0);
    }
}
