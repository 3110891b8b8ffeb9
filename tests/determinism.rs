//! Cross-cutting determinism properties
//!
//! The engine's one hard promise: identical inputs and step counts produce
//! identical state, no matter how the steps were delivered.

use proptest::prelude::*;

use drop_derby::consts::STEP_MS;
use drop_derby::sim::{Participant, Simulation};

fn participants(counts: &[u32]) -> Vec<Participant> {
    counts
        .iter()
        .enumerate()
        .map(|(i, &ball_count)| Participant {
            player_id: format!("p{i}"),
            ball_count,
        })
        .collect()
}

fn snapshot(sim: &Simulation) -> String {
    serde_json::to_string(&(sim.balls(), sim.winner(), sim.step_count()))
        .expect("state serializes")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn fixed_step_replay_is_identical(
        seed in "[a-z0-9]{1,12}",
        steps in 1u32..800,
        counts in prop::collection::vec(0u32..4, 1..4),
    ) {
        let entrants = participants(&counts);
        let mut a = Simulation::new();
        let mut b = Simulation::new();
        a.start(&seed, Some(&[0, 3, 1]), &entrants);
        b.start(&seed, Some(&[0, 3, 1]), &entrants);

        a.advance_fixed_steps(steps);
        b.advance_fixed_steps(steps);

        prop_assert_eq!(snapshot(&a), snapshot(&b));
    }

    #[test]
    fn chunked_realtime_equals_batch(
        seed in "[a-z0-9]{1,10}",
        chunks in prop::collection::vec(1u32..40, 1..12),
    ) {
        let entrants = participants(&[2, 1]);
        let total: u32 = chunks.iter().sum();

        let mut fixed = Simulation::new();
        let mut realtime = Simulation::new();
        fixed.start(&seed, Some(&[5, 2, 9]), &entrants);
        realtime.start(&seed, Some(&[5, 2, 9]), &entrants);

        fixed.advance_fixed_steps(total);
        for chunk in &chunks {
            realtime.advance_realtime(*chunk as f64 * STEP_MS);
        }

        prop_assert_eq!(snapshot(&fixed), snapshot(&realtime));
    }

    #[test]
    fn winner_is_stable_after_finish(seed in "[a-z0-9]{1,10}") {
        let mut sim = Simulation::new();
        sim.start(&seed, Some(&[1]), &participants(&[1, 1]));
        let first = sim.run_to_completion(30_000);
        sim.advance_fixed_steps(500);
        prop_assert_eq!(first.as_ref(), sim.winner());
    }
}
