//! Headless round driver
//!
//! Runs one round to completion and prints the outcome as JSON, exercising
//! the engine exactly the way a prediction instance would:
//!
//! ```text
//! drop-derby <seed> [block index]...
//! ```
//!
//! With no block indices the full catalog is played. Set `RUST_LOG=info` for
//! round lifecycle logging.

use drop_derby::sim::{Participant, Simulation};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().unwrap_or_else(|| "demo".to_string());
    let spec: Vec<usize> = args.filter_map(|arg| arg.parse().ok()).collect();
    let spec = if spec.is_empty() {
        None
    } else {
        Some(spec.as_slice())
    };

    let participants = vec![
        Participant {
            player_id: "p1".to_string(),
            ball_count: 2,
        },
        Participant {
            player_id: "p2".to_string(),
            ball_count: 2,
        },
    ];

    let mut sim = Simulation::new();
    sim.start(&seed, spec, &participants);
    let winner = sim.run_to_completion(60_000);

    let outcome = serde_json::json!({
        "seed": seed,
        "steps": sim.step_count(),
        "phase": sim.phase(),
        "winner": winner,
    });
    println!("{}", serde_json::to_string_pretty(&outcome).unwrap_or_default());
}
