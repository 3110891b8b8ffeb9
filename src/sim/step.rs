//! Fixed timestep physics stepper
//!
//! Advances the world by exactly one 1/60 s increment. Callable any number of
//! times per host frame; every trajectory is a pure function of the starting
//! state, so replaying the same state for the same number of steps is
//! bit-identical.
//!
//! Per active ball, in order: integration, surface rolling or free flight,
//! obstacle collisions in layout order, ball-ball collisions, world walls,
//! terminal checks. Finished balls are pruned after the pass, except the
//! recorded winner which is retained for terminal-frame rendering.

use glam::Vec2;

use super::collision::{circle_circle, circle_polygon, circle_rect, reflect, RectFace};
use super::state::{Ball, ObstacleKind, RaceState, RoundPhase, SimEvent};
use crate::consts::*;

/// Advance the simulation by one fixed step. No-op unless `Playing`.
pub fn step(state: &mut RaceState) {
    if state.phase != RoundPhase::Playing {
        return;
    }
    state.step_count += 1;

    // World-level motion runs regardless of ball interactions
    for ob in &mut state.course.obstacles {
        ob.advance_motion();
    }
    for spinner in &mut state.course.spinners {
        spinner.spin();
    }

    let count = state.balls.len();
    for i in 0..count {
        if state.balls[i].finished {
            continue;
        }
        integrate(i, state);
        resolve_obstacles(i, state);
        resolve_ball_pairs(i, state);
        resolve_walls(i, state);
        resolve_terminal(i, state);
    }

    prune_finished(state);
}

/// Gravity + damping, then either the rolling branch or free flight.
fn integrate(i: usize, state: &mut RaceState) {
    let RaceState {
        balls,
        course,
        rng,
        ..
    } = state;
    let ball = &mut balls[i];

    ball.vel.y += GRAVITY;
    ball.vel *= DAMPING;

    // A destroyed or vanished support drops the ball back into free flight
    if ball.on_surface {
        let support_gone = ball
            .surface
            .and_then(|idx| course.obstacles.get(idx))
            .map(|ob| ob.destroyed)
            .unwrap_or(true);
        if support_gone {
            ball.leave_surface();
        }
    }

    if let Some(idx) = ball.surface.filter(|_| ball.on_surface) {
        let ob = &course.obstacles[idx];
        // Pin to the obstacle top and roll under friction
        ball.pos.y = ob.pos.y - ob.half_height() - BALL_RADIUS;
        ball.vel.y = 0.0;
        ball.vel.x *= ROLL_FRICTION;
        if ball.vel.x.abs() < ROLL_STOP_THRESHOLD {
            ball.vel.x = 0.0;
        }
        ball.pos.x += ball.vel.x;
        if ball.vel.x == 0.0 {
            // Stalled: nudge so the ball eventually finds an edge
            ball.vel.x = (rng.next_f32() - 0.5) * ROLL_NUDGE;
        }
        if (ball.pos.x - ob.pos.x).abs() > ob.half_width() {
            ball.leave_surface();
        }
    } else {
        ball.pos += ball.vel;
    }
}

/// Obstacle collisions, checked in layout order against every non-destroyed
/// obstacle.
fn resolve_obstacles(i: usize, state: &mut RaceState) {
    let RaceState {
        balls,
        course,
        events,
        ..
    } = state;
    let ball = &mut balls[i];

    for (ob_index, ob) in course.obstacles.iter_mut().enumerate() {
        if ob.destroyed {
            continue;
        }
        match ob.kind {
            ObstacleKind::Peg => {
                let Some(contact) = circle_circle(ob.pos, ball.pos, PEG_CONTACT_DIST) else {
                    continue;
                };
                ball.pos = ob.pos + contact.normal * PEG_CONTACT_DIST;
                ball.vel = reflect(ball.vel, contact.normal) * PEG_RESTITUTION;
            }
            ObstacleKind::Brick | ObstacleKind::Barrier => {
                let hw = ob.half_width() + BALL_RADIUS;
                let hh = ob.half_height() + BALL_RADIUS;
                let Some(contact) = circle_rect(ball.pos, ob.pos, hw, hh) else {
                    continue;
                };
                if ob.kind == ObstacleKind::Barrier
                    && (ob.pos.y - course.start_pit_height).abs() < 0.5
                {
                    // The pit floor holds balls without bouncing
                    ball.pos.y = ob.pos.y - hh;
                    ball.vel.y = 0.0;
                } else {
                    let bias = (ob.pos.x - ob.prev_x) * MOVING_HIT_BIAS;
                    match contact.face {
                        RectFace::Left => {
                            ball.pos.x = ob.pos.x - hw;
                            ball.vel.x = -ball.vel.x * SURFACE_RESTITUTION + bias;
                        }
                        RectFace::Right => {
                            ball.pos.x = ob.pos.x + hw;
                            ball.vel.x = -ball.vel.x * SURFACE_RESTITUTION + bias;
                        }
                        RectFace::Top => {
                            // Land and start rolling instead of bouncing
                            ball.pos.y = ob.pos.y - hh;
                            ball.vel.y = 0.0;
                            ball.on_surface = true;
                            ball.surface = Some(ob_index);
                        }
                        RectFace::Bottom => {
                            ball.pos.y = ob.pos.y + hh;
                            ball.vel.y = -ball.vel.y * SURFACE_RESTITUTION;
                        }
                    }
                }
                if ob.kind == ObstacleKind::Brick {
                    // Single-hit, whichever axis resolved
                    ob.destroyed = true;
                    ob.hits += 1;
                }
            }
            ObstacleKind::Spinner => {
                let Some(contact) = circle_circle(ob.pos, ball.pos, SPINNER_CONTACT_DIST) else {
                    continue;
                };
                let n = contact.normal;
                ball.pos = ob.pos + n * SPINNER_CONTACT_DIST;
                let vn = ball.vel.dot(n);
                let vt = ball.vel - n * vn;
                // Reflect and damp the approaching radial part, then spin the
                // ball away along the tangent
                let radial = if vn < 0.0 { -vn * SPINNER_RADIAL_DAMP } else { vn };
                let tangent = Vec2::new(-n.y, n.x);
                ball.vel = vt + n * radial + tangent * SPINNER_TANGENT_IMPULSE;
            }
            ObstacleKind::Polygon => {
                let Some(verts) = &ob.vertices else {
                    continue;
                };
                let Some(contact) = circle_polygon(ball.pos, verts, BALL_RADIUS) else {
                    continue;
                };
                ball.pos += contact.normal * contact.depth;
                if ball.vel.dot(contact.normal) < 0.0 {
                    let bias = (ob.pos.x - ob.prev_x) * MOVING_HIT_BIAS;
                    ball.vel = reflect(ball.vel, contact.normal) * SURFACE_RESTITUTION;
                    ball.vel.x += bias;
                }
            }
        }
        ball.bounce_count += 1;
        events.push(SimEvent::Collision {
            ball_id: ball.id.clone(),
            obstacle_index: ob_index,
            kind: ob.kind,
        });
    }
}

/// Ball-ball contacts: symmetric separation to the exact contact distance,
/// impulse only when approaching.
fn resolve_ball_pairs(i: usize, state: &mut RaceState) {
    let count = state.balls.len();
    for j in 0..count {
        if j == i || state.balls[j].finished {
            continue;
        }
        let (a, b) = pair_mut(&mut state.balls, i, j);

        let delta = a.pos - b.pos;
        let dist_sq = delta.length_squared();
        if dist_sq >= BALL_CONTACT_DIST * BALL_CONTACT_DIST {
            continue;
        }
        let dist = dist_sq.sqrt();
        let normal = if dist > 1e-6 {
            delta / dist
        } else {
            Vec2::new(0.0, 1.0)
        };

        // Split the correction evenly so both balls end exactly in contact
        let push = (BALL_CONTACT_DIST - dist) / 2.0;
        a.pos += normal * push;
        b.pos -= normal * push;

        let approach = (a.vel - b.vel).dot(normal);
        if approach < 0.0 {
            let impulse = -(1.0 + BALL_RESTITUTION) / 2.0 * approach;
            a.vel += normal * impulse;
            b.vel -= normal * impulse;
        }
    }
}

/// Disjoint mutable borrows of two balls.
fn pair_mut(balls: &mut [Ball], i: usize, j: usize) -> (&mut Ball, &mut Ball) {
    if i < j {
        let (left, right) = balls.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = balls.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Clamp to the side walls with restitution.
fn resolve_walls(i: usize, state: &mut RaceState) {
    let ball = &mut state.balls[i];
    let min_x = BALL_RADIUS;
    let max_x = state.course.width - BALL_RADIUS;
    if ball.pos.x < min_x {
        ball.pos.x = min_x;
        ball.vel.x = -ball.vel.x * WALL_RESTITUTION;
        ball.bounce_count += 1;
    } else if ball.pos.x > max_x {
        ball.pos.x = max_x;
        ball.vel.x = -ball.vel.x * WALL_RESTITUTION;
        ball.bounce_count += 1;
    }
}

/// Win and death thresholds. The first ball past the finish line is the sole
/// winner; later balls fall on to the death band.
fn resolve_terminal(i: usize, state: &mut RaceState) {
    let win_y = state.course.win_y;
    let death_y = state.course.death_y;
    let y = state.balls[i].pos.y;

    if y > win_y && state.winner.is_none() {
        let (id, player) = {
            let ball = &state.balls[i];
            (ball.id.clone(), ball.player_id.clone())
        };
        state.record_winner(&id, &player);
        state.balls[i].finished = true;
        log::info!("ball {id} wins for {player}");
        return;
    }

    if y >= death_y && y < death_y + DEATH_BAND {
        let ball = &mut state.balls[i];
        ball.finished = true;
        let id = ball.id.clone();
        state.events.push(SimEvent::BallDied { ball_id: id });
    }
}

/// Drop finished balls, keep the winner for terminal-frame rendering. A round
/// whose balls all died with no winner finishes void.
fn prune_finished(state: &mut RaceState) {
    let winner_id = state.winner.as_ref().map(|w| w.ball_id.clone());
    state
        .balls
        .retain(|b| !b.finished || winner_id.as_deref() == Some(b.id.as_str()));

    if state.phase == RoundPhase::Playing && state.balls.is_empty() {
        state.phase = RoundPhase::Finished;
        state.events.push(SimEvent::RoundVoid);
        log::info!("round void: every ball died before the finish line");
    }
}
