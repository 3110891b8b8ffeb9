//! Course layout builder
//!
//! Assembles the obstacle/spinner layout for one round: start pit, a sequence
//! of themed blocks, the funnel and the finish stripe. Construction is fully
//! deterministic and takes no RNG; where a block wants variety it hashes the
//! element index instead, so identical inputs always produce identical
//! geometry. Ball placement randomness happens later, in the runner.
//!
//! Blocks are a fixed catalog of pure generators keyed by index. Adding a new
//! block type means writing one `fn(start_y, width) -> BlockSection` and
//! appending it to [`BLOCK_LIBRARY`]; the builder itself never changes.

use glam::Vec2;

use super::state::{Course, Obstacle, Spinner};
use crate::consts::*;

/// Output of one block generator
#[derive(Debug, Default)]
pub struct BlockSection {
    pub obstacles: Vec<Obstacle>,
    pub spinners: Vec<Spinner>,
    /// Vertical extent the builder advances past before the next block
    pub height: f32,
}

impl BlockSection {
    fn new(height: f32) -> Self {
        Self {
            obstacles: Vec::new(),
            spinners: Vec::new(),
            height,
        }
    }
}

/// A block generator: pure function of the write-head Y and the course width
pub type BlockFn = fn(start_y: f32, width: f32) -> BlockSection;

/// The block catalog, keyed by the indices a course spec refers to
pub const BLOCK_LIBRARY: &[BlockFn] = &[
    peg_grid,        // 0
    brick_rows,      // 1
    spinner_row,     // 2
    maze_walls,      // 3
    diagonal_bars,   // 4
    zigzag_rails,    // 5
    funnel_rows,     // 6
    cross_spinners,  // 7
    narrow_passage,  // 8
    elastic_walls,   // 9
    moving_triangle, // 10
];

/// Build the full course for one round.
///
/// `spec` selects blocks from [`BLOCK_LIBRARY`] in order; `None` plays the
/// whole catalog. Out-of-range indices are skipped. Two calls with identical
/// inputs produce identical geometry.
pub fn build_course(spec: Option<&[usize]>, width: f32) -> Course {
    let mut course = Course::empty();
    course.width = width;
    course.start_pit_height = START_PIT_HEIGHT;

    // Start pit, capped by the gate the runner removes at round start
    course.obstacles.push(Obstacle::gate(
        Vec2::new(width / 2.0, START_PIT_HEIGHT),
        width,
    ));

    let default: Vec<usize> = (0..BLOCK_LIBRARY.len()).collect();
    let indices = spec.unwrap_or(&default);

    let mut cursor = START_PIT_HEIGHT + BLOCK_GAP;
    for &index in indices {
        let Some(generator) = BLOCK_LIBRARY.get(index) else {
            log::warn!("course spec references unknown block {index}, skipping");
            continue;
        };
        let section = generator(cursor, width);
        course.obstacles.extend(section.obstacles);
        course.spinners.extend(section.spinners);
        cursor += section.height + BLOCK_GAP;
    }

    append_funnel(&mut course, cursor);
    course
}

/// Funnel passage width at the mouth
const FUNNEL_PASSAGE: f32 = 160.0;
/// Vertical extent of the converging walls
const FUNNEL_HEIGHT: f32 = 400.0;
/// Length of the reinforced chute below the funnel mouth
const CHUTE_HEIGHT: f32 = 120.0;
/// Finish stripe tile edge length
const FINISH_TILE: f32 = 40.0;

/// Converging funnel walls, reinforced chute, finish stripe, and the win /
/// death thresholds derived from them.
fn append_funnel(course: &mut Course, start_y: f32) {
    let width = course.width;
    let cx = width / 2.0;
    let mouth_y = start_y + FUNNEL_HEIGHT;

    // Solid wedges filling both lower corners; balls slide down the
    // hypotenuse into the center passage
    course.obstacles.push(Obstacle::polygon(vec![
        Vec2::new(0.0, start_y),
        Vec2::new(cx - FUNNEL_PASSAGE / 2.0, mouth_y),
        Vec2::new(0.0, mouth_y),
    ]));
    course.obstacles.push(Obstacle::polygon(vec![
        Vec2::new(width, start_y),
        Vec2::new(cx + FUNNEL_PASSAGE / 2.0, mouth_y),
        Vec2::new(width, mouth_y),
    ]));

    // Thin reinforcing barriers lining the passage mouth
    let chute_mid = mouth_y + CHUTE_HEIGHT / 2.0;
    course.obstacles.push(Obstacle::barrier(
        Vec2::new(cx - FUNNEL_PASSAGE / 2.0 - 10.0, chute_mid),
        20.0,
        CHUTE_HEIGHT,
    ));
    course.obstacles.push(Obstacle::barrier(
        Vec2::new(cx + FUNNEL_PASSAGE / 2.0 + 10.0, chute_mid),
        20.0,
        CHUTE_HEIGHT,
    ));

    // Checkerboard finish stripe (render-only)
    let stripe_y = mouth_y + CHUTE_HEIGHT + 20.0;
    for row in 0..2 {
        let y = stripe_y + row as f32 * FINISH_TILE;
        let mut col = row % 2;
        while (col as f32 + 1.0) * FINISH_TILE <= width {
            course.finish_tiles.push(Vec2::new(
                (col as f32 + 0.5) * FINISH_TILE,
                y + FINISH_TILE / 2.0,
            ));
            col += 2;
        }
    }

    course.win_y = stripe_y + 2.0 * FINISH_TILE;
    course.death_y = course.win_y + DEATH_DROP;
    course.height = course.death_y + DEATH_BAND + 100.0;
}

/// Knuth multiplicative hash, the only "randomness" layout is allowed
fn layout_hash(i: u32) -> u32 {
    i.wrapping_mul(2654435761)
}

// --- block library ---

/// 0: staggered grid of pegs
fn peg_grid(start_y: f32, width: f32) -> BlockSection {
    let mut section = BlockSection::new(4.0 * 110.0);
    let pitch = 100.0;
    // Pegs are fixed-size, so rows are centered instead of width-adjusted;
    // both edge gaps stay equal at any course width
    let count = ((width - 120.0) / pitch) as u32 + 1;
    let margin = (width - (count - 1) as f32 * pitch) / 2.0;
    for row in 0..4u32 {
        let y = start_y + row as f32 * 110.0;
        if row % 2 == 0 {
            for k in 0..count {
                section
                    .obstacles
                    .push(Obstacle::peg(Vec2::new(margin + k as f32 * pitch, y)));
            }
        } else {
            // Staggered rows drop one peg and shift by half a pitch, which
            // keeps them centered too
            for k in 0..count.saturating_sub(1) {
                section.obstacles.push(Obstacle::peg(Vec2::new(
                    margin + pitch / 2.0 + k as f32 * pitch,
                    y,
                )));
            }
        }
    }
    section
}

/// 1: staggered rows of single-hit bricks
fn brick_rows(start_y: f32, width: f32) -> BlockSection {
    let mut section = BlockSection::new(3.0 * 120.0);
    let brick_w = 120.0;
    let brick_h = 36.0;
    let pitch = 160.0;
    for row in 0..3u32 {
        let y = start_y + row as f32 * 120.0;
        let mut left = if row % 2 == 1 { 80.0 } else { 0.0 };
        while left + brick_w <= width {
            section.obstacles.push(Obstacle::brick(
                Vec2::new(left + brick_w / 2.0, y),
                brick_w,
                brick_h,
            ));
            left += pitch;
        }
        // Width-adjusted filler so the row reaches the right edge
        let remaining = width - left;
        if remaining > 1.0 {
            section.obstacles.push(Obstacle::brick(
                Vec2::new(left + remaining / 2.0, y),
                remaining,
                brick_h,
            ));
        }
    }
    section
}

/// 2: a single row of spinners
fn spinner_row(start_y: f32, width: f32) -> BlockSection {
    let mut section = BlockSection::new(160.0);
    let y = start_y + 60.0;
    let mut x = 140.0;
    while x <= width - 140.0 {
        let pos = Vec2::new(x, y);
        section.obstacles.push(Obstacle::spinner_body(pos));
        section.spinners.push(Spinner::new(pos));
        x += 240.0;
    }
    section
}

/// 3: staggered wall segments; gaps never line up between rows
fn maze_walls(start_y: f32, width: f32) -> BlockSection {
    let mut section = BlockSection::new(3.0 * 170.0);
    // Segment spans as fractions of the course width
    let even_row: [(f32, f32); 3] = [(0.0, 0.2), (0.3, 0.7), (0.8, 1.0)];
    let odd_row: [(f32, f32); 2] = [(0.1, 0.45), (0.55, 0.9)];
    for row in 0..3u32 {
        let y = start_y + row as f32 * 170.0;
        let spans: &[(f32, f32)] = if row % 2 == 0 { &even_row } else { &odd_row };
        for &(a, b) in spans {
            let (left, right) = (a * width, b * width);
            section.obstacles.push(Obstacle::barrier(
                Vec2::new((left + right) / 2.0, y),
                right - left,
                30.0,
            ));
        }
    }
    section
}

/// 4: slanted bars alternating direction
fn diagonal_bars(start_y: f32, width: f32) -> BlockSection {
    let mut section = BlockSection::new(3.0 * 160.0 + 24.0);
    let thickness = 24.0;
    let drop = 90.0;
    for i in 0..3u32 {
        let y = start_y + i as f32 * 160.0;
        let (x0, x1) = if i % 2 == 0 {
            (0.0, width * 0.6)
        } else {
            (width, width * 0.4)
        };
        section.obstacles.push(Obstacle::polygon(vec![
            Vec2::new(x0, y),
            Vec2::new(x1, y + drop),
            Vec2::new(x1, y + drop + thickness),
            Vec2::new(x0, y + thickness),
        ]));
    }
    section
}

/// 5: connected zigzag guardrails down the middle of the course
fn zigzag_rails(start_y: f32, width: f32) -> BlockSection {
    let mut section = BlockSection::new(4.0 * 120.0 + 24.0);
    let thickness = 24.0;
    for j in 0..4u32 {
        let y = start_y + j as f32 * 120.0;
        let (xa, xb) = if j % 2 == 0 {
            (width * 0.25, width * 0.75)
        } else {
            (width * 0.75, width * 0.25)
        };
        section.obstacles.push(Obstacle::polygon(vec![
            Vec2::new(xa, y),
            Vec2::new(xb, y + 120.0),
            Vec2::new(xb, y + 120.0 + thickness),
            Vec2::new(xa, y + thickness),
        ]));
    }
    section
}

/// 6: a row of small V funnels with a gap at each bottom
fn funnel_rows(start_y: f32, width: f32) -> BlockSection {
    let mut section = BlockSection::new(150.0);
    let cell = 240.0;
    let thickness = 20.0;
    let cells = (width / cell).floor() as u32;
    let margin = (width - cells as f32 * cell) / 2.0;
    for k in 0..cells {
        let cx = margin + (k as f32 + 0.5) * cell;
        for side in [-1.0f32, 1.0] {
            let outer = cx + side * 120.0;
            let inner = cx + side * 30.0;
            section.obstacles.push(Obstacle::polygon(vec![
                Vec2::new(outer, start_y),
                Vec2::new(inner, start_y + 100.0),
                Vec2::new(inner, start_y + 100.0 + thickness),
                Vec2::new(outer, start_y + thickness),
            ]));
        }
    }
    section
}

/// 7: two staggered rows of spinners (cross field)
fn cross_spinners(start_y: f32, width: f32) -> BlockSection {
    let mut section = BlockSection::new(280.0);
    for row in 0..2u32 {
        let y = start_y + 60.0 + row as f32 * 140.0;
        let mut x = 120.0 + if row % 2 == 1 { 100.0 } else { 0.0 };
        while x <= width - 120.0 {
            let pos = Vec2::new(x, y);
            section.obstacles.push(Obstacle::spinner_body(pos));
            section.spinners.push(Spinner::new(pos));
            x += 200.0;
        }
    }
    section
}

/// 8: full-width wall with a narrow center gap, pegs guarding the approach
fn narrow_passage(start_y: f32, width: f32) -> BlockSection {
    let mut section = BlockSection::new(200.0);
    let cx = width / 2.0;
    let gap = 90.0;
    let y = start_y + 120.0;
    section
        .obstacles
        .push(Obstacle::peg(Vec2::new(cx - gap - 60.0, start_y)));
    section
        .obstacles
        .push(Obstacle::peg(Vec2::new(cx + gap + 60.0, start_y)));
    section.obstacles.push(Obstacle::barrier(
        Vec2::new((cx - gap) / 2.0, y),
        cx - gap,
        40.0,
    ));
    section.obstacles.push(Obstacle::barrier(
        Vec2::new((cx + gap + width) / 2.0, y),
        width - cx - gap,
        40.0,
    ));
    section
}

/// 9: columns of hash-varied height walls, bottoms aligned
fn elastic_walls(start_y: f32, width: f32) -> BlockSection {
    let mut section = BlockSection::new(280.0);
    let base = start_y + 240.0;
    let pitch = 150.0;
    // Fixed-width columns, so the row is centered rather than width-adjusted
    let count = ((width - 80.0) / pitch) as u32 + 1;
    let margin = (width - (count - 1) as f32 * pitch) / 2.0;
    for col in 0..count {
        let x = margin + col as f32 * pitch;
        let h = 80.0 + (layout_hash(col) % 160) as f32;
        section.obstacles.push(Obstacle::barrier(
            Vec2::new(x, base - h / 2.0),
            26.0,
            h,
        ));
    }
    section
}

/// 10: one oscillating triangle sweeping the middle of the course
fn moving_triangle(start_y: f32, width: f32) -> BlockSection {
    let mut section = BlockSection::new(240.0);
    let cx = width / 2.0;
    section.obstacles.push(
        Obstacle::polygon(vec![
            Vec2::new(cx, start_y),
            Vec2::new(cx + 110.0, start_y + 140.0),
            Vec2::new(cx - 110.0, start_y + 140.0),
        ])
        .with_motion(width * 0.25, 2.0),
    );
    section
}
