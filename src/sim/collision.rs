//! Collision detection primitives
//!
//! Pure geometry queries shared by the stepper: circle-circle,
//! circle-rectangle with axis selection, and circle-vs-polygon-edge. Response
//! (restitution, impulses, destruction) stays in the stepper; these functions
//! only report contact normals and penetration depths.

use glam::Vec2;

/// A detected contact
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit normal pointing from the obstacle toward the ball center
    pub normal: Vec2,
    /// Penetration depth along the normal
    pub depth: f32,
}

/// Which face of a rectangle resolved the contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectFace {
    Left,
    Right,
    Top,
    Bottom,
}

/// Contact against an axis-aligned rectangle
#[derive(Debug, Clone, Copy)]
pub struct RectContact {
    pub face: RectFace,
    /// Penetration along the resolution axis
    pub depth: f32,
}

/// Circle vs circle, expressed as a contact distance (sum of radii).
///
/// A ball exactly at the obstacle center gets a fixed downward normal so the
/// degenerate case still resolves deterministically.
pub fn circle_circle(center: Vec2, ball_pos: Vec2, contact_dist: f32) -> Option<Contact> {
    let delta = ball_pos - center;
    let dist_sq = delta.length_squared();
    if dist_sq >= contact_dist * contact_dist {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-6 {
        delta / dist
    } else {
        Vec2::new(0.0, 1.0)
    };
    Some(Contact {
        normal,
        depth: contact_dist - dist,
    })
}

/// Circle vs axis-aligned rectangle with the ball radius already folded into
/// the half-extents. Picks the axis of least penetration; Y is down, so
/// `Top` means the ball sits above the rectangle.
pub fn circle_rect(ball_pos: Vec2, center: Vec2, half_w: f32, half_h: f32) -> Option<RectContact> {
    let dx = ball_pos.x - center.x;
    let dy = ball_pos.y - center.y;
    if dx.abs() >= half_w || dy.abs() >= half_h {
        return None;
    }
    let pen_x = half_w - dx.abs();
    let pen_y = half_h - dy.abs();
    if pen_x < pen_y {
        let face = if dx < 0.0 { RectFace::Left } else { RectFace::Right };
        Some(RectContact { face, depth: pen_x })
    } else {
        let face = if dy < 0.0 { RectFace::Top } else { RectFace::Bottom };
        Some(RectContact { face, depth: pen_y })
    }
}

/// Circle vs line segment.
pub fn circle_segment(ball_pos: Vec2, a: Vec2, b: Vec2, radius: f32) -> Option<Contact> {
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq < 1e-8 {
        return circle_circle(a, ball_pos, radius);
    }
    let t = ((ball_pos - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    let closest = a + seg * t;
    let delta = ball_pos - closest;
    let dist = delta.length();
    if dist >= radius {
        return None;
    }
    let normal = if dist > 1e-6 {
        delta / dist
    } else {
        // Ball center on the segment: push perpendicular, away from gravity
        Vec2::new(-seg.y, seg.x).normalize() * -1.0
    };
    Some(Contact {
        normal,
        depth: radius - dist,
    })
}

/// Circle vs polygon outline: deepest contact over all edges.
pub fn circle_polygon(ball_pos: Vec2, vertices: &[Vec2], radius: f32) -> Option<Contact> {
    let mut best: Option<Contact> = None;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        if let Some(contact) = circle_segment(ball_pos, a, b, radius) {
            let deeper = best.map(|c| contact.depth > c.depth).unwrap_or(true);
            if deeper {
                best = Some(contact);
            }
        }
    }
    best
}

/// Standard reflection: `v' = v - 2(v·n)n`
#[inline]
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_circle_overlap() {
        let contact = circle_circle(Vec2::ZERO, Vec2::new(30.0, 0.0), 36.0)
            .expect("overlapping circles collide");
        assert!((contact.normal - Vec2::new(1.0, 0.0)).length() < 1e-6);
        assert!((contact.depth - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_circle_miss() {
        assert!(circle_circle(Vec2::ZERO, Vec2::new(36.0, 0.0), 36.0).is_none());
        assert!(circle_circle(Vec2::ZERO, Vec2::new(100.0, 0.0), 36.0).is_none());
    }

    #[test]
    fn test_circle_circle_degenerate_center() {
        let contact = circle_circle(Vec2::ZERO, Vec2::ZERO, 36.0).expect("coincident centers");
        assert_eq!(contact.normal, Vec2::new(0.0, 1.0));
        assert!((contact.depth - 36.0).abs() < 1e-6);
    }

    #[test]
    fn test_circle_rect_side_vs_top() {
        // Shallow from the left: X axis resolves
        let side = circle_rect(Vec2::new(-95.0, 0.0), Vec2::ZERO, 100.0, 50.0)
            .expect("inside padded rect");
        assert_eq!(side.face, RectFace::Left);
        assert!((side.depth - 5.0).abs() < 1e-5);

        // Shallow from above: Y axis resolves (Y down, so ball above = Top)
        let top = circle_rect(Vec2::new(0.0, -45.0), Vec2::ZERO, 100.0, 50.0)
            .expect("inside padded rect");
        assert_eq!(top.face, RectFace::Top);
        assert!((top.depth - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_rect_outside() {
        assert!(circle_rect(Vec2::new(200.0, 0.0), Vec2::ZERO, 100.0, 50.0).is_none());
        assert!(circle_rect(Vec2::new(0.0, 50.0), Vec2::ZERO, 100.0, 50.0).is_none());
    }

    #[test]
    fn test_circle_segment_contact() {
        let a = Vec2::new(0.0, 100.0);
        let b = Vec2::new(100.0, 100.0);
        let contact = circle_segment(Vec2::new(50.0, 80.0), a, b, 24.0).expect("near segment");
        assert!((contact.normal - Vec2::new(0.0, -1.0)).length() < 1e-6);
        assert!((contact.depth - 4.0).abs() < 1e-5);

        assert!(circle_segment(Vec2::new(50.0, 60.0), a, b, 24.0).is_none());
    }

    #[test]
    fn test_circle_polygon_picks_deepest() {
        let tri = [
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(50.0, 80.0),
        ];
        // Just below the bottom edge, far from the slanted edges
        let contact = circle_polygon(Vec2::new(50.0, -10.0), &tri, 24.0).expect("near bottom edge");
        assert!((contact.normal - Vec2::new(0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_reflect() {
        let reflected = reflect(Vec2::new(3.0, -4.0), Vec2::new(0.0, 1.0));
        assert!((reflected - Vec2::new(3.0, 4.0)).length() < 1e-6);
    }
}
