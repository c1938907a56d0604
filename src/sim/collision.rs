//! Collision detection for circles and beams
//!
//! Everything in the arena is a circle. Beams are rays from an origin along a
//! heading with a half-width; a circle is hit when its centre projects onto the
//! ray within range and sits closer to the ray than its radius plus the
//! half-width.

use glam::Vec2;

use crate::vec_from_angle;

/// Whether two circles overlap (touching does not count)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// Perpendicular distance from `point` to a beam, if the point projects onto it
///
/// Returns `None` when the point is behind the origin or beyond `range`.
pub fn beam_offset(origin: Vec2, angle: f32, range: f32, point: Vec2) -> Option<f32> {
    let dir = vec_from_angle(angle);
    let rel = point - origin;
    let proj = rel.dot(dir);
    if !(0.0..=range).contains(&proj) {
        return None;
    }
    Some((rel - dir * proj).length())
}

/// Beam vs circle test, inclusive at the edge
pub fn beam_hits_circle(
    origin: Vec2,
    angle: f32,
    range: f32,
    half_width: f32,
    center: Vec2,
    radius: f32,
) -> bool {
    beam_offset(origin, angle, range, center).is_some_and(|d| d <= radius + half_width)
}

/// Push-apart result for two overlapping bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    /// Unit vector from the first body toward the second
    pub normal: Vec2,
    pub overlap: f32,
}

/// Overlap between two circles, with the normal pointing from `a` to `b`
///
/// Coincident centres have no defined normal and report no separation.
pub fn circle_separation(a: Vec2, ra: f32, b: Vec2, rb: f32) -> Option<Separation> {
    let delta = b - a;
    let dist = delta.length();
    let min_dist = ra + rb;
    if dist >= min_dist || dist <= 0.0 {
        return None;
    }
    Some(Separation {
        normal: delta / dist,
        overlap: min_dist - dist,
    })
}

/// Whether a point lies more than `margin` outside a `width` x `height` box
#[inline]
pub fn outside_bounds(pos: Vec2, width: f32, height: f32, margin: f32) -> bool {
    pos.x < -margin || pos.x > width + margin || pos.y < -margin || pos.y > height + margin
}
