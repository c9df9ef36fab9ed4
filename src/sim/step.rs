//! Single simulation step
//!
//! Order within a tick is fixed:
//! 1. cursor vs every body
//! 2. every unordered body pair (i < j, list order)
//! 3. integrate, apply friction, bounce off walls (list order)
//!
//! The pair scan is O(n²) with no broad phase. Ball counts are capped at 20,
//! and resolution is order dependent, so a spatial index would change results.

use super::collision::{bounce_off_walls, resolve_against_cursor, resolve_pair};
use super::state::{Arena, Body, PhysicsParams};

/// Advance all persistent bodies by one tick
///
/// `cursor` is read only; it is never integrated or bounced.
pub fn step(bodies: &mut [Body], cursor: Option<&Body>, arena: &Arena, params: &PhysicsParams) {
    if let Some(cursor) = cursor {
        for body in bodies.iter_mut() {
            resolve_against_cursor(body, cursor);
        }
    }

    for i in 0..bodies.len() {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            resolve_pair(a, b);
        }
    }

    for body in bodies.iter_mut() {
        integrate(body, arena, params);
    }
}

/// Move one body, decay its velocity, then resolve wall contact
pub fn integrate(body: &mut Body, arena: &Arena, params: &PhysicsParams) {
    body.pos += body.vel;

    body.vel.x = apply_friction(body.vel.x, params.friction, params.rest_epsilon);
    body.vel.y = apply_friction(body.vel.y, params.friction, params.rest_epsilon);

    bounce_off_walls(body, arena, params.restitution);
}

/// Linear decay toward zero; magnitudes under `epsilon` snap to exactly zero.
/// The decay stops at zero and never flips the sign.
#[inline]
pub fn apply_friction(v: f32, friction: f32, epsilon: f32) -> f32 {
    if v.abs() < epsilon {
        0.0
    } else {
        (v.abs() - friction).max(0.0).copysign(v)
    }
}
