//! Collision detection and response between disks and against arena walls
//!
//! Disk/disk response is a radius-weighted 1D elastic exchange along the
//! contact normal. Radius stands in for mass; no restitution is applied here,
//! energy is only lost at the walls.

use glam::Vec2;

use super::state::{Arena, Body};

/// Normal used when two centers coincide exactly
const FALLBACK_NORMAL: Vec2 = Vec2::X;

/// Contact between two overlapping disks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from A's center toward B's center
    pub normal: Vec2,
    /// Penetration depth (`rA + rB - d`)
    pub overlap: f32,
}

/// Position, velocity and radius of one side of a collision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl From<&Body> for Kinematics {
    fn from(body: &Body) -> Self {
        Self {
            pos: body.pos,
            vel: body.vel,
            radius: body.radius,
        }
    }
}

impl Kinematics {
    fn write_to(self, body: &mut Body) {
        body.pos = self.pos;
        body.vel = self.vel;
    }
}

/// Check whether two disks overlap
///
/// Touching disks (`d == rA + rB`) do not collide.
pub fn contact(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> Option<Contact> {
    let delta = b_pos - a_pos;
    let distance = delta.length();
    let reach = a_radius + b_radius;

    if distance >= reach {
        return None;
    }

    let normal = if distance > 0.0 {
        delta / distance
    } else {
        FALLBACK_NORMAL
    };

    Some(Contact {
        normal,
        overlap: reach - distance,
    })
}

/// Resolve a collision between two disks, returning their post-collision state
///
/// Each disk is pushed out by half the overlap along the normal. Tangential
/// velocity is kept; normal velocity follows the elastic exchange.
pub fn resolve(a: Kinematics, b: Kinematics) -> Option<(Kinematics, Kinematics)> {
    let Contact { normal, overlap } = contact(a.pos, a.radius, b.pos, b.radius)?;
    let tangent = normal.perp();

    let displacement = normal * overlap * 0.5;
    let a_pos = a.pos - displacement;
    let b_pos = b.pos + displacement;

    let a_tan = a.vel.dot(tangent);
    let a_norm = a.vel.dot(normal);
    let b_tan = b.vel.dot(tangent);
    let b_norm = b.vel.dot(normal);

    let (a_norm, b_norm) = exchange_normal_velocity(a_norm, a.radius, b_norm, b.radius);

    Some((
        Kinematics {
            pos: a_pos,
            vel: tangent * a_tan + normal * a_norm,
            radius: a.radius,
        },
        Kinematics {
            pos: b_pos,
            vel: tangent * b_tan + normal * b_norm,
            radius: b.radius,
        },
    ))
}

/// One-dimensional elastic collision with radius as mass
#[inline]
pub fn exchange_normal_velocity(v1: f32, r1: f32, v2: f32, r2: f32) -> (f32, f32) {
    let total = r1 + r2;
    let v1_after = (v1 * (r1 - r2) + 2.0 * r2 * v2) / total;
    let v2_after = (v2 * (r2 - r1) + 2.0 * r1 * v1) / total;
    (v1_after, v2_after)
}

/// Resolve a collision between two persistent bodies, writing both back
pub fn resolve_pair(a: &mut Body, b: &mut Body) -> bool {
    match resolve(Kinematics::from(&*a), Kinematics::from(&*b)) {
        Some((a_after, b_after)) => {
            a_after.write_to(a);
            b_after.write_to(b);
            true
        }
        None => false,
    }
}

/// Resolve a collision between a persistent body and the cursor
///
/// The cursor is side B of the math; its post-collision state is discarded.
pub fn resolve_against_cursor(body: &mut Body, cursor: &Body) -> bool {
    match resolve(Kinematics::from(&*body), Kinematics::from(cursor)) {
        Some((after, _)) => {
            after.write_to(body);
            true
        }
        None => false,
    }
}

/// Reflect one axis off the `[0, max]` walls and clamp the edge onto the wall
///
/// Returns true when a bounce happened.
#[inline]
pub fn bounce_axis(pos: &mut f32, vel: &mut f32, radius: f32, max: f32, restitution: f32) -> bool {
    if *pos + radius > max {
        *vel = -*vel * restitution;
        *pos = max - radius;
        true
    } else if *pos - radius < 0.0 {
        *vel = -*vel * restitution;
        *pos = radius;
        true
    } else {
        false
    }
}

/// Bounce a body off the arena walls on both axes
pub fn bounce_off_walls(body: &mut Body, arena: &Arena, restitution: f32) -> bool {
    let hit_x = bounce_axis(
        &mut body.pos.x,
        &mut body.vel.x,
        body.radius,
        arena.width,
        restitution,
    );
    let hit_y = bounce_axis(
        &mut body.pos.y,
        &mut body.vel.y,
        body.radius,
        arena.height,
        restitution,
    );
    hit_x || hit_y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kin(x: f32, y: f32, vx: f32, vy: f32, radius: f32) -> Kinematics {
        Kinematics {
            pos: Vec2::new(x, y),
            vel: Vec2::new(vx, vy),
            radius,
        }
    }

    #[test]
    fn test_contact_miss_and_touch() {
        assert!(contact(Vec2::ZERO, 10.0, Vec2::new(30.0, 0.0), 10.0).is_none());
        // Exactly touching is not a collision
        assert!(contact(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0).is_none());

        let hit = contact(Vec2::ZERO, 10.0, Vec2::new(0.0, 15.0), 10.0).unwrap();
        assert!((hit.normal - Vec2::Y).length() < 1e-6);
        assert!((hit.overlap - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_contact_coincident_centers() {
        let hit = contact(Vec2::new(50.0, 50.0), 10.0, Vec2::new(50.0, 50.0), 5.0).unwrap();
        assert_eq!(hit.normal, Vec2::X);
        assert_eq!(hit.overlap, 15.0);

        let (a, b) = resolve(kin(50.0, 50.0, 1.0, 2.0, 10.0), kin(50.0, 50.0, -3.0, 0.5, 5.0)).unwrap();
        for k in [a, b] {
            assert!(k.pos.is_finite());
            assert!(k.vel.is_finite());
        }
        assert!((a.pos.x - 42.5).abs() < 1e-5);
        assert!((b.pos.x - 57.5).abs() < 1e-5);
    }

    #[test]
    fn test_equal_radius_head_on_swaps() {
        let (a, b) = resolve(kin(0.0, 0.0, 3.0, 0.0, 10.0), kin(19.0, 0.0, -3.0, 0.0, 10.0)).unwrap();
        assert!((a.vel.x - (-3.0)).abs() < 1e-6);
        assert!((b.vel.x - 3.0).abs() < 1e-6);
        assert!(a.vel.y.abs() < 1e-6 && b.vel.y.abs() < 1e-6);
        // Separated to exactly touching
        assert!((b.pos.x - a.pos.x - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_tangential_velocity_preserved() {
        // Contact normal along x, so y velocity is tangential
        let (a, b) = resolve(kin(0.0, 0.0, 2.0, 4.0, 10.0), kin(15.0, 0.0, 0.0, -1.0, 20.0)).unwrap();
        assert!((a.vel.y - 4.0).abs() < 1e-5);
        assert!((b.vel.y - (-1.0)).abs() < 1e-5);
    }

    #[test]
    fn test_exchange_conserves_weighted_momentum_and_energy() {
        let (r1, r2, v1, v2) = (15.0, 30.0, 4.0, -2.0);
        let (u1, u2) = exchange_normal_velocity(v1, r1, v2, r2);
        assert!((r1 * v1 + r2 * v2 - (r1 * u1 + r2 * u2)).abs() < 1e-4);
        assert!((r1 * v1 * v1 + r2 * v2 * v2 - (r1 * u1 * u1 + r2 * u2 * u2)).abs() < 1e-3);
    }

    #[test]
    fn test_cursor_state_is_discarded() {
        let mut body = Body::new(0, Vec2::new(100.0, 100.0), Vec2::ZERO, 20.0);
        let cursor = Body::cursor(Vec2::new(110.0, 100.0), Vec2::new(-6.0, 0.0), 5.0);
        let before = cursor.clone();

        assert!(resolve_against_cursor(&mut body, &cursor));
        assert_eq!(cursor, before);
        // Body pushed left by half the overlap, picks up leftward speed
        assert!((body.pos.x - 92.5).abs() < 1e-4);
        assert!(body.vel.x < 0.0);
    }

    #[test]
    fn test_bounce_axis() {
        let (mut pos, mut vel) = (795.0, 4.0);
        assert!(bounce_axis(&mut pos, &mut vel, 10.0, 800.0, 0.8));
        assert_eq!(pos, 790.0);
        assert!((vel - (-3.2)).abs() < 1e-6);

        let (mut pos, mut vel) = (5.0, -5.0);
        assert!(bounce_axis(&mut pos, &mut vel, 10.0, 800.0, 0.8));
        assert_eq!(pos, 10.0);
        assert!((vel - 4.0).abs() < 1e-6);

        // Edge exactly on the wall: no bounce
        let (mut pos, mut vel) = (10.0, -1.0);
        assert!(!bounce_axis(&mut pos, &mut vel, 10.0, 800.0, 0.8));
        assert_eq!(vel, -1.0);
    }

    #[test]
    fn test_bounce_off_walls_corner() {
        let mut body = Body::new(0, Vec2::new(-3.0, 505.0), Vec2::new(-2.0, 1.0), 10.0);
        assert!(bounce_off_walls(&mut body, &Arena::new(800.0, 500.0), 0.5));
        assert_eq!(body.pos, Vec2::new(10.0, 490.0));
        assert!((body.vel - Vec2::new(1.0, -0.5)).length() < 1e-6);
    }
}
