//! World state and core simulation types
//!
//! The `World` is the single owner of the persistent body list. Everything
//! outside the `sim` module reads bodies through `World::bodies` and writes
//! only through the narrow mutators defined here.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::step::step;
use crate::consts::{CURSOR_COLOR, CURSOR_ID, DEFAULT_COLOR};

/// Display color of a body, kept as a CSS color string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(String);

impl Color {
    /// Parse a `#rrggbb` hex color (the format produced by a color picker)
    pub fn parse_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#')?;
        if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(s.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// Fixed color used to draw the cursor body
    pub fn cursor() -> Self {
        Self(CURSOR_COLOR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(DEFAULT_COLOR.to_string())
    }
}

/// A disk body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: i32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Color,
}

impl Body {
    pub fn new(id: i32, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        debug_assert!(radius > 0.0, "body radius must be positive");
        Self {
            id,
            pos,
            vel,
            radius,
            color: Color::default(),
        }
    }

    /// Build the transient cursor body for this frame
    pub fn cursor(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id: CURSOR_ID,
            pos,
            vel,
            radius,
            color: Color::cursor(),
        }
    }

    pub fn is_cursor(&self) -> bool {
        self.id == CURSOR_ID
    }

    /// Hit test used for picking (strictly inside the disk)
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance(point) < self.radius
    }
}

/// Rectangular arena, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Per-tick physics constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParams {
    /// Linear decay applied to each velocity component every tick
    pub friction: f32,
    /// Velocity kept after a wall bounce (sign flipped)
    pub restitution: f32,
    /// Components with a smaller magnitude snap to zero
    pub rest_epsilon: f32,
}

/// Parameters for the initial body row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnParams {
    pub min_radius: f32,
    pub max_radius: f32,
    /// Bound on each initial velocity component
    pub max_speed: f32,
    /// Spacing added to `max_radius` between spawn slots
    pub gap: f32,
}

impl SpawnParams {
    /// Whole-number radii a spawned body may get (never below 1)
    pub fn radius_range(&self) -> RangeInclusive<i32> {
        self.min_radius.ceil().max(1.0) as i32..=self.max_radius.floor() as i32
    }

    /// Center of spawn slot `index` (left-to-right along the top edge)
    pub fn slot(&self, index: usize) -> Vec2 {
        let pitch = self.max_radius + self.gap;
        Vec2::new((index + 1) as f32 * pitch, pitch)
    }
}

/// The physics world: arena bounds plus the persistent body list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub arena: Arena,
    pub params: PhysicsParams,
    bodies: Vec<Body>,
}

impl World {
    /// Create a world from explicit bodies (ids must be unique, never the cursor id)
    pub fn with_bodies(arena: Arena, params: PhysicsParams, bodies: Vec<Body>) -> Self {
        debug_assert!(
            bodies.iter().all(|b| !b.is_cursor()),
            "cursor body in persistent list"
        );
        debug_assert!(
            bodies
                .iter()
                .enumerate()
                .all(|(i, b)| bodies[..i].iter().all(|o| o.id != b.id)),
            "duplicate body id"
        );
        Self {
            arena,
            params,
            bodies,
        }
    }

    /// Spawn `count` bodies with random whole-number radius and velocity
    pub fn spawn(
        arena: Arena,
        params: PhysicsParams,
        spawn: &SpawnParams,
        count: usize,
        rng: &mut Pcg32,
    ) -> Self {
        let radius_range = spawn.radius_range();
        let speed = spawn.max_speed.floor() as i32;

        let bodies = (0..count)
            .map(|i| {
                let radius = rng.random_range(radius_range.clone()) as f32;
                let vel = Vec2::new(
                    rng.random_range(-speed..=speed) as f32,
                    rng.random_range(-speed..=speed) as f32,
                );
                Body::new(i as i32, spawn.slot(i), vel, radius)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Spawned {} bodies, radii {:?}",
            bodies.len(),
            bodies.iter().map(|b| b.radius).collect::<Vec<_>>()
        );

        Self::with_bodies(arena, params, bodies)
    }

    /// Read-only view of the persistent bodies (list order)
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: i32) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    /// Replace a body's display color; returns false for an unknown id
    pub fn set_color(&mut self, id: i32, color: Color) -> bool {
        match self.bodies.iter_mut().find(|b| b.id == id) {
            Some(body) => {
                body.color = color;
                true
            }
            None => false,
        }
    }

    /// First body (list order) whose disk contains `point`
    pub fn pick(&self, point: Vec2) -> Option<i32> {
        self.bodies.iter().find(|b| b.contains(point)).map(|b| b.id)
    }

    /// Advance every body by one tick
    pub fn step(&mut self, cursor: Option<&Body>) {
        step(&mut self.bodies, cursor, &self.arena, &self.params);
    }

    /// Sum of radius-weighted squared speeds (radius stands in for mass)
    pub fn kinetic_energy(&self) -> f32 {
        self.bodies
            .iter()
            .map(|b| b.radius * b.vel.length_squared())
            .sum()
    }
}
