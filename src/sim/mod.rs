//! Physics world
//!
//! All body mutation lives here. This module must stay free of rendering and
//! platform dependencies:
//! - One step per call, no internal timing
//! - Stable iteration order (list order)
//! - Seeded RNG only (spawning)

pub mod collision;
pub mod state;
pub mod step;

pub use collision::{Contact, Kinematics, contact, resolve, resolve_against_cursor, resolve_pair};
pub use state::{Arena, Body, Color, PhysicsParams, SpawnParams, World};
pub use step::{apply_friction, integrate, step};
