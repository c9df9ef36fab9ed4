//! Ball Arena - elastic ball collisions in a rectangular arena
//!
//! Core modules:
//! - `sim`: Physics world (integration, friction, wall bounce, collisions)
//! - `driver`: Frame-driven start/pause/stop state machine
//! - `input`: Pointer snapshot and cursor body derivation
//! - `renderer`: Render sink abstraction (canvas implementation on web)
//! - `settings`: Validated, serializable configuration

pub mod driver;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use driver::{FrameOutcome, FrameTicket, LoopError, LoopState, Simulation};
pub use input::PointerState;
pub use renderer::RenderSink;
pub use settings::{Settings, SettingsError};

/// Simulation configuration defaults
pub mod consts {
    /// Arena dimensions (canvas pixels)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 500.0;

    /// Ball count bounds (control panel slider range)
    pub const DEFAULT_BALL_COUNT: usize = 10;
    pub const MIN_BALL_COUNT: usize = 1;
    pub const MAX_BALL_COUNT: usize = 20;

    /// Ball radius range, drawn once per ball at spawn
    pub const MIN_RADIUS: f32 = 15.0;
    pub const MAX_RADIUS: f32 = 30.0;
    /// Maximum initial speed per velocity component (units/tick)
    pub const MAX_SPEED: f32 = 10.0;
    /// Gap between the spawn row and the arena edge / neighbouring slots
    pub const SPAWN_GAP: f32 = 5.0;

    /// Linear velocity decay per tick, per axis
    pub const FRICTION: f32 = 0.01;
    /// Velocity components below this snap to zero
    pub const REST_EPSILON: f32 = 0.01;
    /// Fraction of velocity kept (sign flipped) after a wall bounce
    pub const RESTITUTION: f32 = 0.8;

    /// Cursor body radius
    pub const CURSOR_RADIUS: f32 = 5.0;
    /// Reserved id of the transient cursor body
    pub const CURSOR_ID: i32 = -1;

    /// Color given to freshly spawned balls
    pub const DEFAULT_COLOR: &str = "#ff0000";
    /// Fixed cursor color
    pub const CURSOR_COLOR: &str = "red";
}
