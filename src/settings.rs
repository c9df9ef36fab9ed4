//! Simulation settings
//!
//! Loaded from a JSON file on native, persisted in LocalStorage on web.
//! Everything is validated before a simulation is started; the physics core
//! never sees an invalid value.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consts::*;
use crate::sim::{Arena, PhysicsParams, SpawnParams};

/// Rejected configuration
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("ball count {count} outside {min}..={max}")]
    BallCount { count: usize, min: usize, max: usize },
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidConstant { name: &'static str, value: f32 },
    #[error("radius range {min}..={max} contains no positive whole number")]
    RadiusRange { min: f32, max: f32 },
    #[error("restitution {0} outside 0..=1")]
    Restitution(f32),
    #[error("friction {friction} needs a positive rest_epsilon of at least half its value, got {rest_epsilon}")]
    Friction { friction: f32, rest_epsilon: f32 },
    #[error("arena {width}x{height} too small for a ball of radius {radius}")]
    ArenaTooSmall { width: f32, height: f32, radius: f32 },
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Spawning ===
    /// Number of balls created on start
    pub ball_count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Bound on each initial velocity component (units/tick)
    pub max_speed: f32,
    /// RNG seed; `None` lets the front end pick one
    pub seed: Option<u64>,

    // === Physics ===
    pub friction: f32,
    pub restitution: f32,
    pub rest_epsilon: f32,

    // === Cursor ===
    pub cursor_radius: f32,

    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ball_count: DEFAULT_BALL_COUNT,
            min_radius: MIN_RADIUS,
            max_radius: MAX_RADIUS,
            max_speed: MAX_SPEED,
            seed: None,

            friction: FRICTION,
            restitution: RESTITUTION,
            rest_epsilon: REST_EPSILON,

            cursor_radius: CURSOR_RADIUS,

            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
        }
    }
}

impl Settings {
    pub fn arena(&self) -> Arena {
        Arena::new(self.arena_width, self.arena_height)
    }

    pub fn physics(&self) -> PhysicsParams {
        PhysicsParams {
            friction: self.friction,
            restitution: self.restitution,
            rest_epsilon: self.rest_epsilon,
        }
    }

    pub fn spawn(&self) -> SpawnParams {
        SpawnParams {
            min_radius: self.min_radius,
            max_radius: self.max_radius,
            max_speed: self.max_speed,
            gap: SPAWN_GAP,
        }
    }

    /// Largest ball count whose spawn row fits inside the arena
    pub fn spawn_capacity(&self) -> usize {
        let spawn = self.spawn();
        (1..=MAX_BALL_COUNT)
            .take_while(|&n| spawn.slot(n - 1).x + self.max_radius <= self.arena_width)
            .last()
            .unwrap_or(0)
    }

    /// Clamp a requested ball count into the accepted range
    pub fn clamp_ball_count(&self, count: usize) -> usize {
        count.clamp(MIN_BALL_COUNT, self.spawn_capacity().max(MIN_BALL_COUNT))
    }

    /// Check a ball count against the accepted range
    pub fn check_ball_count(&self, count: usize) -> Result<(), SettingsError> {
        let max = self.spawn_capacity();
        if (MIN_BALL_COUNT..=max).contains(&count) {
            Ok(())
        } else {
            Err(SettingsError::BallCount {
                count,
                min: MIN_BALL_COUNT,
                max,
            })
        }
    }

    /// Reject values the physics core cannot handle
    pub fn validate(&self) -> Result<(), SettingsError> {
        let constants = [
            ("min_radius", self.min_radius),
            ("max_radius", self.max_radius),
            ("max_speed", self.max_speed),
            ("friction", self.friction),
            ("restitution", self.restitution),
            ("rest_epsilon", self.rest_epsilon),
            ("cursor_radius", self.cursor_radius),
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
        ];
        for (name, value) in constants {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::InvalidConstant { name, value });
            }
        }
        if self.cursor_radius == 0.0 {
            return Err(SettingsError::InvalidConstant {
                name: "cursor_radius",
                value: self.cursor_radius,
            });
        }

        if self.spawn().radius_range().is_empty() {
            return Err(SettingsError::RadiusRange {
                min: self.min_radius,
                max: self.max_radius,
            });
        }

        if self.restitution > 1.0 {
            return Err(SettingsError::Restitution(self.restitution));
        }

        // Anything slower than one tick of friction must snap to rest
        if self.rest_epsilon == 0.0 || self.friction > 2.0 * self.rest_epsilon {
            return Err(SettingsError::Friction {
                friction: self.friction,
                rest_epsilon: self.rest_epsilon,
            });
        }

        let tallest_row = self.spawn().slot(0).y + self.max_radius;
        if self.arena_width < 2.0 * self.max_radius
            || self.arena_height < 2.0 * self.max_radius
            || tallest_row > self.arena_height
        {
            return Err(SettingsError::ArenaTooSmall {
                width: self.arena_width,
                height: self.arena_height,
                radius: self.max_radius,
            });
        }

        self.check_ball_count(self.ball_count)
    }

    /// Parse and validate settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// LocalStorage key
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "ball_arena_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native: settings come from a file given on the command line
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
