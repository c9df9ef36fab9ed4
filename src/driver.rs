//! Frame driver
//!
//! Explicit Idle/Running/Paused state machine. The host schedules one frame
//! callback per display refresh and passes the `FrameTicket` it was handed
//! back into `Simulation::frame`. Tickets carry the generation they were
//! issued in; `start` and `stop` bump the generation, so a callback that was
//! already queued when the simulation stopped does nothing.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::input::PointerState;
use crate::renderer::RenderSink;
use crate::settings::{Settings, SettingsError};
use crate::sim::{Body, Color, World};

/// Lifecycle state of the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopState {
    /// No bodies, no frames scheduled
    Idle,
    /// Stepping and rendering every frame
    Running,
    /// Rendering only
    Paused,
}

/// Permission to run one frame, valid until the next start/stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

/// What a frame callback did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Bodies advanced one tick and were rendered
    Stepped(FrameTicket),
    /// Bodies rendered without mutation
    Rendered(FrameTicket),
    /// Stale ticket or idle simulation; do not reschedule
    Cancelled,
}

impl FrameOutcome {
    /// Ticket for the next frame, if one should be scheduled
    pub fn next(self) -> Option<FrameTicket> {
        match self {
            FrameOutcome::Stepped(ticket) | FrameOutcome::Rendered(ticket) => Some(ticket),
            FrameOutcome::Cancelled => None,
        }
    }
}

/// Rejected control operation
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    #[error("cannot {action} while {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: LoopState,
    },
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("no body with id {0}")]
    UnknownBody(i32),
    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),
}

/// Owns the world and drives it frame by frame
#[derive(Debug, Clone)]
pub struct Simulation {
    settings: Settings,
    state: LoopState,
    world: Option<World>,
    rng: Pcg32,
    generation: u64,
    ticks: u64,
}

impl Simulation {
    /// Create an idle simulation; settings are validated here
    pub fn new(settings: Settings) -> Result<Self, LoopError> {
        settings.validate()?;
        Ok(Self::idle(settings))
    }

    /// Like `new`, but invalid settings fall back to the defaults (keeping the seed)
    pub fn new_or_default(settings: Settings) -> Self {
        let seed = settings.seed;
        Self::new(settings).unwrap_or_else(|e| {
            log::warn!("Invalid settings ({}), using defaults", e);
            Self::idle(Settings {
                seed,
                ..Default::default()
            })
        })
    }

    fn idle(settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or_default();
        Self {
            settings,
            state: LoopState::Idle,
            world: None,
            rng: Pcg32::seed_from_u64(seed),
            generation: 0,
            ticks: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    /// Read-only snapshot of the current bodies (empty while idle)
    pub fn bodies(&self) -> &[Body] {
        self.world.as_ref().map(World::bodies).unwrap_or(&[])
    }

    /// Steps taken since the last start
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether a ticket still authorizes a frame
    pub fn is_live(&self, ticket: FrameTicket) -> bool {
        ticket.generation == self.generation && self.state != LoopState::Idle
    }

    /// Spawn `count` bodies and start running
    pub fn start(&mut self, count: usize) -> Result<FrameTicket, LoopError> {
        if self.state != LoopState::Idle {
            log::warn!("Ignoring start while {:?}", self.state);
            return Err(LoopError::InvalidTransition {
                action: "start",
                state: self.state,
            });
        }
        self.settings.check_ball_count(count)?;

        self.world = Some(World::spawn(
            self.settings.arena(),
            self.settings.physics(),
            &self.settings.spawn(),
            count,
            &mut self.rng,
        ));
        self.state = LoopState::Running;
        self.ticks = 0;
        self.generation += 1;

        log::info!("Simulation started with {} balls", count);
        Ok(FrameTicket {
            generation: self.generation,
        })
    }

    /// Discard all bodies and go idle; outstanding tickets become stale
    pub fn stop(&mut self) -> Result<(), LoopError> {
        if self.state == LoopState::Idle {
            return Err(LoopError::InvalidTransition {
                action: "stop",
                state: self.state,
            });
        }
        self.world = None;
        self.state = LoopState::Idle;
        self.generation += 1;

        log::info!("Simulation stopped after {} ticks", self.ticks);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), LoopError> {
        match self.state {
            LoopState::Running => {
                self.state = LoopState::Paused;
                log::info!("Paused");
                Ok(())
            }
            state => Err(LoopError::InvalidTransition {
                action: "pause",
                state,
            }),
        }
    }

    pub fn resume(&mut self) -> Result<(), LoopError> {
        match self.state {
            LoopState::Paused => {
                self.state = LoopState::Running;
                log::info!("Resumed");
                Ok(())
            }
            state => Err(LoopError::InvalidTransition {
                action: "resume",
                state,
            }),
        }
    }

    /// Pause button: flip between Running and Paused
    pub fn toggle_pause(&mut self) -> Result<LoopState, LoopError> {
        match self.state {
            LoopState::Running => self.pause()?,
            LoopState::Paused => self.resume()?,
            LoopState::Idle => {
                return Err(LoopError::InvalidTransition {
                    action: "toggle pause",
                    state: LoopState::Idle,
                });
            }
        }
        Ok(self.state)
    }

    /// Start/Stop button: start when idle, otherwise stop
    ///
    /// Returns the first frame ticket when a new run begins.
    pub fn toggle_running(&mut self, count: usize) -> Result<Option<FrameTicket>, LoopError> {
        if self.state == LoopState::Idle {
            self.start(count).map(Some)
        } else {
            self.stop().map(|()| None)
        }
    }

    /// Run one display frame
    ///
    /// Running: sample the cursor, step, then draw. Paused: draw only.
    /// Rendering always happens after the step of the same frame.
    pub fn frame(
        &mut self,
        ticket: FrameTicket,
        pointer: &mut PointerState,
        sink: &mut impl RenderSink,
    ) -> FrameOutcome {
        if !self.is_live(ticket) {
            log::debug!("Dropping stale frame (generation {})", ticket.generation);
            return FrameOutcome::Cancelled;
        }
        let Some(world) = self.world.as_mut() else {
            return FrameOutcome::Cancelled;
        };

        match self.state {
            LoopState::Running => {
                let cursor = pointer.sample_cursor(&world.arena, self.settings.cursor_radius);
                world.step(cursor.as_ref());
                self.ticks += 1;

                sink.clear();
                if let Some(cursor) = &cursor {
                    sink.draw_disk(cursor.pos, cursor.radius, &cursor.color);
                }
                draw_bodies(world.bodies(), sink);
                FrameOutcome::Stepped(ticket)
            }
            LoopState::Paused => {
                pointer.delta = Vec2::ZERO;
                sink.clear();
                draw_bodies(world.bodies(), sink);
                FrameOutcome::Rendered(ticket)
            }
            LoopState::Idle => FrameOutcome::Cancelled,
        }
    }

    /// Body under a pick click, if any
    pub fn pick(&self, pos: Vec2) -> Option<i32> {
        self.world.as_ref()?.pick(pos)
    }

    pub fn color_of(&self, id: i32) -> Option<&Color> {
        self.world.as_ref()?.body(id).map(|b| &b.color)
    }

    /// Change a body's display color (`#rrggbb`)
    pub fn set_color(&mut self, id: i32, color: &str) -> Result<(), LoopError> {
        let color = Color::parse_hex(color).ok_or_else(|| LoopError::InvalidColor(color.into()))?;
        if self.world.as_mut().is_some_and(|w| w.set_color(id, color)) {
            log::debug!("Ball {} color set", id);
            Ok(())
        } else {
            Err(LoopError::UnknownBody(id))
        }
    }
}

fn draw_bodies(bodies: &[Body], sink: &mut impl RenderSink) {
    for body in bodies {
        sink.draw_disk(body.pos, body.radius, &body.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRICTION;
    use crate::input::PRIMARY_BUTTON;

    /// Records every draw call, grouped by frame
    #[derive(Default)]
    struct Recorder {
        frames: Vec<Vec<(Vec2, f32, String)>>,
    }

    impl RenderSink for Recorder {
        fn clear(&mut self) {
            self.frames.push(Vec::new());
        }

        fn draw_disk(&mut self, center: Vec2, radius: f32, color: &Color) {
            self.frames
                .last_mut()
                .expect("draw before clear")
                .push((center, radius, color.as_str().to_string()));
        }
    }

    fn simulation() -> Simulation {
        Simulation::new(Settings {
            seed: Some(12345),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut sim = simulation();
        assert_eq!(sim.state(), LoopState::Idle);
        assert!(sim.stop().is_err());
        assert!(sim.pause().is_err());
        assert!(sim.toggle_pause().is_err());

        sim.start(10).unwrap();
        assert_eq!(sim.state(), LoopState::Running);
        assert_eq!(sim.bodies().len(), 10);
        assert!(matches!(
            sim.start(5),
            Err(LoopError::InvalidTransition { action: "start", .. })
        ));

        assert_eq!(sim.toggle_pause().unwrap(), LoopState::Paused);
        assert!(sim.pause().is_err());
        assert!(sim.start(5).is_err());
        sim.resume().unwrap();
        assert_eq!(sim.state(), LoopState::Running);

        sim.pause().unwrap();
        sim.stop().unwrap();
        assert_eq!(sim.state(), LoopState::Idle);
        assert!(sim.bodies().is_empty());
        assert!(sim.world().is_none());
    }

    #[test]
    fn test_start_rejects_bad_count() {
        let mut sim = simulation();
        assert!(matches!(
            sim.start(0),
            Err(LoopError::Settings(SettingsError::BallCount { .. }))
        ));
        assert!(sim.start(21).is_err());
        assert_eq!(sim.state(), LoopState::Idle);
    }

    #[test]
    fn test_running_frame_steps_and_draws() {
        let mut sim = simulation();
        let ticket = sim.start(3).unwrap();
        let before = sim.bodies().to_vec();
        let mut pointer = PointerState::default();
        let mut sink = Recorder::default();

        let outcome = sim.frame(ticket, &mut pointer, &mut sink);
        assert_eq!(outcome, FrameOutcome::Stepped(ticket));
        assert_eq!(sim.ticks(), 1);
        assert_ne!(sim.bodies(), before.as_slice());

        // Drawn positions are the post-step state
        assert_eq!(sink.frames.len(), 1);
        let drawn: Vec<Vec2> = sink.frames[0].iter().map(|(p, _, _)| *p).collect();
        let current: Vec<Vec2> = sim.bodies().iter().map(|b| b.pos).collect();
        assert_eq!(drawn, current);
    }

    #[test]
    fn test_paused_frame_renders_without_mutation() {
        let mut sim = simulation();
        let ticket = sim.start(4).unwrap();
        sim.pause().unwrap();
        let before = sim.bodies().to_vec();

        let mut pointer = PointerState::default();
        pointer.enter();
        pointer.update(Vec2::new(200.0, 200.0), Vec2::new(9.0, 9.0), PRIMARY_BUTTON, false);
        let mut sink = Recorder::default();

        for _ in 0..5 {
            let outcome = sim.frame(ticket, &mut pointer, &mut sink);
            assert_eq!(outcome, FrameOutcome::Rendered(ticket));
        }
        assert_eq!(sim.bodies(), before.as_slice());
        assert_eq!(sim.ticks(), 0);
        assert_eq!(sink.frames.len(), 5);
        // No cursor disk while paused
        assert!(sink.frames.iter().all(|f| f.len() == 4));
    }

    #[test]
    fn test_cursor_drawn_first_in_fixed_color() {
        let mut sim = simulation();
        let ticket = sim.start(2).unwrap();
        let mut pointer = PointerState::default();
        pointer.enter();
        pointer.update(Vec2::new(600.0, 400.0), Vec2::new(1.0, 0.0), PRIMARY_BUTTON, false);
        let mut sink = Recorder::default();

        sim.frame(ticket, &mut pointer, &mut sink);
        let frame = &sink.frames[0];
        assert_eq!(frame.len(), 3);
        assert_eq!(frame[0], (Vec2::new(600.0, 400.0), 5.0, "red".to_string()));
        assert_eq!(pointer.delta, Vec2::ZERO);
    }

    #[test]
    fn test_stale_ticket_after_stop() {
        let mut sim = simulation();
        let old = sim.start(5).unwrap();
        sim.stop().unwrap();

        let mut pointer = PointerState::default();
        let mut sink = Recorder::default();
        assert_eq!(sim.frame(old, &mut pointer, &mut sink), FrameOutcome::Cancelled);
        assert!(sink.frames.is_empty());

        // Restarting does not revive the old callback chain
        let fresh = sim.start(5).unwrap();
        assert!(!sim.is_live(old));
        assert_eq!(sim.frame(old, &mut pointer, &mut sink), FrameOutcome::Cancelled);
        assert_eq!(sim.ticks(), 0);
        assert_eq!(
            sim.frame(fresh, &mut pointer, &mut sink),
            FrameOutcome::Stepped(fresh)
        );
        assert_eq!(sim.ticks(), 1);
    }

    #[test]
    fn test_toggle_running() {
        let mut sim = simulation();
        let ticket = sim.toggle_running(6).unwrap();
        assert!(ticket.is_some());
        assert_eq!(sim.bodies().len(), 6);

        sim.pause().unwrap();
        assert_eq!(sim.toggle_running(6).unwrap(), None);
        assert_eq!(sim.state(), LoopState::Idle);
    }

    #[test]
    fn test_pick_and_recolor() {
        let mut sim = simulation();
        assert_eq!(sim.pick(Vec2::new(35.0, 35.0)), None);

        sim.start(3).unwrap();
        // Spawn slot 0 is centered at (35, 35)
        assert_eq!(sim.pick(Vec2::new(35.0, 35.0)), Some(0));

        sim.set_color(0, "#00ff00").unwrap();
        assert_eq!(sim.color_of(0).unwrap().as_str(), "#00ff00");
        assert!(matches!(
            sim.set_color(0, "green"),
            Err(LoopError::InvalidColor(_))
        ));
        assert!(matches!(
            sim.set_color(99, "#000000"),
            Err(LoopError::UnknownBody(99))
        ));
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = simulation();
        let mut b = simulation();
        let ta = a.start(8).unwrap();
        let tb = b.start(8).unwrap();
        let mut pointer = PointerState::default();
        let mut sink = Recorder::default();

        for _ in 0..50 {
            a.frame(ta, &mut pointer, &mut sink);
            b.frame(tb, &mut pointer, &mut sink);
        }
        assert_eq!(a.bodies(), b.bodies());
    }

    #[test]
    fn test_invalid_settings_fall_back_with_seed() {
        let sim = Simulation::new_or_default(Settings {
            friction: 0.5,
            seed: Some(777),
            ..Default::default()
        });
        assert_eq!(sim.settings().friction, FRICTION);
        assert_eq!(sim.settings().seed, Some(777));

        let mut a = sim;
        let mut b = Simulation::new(Settings {
            seed: Some(777),
            ..Default::default()
        })
        .unwrap();
        a.start(5).unwrap();
        b.start(5).unwrap();
        assert_eq!(a.bodies(), b.bodies());

        let valid = Simulation::new_or_default(Settings {
            ball_count: 4,
            ..Default::default()
        });
        assert_eq!(valid.settings().ball_count, 4);
    }
}
