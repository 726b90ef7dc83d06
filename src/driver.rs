//! Session driver: fixed-rate loop, input dispatch and render sync
//!
//! Everything runs on the calling thread. Between ticks the driver drains
//! pending input events, then it ticks the simulation, mirrors the result onto
//! the render surface and sleeps until the next tick is due.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use glam::Vec2;

use crate::render::{RenderSurface, RenderSync};
use crate::settings::Settings;
use crate::sim::{Entity, EntityId, EntityKind, GameEvent, GameState, tick};

/// Input delivered by the host between ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Press { x: f32, y: f32 },
    Release,
    PointerMove { x: f32, y: f32 },
    Stop,
}

/// Most input events applied between two ticks
pub const MAX_EVENTS_PER_TICK: usize = 64;

/// Source of input events, polled before every tick until it runs dry or
/// [`MAX_EVENTS_PER_TICK`] events have been taken
pub trait InputSource {
    fn next_event(&mut self, state: &GameState, now: Instant) -> Option<InputEvent>;
}

/// Events pushed from a host thread
impl InputSource for mpsc::Receiver<InputEvent> {
    fn next_event(&mut self, _state: &GameState, _now: Instant) -> Option<InputEvent> {
        match self.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::TryRecvError::Empty) => None,
            // Host went away: nobody can stop us any more, so stop now
            Err(mpsc::TryRecvError::Disconnected) => Some(InputEvent::Stop),
        }
    }
}

/// Scripted events, all delivered before the first tick
impl InputSource for VecDeque<InputEvent> {
    fn next_event(&mut self, _state: &GameState, _now: Instant) -> Option<InputEvent> {
        self.pop_front()
    }
}

/// A running game bound to a render surface
pub struct Session<S: RenderSurface> {
    settings: Settings,
    state: GameState,
    surface: S,
    sync: RenderSync,
}

impl<S: RenderSurface> Session<S> {
    /// Build the world and attach the cannon to the surface
    pub fn init(settings: Settings, mut surface: S) -> Self {
        let state = GameState::new(settings.field(), settings.cannon_origin, settings.seed);
        let sync = RenderSync::attach(&state, &mut surface);
        log::info!(
            "{}: {}x{} field at {} ticks/s",
            settings.name,
            settings.width,
            settings.height,
            settings.fps
        );
        Self {
            settings,
            state,
            surface,
            sync,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Spawn an entity and put it on the surface right away
    pub fn spawn(&mut self, kind: EntityKind, entity: Entity) -> EntityId {
        let id = self.state.spawn(kind, entity);
        self.sync.sync(&mut self.state, &mut self.surface);
        id
    }

    /// Spawn `count` targets at random positions with random drift
    pub fn spawn_random_targets(&mut self, count: u32) {
        for _ in 0..count {
            self.state.spawn_random_target();
        }
        self.sync.sync(&mut self.state, &mut self.surface);
    }

    /// Remove the most recently spawned live target
    pub fn pop_target(&mut self) -> Option<EntityId> {
        let id = self.state.targets.pop_latest()?;
        self.sync.sync(&mut self.state, &mut self.surface);
        Some(id)
    }

    /// Apply one input event
    pub fn handle(&mut self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::Press { x, y } => self.state.on_press(Vec2::new(x, y), now),
            InputEvent::Release => {
                self.state.on_release();
            }
            InputEvent::PointerMove { x, y } => self.state.on_pointer_move(Vec2::new(x, y)),
            InputEvent::Stop => self.state.stop(),
        }
    }

    /// Run one tick and push the frame to the surface
    pub fn step(&mut self, now: Instant) {
        tick(&mut self.state, now);
        self.sync.frame(&mut self.state, &mut self.surface);
        self.log_events();
    }

    /// Tick at the configured rate until the session ends; returns the score
    pub fn run<I: InputSource>(&mut self, input: &mut I) -> u64 {
        let period = self.settings.tick_period();
        let mut next_tick_time = Instant::now();
        log::info!(
            "Session started with {} targets",
            self.state.live_targets()
        );

        while self.state.is_running() {
            let now = Instant::now();
            for _ in 0..MAX_EVENTS_PER_TICK {
                if !self.state.is_running() {
                    break;
                }
                match input.next_event(&self.state, now) {
                    Some(event) => self.handle(event, now),
                    None => break,
                }
            }
            if !self.state.is_running() {
                self.log_events();
                break;
            }

            self.step(now);

            next_tick_time += period;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > period * 2 {
                // Too far behind, don't try to catch up
                next_tick_time = now;
            }
        }

        log::info!(
            "Session over after {} ticks ({:?}), score {}",
            self.state.time_ticks,
            self.state.phase,
            self.state.score
        );
        self.state.score
    }

    fn log_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::BulletFired { id, speed } => {
                    log::debug!("Fired {:?} at {:.2} px/tick", id, speed)
                }
                GameEvent::TargetHit {
                    bullet,
                    target,
                    points,
                } => log::debug!("{:?} hit {:?} (+{})", bullet, target, points),
                GameEvent::SessionOver { phase, score } => {
                    log::debug!("Session ended: {:?}, score {}", phase, score)
                }
            }
        }
    }
}

/// What the demo pilot is doing
#[derive(Debug, Clone, Copy, PartialEq)]
enum PilotPhase {
    Waiting { until_tick: u64 },
    Holding { since: Instant },
}

/// Input source that plays the game on its own
///
/// Aims at the first live target, holds the button for a fixed time, releases,
/// waits a few ticks and repeats. Asks to stop once its tick budget runs out.
#[derive(Debug, Clone)]
pub struct DemoPilot {
    hold: Duration,
    cooldown_ticks: u64,
    max_ticks: u64,
    phase: PilotPhase,
    pending: VecDeque<InputEvent>,
    /// Last tick a batch was planned for
    planned_tick: Option<u64>,
}

impl DemoPilot {
    pub fn new(hold: Duration, cooldown_ticks: u64, max_ticks: u64) -> Self {
        Self {
            hold,
            cooldown_ticks,
            max_ticks,
            phase: PilotPhase::Waiting { until_tick: 0 },
            pending: VecDeque::new(),
            planned_tick: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Duration::from_millis(settings.demo_hold_ms),
            settings.demo_cooldown_ticks,
            settings.demo_max_ticks,
        )
    }

    fn plan(&mut self, state: &GameState, now: Instant) {
        if state.time_ticks >= self.max_ticks {
            self.pending.push_back(InputEvent::Stop);
            return;
        }

        let Some(aim) = state.targets.iter_alive().map(|(_, t)| t.pos).next() else {
            return;
        };
        self.pending.push_back(InputEvent::PointerMove {
            x: aim.x,
            y: aim.y,
        });

        match self.phase {
            PilotPhase::Waiting { until_tick } if state.time_ticks >= until_tick => {
                let press = state.cannon.origin;
                self.pending.push_back(InputEvent::Press {
                    x: press.x,
                    y: press.y,
                });
                self.phase = PilotPhase::Holding { since: now };
            }
            PilotPhase::Holding { since } if now.saturating_duration_since(since) >= self.hold => {
                self.pending.push_back(InputEvent::Release);
                self.phase = PilotPhase::Waiting {
                    until_tick: state.time_ticks + self.cooldown_ticks,
                };
            }
            _ => {}
        }
    }
}

impl InputSource for DemoPilot {
    fn next_event(&mut self, state: &GameState, now: Instant) -> Option<InputEvent> {
        if self.planned_tick != Some(state.time_ticks) {
            self.planned_tick = Some(state.time_ticks);
            self.plan(state, now);
        }
        self.pending.pop_front()
    }
}
