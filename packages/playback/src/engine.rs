//! # Playback Engine
//!
//! Owns a [`Timeline`] and drives it with a Tokio interval while playing.
//!
//! ## State Machine
//!
//! ```text
//!            play()              pause()
//!   IDLE ───────────→ PLAYING ───────────→ PAUSED
//!    ↑                 │   ↑                 │
//!    │   last revision │   └──── play() ─────┘
//!    └─────────────────┘
//!    ↑
//!    └──────────────── reset() (from any state)
//! ```
//!
//! ## Timer
//!
//! At most one autoplay task exists per engine. Every `play()`, `pause()`
//! and `reset()` bumps a run counter under the lock and aborts the
//! previous task, so a tick that was already waiting on the lock sees a
//! stale run and does nothing. No tick takes effect after `pause()` or
//! `reset()` returns.

use crate::error::PlaybackResult;
use crate::options::{PlaybackOptions, PlaybackOptionsPatch};
use crate::timeline::{PlaybackState, ReplayStrategy, Timeline};
use rewind_commands::Revision;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Point-in-time view of an engine, for consumers that poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub revision_index: i64,
    pub content: String,
    pub revision_count: usize,
}

#[derive(Debug)]
struct Shared {
    timeline: Timeline,
    /// Identifies the autoplay task allowed to tick
    run: u64,
}

/// Navigable, playable view over a revision history
#[derive(Debug)]
pub struct PlaybackEngine {
    shared: Arc<Mutex<Shared>>,
    options: PlaybackOptions,
    timer: Option<JoinHandle<()>>,
}

impl PlaybackEngine {
    /// Create an engine with default options
    pub fn new(revisions: Vec<Revision>) -> Self {
        Self::from_timeline(Timeline::new(revisions), PlaybackOptions::default())
    }

    /// Create an engine with custom options.
    ///
    /// If `auto_play` is set, playback starts immediately (this needs a
    /// Tokio runtime; without one the engine stays idle).
    pub fn with_options(
        revisions: Vec<Revision>,
        options: PlaybackOptions,
    ) -> PlaybackResult<Self> {
        Self::with_strategy(revisions, options, ReplayStrategy::default())
    }

    pub fn with_strategy(
        revisions: Vec<Revision>,
        options: PlaybackOptions,
        strategy: ReplayStrategy,
    ) -> PlaybackResult<Self> {
        options.validate()?;

        let mut engine = Self::from_timeline(Timeline::with_strategy(revisions, strategy), options);
        if options.auto_play {
            engine.play();
        }
        Ok(engine)
    }

    fn from_timeline(timeline: Timeline, options: PlaybackOptions) -> Self {
        debug!("Creating playback engine over {} revisions", timeline.len());

        Self {
            shared: Arc::new(Mutex::new(Shared { timeline, run: 0 })),
            options,
            timer: None,
        }
    }

    /// Start autoplay. Returns false if already playing or no Tokio runtime is available.
    pub fn play(&mut self) -> bool {
        let mut shared = lock(&self.shared);
        if shared.timeline.state() == PlaybackState::Playing {
            return false;
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("Cannot start playback outside of a Tokio runtime");
                return false;
            }
        };

        shared.run += 1;
        cancel(&mut self.timer);
        shared.timeline.set_state(PlaybackState::Playing);

        let run = shared.run;
        let period = self.options.tick_interval();
        drop(shared);

        info!(
            "Starting playback (speed {}, tick every {:?})",
            self.options.speed, period
        );
        self.timer = Some(runtime.spawn(autoplay(Arc::clone(&self.shared), run, period)));
        true
    }

    /// Pause autoplay. Returns false unless currently playing.
    pub fn pause(&mut self) -> bool {
        let mut shared = lock(&self.shared);
        if shared.timeline.state() != PlaybackState::Playing {
            return false;
        }

        shared.run += 1;
        cancel(&mut self.timer);
        shared.timeline.set_state(PlaybackState::Paused);
        debug!("Paused at revision {}", shared.timeline.revision_index());
        true
    }

    /// Stop autoplay and return to the empty initial state
    pub fn reset(&mut self) {
        let mut shared = lock(&self.shared);

        shared.run += 1;
        cancel(&mut self.timer);
        shared.timeline.reset_cursor();
        shared.timeline.set_state(PlaybackState::Idle);
    }

    pub fn step_forward(&self) -> bool {
        lock(&self.shared).timeline.step_forward()
    }

    pub fn step_backward(&self) -> bool {
        lock(&self.shared).timeline.step_backward()
    }

    /// Jump to `index`, clamped into `[-1, len - 1]`. Always returns true.
    pub fn jump_to_revision(&self, index: i64) -> bool {
        lock(&self.shared).timeline.jump_to_revision(index)
    }

    pub fn state(&self) -> PlaybackState {
        lock(&self.shared).timeline.state()
    }

    pub fn revision_index(&self) -> i64 {
        lock(&self.shared).timeline.revision_index()
    }

    pub fn content(&self) -> String {
        lock(&self.shared).timeline.content().to_string()
    }

    pub fn revision_count(&self) -> usize {
        lock(&self.shared).timeline.len()
    }

    /// Revision under the cursor, if any
    pub fn current_revision(&self) -> Option<Revision> {
        lock(&self.shared).timeline.current_revision().cloned()
    }

    /// Content after revisions `0..=index`, without moving the cursor
    pub fn content_at(&self, index: i64) -> String {
        lock(&self.shared).timeline.content_at(index)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let shared = lock(&self.shared);
        PlaybackSnapshot {
            state: shared.timeline.state(),
            revision_index: shared.timeline.revision_index(),
            content: shared.timeline.content().to_string(),
            revision_count: shared.timeline.len(),
        }
    }

    /// Copy of the current options
    pub fn options(&self) -> PlaybackOptions {
        self.options
    }

    /// Merge `patch` into the options. A running timer keeps its interval
    /// until the next `play()`.
    pub fn set_options(&mut self, patch: PlaybackOptionsPatch) -> PlaybackResult<()> {
        self.options = self.options.merge(patch)?;
        Ok(())
    }

    /// Whether an autoplay task is still scheduled
    pub fn is_timer_active(&self) -> bool {
        self.timer
            .as_ref()
            .map_or(false, |timer| !timer.is_finished())
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        cancel(&mut self.timer);
    }
}

/// Abort the autoplay task, if any. Safe to call repeatedly.
fn cancel(timer: &mut Option<JoinHandle<()>>) {
    if let Some(timer) = timer.take() {
        timer.abort();
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn autoplay(shared: Arc<Mutex<Shared>>, run: u64, period: Duration) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if !tick(&shared, run) {
            break;
        }
    }
}

/// One autoplay step. Returns false once this run should stop ticking.
fn tick(shared: &Mutex<Shared>, run: u64) -> bool {
    let mut shared = lock(shared);
    if shared.run != run || shared.timeline.state() != PlaybackState::Playing {
        return false;
    }

    let timeline = &mut shared.timeline;
    let advanced = timeline.step_forward();
    if advanced && timeline.revision_index() < timeline.last_index() {
        return true;
    }

    timeline.set_state(PlaybackState::Idle);
    info!(
        "Playback complete at revision {}",
        timeline.revision_index()
    );
    false
}
