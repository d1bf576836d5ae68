//! # Revision Timeline
//!
//! Cursor over an ordered list of revisions with on-demand reconstruction.
//!
//! ## Cursor
//!
//! ```text
//!  -1        0        1        2      ← revision_index
//!  ""  →  "Hello" → "Hello world" → "Hello world!"
//! ```
//!
//! `-1` is the empty document before the first revision. The content at
//! index `i` is always the replay of revisions `0..=i`, in list order,
//! starting from an empty buffer. Timestamps are never used for ordering.
//!
//! ## Replay Strategies
//!
//! - [`ReplayStrategy::Full`] replays from revision 0 on every move.
//! - [`ReplayStrategy::Cached`] memoizes content per visited index and
//!   resumes from the nearest cached index at or below the target.
//!
//! Both produce exactly what [`replay`] produces for the same index.

use rewind_commands::{apply_commands_in_place, Revision};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{instrument, trace};

/// Maximum number of memoized snapshots kept by the cached strategy
pub const DEFAULT_CACHE_LIMIT: usize = 256;

/// Playback lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
    Loading,
    Error,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlaybackState::Idle => "IDLE",
            PlaybackState::Playing => "PLAYING",
            PlaybackState::Paused => "PAUSED",
            PlaybackState::Loading => "LOADING",
            PlaybackState::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// How content is rebuilt after the cursor moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReplayStrategy {
    /// Replay from the first revision every time
    Full,

    /// Resume from memoized snapshots when possible
    #[default]
    Cached,
}

/// Reconstruct the content after revisions `0..=upto`.
///
/// Negative `upto` yields the empty document; `upto` past the end replays
/// every revision.
#[instrument(level = "trace", skip(revisions))]
pub fn replay(revisions: &[Revision], upto: i64) -> String {
    let mut buffer = String::new();
    if upto < 0 {
        return buffer;
    }

    let end = (upto as usize).min(revisions.len().saturating_sub(1));
    for revision in revisions.iter().take(end + 1) {
        apply_commands_in_place(&mut buffer, &revision.commands);
    }
    buffer
}

/// Revision list plus cursor, content and state
#[derive(Debug, Clone)]
pub struct Timeline {
    revisions: Vec<Revision>,
    revision_index: i64,
    content: String,
    state: PlaybackState,
    strategy: ReplayStrategy,
    snapshots: BTreeMap<usize, String>,
    cache_limit: usize,
}

impl Timeline {
    pub fn new(revisions: Vec<Revision>) -> Self {
        Self::with_strategy(revisions, ReplayStrategy::default())
    }

    pub fn with_strategy(revisions: Vec<Revision>, strategy: ReplayStrategy) -> Self {
        Self {
            revisions,
            revision_index: -1,
            content: String::new(),
            state: PlaybackState::Idle,
            strategy,
            snapshots: BTreeMap::new(),
            cache_limit: DEFAULT_CACHE_LIMIT,
        }
    }

    /// Cap the number of memoized snapshots (at least 1)
    pub fn with_cache_limit(mut self, cache_limit: usize) -> Self {
        self.cache_limit = cache_limit.max(1);
        self
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// Highest valid cursor position (`-1` when there are no revisions)
    pub fn last_index(&self) -> i64 {
        self.revisions.len() as i64 - 1
    }

    pub fn revision_index(&self) -> i64 {
        self.revision_index
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: PlaybackState) {
        self.state = state;
    }

    /// Revision under the cursor, if any
    pub fn current_revision(&self) -> Option<&Revision> {
        usize::try_from(self.revision_index)
            .ok()
            .and_then(|index| self.revisions.get(index))
    }

    /// Advance one revision. Returns false at the last revision.
    pub fn step_forward(&mut self) -> bool {
        if self.revision_index >= self.last_index() {
            return false;
        }

        self.revision_index += 1;
        self.reconstruct_current_content();
        true
    }

    /// Go back one revision. Returns false at the initial empty state.
    pub fn step_backward(&mut self) -> bool {
        if self.revision_index <= -1 {
            return false;
        }

        self.revision_index -= 1;
        self.reconstruct_current_content();
        true
    }

    /// Move the cursor to `index`, clamped into `[-1, len - 1]`. Always succeeds.
    pub fn jump_to_revision(&mut self, index: i64) -> bool {
        let target = index.clamp(-1, self.last_index());
        self.revision_index = target;

        if target == -1 {
            self.content.clear();
        } else {
            self.reconstruct_current_content();
        }
        true
    }

    /// Back to the initial empty state
    pub fn reset_cursor(&mut self) {
        self.revision_index = -1;
        self.content.clear();
    }

    /// Content after revisions `0..=index`, without moving the cursor
    pub fn content_at(&self, index: i64) -> String {
        replay(&self.revisions, index.clamp(-1, self.last_index()))
    }

    /// Rebuild `content` from the cursor position
    pub fn reconstruct_current_content(&mut self) {
        if self.revision_index < 0 {
            self.content.clear();
            return;
        }

        self.content = match self.strategy {
            ReplayStrategy::Full => replay(&self.revisions, self.revision_index),
            ReplayStrategy::Cached => self.replay_cached(self.revision_index as usize),
        };
    }

    fn replay_cached(&mut self, target: usize) -> String {
        let (mut buffer, from) = match self.snapshots.range(..=target).next_back() {
            Some((&index, snapshot)) => (snapshot.clone(), index + 1),
            None => (String::new(), 0),
        };

        trace!("Replaying revisions {}..={} from snapshot", from, target);

        for revision in &self.revisions[from..=target] {
            apply_commands_in_place(&mut buffer, &revision.commands);
        }

        self.remember(target, &buffer);
        buffer
    }

    fn remember(&mut self, index: usize, content: &str) {
        if self.snapshots.contains_key(&index) {
            return;
        }

        if self.snapshots.len() >= self.cache_limit {
            // Evict the snapshot farthest from where the cursor is now
            let farthest = self
                .snapshots
                .keys()
                .copied()
                .max_by_key(|&key| key.abs_diff(index));
            if let Some(key) = farthest {
                self.snapshots.remove(&key);
            }
        }

        self.snapshots.insert(index, content.to_string());
    }
}
