//! Playback clock: derived "where is the playhead" state for a room.
//!
//! A room never runs a timer. It stores the playhead position as of
//! `last_update` and derives the effective position from the wall clock
//! whenever someone interacts with the room. Track completion is therefore
//! discovered lazily, by the next operation or snapshot read.

use super::{entity::Track, value_object::Timestamp};

/// Stored playback state of one room.
///
/// Invariants:
/// - `is_playing` is false whenever `current_index` is `None`
/// - `stored_elapsed_seconds` is within `[0, duration]` of the active track
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    current_index: Option<usize>,
    is_playing: bool,
    stored_elapsed_seconds: f64,
    last_update: Timestamp,
}

impl PlaybackState {
    /// Idle state: no active track, paused, playhead at 0
    pub fn idle(now: Timestamp) -> Self {
        Self {
            current_index: None,
            is_playing: false,
            stored_elapsed_seconds: 0.0,
            last_update: now,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Playhead position as of [`PlaybackState::last_update`]
    pub fn stored_elapsed_seconds(&self) -> f64 {
        self.stored_elapsed_seconds
    }

    pub fn last_update(&self) -> Timestamp {
        self.last_update
    }

    /// Effective playhead position at `now`, clamped to `[0, duration]`.
    ///
    /// Pure: does not modify the stored state.
    pub fn effective_elapsed(&self, duration_seconds: f64, now: Timestamp) -> f64 {
        let elapsed = if self.is_playing && self.current_index.is_some() {
            self.stored_elapsed_seconds + now.seconds_since(self.last_update)
        } else {
            self.stored_elapsed_seconds
        };
        clamp_elapsed(elapsed, duration_seconds)
    }

    /// Fold the wall-clock time since the last update into the stored state.
    ///
    /// If the active track has played to its end, performs the same
    /// transition as an explicit skip (advance, or stop when the queue is
    /// exhausted). Returns `true` when that happened, meaning every member
    /// is owed a state-changed notification.
    ///
    /// Idempotent: calling it twice with the same `now` changes nothing the
    /// second time.
    pub fn reconcile(&mut self, queue: &[Track], now: Timestamp) -> bool {
        let Some(duration) = self.active_duration(queue) else {
            self.current_index = None;
            self.is_playing = false;
            self.stored_elapsed_seconds = 0.0;
            self.last_update = now;
            return false;
        };

        self.stored_elapsed_seconds = self.effective_elapsed(duration, now);
        self.last_update = now;

        if self.is_playing && self.stored_elapsed_seconds >= duration {
            self.advance(queue.len(), now);
            return true;
        }
        false
    }

    /// Skip transition: move to the following track and play it from the
    /// start, or stop with no active track when none follows.
    pub fn advance(&mut self, queue_len: usize, now: Timestamp) {
        match self.current_index {
            Some(index) if index + 1 < queue_len => self.start_at(index + 1, now),
            _ => self.stop(now),
        }
    }

    /// Make `index` the active track and play it from the start
    pub fn start_at(&mut self, index: usize, now: Timestamp) {
        self.current_index = Some(index);
        self.is_playing = true;
        self.stored_elapsed_seconds = 0.0;
        self.last_update = now;
    }

    /// Clear the active track ("queue exhausted")
    pub fn stop(&mut self, now: Timestamp) {
        self.current_index = None;
        self.is_playing = false;
        self.stored_elapsed_seconds = 0.0;
        self.last_update = now;
    }

    /// Flip play/pause. Callers reconcile first so no playing time is lost.
    pub fn toggle(&mut self, now: Timestamp) {
        if self.current_index.is_some() {
            self.is_playing = !self.is_playing;
        }
        self.last_update = now;
    }

    /// Move the playhead, clamped to the active track
    pub fn seek(&mut self, seconds: f64, duration_seconds: f64, now: Timestamp) {
        self.stored_elapsed_seconds = clamp_elapsed(seconds, duration_seconds);
        self.last_update = now;
    }

    /// Keep `current_index` pointing at the same track after removing
    /// the queue entry at `removed`.
    pub fn on_track_removed(&mut self, removed: usize) {
        if let Some(index) = self.current_index
            && index > removed
        {
            self.current_index = Some(index - 1);
        }
    }

    fn active_duration(&self, queue: &[Track]) -> Option<f64> {
        self.current_index
            .and_then(|index| queue.get(index))
            .map(|track| track.duration.as_secs())
    }
}

/// Clamp a playhead position to `[0, duration]`; NaN collapses to 0
pub fn clamp_elapsed(seconds: f64, duration_seconds: f64) -> f64 {
    let upper = duration_seconds.max(0.0);
    if seconds.is_nan() {
        return 0.0;
    }
    seconds.max(0.0).min(upper)
}
