//! Entity 定義
//!
//! Room はチャットと再生キューを持つ集約ルート。
//! Room の状態はここに定義されたメソッドを通してのみ変更される。

use super::{
    error::RoomError,
    playback::PlaybackState,
    value_object::{
        ConnectionId, MessageContent, RoomId, RoomName, Timestamp, TrackDuration, TrackId,
        Username,
    },
};

/// One connection's membership in a room
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub username: Username,
    pub profile_color: Option<String>,
    pub joined_at: Timestamp,
}

/// One chat message in a room's history
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub author: Username,
    pub content: MessageContent,
    pub timestamp: Timestamp,
    pub profile_color: Option<String>,
}

/// One entry of a room's playback queue.
///
/// Metadata comes from the track catalogue; `id` and `added_by` are
/// assigned by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub preview_url: String,
    pub artwork: String,
    pub duration: TrackDuration,
    pub added_by: Username,
}

/// Verified identity attached to a connection
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub username: Username,
    pub profile_color: Option<String>,
}

/// What the registry knew about a connection when it went away
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRecord {
    pub identity: Identity,
    pub rooms: Vec<RoomId>,
}

/// Point-in-time listing entry for a room
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: RoomName,
    pub member_count: usize,
    pub created_at: Timestamp,
}

/// Read-only view of a room's playback
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub current_track: Option<Track>,
    pub current_index: Option<usize>,
    pub is_playing: bool,
    pub elapsed_seconds: f64,
    pub queue: Vec<Track>,
}

/// Playback mutations a member can request
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackCommand {
    AddToQueue(Track),
    PlayPause,
    Next,
    Previous,
    Seek(f64),
    RemoveFromQueue(usize),
}

/// Which notification a successful playback mutation calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackChange {
    /// Full snapshot (`state-changed`)
    StateChanged,
    /// Queue and current index only (`queue-updated`)
    QueueUpdated,
}

/// Result of applying a [`PlaybackCommand`].
///
/// `auto_advanced` is reported separately from `result`: reconciliation
/// may discover a finished track even when the command itself is then
/// rejected, and that discovery is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackOutcome {
    pub auto_advanced: bool,
    pub result: Result<PlaybackChange, RoomError>,
}

impl PlaybackOutcome {
    /// The notification owed to the room's members, if any
    pub fn notification(&self) -> Option<PlaybackChange> {
        match (&self.result, self.auto_advanced) {
            (_, true) | (Ok(PlaybackChange::StateChanged), false) => {
                Some(PlaybackChange::StateChanged)
            }
            (Ok(PlaybackChange::QueueUpdated), false) => Some(PlaybackChange::QueueUpdated),
            (Err(_), false) => None,
        }
    }
}

/// Client-supplied metadata of a track to enqueue
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    pub title: String,
    pub preview_url: String,
    pub artwork: String,
    pub duration: TrackDuration,
}

impl TrackMetadata {
    /// Turn the metadata into a queue entry
    pub fn into_track(self, id: TrackId, added_by: Username) -> Track {
        Track {
            id,
            title: self.title,
            preview_url: self.preview_url,
            artwork: self.artwork,
            duration: self.duration,
            added_by,
        }
    }
}

/// What a connection receives after joining a room
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRoom {
    pub room_id: RoomId,
    pub room_name: RoomName,
    pub members: Vec<Member>,
    pub messages: Vec<ChatMessage>,
    pub playback: PlaybackSnapshot,
}

/// Read model of a single room for the HTTP API
#[derive(Debug, Clone, PartialEq)]
pub struct RoomDetail {
    pub id: RoomId,
    pub name: RoomName,
    pub created_at: Timestamp,
    pub members: Vec<Member>,
    pub message_count: usize,
    pub playback: PlaybackSnapshot,
}

/// Room エンティティ
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    pub created_at: Timestamp,
    /// Join order; unique by connection id
    pub members: Vec<Member>,
    /// Append-only
    pub messages: Vec<ChatMessage>,
    pub queue: Vec<Track>,
    playback: PlaybackState,
}

impl Room {
    pub fn new(id: RoomId, name: RoomName, created_at: Timestamp) -> Self {
        Self {
            id,
            name,
            created_at,
            members: Vec::new(),
            messages: Vec::new(),
            queue: Vec::new(),
            playback: PlaybackState::idle(created_at),
        }
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            member_count: self.members.len(),
            created_at: self.created_at,
        }
    }

    // ----------------------------------------
    // membership & chat
    // ----------------------------------------

    /// Add a member. A connection that is already a member is replaced and
    /// moves to the end of the join order.
    pub fn join(&mut self, member: Member) {
        self.members
            .retain(|m| m.connection_id != member.connection_id);
        self.members.push(member);
    }

    /// Remove a member; absence is not an error
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<Member> {
        let index = self
            .members
            .iter()
            .position(|m| &m.connection_id == connection_id)?;
        Some(self.members.remove(index))
    }

    pub fn is_member(&self, connection_id: &ConnectionId) -> bool {
        self.members.iter().any(|m| &m.connection_id == connection_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Connection ids of all members, in join order
    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members
            .iter()
            .map(|m| m.connection_id.clone())
            .collect()
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    // ----------------------------------------
    // playback
    // ----------------------------------------

    /// Apply a playback command at `now`.
    ///
    /// The playhead is reconciled with the wall clock first, so a track that
    /// ended since the last interaction is skipped before the command runs.
    pub fn apply(&mut self, command: PlaybackCommand, now: Timestamp) -> PlaybackOutcome {
        let auto_advanced = self.playback.reconcile(&self.queue, now);
        let result = match command {
            PlaybackCommand::AddToQueue(track) => Ok(self.add_to_queue(track, now)),
            PlaybackCommand::PlayPause => self.play_pause(now),
            PlaybackCommand::Next => self.next(auto_advanced, now),
            PlaybackCommand::Previous => self.previous(now),
            PlaybackCommand::Seek(seconds) => self.seek(seconds, now),
            PlaybackCommand::RemoveFromQueue(index) => self.remove_from_queue(index),
        };
        PlaybackOutcome {
            auto_advanced,
            result,
        }
    }

    /// Reconcile at `now` and return the resulting snapshot.
    ///
    /// The flag is `true` when reconciliation skipped a finished track.
    pub fn playback_snapshot(&mut self, now: Timestamp) -> (PlaybackSnapshot, bool) {
        let auto_advanced = self.playback.reconcile(&self.queue, now);
        (self.current_snapshot(), auto_advanced)
    }

    /// Snapshot of the stored state, without consulting the clock.
    ///
    /// Only meaningful right after a reconciliation.
    pub fn current_snapshot(&self) -> PlaybackSnapshot {
        let current_index = self.playback.current_index();
        PlaybackSnapshot {
            current_track: current_index.and_then(|i| self.queue.get(i)).cloned(),
            current_index,
            is_playing: self.playback.is_playing(),
            elapsed_seconds: self.playback.stored_elapsed_seconds(),
            queue: self.queue.clone(),
        }
    }

    fn add_to_queue(&mut self, track: Track, now: Timestamp) -> PlaybackChange {
        let was_empty = self.queue.is_empty();
        self.queue.push(track);

        // The first track of an empty queue starts playing on its own.
        if was_empty {
            self.playback.start_at(0, now);
            return PlaybackChange::StateChanged;
        }
        PlaybackChange::QueueUpdated
    }

    fn play_pause(&mut self, now: Timestamp) -> Result<PlaybackChange, RoomError> {
        self.require_active_track()?;
        self.playback.toggle(now);
        Ok(PlaybackChange::StateChanged)
    }

    fn next(&mut self, auto_advanced: bool, now: Timestamp) -> Result<PlaybackChange, RoomError> {
        // A skip that races with the end of the track must not skip twice.
        if auto_advanced {
            return Ok(PlaybackChange::StateChanged);
        }
        if self.queue.is_empty() {
            return Err(RoomError::InvalidState("the queue is empty".to_string()));
        }
        self.require_active_track()?;
        self.playback.advance(self.queue.len(), now);
        Ok(PlaybackChange::StateChanged)
    }

    fn previous(&mut self, now: Timestamp) -> Result<PlaybackChange, RoomError> {
        let index = self.require_active_track()?;
        if index == 0 {
            return Err(RoomError::InvalidState(
                "already at the start of the queue".to_string(),
            ));
        }
        self.playback.start_at(index - 1, now);
        Ok(PlaybackChange::StateChanged)
    }

    fn seek(&mut self, seconds: f64, now: Timestamp) -> Result<PlaybackChange, RoomError> {
        let index = self.require_active_track()?;
        let duration = self.queue[index].duration.as_secs();
        self.playback.seek(seconds, duration, now);
        Ok(PlaybackChange::StateChanged)
    }

    fn remove_from_queue(&mut self, index: usize) -> Result<PlaybackChange, RoomError> {
        if index >= self.queue.len() {
            return Err(RoomError::NotFound(format!(
                "no track at queue index {index}"
            )));
        }
        if self.playback.current_index() == Some(index) {
            return Err(RoomError::InvalidState(
                "cannot remove the track that is currently playing".to_string(),
            ));
        }
        self.queue.remove(index);
        self.playback.on_track_removed(index);
        Ok(PlaybackChange::QueueUpdated)
    }

    fn require_active_track(&self) -> Result<usize, RoomError> {
        self.playback
            .current_index()
            .ok_or_else(|| RoomError::InvalidState("no track is playing".to_string()))
    }
}
