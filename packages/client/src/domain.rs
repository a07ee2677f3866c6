//! Domain logic for client-side operations.
//!
//! Pure functions and state with no I/O, so they are easy to test.

use std::collections::HashMap;

use tunebox_server::infrastructure::dto::websocket::{
    ClientRequest, ReplyData, ReplyMessage, RequestOp,
};

use url::Url;

use crate::error::ClientError;

/// Check if the client should exit immediately based on the error type.
///
/// An unusable URL will not get better by retrying.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(error, ClientError::InvalidUrl(_))
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    if should_exit_immediately(error) {
        return false;
    }

    current_attempt < max_attempts
}

/// Build the WebSocket URL carrying the identity as query parameters
pub fn connect_url(
    base: &str,
    username: &str,
    profile_color: Option<&str>,
) -> Result<String, ClientError> {
    let mut url = Url::parse(base).map_err(|_| ClientError::InvalidUrl(base.to_string()))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("username", username);
        if let Some(color) = profile_color {
            query.append_pair("profile_color", color);
        }
    }
    Ok(url.into())
}

/// Request kinds whose success changes which room the session is in
#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Leave(String),
}

/// Per-connection state of the interactive session
#[derive(Debug, Default)]
pub struct SessionState {
    next_request_id: u64,
    current_room: Option<String>,
    pending: HashMap<u64, Pending>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Room the user is currently in, if any
    pub fn current_room(&self) -> Option<&str> {
        self.current_room.as_deref()
    }

    /// Assign a request id and remember what needs to happen on success
    pub fn prepare(&mut self, op: RequestOp) -> ClientRequest {
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        if let RequestOp::LeaveRoom { room_id } = &op {
            self.pending.insert(request_id, Pending::Leave(room_id.clone()));
        }
        ClientRequest {
            request_id: Some(request_id),
            op,
        }
    }

    /// Update the state from a reply
    pub fn on_reply(&mut self, reply: &ReplyMessage) {
        let pending = reply
            .request_id
            .and_then(|request_id| self.pending.remove(&request_id));

        if !reply.success {
            return;
        }
        if let Some(ReplyData::Joined(joined)) = &reply.data {
            self.current_room = Some(joined.room_id.clone());
        }
        if let Some(Pending::Leave(room_id)) = pending
            && self.current_room.as_deref() == Some(room_id.as_str())
        {
            self.current_room = None;
        }
    }
}
