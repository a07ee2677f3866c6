//! Message formatting utilities for client display.

use tunebox_server::infrastructure::dto::websocket::{
    JoinedRoomDto, MemberDto, MessageDto, PlaybackStateDto, ReplyData, ReplyMessage, RoomInfoDto,
    ServerMessage, TrackDto,
};
use tunebox_shared::time::timestamp_to_time_label;

const RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format any frame received from the server
    pub fn format_server_message(message: &ServerMessage, me: &str) -> String {
        match message {
            ServerMessage::Connected {
                connection_id,
                username,
                ..
            } => Self::format_connected(username, connection_id),
            ServerMessage::Reply(reply) => Self::format_reply(reply, me),
            ServerMessage::MemberJoined {
                member,
                member_count,
                ..
            } => Self::format_member_joined(member, *member_count),
            ServerMessage::MemberLeft {
                username,
                member_count,
                ..
            } => format!("\n- {} left ({} in room)\n", username, member_count),
            ServerMessage::NewMessage { message, .. } => Self::format_chat_message(message, me),
            ServerMessage::StateChanged { music_state, .. } => {
                format!("\n{}", Self::format_music_state(music_state))
            }
            ServerMessage::QueueUpdated {
                queue,
                current_index,
                ..
            } => format!(
                "\nQueue updated:\n{}",
                Self::format_queue(queue, *current_index)
            ),
        }
    }

    pub fn format_connected(username: &str, connection_id: &str) -> String {
        format!(
            "\nConnected as '{}' ({}). Type /help for commands.\n",
            username, connection_id
        )
    }

    /// Format the reply to one of our own requests
    pub fn format_reply(reply: &ReplyMessage, me: &str) -> String {
        if !reply.success {
            return format!(
                "\n! {}\n",
                reply.message.as_deref().unwrap_or("request failed")
            );
        }
        match &reply.data {
            None => String::new(),
            Some(ReplyData::RoomCreated { room }) => {
                format!("\nCreated room '{}' (id: {})\n", room.name, room.id)
            }
            Some(ReplyData::Rooms { rooms }) => Self::format_rooms(rooms),
            Some(ReplyData::UsersCount {
                room_name,
                member_count,
                ..
            }) => format!("\n{}: {} member(s)\n", room_name, member_count),
            Some(ReplyData::Joined(joined)) => Self::format_joined(joined, me),
            Some(ReplyData::MusicState(state)) => format!("\n{}", Self::format_music_state(state)),
        }
    }

    pub fn format_rooms(rooms: &[RoomInfoDto]) -> String {
        let mut output = String::from("\nRooms:\n");
        if rooms.is_empty() {
            output.push_str("(No rooms yet, create one with /create <name>)\n");
        }
        for room in rooms {
            output.push_str(&format!(
                "{} - {} ({} member(s))\n",
                room.id, room.name, room.member_count
            ));
        }
        output
    }

    /// Format the room header shown after joining
    pub fn format_joined(joined: &JoinedRoomDto, me: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!("Room: {}\n", joined.room_name));
        output.push_str("Members:\n");
        for member in &joined.members {
            let me_suffix = if member.username == me { " (me)" } else { "" };
            output.push_str(&format!(
                "{}{} - joined at {}\n",
                member.username,
                me_suffix,
                timestamp_to_time_label(member.joined_at)
            ));
        }
        if !joined.messages.is_empty() {
            output.push_str("Recent messages:\n");
            for message in &joined.messages {
                output.push_str(&format!(
                    "[{}] @{}: {}\n",
                    timestamp_to_time_label(message.timestamp),
                    message.username,
                    message.content
                ));
            }
        }
        output.push_str(&Self::format_music_state(&joined.music_state));
        output.push_str(&format!("{}\n", RULE));
        output
    }

    pub fn format_member_joined(member: &MemberDto, member_count: usize) -> String {
        format!(
            "\n+ {} joined at {} ({} in room)\n",
            member.username,
            timestamp_to_time_label(member.joined_at),
            member_count
        )
    }

    /// Format a chat message
    pub fn format_chat_message(message: &MessageDto, me: &str) -> String {
        let from = if message.username == me {
            format!("@{} (me)", message.username)
        } else {
            format!("@{}", message.username)
        };
        format!(
            "\n[{}] {}: {}\n",
            timestamp_to_time_label(message.timestamp),
            from,
            message.content
        )
    }

    /// Format the now-playing line followed by the queue
    pub fn format_music_state(state: &PlaybackStateDto) -> String {
        let now_playing = match &state.current_track {
            Some(track) => format!(
                "{} {} [{} / {}] added by {}",
                if state.is_playing { "▶" } else { "⏸" },
                track.title,
                format_seconds(state.elapsed_seconds),
                format_seconds(track.duration_seconds),
                track.added_by
            ),
            None => "Nothing playing".to_string(),
        };
        format!(
            "{}\n{}",
            now_playing,
            Self::format_queue(&state.queue, state.current_index)
        )
    }

    pub fn format_queue(queue: &[TrackDto], current_index: Option<usize>) -> String {
        if queue.is_empty() {
            return "(Queue is empty)\n".to_string();
        }
        let mut output = String::new();
        for (index, track) in queue.iter().enumerate() {
            let marker = if current_index == Some(index) { ">" } else { " " };
            output.push_str(&format!(
                "{} {}. {} ({})\n",
                marker,
                index,
                track.title,
                format_seconds(track.duration_seconds)
            ));
        }
        output
    }

    pub fn format_help() -> String {
        "\nCommands:\n\
         /create <name>                 create a room\n\
         /rooms                         list rooms\n\
         /join <room_id>                join a room\n\
         /users [room_id]               member count\n\
         /leave                         leave the current room\n\
         /add <title> <url> [duration]  queue a track\n\
         /play                          toggle play/pause\n\
         /next, /prev                   skip tracks\n\
         /seek <seconds>                seek in the current track\n\
         /remove <index>                remove a queued track\n\
         /queue                         show what is playing\n\
         /quit                          exit\n\
         Anything else is sent as a chat message.\n"
            .to_string()
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}

/// `m:ss`
fn format_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
