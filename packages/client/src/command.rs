//! Parsing of prompt lines into requests.
//!
//! Lines starting with `/` are commands; anything else is a chat message for
//! the room the client is currently in.

use tunebox_server::infrastructure::dto::websocket::{
    DEFAULT_TRACK_DURATION_SECS, NewTrackDto, RequestOp,
};

use crate::error::CommandError;

/// What the user asked for on one prompt line
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Request(RequestOp),
    Help,
    Quit,
}

/// Parse one non-empty prompt line
pub fn parse_input(line: &str, current_room: Option<&str>) -> Result<Input, CommandError> {
    let line = line.trim();
    let Some(command_line) = line.strip_prefix('/') else {
        let room_id = require_room(current_room)?;
        return Ok(Input::Request(RequestOp::SendMessage {
            room_id,
            content: line.to_string(),
            profile_color: None,
        }));
    };

    let (command, rest) = match command_line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (command_line, ""),
    };

    let op = match command {
        "help" | "h" => return Ok(Input::Help),
        "quit" | "q" => return Ok(Input::Quit),
        "create" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("/create <name>"));
            }
            RequestOp::CreateRoom {
                room_name: rest.to_string(),
            }
        }
        "rooms" => RequestOp::GetRooms,
        "users" => RequestOp::GetRoomUsersCount {
            room_id: argument_or_room(rest, current_room)?,
        },
        "join" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("/join <room_id>"));
            }
            RequestOp::JoinRoom {
                room_id: rest.to_string(),
                username: None,
                profile_color: None,
            }
        }
        "leave" => RequestOp::LeaveRoom {
            room_id: require_room(current_room)?,
        },
        "add" => RequestOp::AddToQueue {
            room_id: require_room(current_room)?,
            track: parse_track(rest)?,
        },
        "play" | "pause" => RequestOp::PlayPause {
            room_id: require_room(current_room)?,
        },
        "next" => RequestOp::NextTrack {
            room_id: require_room(current_room)?,
        },
        "prev" => RequestOp::PreviousTrack {
            room_id: require_room(current_room)?,
        },
        "seek" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("/seek <seconds>"));
            }
            RequestOp::SeekTo {
                room_id: require_room(current_room)?,
                time: parse_number(rest, "number of seconds")?,
            }
        }
        "remove" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("/remove <index>"));
            }
            RequestOp::RemoveFromQueue {
                room_id: require_room(current_room)?,
                track_index: parse_number(rest, "queue index")?,
            }
        }
        "queue" => RequestOp::GetMusicState {
            room_id: require_room(current_room)?,
        },
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };
    Ok(Input::Request(op))
}

fn require_room(current_room: Option<&str>) -> Result<String, CommandError> {
    current_room
        .map(str::to_string)
        .ok_or(CommandError::NotInRoom)
}

fn argument_or_room(rest: &str, current_room: Option<&str>) -> Result<String, CommandError> {
    if rest.is_empty() {
        require_room(current_room)
    } else {
        Ok(rest.to_string())
    }
}

fn parse_number<T: std::str::FromStr>(
    value: &str,
    expected: &'static str,
) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidNumber {
        value: value.to_string(),
        expected,
    })
}

/// `<title...> <url> [duration]`
///
/// The title may contain spaces; the URL is the last token unless that token
/// is a number, in which case it is the duration and the URL precedes it.
fn parse_track(rest: &str) -> Result<NewTrackDto, CommandError> {
    const USAGE: &str = "/add <title> <url> [duration]";

    let mut tokens: Vec<&str> = rest.split_whitespace().collect();
    let duration_seconds = match tokens.last() {
        Some(&last) if tokens.len() >= 3 && last.parse::<f64>().is_ok() => {
            let duration = parse_number(last, "duration")?;
            tokens.pop();
            Some(duration)
        }
        _ => None,
    };
    let Some(preview_url) = tokens.pop() else {
        return Err(CommandError::Usage(USAGE));
    };
    if tokens.is_empty() {
        return Err(CommandError::Usage(USAGE));
    }

    Ok(NewTrackDto {
        title: tokens.join(" "),
        preview_url: preview_url.to_string(),
        artwork: String::new(),
        duration_seconds: duration_seconds.unwrap_or(DEFAULT_TRACK_DURATION_SECS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_chat_message_for_current_room() {
        // テスト項目: スラッシュで始まらない行は現在の Room へのメッセージになる
        // when (操作):
        let input = parse_input("hello there", Some("room-1")).unwrap();

        // then (期待する結果):
        assert_eq!(
            input,
            Input::Request(RequestOp::SendMessage {
                room_id: "room-1".to_string(),
                content: "hello there".to_string(),
                profile_color: None,
            })
        );
    }

    #[test]
    fn test_chat_message_requires_room() {
        // テスト項目: Room 未参加でメッセージを送ろうとするとエラーになる
        // when (操作):
        let result = parse_input("hello", None);

        // then (期待する結果):
        assert_eq!(result, Err(CommandError::NotInRoom));
    }

    #[test]
    fn test_room_commands() {
        // テスト項目: Room 関連のコマンドが対応するリクエストになる
        // then (期待する結果):
        assert_eq!(
            parse_input("/create Friday Night", None).unwrap(),
            Input::Request(RequestOp::CreateRoom {
                room_name: "Friday Night".to_string()
            })
        );
        assert_eq!(
            parse_input("/rooms", None).unwrap(),
            Input::Request(RequestOp::GetRooms)
        );
        assert_eq!(
            parse_input("/join abc", None).unwrap(),
            Input::Request(RequestOp::JoinRoom {
                room_id: "abc".to_string(),
                username: None,
                profile_color: None,
            })
        );
        assert_eq!(
            parse_input("/users", Some("abc")).unwrap(),
            Input::Request(RequestOp::GetRoomUsersCount {
                room_id: "abc".to_string()
            })
        );
        assert_eq!(
            parse_input("/leave", Some("abc")).unwrap(),
            Input::Request(RequestOp::LeaveRoom {
                room_id: "abc".to_string()
            })
        );
        assert_eq!(parse_input("/help", None).unwrap(), Input::Help);
        assert_eq!(parse_input("/quit", None).unwrap(), Input::Quit);
    }

    #[test]
    fn test_playback_commands() {
        // テスト項目: 再生操作のコマンドが対応するリクエストになる
        // given (前提条件):
        let room = Some("abc");

        // then (期待する結果):
        assert_eq!(
            parse_input("/seek 12.5", room).unwrap(),
            Input::Request(RequestOp::SeekTo {
                room_id: "abc".to_string(),
                time: 12.5
            })
        );
        assert_eq!(
            parse_input("/remove 2", room).unwrap(),
            Input::Request(RequestOp::RemoveFromQueue {
                room_id: "abc".to_string(),
                track_index: 2
            })
        );
        assert_eq!(
            parse_input("/next", room).unwrap(),
            Input::Request(RequestOp::NextTrack {
                room_id: "abc".to_string()
            })
        );
        assert_eq!(
            parse_input("/queue", room).unwrap(),
            Input::Request(RequestOp::GetMusicState {
                room_id: "abc".to_string()
            })
        );
        assert_eq!(parse_input("/next", None), Err(CommandError::NotInRoom));
    }

    #[test]
    fn test_add_track_with_and_without_duration() {
        // テスト項目: /add はタイトル・URL・長さ (省略可) を解釈する
        // when (操作):
        let with_duration = parse_input("/add So What https://cdn.example/a.m4a 42", Some("r"));
        let without_duration = parse_input("/add Blue https://cdn.example/b.m4a", Some("r"));

        // then (期待する結果):
        let Ok(Input::Request(RequestOp::AddToQueue { track, .. })) = with_duration else {
            panic!("expected add-to-queue");
        };
        assert_eq!(track.title, "So What");
        assert_eq!(track.preview_url, "https://cdn.example/a.m4a");
        assert_eq!(track.duration_seconds, 42.0);

        let Ok(Input::Request(RequestOp::AddToQueue { track, .. })) = without_duration else {
            panic!("expected add-to-queue");
        };
        assert_eq!(track.title, "Blue");
        assert_eq!(track.duration_seconds, 30.0);
    }

    #[test]
    fn test_invalid_commands() {
        // テスト項目: 不正なコマンドは送信前にエラーになる
        // then (期待する結果):
        assert_eq!(
            parse_input("/dance", None),
            Err(CommandError::UnknownCommand("dance".to_string()))
        );
        assert_eq!(
            parse_input("/create", None),
            Err(CommandError::Usage("/create <name>"))
        );
        assert_eq!(
            parse_input("/add https://cdn.example/a.m4a", Some("r")),
            Err(CommandError::Usage("/add <title> <url> [duration]"))
        );
        assert!(matches!(
            parse_input("/remove first", Some("r")),
            Err(CommandError::InvalidNumber { .. })
        ));
    }
}
