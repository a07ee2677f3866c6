//! Integration tests: the real router on an ephemeral port, driven over
//! WebSocket and HTTP.

use std::{collections::VecDeque, net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{net::TcpListener, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tunebox_server::{
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::{AppState, Server},
};
use tunebox_shared::time::ManualClock;

const FRAME_TIMEOUT: Duration = Duration::from_secs(2);

/// Start a server on an ephemeral port
async fn spawn_server(clock: ManualClock) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(
        Arc::new(InMemoryRoomRepository::new()),
        Arc::new(WebSocketMessagePusher::new()),
        Arc::new(clock),
    );
    let router = Server::new(state).router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// WebSocket client that separates replies from pushed events
struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
    events: VecDeque<Value>,
    next_request_id: u64,
    connection_id: String,
}

impl TestClient {
    async fn connect(addr: SocketAddr, query: &str) -> Self {
        let url = format!("ws://{addr}/ws{query}");
        let (ws, _response) = connect_async(url).await.unwrap();
        let mut client = Self {
            ws,
            events: VecDeque::new(),
            next_request_id: 1,
            connection_id: String::new(),
        };
        let connected = client.recv_frame().await;
        assert_eq!(connected["type"], "connected");
        client.connection_id = connected["connection_id"].as_str().unwrap().to_string();
        client.events.push_back(connected);
        client
    }

    async fn recv_frame(&mut self) -> Value {
        loop {
            let message = timeout(FRAME_TIMEOUT, self.ws.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("connection closed")
                .unwrap();
            if let Message::Text(text) = message {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    async fn send_raw(&mut self, text: &str) {
        self.ws.send(Message::Text(text.into())).await.unwrap();
    }

    /// Send a request and wait for its reply; events received meanwhile are kept
    async fn request(&mut self, mut op: Value) -> Value {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        op["request_id"] = json!(request_id);
        self.send_raw(&op.to_string()).await;

        loop {
            let frame = self.recv_frame().await;
            if frame["type"] == "reply" && frame["request_id"] == json!(request_id) {
                return frame;
            }
            self.events.push_back(frame);
        }
    }

    /// Next pushed event of the given type, skipping others
    async fn expect_event(&mut self, event_type: &str) -> Value {
        while let Some(frame) = self.events.pop_front() {
            if frame["type"] == event_type {
                return frame;
            }
        }
        loop {
            let frame = self.recv_frame().await;
            if frame["type"] == event_type {
                return frame;
            }
        }
    }

    fn clear_events(&mut self) {
        self.events.clear();
    }
}

async fn create_room(client: &mut TestClient, name: &str) -> String {
    let reply = client
        .request(json!({"type": "create-room", "room_name": name}))
        .await;
    assert_eq!(reply["success"], true, "{reply}");
    assert_eq!(reply["data"]["kind"], "room-created");
    reply["data"]["room"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_http_room_lifecycle() {
    // テスト項目: HTTP で Room を作成し、一覧と詳細を取得できる
    // given (前提条件):
    let addr = spawn_server(ManualClock::new(0)).await;
    let http = reqwest::Client::new();

    // when (操作):
    let health: Value = reqwest::get(format!("http://{addr}/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let created = http
        .post(format!("http://{addr}/api/rooms"))
        .json(&json!({"name": "Lounge"}))
        .send()
        .await
        .unwrap();
    let created_status = created.status();
    let created: Value = created.json().await.unwrap();
    let room_id = created["id"].as_str().unwrap().to_string();
    let rooms: Value = reqwest::get(format!("http://{addr}/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let detail: Value = reqwest::get(format!("http://{addr}/api/rooms/{room_id}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let missing = reqwest::get(format!("http://{addr}/api/rooms/does-not-exist"))
        .await
        .unwrap();
    let blank = http
        .post(format!("http://{addr}/api/rooms"))
        .json(&json!({"name": "   "}))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health, json!({"status": "ok"}));
    assert_eq!(created_status, reqwest::StatusCode::CREATED);
    assert_eq!(created["name"], "Lounge");
    assert_eq!(created["created_at"], "1970-01-01T00:00:00+00:00");
    assert_eq!(
        rooms,
        json!([{"id": room_id, "name": "Lounge", "member_count": 0}])
    );
    assert_eq!(detail["name"], "Lounge");
    assert_eq!(detail["message_count"], 0);
    assert_eq!(detail["playback"]["is_playing"], false);
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(blank.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_connect_without_username_is_anonymous() {
    // テスト項目: ユーザー名なしの接続は anonymous になる
    // when (操作):
    let addr = spawn_server(ManualClock::new(0)).await;
    let mut client = TestClient::connect(addr, "").await;

    // then (期待する結果):
    let connected = client.expect_event("connected").await;
    assert_eq!(connected["username"], "anonymous");
    assert!(!client.connection_id.is_empty());
}

#[tokio::test]
async fn test_two_members_chat_in_order() {
    // テスト項目: 2 人が参加し、一方のメッセージを両者が同じ順序で受け取る
    // given (前提条件):
    let addr = spawn_server(ManualClock::new(0)).await;
    let mut alice = TestClient::connect(addr, "?username=alice&profile_color=%23ff0000").await;
    let mut bob = TestClient::connect(addr, "?username=bob").await;
    let room_id = create_room(&mut alice, "Lounge").await;

    let joined = alice
        .request(json!({"type": "join-room", "room_id": room_id}))
        .await;
    assert_eq!(joined["data"]["kind"], "joined");
    assert_eq!(joined["data"]["member_count"], 1);
    let joined = bob
        .request(json!({"type": "join-room", "room_id": room_id}))
        .await;
    assert_eq!(joined["data"]["member_count"], 2);
    let event = alice.expect_event("member-joined").await;
    assert_eq!(event["member"]["username"], "alice");
    let event = alice.expect_event("member-joined").await;
    assert_eq!(event["member"]["username"], "bob");

    // when (操作):
    for content in ["one", "two", "three"] {
        let reply = alice
            .request(json!({"type": "send-message", "room_id": room_id, "content": content}))
            .await;
        assert_eq!(reply["success"], true);
    }

    // then (期待する結果):
    for client in [&mut alice, &mut bob] {
        let mut received = Vec::new();
        for _ in 0..3 {
            let event = client.expect_event("new-message").await;
            assert_eq!(event["message"]["username"], "alice");
            assert_eq!(event["message"]["profile_color"], "#ff0000");
            received.push(event["message"]["content"].as_str().unwrap().to_string());
        }
        assert_eq!(received, vec!["one", "two", "three"]);
    }

    let count = bob
        .request(json!({"type": "get-room-users-count", "room_id": room_id}))
        .await;
    assert_eq!(count["data"]["kind"], "users-count");
    assert_eq!(count["data"]["member_count"], 2);
}

#[tokio::test]
async fn test_disconnect_notifies_remaining_members() {
    // テスト項目: 切断すると残ったメンバーに member-left が届く
    // given (前提条件):
    let addr = spawn_server(ManualClock::new(0)).await;
    let mut alice = TestClient::connect(addr, "?username=alice").await;
    let mut bob = TestClient::connect(addr, "?username=bob").await;
    let room_id = create_room(&mut alice, "Lounge").await;
    alice
        .request(json!({"type": "join-room", "room_id": room_id}))
        .await;
    bob.request(json!({"type": "join-room", "room_id": room_id}))
        .await;
    alice.clear_events();

    // when (操作):
    bob.ws.close(None).await.unwrap();

    // then (期待する結果):
    let event = alice.expect_event("member-left").await;
    assert_eq!(event["username"], "bob");
    assert_eq!(event["member_count"], 1);
}

#[tokio::test]
async fn test_shared_playback_and_auto_advance() {
    // テスト項目: キューの追加・自動スキップが全メンバーに同期される
    // given (前提条件):
    let clock = ManualClock::new(0);
    let addr = spawn_server(clock.clone()).await;
    let mut alice = TestClient::connect(addr, "?username=alice").await;
    let mut bob = TestClient::connect(addr, "?username=bob").await;
    let room_id = create_room(&mut alice, "Lounge").await;
    alice
        .request(json!({"type": "join-room", "room_id": room_id}))
        .await;
    bob.request(json!({"type": "join-room", "room_id": room_id}))
        .await;
    bob.clear_events();

    // when (操作): 空の Room に 2 曲追加
    let first = alice
        .request(json!({
            "type": "add-to-queue",
            "room_id": room_id,
            "track": {"title": "A", "preview_url": "https://cdn.example/a.m4a", "duration_seconds": 30}
        }))
        .await;
    let second = alice
        .request(json!({
            "type": "add-to-queue",
            "room_id": room_id,
            "track": {"title": "B", "preview_url": "https://cdn.example/b.m4a"}
        }))
        .await;

    // then (期待する結果):
    assert_eq!(first["data"]["kind"], "music-state");
    assert_eq!(first["data"]["current_index"], 0);
    assert_eq!(first["data"]["is_playing"], true);
    assert_eq!(second["data"]["queue"].as_array().unwrap().len(), 2);
    let started = bob.expect_event("state-changed").await;
    assert_eq!(started["music_state"]["current_track"]["title"], "A");
    assert_eq!(started["music_state"]["current_track"]["added_by"], "alice");
    let updated = bob.expect_event("queue-updated").await;
    assert_eq!(updated["current_index"], 0);

    // when (操作): 35 秒経過後に再生状態を取得
    clock.advance_secs(35);
    let state = alice
        .request(json!({"type": "get-music-state", "room_id": room_id}))
        .await;

    // then (期待する結果):
    assert_eq!(state["data"]["current_index"], 1);
    assert_eq!(state["data"]["elapsed_seconds"], 0.0);
    assert_eq!(state["data"]["is_playing"], true);
    let advanced = bob.expect_event("state-changed").await;
    assert_eq!(advanced["music_state"]["current_track"]["title"], "B");
}

#[tokio::test]
async fn test_invalid_requests_get_failed_replies() {
    // テスト項目: 不正なリクエストは接続を切らずに success: false で返される
    // given (前提条件):
    let addr = spawn_server(ManualClock::new(0)).await;
    let mut client = TestClient::connect(addr, "?username=alice").await;
    client.clear_events();

    // when (操作):
    client.send_raw("{this is not json").await;
    let malformed = client.recv_frame().await;
    let unknown_room = client
        .request(json!({"type": "join-room", "room_id": "missing"}))
        .await;
    let room_id = create_room(&mut client, "Lounge").await;
    let nothing_playing = client
        .request(json!({"type": "play-pause", "room_id": room_id}))
        .await;
    let bad_duration = client
        .request(json!({
            "type": "add-to-queue",
            "room_id": room_id,
            "track": {"title": "A", "preview_url": "https://cdn.example/a.m4a", "duration_seconds": -1}
        }))
        .await;
    let unknown_op = client.request(json!({"type": "dance"})).await;

    // then (期待する結果):
    assert_eq!(malformed["type"], "reply");
    assert_eq!(malformed["success"], false);
    assert_eq!(malformed["request_id"], Value::Null);
    assert_eq!(unknown_room["success"], false);
    assert_eq!(unknown_room["message"], "room 'missing' does not exist");
    assert_eq!(nothing_playing["success"], false);
    assert_eq!(bad_duration["success"], false);
    assert_eq!(unknown_op["success"], false);

    // 接続は維持されている
    let rooms = client.request(json!({"type": "get-rooms"})).await;
    assert_eq!(rooms["success"], true);
    assert_eq!(rooms["data"]["rooms"].as_array().unwrap().len(), 1);
}
