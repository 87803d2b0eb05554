//! Integration tests for the typing race server, driving a real in-process axum server.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use keyrace_server::{
    domain::{MessagePusher, RoomRepository},
    infrastructure::{
        factory::UuidRoomIdFactory, message_pusher::WebSocketMessagePusher,
        repository::InMemoryRoomRepository,
    },
    ui::{Server, SessionGateway},
    usecase::{
        BroadcastRouter, CreateRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase, RoomLifecycle,
    },
};
use keyrace_shared::time::{Clock, SystemClock};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE: Duration = Duration::from_millis(200);

/// Helper struct to manage an in-process server
struct TestServer {
    addr: SocketAddr,
    http: reqwest::Client,
}

impl TestServer {
    /// Start a test server on an ephemeral port
    async fn start() -> Self {
        let repository: Arc<dyn RoomRepository> =
            Arc::new(InMemoryRoomRepository::new(Arc::new(UuidRoomIdFactory)));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());

        let lifecycle = Arc::new(RoomLifecycle::new(repository.clone(), clock.clone()));
        let gateway = Arc::new(SessionGateway::new(
            lifecycle,
            Arc::new(BroadcastRouter::new(message_pusher)),
        ));
        let app = Server::new(
            gateway,
            Arc::new(CreateRoomUseCase::new(repository.clone(), clock.clone())),
            Arc::new(GetRoomsUseCase::new(repository.clone())),
            Arc::new(GetRoomDetailUseCase::new(repository)),
            clock,
        )
        .into_router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            addr,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn create_room(&self, id: &str, text: &str) -> reqwest::Response {
        self.http
            .post(self.url("/rooms"))
            .json(&json!({"room": {"id": id, "name": format!("Room {id}"), "text": text}}))
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.http.get(self.url(path)).send().await.unwrap()
    }

    async fn connect(&self) -> TestClient {
        let (socket, _) = connect_async(format!("ws://{}/ws", self.addr))
            .await
            .unwrap();
        TestClient { socket }
    }
}

/// Helper struct to manage one WebSocket client
struct TestClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    async fn emit(&mut self, event: Value) {
        self.socket
            .send(Message::text(event.to_string()))
            .await
            .unwrap();
    }

    /// Next event frame, skipping control frames
    async fn recv(&mut self) -> Value {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.socket.next())
                .await
                .expect("timed out waiting for an event")
                .expect("socket closed")
                .unwrap();
            if let Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    async fn expect_event(&mut self, name: &str) -> Value {
        let frame = self.recv().await;
        assert_eq!(frame["event"], name, "unexpected frame: {frame}");
        frame["data"].clone()
    }

    /// Assert that nothing arrives for a short while
    async fn expect_silence(&mut self) {
        let next = tokio::time::timeout(SILENCE, self.socket.next()).await;
        assert!(next.is_err(), "unexpected frame: {:?}", next);
    }

    async fn join(&mut self, room_id: &str, participant_id: &str) {
        self.emit(json!({
            "event": "room:join",
            "data": {
                "roomId": room_id,
                "participant": {"id": participant_id, "name": participant_id.to_uppercase()}
            }
        }))
        .await;
    }

    async fn ready(&mut self, room_id: &str, participant_id: &str) {
        self.emit(json!({
            "event": "room:ready",
            "data": {"roomId": room_id, "participantId": participant_id}
        }))
        .await;
    }

    async fn progress(&mut self, room_id: &str, participant_id: &str, input: &str, is_done: bool) {
        self.emit(json!({
            "event": "typing:progress",
            "data": {
                "roomId": room_id,
                "participantId": participant_id,
                "input": input,
                "wpm": 60.0,
                "isDone": is_done
            }
        }))
        .await;
    }

    async fn close(mut self) {
        self.socket.close(None).await.unwrap();
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    // テスト項目: GET / がヘルスチェックの応答を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = server.get("/").await;

    // then (期待する結果):
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Server is up and running");
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_room_http_endpoints() {
    // テスト項目: Room の作成・一覧・詳細取得と、重複 / 未知の ID のエラー
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let created = server.create_room("R1", "the quick fox").await;
    let duplicate = server.create_room("R1", "again").await;
    let list = server.get("/rooms").await;
    let detail = server.get("/rooms/R1").await;
    let missing = server.get("/rooms/R9").await;

    // then (期待する結果):
    assert_eq!(created.status(), StatusCode::CREATED);
    let room: Value = created.json().await.unwrap();
    assert_eq!(room["id"], "R1");
    assert_eq!(room["phase"], "lobby");
    assert_eq!(room["participants"], json!([]));

    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let rooms: Value = list.json().await.unwrap();
    assert_eq!(rooms.as_array().unwrap().len(), 1);

    assert_eq!(detail.status(), StatusCode::OK);
    let room: Value = detail.json().await.unwrap();
    assert_eq!(room["text"], "the quick fox");

    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["message"], "Room not found");
}

#[tokio::test]
async fn test_create_room_without_id_assigns_one() {
    // テスト項目: ID なしで作成すると ID が割り当てられる
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = server
        .http
        .post(server.url("/rooms"))
        .json(&json!({"room": {"name": "Anonymous", "text": "hello"}}))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), StatusCode::CREATED);
    let room: Value = response.json().await.unwrap();
    let id = room["id"].as_str().unwrap();
    assert!(!id.is_empty());
    assert_eq!(server.get(&format!("/rooms/{id}")).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_two_player_race_over_websocket() {
    // テスト項目: 2 人が参加・準備完了・完了し、Room が Finished になる
    // given (前提条件):
    let server = TestServer::start().await;
    server.create_room("R1", "the quick fox").await;
    let mut u1 = server.connect().await;
    let mut u2 = server.connect().await;

    // when (操作): 参加
    u1.join("R1", "u1").await;
    let joined = u1.expect_event("room:joined").await;
    u2.join("R1", "u2").await;
    u2.expect_event("room:joined").await;
    let user_joined = u1.expect_event("room:user_joined").await;

    // then (期待する結果):
    assert_eq!(joined["room"]["participants"][0]["isOwner"], true);
    assert_eq!(user_joined["participant"]["id"], "u2");
    assert_eq!(user_joined["participant"]["isOwner"], false);

    // when (操作): 準備完了
    u1.ready("R1", "u1").await;
    u1.expect_event("room:user_ready").await;
    u2.expect_event("room:user_ready").await;
    u2.ready("R1", "u2").await;

    // then (期待する結果): user_ready の後に race_start が届く
    for client in [&mut u1, &mut u2] {
        let ready = client.expect_event("room:user_ready").await;
        assert_eq!(ready["participantId"], "u2");
        let start = client.expect_event("room:race_start").await;
        assert_eq!(start["room"]["phase"], "active");
        assert!(start["room"]["startedAt"].is_string());
    }

    // when (操作): 進捗と完了
    u1.progress("R1", "u1", "the", false).await;

    // then (期待する結果): 送信者にはエコーされない
    let seen = u2.expect_event("typing:user_progress").await;
    assert_eq!(seen["room"]["participants"][0]["input"], "the");
    u1.expect_silence().await;

    u1.progress("R1", "u1", "the quick fox", true).await;
    u2.expect_event("typing:user_progress").await;
    u2.progress("R1", "u2", "the quick fox", true).await;
    let finished = u1.expect_event("typing:user_progress").await;
    assert_eq!(finished["room"]["phase"], "finished");
    assert!(finished["room"]["finishedAt"].is_string());

    let room: Value = server.get("/rooms/R1").await.json().await.unwrap();
    assert_eq!(room["phase"], "finished");
}

#[tokio::test]
async fn test_fourth_participant_is_rejected() {
    // テスト項目: 満員の Room への 4 人目の参加は room:join_error になる
    // given (前提条件):
    let server = TestServer::start().await;
    server.create_room("R1", "text").await;
    let mut members = Vec::new();
    for i in 1..=3 {
        let mut client = server.connect().await;
        client.join("R1", &format!("u{i}")).await;
        client.expect_event("room:joined").await;
        members.push(client);
    }
    let mut late = server.connect().await;

    // when (操作):
    late.join("R1", "u4").await;

    // then (期待する結果):
    let error = late.expect_event("room:join_error").await;
    assert_eq!(error["message"], "Room is full");
    let room: Value = server.get("/rooms/R1").await.json().await.unwrap();
    assert_eq!(room["participants"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_disconnect_cleans_up_room() {
    // テスト項目: 切断で参加者が外れ、最後の切断で Room が削除される
    // given (前提条件):
    let server = TestServer::start().await;
    server.create_room("R1", "text").await;
    let mut u1 = server.connect().await;
    let mut u2 = server.connect().await;
    u1.join("R1", "u1").await;
    u1.expect_event("room:joined").await;
    u2.join("R1", "u2").await;
    u2.expect_event("room:joined").await;
    u1.expect_event("room:user_joined").await;

    // when (操作):
    u2.close().await;

    // then (期待する結果):
    let left = u1.expect_event("room:user_left").await;
    assert_eq!(left["participantId"], "u2");
    assert_eq!(left["room"]["participants"].as_array().unwrap().len(), 1);

    // when (操作): 最後の参加者も切断
    u1.close().await;

    // then (期待する結果): Room が削除される
    let mut status = StatusCode::OK;
    for _ in 0..20 {
        status = server.get("/rooms/R1").await.status();
        if status == StatusCode::NOT_FOUND {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leave_removes_room_when_last() {
    // テスト項目: 最後の参加者の room:leave で room:left が返り、Room が削除される
    // given (前提条件):
    let server = TestServer::start().await;
    server.create_room("R1", "text").await;
    let mut u1 = server.connect().await;
    u1.join("R1", "u1").await;
    u1.expect_event("room:joined").await;

    // when (操作):
    u1.emit(json!({"event": "room:leave", "data": {"roomId": "R1", "participantId": "u1"}}))
        .await;

    // then (期待する結果):
    let left = u1.expect_event("room:left").await;
    assert_eq!(left["roomId"], "R1");
    assert_eq!(server.get("/rooms/R1").await.status(), StatusCode::NOT_FOUND);
}
