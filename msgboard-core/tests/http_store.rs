//! HTTP store client against a local axum stand-in for the message service.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use msgboard_core::config::StoreConfig;
use msgboard_core::models::{MediaAttachment, MediaKind, MessageId, NewMessage};
use msgboard_core::{BoardError, HttpMessageStore, MessageStore};

/// What the stand-in server saw
#[derive(Debug, Clone, PartialEq)]
enum Seen {
    List,
    Create {
        fields: Vec<(String, Option<String>, Vec<u8>)>,
    },
    Delete(String),
    Upvote(String, Value),
    Downvote(String, Value),
    Comment(String, Value),
    Comments(String),
}

type Log = Arc<Mutex<Vec<Seen>>>;

const MISSING: &str = "missing";

fn not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": "Message not found"})),
    )
        .into_response()
}

async fn list(State(log): State<Log>) -> Json<Value> {
    log.lock().unwrap().push(Seen::List);
    Json(json!([
        {
            "_id": "665a",
            "username": "bob",
            "description": "first",
            "media": "clip.mp4",
            "upvotes": ["alice"],
            "downvotes": [],
            "comments": [{"username": "carol", "text": "nice"}],
            "__v": 0
        },
        {
            "_id": "665b",
            "username": "carol",
            "description": "second",
            "upvotes": [],
            "downvotes": ["alice", "bob"]
        }
    ]))
}

async fn create(State(log): State<Log>, mut multipart: Multipart) -> StatusCode {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.unwrap().to_vec();
        fields.push((name, file_name, bytes));
    }
    log.lock().unwrap().push(Seen::Create { fields });
    StatusCode::CREATED
}

async fn remove(State(log): State<Log>, Path(id): Path<String>) -> axum::response::Response {
    if id == MISSING {
        return not_found();
    }
    log.lock().unwrap().push(Seen::Delete(id));
    Json(json!({"message": "Message deleted"})).into_response()
}

async fn upvote(
    State(log): State<Log>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if id == MISSING {
        return not_found();
    }
    log.lock().unwrap().push(Seen::Upvote(id, body));
    StatusCode::OK.into_response()
}

async fn downvote(State(log): State<Log>, Path(id): Path<String>, Json(body): Json<Value>) -> StatusCode {
    log.lock().unwrap().push(Seen::Downvote(id, body));
    StatusCode::OK
}

async fn comment(State(log): State<Log>, Path(id): Path<String>, Json(body): Json<Value>) -> StatusCode {
    log.lock().unwrap().push(Seen::Comment(id, body));
    StatusCode::OK
}

async fn comments(State(log): State<Log>, Path(id): Path<String>) -> axum::response::Response {
    if id == "garbled" {
        return (StatusCode::OK, "not json").into_response();
    }
    log.lock().unwrap().push(Seen::Comments(id));
    Json(json!([
        {"username": "bob", "text": "one"},
        {"username": "carol", "text": "two"}
    ]))
    .into_response()
}

async fn spawn_server() -> (SocketAddr, Log) {
    let log: Log = Arc::default();
    let app = Router::new()
        .route("/api/messages/all", get(list))
        .route("/api/messages/post", post(create))
        .route("/api/messages/{id}", delete(remove))
        .route("/api/messages/upvote/{id}", put(upvote))
        .route("/api/messages/downvote/{id}", put(downvote))
        .route("/api/messages/comment/{id}", put(comment))
        .route("/api/messages/comments/{id}", get(comments))
        .with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, log)
}

fn store_for(addr: SocketAddr) -> HttpMessageStore {
    HttpMessageStore::new(&StoreConfig {
        endpoint: format!("http://{}", addr),
        insecure: false,
        request_timeout_secs: Some(10),
    })
    .unwrap()
}

fn seen(log: &Log) -> Vec<Seen> {
    log.lock().unwrap().clone()
}

#[tokio::test]
async fn list_decodes_store_records() {
    let (addr, log) = spawn_server().await;
    let store = store_for(addr);

    let messages = store.list_messages().await.unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, MessageId::from("665a"));
    assert_eq!(messages[0].author, "bob");
    assert!(messages[0].has_upvoted("alice"));
    assert_eq!(messages[0].comments[0].author, "carol");
    assert_eq!(
        messages[0].media_name().map(MediaKind::from_file_name),
        Some(MediaKind::Video)
    );
    assert!(messages[1].media_name().is_none());
    assert!(messages[1].has_downvoted("alice"));
    assert_eq!(seen(&log), vec![Seen::List]);
}

#[tokio::test]
async fn create_sends_text_fields_and_media_part() {
    let (addr, log) = spawn_server().await;
    let store = store_for(addr);

    store
        .create_message(NewMessage {
            author: "alice".to_string(),
            description: "hello".to_string(),
            media: Some(MediaAttachment::new("clip.mp4", vec![0, 1, 2, 3])),
        })
        .await
        .unwrap();

    let Seen::Create { fields } = &seen(&log)[0] else {
        panic!("expected a create");
    };
    assert_eq!(
        fields,
        &vec![
            ("username".to_string(), None, b"alice".to_vec()),
            ("description".to_string(), None, b"hello".to_vec()),
            (
                "media".to_string(),
                Some("clip.mp4".to_string()),
                vec![0, 1, 2, 3]
            ),
        ]
    );
}

#[tokio::test]
async fn create_without_media_sends_no_media_part() {
    let (addr, log) = spawn_server().await;
    let store = store_for(addr);

    store
        .create_message(NewMessage {
            author: "alice".to_string(),
            description: "text only".to_string(),
            media: None,
        })
        .await
        .unwrap();

    let Seen::Create { fields } = &seen(&log)[0] else {
        panic!("expected a create");
    };
    let names: Vec<_> = fields.iter().map(|(name, _, _)| name.as_str()).collect();
    assert_eq!(names, vec!["username", "description"]);
}

#[tokio::test]
async fn votes_and_comments_send_json_bodies() {
    let (addr, log) = spawn_server().await;
    let store = store_for(addr);
    let id = MessageId::from("665a");

    store.upvote(&id, "alice").await.unwrap();
    store.downvote(&id, "alice").await.unwrap();
    store.add_comment(&id, "alice", "hello").await.unwrap();
    let comments = store.list_comments(&id).await.unwrap();
    store.delete_message(&id).await.unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[1].text, "two");
    assert_eq!(
        seen(&log),
        vec![
            Seen::Upvote("665a".to_string(), json!({"username": "alice"})),
            Seen::Downvote("665a".to_string(), json!({"username": "alice"})),
            Seen::Comment(
                "665a".to_string(),
                json!({"username": "alice", "text": "hello"})
            ),
            Seen::Comments("665a".to_string()),
            Seen::Delete("665a".to_string()),
        ]
    );
}

#[tokio::test]
async fn reserved_characters_in_ids_survive_the_round_trip() {
    let (addr, log) = spawn_server().await;
    let store = store_for(addr);

    store.delete_message(&MessageId::from("a b?c")).await.unwrap();

    assert_eq!(seen(&log), vec![Seen::Delete("a b?c".to_string())]);
}

#[tokio::test]
async fn error_status_carries_store_message() {
    let (addr, _log) = spawn_server().await;
    let store = store_for(addr);

    let err = store
        .upvote(&MessageId::from(MISSING), "alice")
        .await
        .unwrap_err();

    match err {
        BoardError::Status {
            operation,
            status,
            message,
        } => {
            assert_eq!(operation, "upvote");
            assert_eq!(status, 404);
            assert_eq!(message, "Message not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (addr, _log) = spawn_server().await;
    let store = store_for(addr);

    let err = store
        .list_comments(&MessageId::from("garbled"))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_store_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = store_for(addr).list_messages().await.unwrap_err();
    assert!(matches!(err, BoardError::Http { .. }));
}
