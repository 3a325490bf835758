//! `RestStore` against a stub REST endpoint on an ephemeral port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Query as QueryParams, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use serde_json::{json, Value};
use store::{device, Query, RestStore, Store, StoreConfig, StoreError, Table};

/// A request as the stub saw it.
#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    params: Vec<(String, String)>,
    headers: HeaderMap,
    body: String,
}

#[derive(Clone, Default)]
struct Stub {
    replies: Arc<Mutex<HashMap<String, (u16, String)>>>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Stub {
    fn reply(&self, table: &str, status: u16, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(format!("/rest/v1/{}", table), (status, body.to_string()));
    }

    fn last(&self) -> Seen {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

async fn respond(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    QueryParams(params): QueryParams<Vec<(String, String)>>,
    body: Bytes,
) -> (StatusCode, String) {
    let path = uri.path().to_string();
    stub.seen.lock().unwrap().push(Seen {
        method,
        path: path.clone(),
        params,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let (status, body) = stub
        .replies
        .lock()
        .unwrap()
        .get(&path)
        .cloned()
        .unwrap_or((404, "no such table".to_string()));
    (StatusCode::from_u16(status).unwrap(), body)
}

async fn start() -> (RestStore, Stub) {
    let stub = Stub::default();
    let app = Router::new().fallback(respond).with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = StoreConfig::new(format!("http://{}/", addr), "service-key")
        .with_timeout(Duration::from_secs(5));
    (RestStore::new(config).unwrap(), stub)
}

fn param<'a>(seen: &'a Seen, name: &str) -> Option<&'a str> {
    seen.params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn test_select_sends_headers_and_filters() {
    let (rest, stub) = start().await;
    stub.reply("sos_event", 200, r#"[{"event_id": "e1"}, {"event_id": "e2"}]"#);

    let query = Query::new()
        .eq("triggered_by", "u1")
        .is("handled", false)
        .any_eq([("user1_id", "a"), ("user2_id", "a")])
        .within("user_id", ["x", "y"])
        .order_desc("on_at")
        .limit(1);
    let rows = rest.select(Table::SosEvent, &query).await.unwrap();
    assert_eq!(rows.len(), 2);

    let seen = stub.last();
    assert_eq!(seen.method, Method::GET);
    assert_eq!(seen.path, "/rest/v1/sos_event");
    assert_eq!(param(&seen, "triggered_by"), Some("eq.u1"));
    assert_eq!(param(&seen, "handled"), Some("is.false"));
    assert_eq!(param(&seen, "or"), Some("(user1_id.eq.a,user2_id.eq.a)"));
    assert_eq!(param(&seen, "user_id"), Some("in.(x,y)"));
    assert_eq!(param(&seen, "order"), Some("on_at.desc"));
    assert_eq!(param(&seen, "limit"), Some("1"));

    assert_eq!(seen.headers["apikey"], "service-key");
    assert_eq!(seen.headers["authorization"], "Bearer service-key");
    assert_eq!(seen.headers["prefer"], "return=representation");
}

#[tokio::test]
async fn test_insert_posts_json_and_accepts_single_object() {
    let (rest, stub) = start().await;
    stub.reply("sos_device", 201, r#"{"device_id": "d1", "owner_id": "u1", "is_online": false}"#);

    let rows = rest
        .insert(Table::Device, json!({"device_id": "d1", "owner_id": "u1"}))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["device_id"], "d1");

    let seen = stub.last();
    assert_eq!(seen.method, Method::POST);
    assert_eq!(seen.headers["content-type"], "application/json");
    let sent: Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(sent["owner_id"], "u1");
}

#[tokio::test]
async fn test_update_patches_matching_rows() {
    let (rest, stub) = start().await;
    stub.reply("sos_device", 200, r#"[{"device_id": "d1", "owner_id": "u1", "is_online": true}]"#);

    device::set_online(&rest, "d1", chrono::Utc::now()).await.unwrap();

    let seen = stub.last();
    assert_eq!(seen.method, Method::PATCH);
    assert_eq!(param(&seen, "device_id"), Some("eq.d1"));
    let sent: Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(sent["is_online"], true);
    assert!(sent["last_triggered_at"].is_string());
}

#[tokio::test]
async fn test_conflict_maps_to_conflict() {
    let (rest, stub) = start().await;
    stub.reply("user", 409, r#"{"message": "duplicate key value"}"#);

    let err = rest
        .insert(Table::User, json!({"user_email": "a@x.io"}))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(err.upstream_body().unwrap().contains("duplicate key value"));
}

#[tokio::test]
async fn test_other_status_carries_body() {
    let (rest, stub) = start().await;
    stub.reply("sos_event", 500, "relation does not exist");

    let err = rest.select(Table::SosEvent, &Query::new()).await.unwrap_err();
    match err {
        StoreError::Status { table, status, ref body } => {
            assert_eq!(table, Table::SosEvent);
            assert_eq!(status, 500);
            assert_eq!(body, "relation does not exist");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.upstream_body(), Some("relation does not exist"));
}

#[tokio::test]
async fn test_blank_body_is_no_rows() {
    let (rest, stub) = start().await;
    stub.reply("help_event", 200, "  ");

    let removed = rest
        .delete(Table::HelpEvent, &Query::new().eq("help_id", "h1"))
        .await
        .unwrap();
    assert_eq!(removed, 0);
    assert_eq!(stub.last().method, Method::DELETE);
}

#[tokio::test]
async fn test_undecodable_body() {
    let (rest, stub) = start().await;
    stub.reply("notification", 200, "<html>gateway</html>");

    let err = rest.select(Table::Notification, &Query::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::Decode { table: Table::Notification, .. }));
}

#[tokio::test]
async fn test_scalar_body_is_empty_response() {
    let (rest, stub) = start().await;
    stub.reply("connection", 200, "true");

    let err = rest.select(Table::Connection, &Query::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::EmptyResponse { table: Table::Connection }));
}

#[tokio::test]
async fn test_rows_that_do_not_fit_the_model() {
    let (rest, stub) = start().await;
    stub.reply("sos_device", 200, r#"[{"device_id": 7}]"#);

    let err = device::get_device(&rest, "d1").await.unwrap_err();
    assert!(matches!(err, StoreError::Decode { table: Table::Device, .. }));
}
