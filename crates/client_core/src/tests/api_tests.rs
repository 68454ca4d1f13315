use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::error::ErrorKind;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    queries: Arc<Mutex<Vec<Value>>>,
}

fn launch_doc(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "date_utc": "2020-05-30T19:22:00.000Z",
        "success": true,
        "upcoming": false,
        "launchpad": "5e9e4502f509094188566f88",
        "links": {
            "patch": { "small": "https://images2.imgbox.com/s.png", "large": "https://images2.imgbox.com/l.png" },
            "flickr": { "small": [], "original": [] },
            "webcast": null
        }
    })
}

async fn handle_query(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.queries.lock().await.push(body);
    Json(json!({
        "docs": [launch_doc("l2", "Crew-2"), launch_doc("l1", "Demo-2")],
        "totalDocs": 2,
        "hasNextPage": false
    }))
}

async fn handle_launch(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    match id.as_str() {
        "missing" => Err(StatusCode::NOT_FOUND),
        "garbled" => Ok(Json(json!({ "unexpected": true }))),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Json(launch_doc("slow", "Slow")))
        }
        other => Ok(Json(launch_doc(other, "Demo-2"))),
    }
}

async fn handle_launchpad(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    if id == "broken" {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!({
        "id": id,
        "full_name": "Kennedy Space Center Historic Launch Complex 39A",
        "locality": "Cape Canaveral",
        "region": "Florida",
        "timezone": "America/New_York",
        "latitude": 28.6080585,
        "longitude": -80.6039558,
        "launch_attempts": 55,
        "launch_successes": 54,
        "images": { "large": ["https://i.imgur.com/Wv1Z8yO.png"] }
    })))
}

async fn spawn_catalog_server() -> (String, ServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState::default();
    let app = Router::new()
        .route("/v5/launches/query", post(handle_query))
        .route("/v5/launches/:id", get(handle_launch))
        .route("/v4/launchpads/:id", get(handle_launchpad))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

#[tokio::test]
async fn launch_page_query_sends_sorted_populated_body() {
    let (server_url, state) = spawn_catalog_server().await;
    let client = SpacexClient::new(&server_url).expect("client");

    let launches = client.fetch_launch_page(3, 25).await.expect("page");

    let names: Vec<&str> = launches.iter().map(|launch| launch.name.as_str()).collect();
    assert_eq!(names, vec!["Crew-2", "Demo-2"]);
    let queries = state.queries.lock().await;
    assert_eq!(
        queries.as_slice(),
        &[json!({
            "query": {},
            "options": {
                "sort": { "date_utc": "desc" },
                "limit": 25,
                "page": 3,
                "populate": ["links.patch"]
            }
        })]
    );
}

#[tokio::test]
async fn fetches_launch_and_launchpad_by_id() {
    let (server_url, _state) = spawn_catalog_server().await;
    let client = SpacexClient::new(&server_url).expect("client");

    let launch = client
        .fetch_launch(&LaunchId::from("5eb87d46ffd86e000604b388"))
        .await
        .expect("launch");
    assert_eq!(launch.id.as_str(), "5eb87d46ffd86e000604b388");
    assert_eq!(launch.image_url(), Some("https://images2.imgbox.com/l.png"));

    let launchpad_id = launch.launchpad.expect("launchpad reference");
    let launchpad = client
        .fetch_launchpad(&launchpad_id)
        .await
        .expect("launchpad");
    assert_eq!(launchpad.id, launchpad_id);
    assert_eq!(launchpad.launch_attempts, 55);
}

#[tokio::test]
async fn unknown_launch_maps_to_not_found() {
    let (server_url, _state) = spawn_catalog_server().await;
    let client = SpacexClient::new(&server_url).expect("client");

    let err = client
        .fetch_launch(&LaunchId::from("missing"))
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        FetchError::NotFound {
            entity: "launch",
            id: "missing".to_string()
        }
    );
}

#[tokio::test]
async fn server_failure_maps_to_remote_error() {
    let (server_url, _state) = spawn_catalog_server().await;
    let client = SpacexClient::new(&server_url).expect("client");

    let err = client
        .fetch_launchpad(&LaunchpadId::from("broken"))
        .await
        .expect_err("must fail");
    assert_eq!(err, FetchError::Remote { status: 500 });
}

#[tokio::test]
async fn unexpected_shape_maps_to_decode_error() {
    let (server_url, _state) = spawn_catalog_server().await;
    let client = SpacexClient::new(&server_url).expect("client");

    let err = client
        .fetch_launch(&LaunchId::from("garbled"))
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn slow_response_times_out_as_network_error() {
    let (server_url, _state) = spawn_catalog_server().await;
    let client =
        SpacexClient::with_timeout(&server_url, Duration::from_millis(200)).expect("client");

    let err = client
        .fetch_launch(&LaunchId::from("slow"))
        .await
        .expect_err("must time out");
    assert_eq!(err, FetchError::Network("request timed out".to_string()));
}

#[tokio::test]
async fn closed_port_maps_to_network_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let client = SpacexClient::new(&format!("http://{addr}")).expect("client");

    let err = client
        .fetch_launch_page(1, 10)
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn zero_page_or_limit_is_rejected_before_sending() {
    let client = SpacexClient::new("http://127.0.0.1:9").expect("client");

    for (page, limit) in [(0, 10), (1, 0)] {
        let err = client
            .fetch_launch_page(page, limit)
            .await
            .expect_err("must reject");
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
}

#[test]
fn endpoint_keeps_base_path_and_escapes_ids() {
    let client = SpacexClient::new("https://example.test/spacex/").expect("client");
    assert_eq!(
        client.endpoint(&["v5", "launches", "a b"]).as_str(),
        "https://example.test/spacex/v5/launches/a%20b"
    );

    let bare = SpacexClient::new(DEFAULT_API_BASE_URL).expect("client");
    assert_eq!(
        bare.endpoint(&["v4", "launchpads", "pad"]).as_str(),
        "https://api.spacexdata.com/v4/launchpads/pad"
    );
}

#[test]
fn rejects_unusable_base_urls() {
    for base in ["not a url", "mailto:ops@example.test"] {
        let err = SpacexClient::new(base).err().expect("must reject");
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
}
