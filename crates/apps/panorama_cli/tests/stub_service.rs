use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use panorama_cli::{Args, ParamArgs, ReqwestTransport, run};

#[derive(Clone, Default)]
struct Stub {
    hits: Arc<AtomicUsize>,
}

const RED_GREEN: &str = "[255,0,0,255,0,255,0,255]";

async fn get_image(State(stub): State<Stub>) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, RED_GREEN).into_response()
}

/// Answers like the rendering service: the 2x1 image for complete queries,
/// `[]` when a parameter is missing, HTTP 500 for `azimuth=500`.
async fn compute_panorama(
    State(stub): State<Stub>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    let keys = [
        "longitude",
        "latitude",
        "elevation",
        "azimuth",
        "fieldOfView",
        "maxDistance",
        "imageWidth",
        "imageHeight",
        "samplingExponent",
    ];
    if q.get("azimuth").map(String::as_str) == Some("500") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    if keys.iter().any(|k| !q.contains_key(*k)) || q.len() != keys.len() {
        return (StatusCode::OK, "[]").into_response();
    }
    if q["imageWidth"] == "2" && q["imageHeight"] == "1" {
        (StatusCode::OK, RED_GREEN).into_response()
    } else {
        (StatusCode::OK, "[]").into_response()
    }
}

async fn spawn_stub() -> (String, Stub) {
    let stub = Stub::default();
    let app = Router::new()
        .route("/getImage", get(get_image))
        .route("/computePanorama", get(compute_panorama))
        .with_state(stub.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), stub)
}

fn args(endpoint: &str, out: &std::path::Path, overrides: &[&str]) -> Args {
    Args {
        endpoint: Some(endpoint.to_string()),
        preset: None,
        params: ParamArgs::default(),
        overrides: overrides.iter().map(|s| s.to_string()).collect(),
        default_image: false,
        out: out.to_path_buf(),
    }
}

#[tokio::test]
async fn computed_panorama_is_written_as_png() {
    let (endpoint, stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("pano.png");

    let a = args(&endpoint, &out, &["imageWidth=2", "imageHeight=1"]);
    let dims = run(&a, ReqwestTransport::default()).await.unwrap();
    assert_eq!((dims.width, dims.height), (2, 1));
    assert_eq!(stub.hits.load(Ordering::SeqCst), 1);

    let img = image::open(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.into_raw(), vec![255, 0, 0, 255, 0, 255, 0, 255]);
}

#[tokio::test]
async fn typed_options_reach_the_service() {
    let (endpoint, stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("typed.png");

    let mut a = args(&endpoint, &out, &[]);
    a.params = ParamArgs {
        image_width: Some("2".to_string()),
        image_height: Some("1".to_string()),
        azimuth: Some("-30".to_string()),
        ..ParamArgs::default()
    };
    let dims = run(&a, ReqwestTransport::default()).await.unwrap();
    assert_eq!((dims.width, dims.height), (2, 1));
    assert_eq!(stub.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn set_overrides_win_over_typed_options() {
    let (endpoint, _stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("override.png");

    let mut a = args(&endpoint, &out, &["imageWidth=2"]);
    a.params.image_width = Some("640".to_string());
    a.params.image_height = Some("1".to_string());
    let dims = run(&a, ReqwestTransport::default()).await.unwrap();
    assert_eq!((dims.width, dims.height), (2, 1));
}

#[tokio::test]
async fn default_image_uses_model_size() {
    let (endpoint, _stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("default.png");

    let mut a = args(&endpoint, &out, &["imageWidth=2", "imageHeight=1"]);
    a.default_image = true;
    run(&a, ReqwestTransport::default()).await.unwrap();
    assert!(out.exists());
}

#[tokio::test]
async fn empty_service_answer_is_malformed() {
    let (endpoint, _stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never.png");

    // Default 1080x480 size: the stub answers `[]`.
    let err = run(&args(&endpoint, &out, &[]), ReqwestTransport::default())
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("malformed response"), "{err}");
    assert!(!out.exists());
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let (endpoint, _stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never.png");

    let a = args(&endpoint, &out, &["azimuth=500"]);
    let err = run(&a, ReqwestTransport::default()).await.unwrap_err();
    assert!(err.to_string().contains("HTTP 500"), "{err}");
    assert!(!out.exists());
}

#[tokio::test]
async fn invalid_parameter_sends_nothing() {
    let (endpoint, stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never.png");

    let a = args(&endpoint, &out, &["elevation=high"]);
    let err = run(&a, ReqwestTransport::default()).await.unwrap_err();
    assert!(err.to_string().contains("Elevation"), "{err}");
    assert_eq!(stub.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_service_is_a_fetch_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never.png");
    let a = args(&format!("http://{addr}"), &out, &["imageWidth=2", "imageHeight=1"]);
    let err = run(&a, ReqwestTransport::default()).await.unwrap_err();
    assert!(err.to_string().contains("failed"), "{err}");
}
