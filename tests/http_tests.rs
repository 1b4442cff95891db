//! HTTP router tests
//!
//! Drives the router end to end with in-process requests.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use rstest::*;
use sdrescue::domain::repositories::{
    BlockDevice, BlockDeviceError, FileHandle, FileSystemView,
};
use sdrescue::infrastructure::block_device::MemoryBlockDevice;
use sdrescue::infrastructure::file_systems::HostFileSystem;
use sdrescue::presentation::http::router;
use sdrescue::{DAMAGED_SECTOR_MARKER, Storage};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

#[fixture]
fn card() -> (TempDir, Arc<Storage>) {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("DCIM")).unwrap();
    fs::write(dir.path().join("index.htm"), b"<h1>card</h1>").unwrap();
    fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
    fs::write(dir.path().join("My Photo.jpg"), b"jpeg").unwrap();
    fs::write(dir.path().join("été.txt"), b"summer").unwrap();

    let data: Vec<u8> = (0..2048).map(|i| (i % 199) as u8).collect();
    let device = MemoryBlockDevice::new(data, 512)
        .unwrap()
        .with_bad_sectors([1]);
    let view = HostFileSystem::new(dir.path()).unwrap();

    let storage = Storage::new(Some(Arc::new(device)), Some(Arc::new(view)));
    (dir, Arc::new(storage))
}

async fn call(storage: Arc<Storage>, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    router(storage).oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn header_value<'a>(response: &'a Response, name: header::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

// ============================================================================
// /raw
// ============================================================================

#[rstest]
#[tokio::test]
async fn test_raw_streams_whole_device(card: (TempDir, Arc<Storage>)) {
    let (_dir, storage) = card;
    let response = call(storage, Method::GET, "/raw").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, header::CONTENT_TYPE),
        Some("application/octet-stream")
    );
    assert_eq!(header_value(&response, header::CONTENT_LENGTH), Some("2048"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.len(), 2048);
    assert_eq!(body[0], 0);
    assert!(body[512..1024].iter().all(|&b| b == DAMAGED_SECTOR_MARKER));
    assert_eq!(body[1024], (1024 % 199) as u8);
}

#[rstest]
#[tokio::test]
async fn test_raw_without_card_is_empty() {
    let response = call(Arc::new(Storage::unavailable()), Method::GET, "/raw").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::CONTENT_LENGTH), Some("0"));
    assert_eq!(body_text(response).await, "");
}

// ============================================================================
// /list
// ============================================================================

#[rstest]
#[tokio::test]
async fn test_list_root(card: (TempDir, Arc<Storage>)) {
    let (_dir, storage) = card;
    let response = call(storage, Method::GET, "/list?dir=/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::CONTENT_TYPE), Some("text/json"));
    assert_eq!(header_value(&response, header::CONTENT_LENGTH), None);

    let text = body_text(response).await;
    let entries: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
    let mut names: Vec<(String, String)> = entries
        .iter()
        .map(|e| {
            (
                e["type"].as_str().unwrap().to_string(),
                e["name"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    names.sort();

    assert_eq!(
        names,
        vec![
            ("dir".to_string(), "/DCIM".to_string()),
            ("file".to_string(), "/My Photo.jpg".to_string()),
            ("file".to_string(), "/index.htm".to_string()),
            ("file".to_string(), "/notes.txt".to_string()),
            ("file".to_string(), "/été.txt".to_string()),
        ]
    );
}

#[rstest]
#[case("/list", "BAD ARGS")]
#[case("/list?dir=/missing", "BAD PATH")]
#[case("/list?dir=", "BAD PATH")]
#[case("/list?dir=/notes.txt", "NOT DIR")]
#[tokio::test]
async fn test_list_rejections(
    card: (TempDir, Arc<Storage>),
    #[case] uri: &str,
    #[case] message: &str,
) {
    let (_dir, storage) = card;
    let response = call(storage, Method::GET, uri).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header_value(&response, header::CONTENT_TYPE), Some("text/plain"));
    assert_eq!(body_text(response).await, message);
}

#[rstest]
#[tokio::test]
async fn test_post_list_falls_through(card: (TempDir, Arc<Storage>)) {
    let (_dir, storage) = card;
    let response = call(storage, Method::POST, "/list?dir=/").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_text(response).await,
        "URI: /list\nMethod: POST\nArguments: 1\n NAME:dir\n VALUE:/\n"
    );
}

// ============================================================================
// Static files and fallback
// ============================================================================

#[rstest]
#[tokio::test]
async fn test_serves_index_for_root(card: (TempDir, Arc<Storage>)) {
    let (_dir, storage) = card;
    let response = call(storage, Method::GET, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::CONTENT_TYPE), Some("text/html"));
    assert_eq!(header_value(&response, header::CONTENT_LENGTH), Some("13"));
    assert_eq!(body_text(response).await, "<h1>card</h1>");
}

#[rstest]
#[tokio::test]
async fn test_download_forces_octet_stream(card: (TempDir, Arc<Storage>)) {
    let (_dir, storage) = card;
    let response = call(storage, Method::GET, "/notes.txt?download=1").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, header::CONTENT_TYPE),
        Some("application/octet-stream")
    );
    assert_eq!(body_text(response).await, "hello");
}

#[rstest]
#[case("/My%20Photo.jpg", "image/jpeg", "jpeg")]
#[case("/%C3%A9t%C3%A9.txt", "text/plain", "summer")]
#[tokio::test]
async fn test_percent_encoded_path_is_served(
    card: (TempDir, Arc<Storage>),
    #[case] uri: &str,
    #[case] content_type: &str,
    #[case] body: &str,
) {
    let (_dir, storage) = card;
    let response = call(storage, Method::GET, uri).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::CONTENT_TYPE), Some(content_type));
    assert_eq!(body_text(response).await, body);
}

#[rstest]
#[tokio::test]
async fn test_not_found_shows_decoded_path(card: (TempDir, Arc<Storage>)) {
    let (_dir, storage) = card;
    let response = call(storage, Method::GET, "/No%20Such.jpg").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_text(response).await,
        "URI: /No Such.jpg\nMethod: GET\nArguments: 0\n"
    );
}

#[rstest]
#[tokio::test]
async fn test_src_serves_html_as_text(card: (TempDir, Arc<Storage>)) {
    let (_dir, storage) = card;
    let response = call(storage, Method::GET, "/index.htm.src").await;

    assert_eq!(header_value(&response, header::CONTENT_TYPE), Some("text/plain"));
    assert_eq!(body_text(response).await, "<h1>card</h1>");
}

#[rstest]
#[tokio::test]
async fn test_missing_file_is_not_found(card: (TempDir, Arc<Storage>)) {
    let (_dir, storage) = card;
    let response = call(storage, Method::GET, "/missing.bin?a=1").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(header_value(&response, header::CONTENT_TYPE), Some("text/plain"));
    assert_eq!(
        body_text(response).await,
        "URI: /missing.bin\nMethod: GET\nArguments: 1\n NAME:a\n VALUE:1\n"
    );
}

#[rstest]
#[tokio::test]
async fn test_not_found_without_card() {
    let response = call(Arc::new(Storage::unavailable()), Method::GET, "/index.htm").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_text(response).await,
        "SDCARD Not Detected\n\nURI: /index.htm\nMethod: GET\nArguments: 0\n"
    );
}

// ============================================================================
// Request gate
// ============================================================================

/// Device whose first sector read waits for the test to release it
struct HeldDevice {
    inner: MemoryBlockDevice,
    release: Mutex<mpsc::Receiver<()>>,
}

impl BlockDevice for HeldDevice {
    fn sector_count(&self) -> u64 {
        self.inner.sector_count()
    }

    fn sector_size(&self) -> usize {
        self.inner.sector_size()
    }

    fn read_sector(&self, sector: u64, buffer: &mut [u8]) -> Result<(), BlockDeviceError> {
        if sector == 0 {
            let _ = self.release.lock().unwrap().recv();
        }
        self.inner.read_sector(sector, buffer)
    }
}

/// Filesystem that only counts lookups
#[derive(Default)]
struct CountingFs {
    lookups: Arc<AtomicUsize>,
}

impl FileSystemView for CountingFs {
    fn exists(&self, _path: &str) -> bool {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        false
    }

    fn open(&self, _path: &str) -> Option<Box<dyn FileHandle>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        None
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_request_waits_for_raw_transfer() {
    let (release_tx, release_rx) = mpsc::channel();
    let device = HeldDevice {
        inner: MemoryBlockDevice::new(vec![7u8; 1024], 512).unwrap(),
        release: Mutex::new(release_rx),
    };
    let filesystem = CountingFs::default();
    let lookups = Arc::clone(&filesystem.lookups);
    let storage = Storage::new(Some(Arc::new(device)), Some(Arc::new(filesystem)));
    let app = router(Arc::new(storage));

    let raw_request = Request::builder().uri("/raw").body(Body::empty()).unwrap();
    let raw = app.clone().oneshot(raw_request).await.unwrap();
    assert_eq!(raw.status(), StatusCode::OK);

    let file_request = Request::builder()
        .uri("/notes.txt")
        .body(Body::empty())
        .unwrap();
    let second = tokio::spawn(app.clone().oneshot(file_request));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(lookups.load(Ordering::SeqCst), 0);
    assert!(!second.is_finished());

    release_tx.send(()).unwrap();
    let body = to_bytes(raw.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.len(), 1024);

    let response = second.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(lookups.load(Ordering::SeqCst) > 0);
}
