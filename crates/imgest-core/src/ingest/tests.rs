//! End-to-end pipeline tests with stub network and registry ports.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use super::*;
use crate::fetch::tests::{png_bytes, StubTransport};
use crate::fetch::FetchError;
use crate::registry::{NoRegistry, RegistryError};
use crate::store::tests::CountingFs;
use crate::template::FixedClock;

/// Registry that hands out sequential ids and keeps what it was given.
#[derive(Default)]
struct RecordingRegistry {
    next: AtomicUsize,
    records: Mutex<Vec<AssetRecord>>,
}

impl AssetRegistry for RecordingRegistry {
    fn register(&self, record: &AssetRecord) -> Result<RegistrationId, RegistryError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(format!("asset-{}", self.next.fetch_add(1, Ordering::SeqCst) + 1))
    }
}

struct Harness {
    root: tempfile::TempDir,
    scratch: tempfile::TempDir,
    transport: Arc<StubTransport>,
    storage: Arc<CountingFs>,
    registry: Arc<RecordingRegistry>,
}

impl Harness {
    fn new(transport: StubTransport) -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
            scratch: tempfile::tempdir().unwrap(),
            transport: Arc::new(transport),
            storage: Arc::new(CountingFs::default()),
            registry: Arc::new(RecordingRegistry::default()),
        }
    }

    fn site(&self) -> Site {
        Site {
            origin: "https://mysite.example".to_string(),
            upload_root: self.root.path().to_path_buf(),
            base_url: "https://mysite.example/uploads".to_string(),
            scratch_dir: Some(self.scratch.path().to_path_buf()),
        }
    }

    fn ingester(&self) -> Ingester {
        Ingester::new(
            self.site(),
            self.transport.clone(),
            self.storage.clone(),
            self.registry.clone(),
        )
        .with_clock(Arc::new(FixedClock(
            DateTime::parse_from_rfc3339("2026-01-02T03:04:05+00:00").unwrap(),
        )))
    }

    fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch.path()).unwrap().count() == 0
    }
}

fn request(url: &str, config: IngestConfig) -> IngestionRequest {
    IngestionRequest {
        url: url.to_string(),
        alt_hint: "A <b>cat</b>".to_string(),
        document: DocumentContext {
            id: 42,
            slug: "hello-world".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).unwrap(),
        },
        config,
    }
}

#[test]
fn scenario_a_allowed_fetched_and_stored() {
    let body = png_bytes(8, 8, 1);
    let h = Harness::new(StubTransport::ok(200, body.clone()));

    let result = h
        .ingester()
        .ingest(&request("https://other.example/cat.png", IngestConfig::default()))
        .unwrap();

    assert_eq!(result.relative_path, "2025/11/cat.png");
    assert_eq!(result.path, h.root.path().join("2025/11/cat.png"));
    assert_eq!(result.url, "https://mysite.example/uploads/2025/11/cat.png");
    assert_eq!(result.mime, "image/png");
    assert_eq!(result.alt_text, "A cat");
    assert_eq!(result.registration, Registration::Registered("asset-1".to_string()));
    assert_eq!(std::fs::read(&result.path).unwrap(), body);
    assert!(h.scratch_is_empty());

    let records = h.registry.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].parent_id, 42);
    assert_eq!(records[0].title, "cat");
    assert_eq!(records[0].alt_text, "A cat");
    assert_eq!(records[0].source_url, "https://other.example/cat.png");
}

#[test]
fn scenario_b_excluded_before_any_network_call() {
    let h = Harness::new(StubTransport::ok(200, png_bytes(1, 1, 0)));
    let cfg = IngestConfig {
        excluded_domains: "other.example".to_string(),
        ..IngestConfig::default()
    };

    let err = h
        .ingester()
        .ingest(&request("https://other.example/cat.png", cfg))
        .unwrap_err();

    assert!(matches!(
        err,
        IngestionError::PolicyRejected {
            reason: policy::PolicyReason::Excluded { .. },
            ..
        }
    ));
    assert_eq!(h.transport.request_count(), 0);
    assert_eq!(h.storage.writes(), 0);
}

#[test]
fn same_host_is_never_fetched() {
    let h = Harness::new(StubTransport::ok(200, png_bytes(1, 1, 0)));
    let err = h
        .ingester()
        .ingest(&request("https://www.mysite.example/uploads/cat.png", IngestConfig::default()))
        .unwrap_err();
    assert!(matches!(
        err,
        IngestionError::PolicyRejected {
            reason: policy::PolicyReason::SameHost,
            ..
        }
    ));
    assert_eq!(h.transport.request_count(), 0);
}

#[test]
fn scenario_c_404_writes_nothing() {
    let h = Harness::new(StubTransport::ok(404, b"not found".to_vec()));

    let err = h
        .ingester()
        .ingest(&request("https://other.example/cat.png", IngestConfig::default()))
        .unwrap_err();

    assert!(matches!(
        err,
        IngestionError::Fetch(FetchError::HttpStatus { status: 404, .. })
    ));
    assert_eq!(h.storage.writes(), 0);
    assert_eq!(std::fs::read_dir(h.root.path()).unwrap().count(), 0);
    assert!(h.scratch_is_empty());
    assert!(h.registry.records.lock().unwrap().is_empty());
}

#[test]
fn scenario_d_repeat_ingest_reuses_stored_file() {
    let h = Harness::new(StubTransport::ok(200, png_bytes(8, 8, 4)));
    let ingester = h.ingester();
    let req = request("https://other.example/cat.png", IngestConfig::default());

    let first = ingester.ingest(&req).unwrap();
    let second = ingester.ingest(&req).unwrap();

    assert_eq!(first.path, second.path);
    assert_eq!(first.url, second.url);
    assert_eq!(h.storage.writes(), 1);
    assert!(h.scratch_is_empty());
}

#[test]
fn registration_failure_keeps_the_file() {
    let h = Harness::new(StubTransport::ok(200, png_bytes(2, 2, 0)));
    let ingester = Ingester::new(
        h.site(),
        h.transport.clone(),
        h.storage.clone(),
        Arc::new(NoRegistry),
    );

    let result = ingester
        .ingest(&request("https://other.example/cat.png", IngestConfig::default()))
        .unwrap();

    assert_eq!(result.registration, Registration::Unregistered);
    assert_eq!(result.registration.id(), None);
    assert!(result.path.exists());
}

#[test]
fn templates_drive_name_and_alt() {
    let h = Harness::new(StubTransport::ok(200, png_bytes(2, 2, 0)));
    let cfg = IngestConfig {
        filename_template: "%post_name%-%filename%-%year%".to_string(),
        alt_template: "%image_alt% (post %post_id%)".to_string(),
        ..IngestConfig::default()
    };

    let result = h
        .ingester()
        .ingest(&request("//other.example/img/cat.png", cfg))
        .unwrap();

    assert_eq!(result.relative_path, "2025/11/hello-world-cat-2026.png");
    assert_eq!(result.alt_text, "A cat (post 42)");
    assert_eq!(
        *h.transport.requests.lock().unwrap(),
        vec!["https://other.example/img/cat.png".to_string()]
    );
}

#[test]
fn resize_registers_the_variant() {
    let h = Harness::new(StubTransport::ok(200, png_bytes(40, 20, 0)));
    let cfg = IngestConfig {
        max_width: 20,
        ..IngestConfig::default()
    };

    let result = h
        .ingester()
        .ingest(&request("https://other.example/cat.png", cfg))
        .unwrap();

    assert_eq!(result.relative_path, "2025/11/cat-20x10.png");
    assert!(h.root.path().join("2025/11/cat.png").exists());
    let records = h.registry.records.lock().unwrap();
    assert_eq!(records[0].url, "https://mysite.example/uploads/2025/11/cat-20x10.png");
}

#[test]
fn not_an_image_is_rejected() {
    let h = Harness::new(StubTransport::ok(200, b"<html></html>".to_vec()));
    let err = h
        .ingester()
        .ingest(&request("https://other.example/cat.png", IngestConfig::default()))
        .unwrap_err();
    assert!(matches!(err, IngestionError::Fetch(FetchError::NotAnImage { .. })));
    assert!(h.scratch_is_empty());
    assert_eq!(h.storage.writes(), 0);
}

#[test]
fn concurrent_ingests_of_same_content_store_once() {
    let h = Harness::new(StubTransport::ok(200, png_bytes(16, 16, 9)));
    let ingester = h.ingester();
    let req = request("https://other.example/cat.png", IngestConfig::default());

    let results: Vec<IngestionResult> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| ingester.ingest(&req).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|r| r.path == results[0].path));
    assert_eq!(h.storage.writes(), 1);
}

#[test]
fn registration_serializes_with_status() {
    let json = serde_json::to_string(&Registration::Registered("7".into())).unwrap();
    assert_eq!(json, r#"{"status":"registered","id":"7"}"#);
    let json = serde_json::to_string(&Registration::Unregistered).unwrap();
    assert_eq!(json, r#"{"status":"unregistered"}"#);
}
