//! End-to-end measurement passes through the library API with a scripted
//! measurement client and real files on disk.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wan_monitor::logging::RunLogger;
use wan_monitor::{
    AppError, ConfigSource, ConfigStore, MeasurementRunner, MeasurementStage, ReportWriter, Result,
    SelectionSource, ServerIdentity, SessionResults, Settings, SpeedtestBackend,
};

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct FakeClient {
    recorder: Recorder,
    download_bps: f64,
    upload_bps: f64,
    ping_ms: f64,
    jitter_ms: Option<f64>,
    fail_upload: bool,
}

impl FakeClient {
    fn scenario(recorder: Recorder) -> Self {
        Self {
            recorder,
            download_bps: 50_000_000.0,
            upload_bps: 10_000_000.0,
            ping_ms: 14.7,
            jitter_ms: None,
            fail_upload: false,
        }
    }
}

#[async_trait]
impl SpeedtestBackend for FakeClient {
    async fn best_server(&mut self) -> Result<ServerIdentity> {
        self.recorder.push("best_server");
        Ok(ServerIdentity::new("7", "Nearby ISP", "Bergen", "Norway"))
    }

    async fn bind(&mut self, server: &ServerIdentity) -> Result<()> {
        self.recorder.push(format!("bind:{}", server.id));
        Ok(())
    }

    async fn download(&mut self) -> Result<f64> {
        self.recorder.push("download");
        Ok(self.download_bps)
    }

    async fn upload(&mut self) -> Result<f64> {
        self.recorder.push("upload");
        if self.fail_upload {
            return Err(AppError::backend("connection reset by peer"));
        }
        Ok(self.upload_bps)
    }

    async fn results(&self) -> Result<SessionResults> {
        self.recorder.push("results");
        Ok(SessionResults {
            ping_ms: self.ping_ms,
            jitter_ms: self.jitter_ms,
        })
    }
}

fn runner(store: &ConfigStore, client: FakeClient) -> MeasurementRunner {
    MeasurementRunner::new(
        Box::new(store.clone()),
        Box::new(client),
        RunLogger::new(&Settings::default()),
    )
}

#[tokio::test]
async fn test_pinned_pass_produces_report() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    store
        .save(&ServerIdentity::new("42", "Acme", "Oslo", "Norway"))
        .await
        .unwrap();

    let recorder = Recorder::default();
    let run = runner(&store, FakeClient::scenario(recorder.clone()))
        .run()
        .await
        .unwrap();

    assert_eq!(run.result.download, 50_000_000.0);
    assert_eq!(run.result.upload, 10_000_000.0);
    assert_eq!(run.result.ping, 15);
    assert_eq!(run.result.jitter, 0);
    assert_eq!(run.source, SelectionSource::Pinned);
    assert_eq!(recorder.entries(), vec!["bind:42", "download", "upload", "results"]);

    let writer = ReportWriter::new(dir.path().join("results.html"), false);
    writer.write(&run).await.unwrap();

    let html = std::fs::read_to_string(writer.path()).unwrap();
    for expected in ["50.00 Mbps", "10.00 Mbps", "15 ms", "0 ms", "Acme - Oslo (Norway)"] {
        assert!(html.contains(expected), "report missing {}", expected);
    }
}

#[tokio::test]
async fn test_report_shows_decimal_megabits() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    let mut client = FakeClient::scenario(Recorder::default());
    client.download_bps = 123_456_789.0;

    let run = runner(&store, client).run().await.unwrap();
    let writer = ReportWriter::new(dir.path().join("results.html"), false);
    writer.write(&run).await.unwrap();

    let html = std::fs::read_to_string(writer.path()).unwrap();
    assert!(html.contains("<p>Download: 123.46 Mbps</p>"));
}

#[tokio::test]
async fn test_upload_failure_yields_no_result_and_no_report() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    store
        .save(&ServerIdentity::new("42", "Acme", "Oslo", "Norway"))
        .await
        .unwrap();
    let report_path = dir.path().join("results.html");

    let recorder = Recorder::default();
    let mut client = FakeClient::scenario(recorder.clone());
    client.fail_upload = true;

    let outcome = runner(&store, client).run().await;

    let error = match outcome {
        Ok(run) => panic!("expected failure, got {:?}", run),
        Err(error) => error,
    };
    assert_eq!(error.stage(), Some(MeasurementStage::Upload));
    assert!(error.to_string().contains("connection reset by peer"));
    assert_eq!(recorder.entries(), vec!["bind:42", "download", "upload"]);
    assert!(!report_path.exists());
}

#[tokio::test]
async fn test_unpinned_pass_auto_selects_and_leaves_config_alone() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    store.clear().await.unwrap();

    let recorder = Recorder::default();
    let run = runner(&store, FakeClient::scenario(recorder.clone()))
        .run()
        .await
        .unwrap();

    assert!(run.source.is_auto_selected());
    assert_eq!(run.server.name, "Bergen");
    assert_eq!(recorder.entries()[..2], ["best_server", "bind:7"]);
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "null");
    assert!(!store.load().await.unwrap().into_config().is_pinned());
}
