use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use spire_client::app::App;
use spire_client::cache::DataCache;
use spire_client::client::SpireClient;
use spire_client::domain::{AmrMode, DownloadTarget, ItemId, ViewTarget};
use spire_client::error::SpireError;

#[derive(Default)]
struct MockClient {
    text: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockClient {
    fn with_text(url: &str, payload: &str) -> Self {
        let mut client = Self::default();
        client.text.insert(url.to_string(), payload.to_string());
        client
    }
}

impl SpireClient for MockClient {
    fn fetch_text(&self, url: &str) -> Result<String, SpireError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.text
            .get(url)
            .cloned()
            .ok_or_else(|| SpireError::SpireHttp(format!("unexpected url: {url}")))
    }

    fn fetch_gzip_text(&self, url: &str) -> Result<String, SpireError> {
        self.calls.lock().unwrap().push(url.to_string());
        Err(SpireError::SpireHttp(format!("unexpected url: {url}")))
    }

    fn download_file(&self, url: &str, destination: &Path) -> Result<(), SpireError> {
        self.calls.lock().unwrap().push(url.to_string());
        std::fs::write(destination, b"data")
            .map_err(|err| SpireError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

fn app_with(client: MockClient, temp: &tempfile::TempDir) -> App<MockClient> {
    let cache =
        DataCache::with_root(Utf8PathBuf::from_path_buf(temp.path().join("cache")).unwrap());
    App::new(client, cache)
}

#[test]
fn view_sample_metadata_renders_tsv() {
    let temp = tempfile::tempdir().unwrap();
    let client = MockClient::with_text(
        "https://spire.embl.de/api/sample/SAMEA1?format=tsv",
        "sample_id\tspire_cluster\nSAMEA1\tc1\n",
    );
    let app = app_with(client, &temp);

    let rendered = app
        .view(
            &ItemId::classify("SAMEA1"),
            ViewTarget::Metadata,
            AmrMode::Deeparg,
        )
        .unwrap();
    assert_eq!(rendered, "sample_id\tspire_cluster\nSAMEA1\tc1\n");
}

#[test]
fn view_study_amr_is_unsupported() {
    let temp = tempfile::tempdir().unwrap();
    let app = app_with(MockClient::default(), &temp);

    let err = app
        .view(
            &ItemId::Study("STUDY_A".to_string()),
            ViewTarget::Amr,
            AmrMode::Deeparg,
        )
        .unwrap_err();
    assert_matches!(
        err,
        SpireError::UnsupportedTarget { kind: "study", target } if target == "amr"
    );
}

#[test]
fn view_study_manifest_is_a_typed_error() {
    let temp = tempfile::tempdir().unwrap();
    let app = app_with(MockClient::default(), &temp);

    let err = app
        .view(
            &ItemId::Study("STUDY_A".to_string()),
            ViewTarget::Manifest,
            AmrMode::Deeparg,
        )
        .unwrap_err();
    assert_matches!(err, SpireError::ManifestUnavailable(_));
}

#[test]
fn download_sample_proteins_is_unsupported() {
    let temp = tempfile::tempdir().unwrap();
    let app = app_with(MockClient::default(), &temp);

    let err = app
        .download(
            &ItemId::Sample("SAMEA1".to_string()),
            DownloadTarget::Proteins,
            temp.path(),
        )
        .unwrap_err();
    assert_matches!(
        err,
        SpireError::UnsupportedTarget { kind: "sample", target } if target == "proteins"
    );
}

#[test]
fn download_study_metadata_writes_named_tsv() {
    let temp = tempfile::tempdir().unwrap();
    let client = MockClient::with_text(
        "https://spire.embl.de/api/study/STUDY_A?format=tsv",
        "sample_id\ns1\ns2\n",
    );
    let app = app_with(client, &temp);

    let output = temp.path().join("out");
    app.download(
        &ItemId::Study("STUDY_A".to_string()),
        DownloadTarget::Metadata,
        &output,
    )
    .unwrap();

    let written = std::fs::read_to_string(output.join("STUDY_A.tsv")).unwrap();
    assert_eq!(written, "sample_id\ns1\ns2\n");
}

#[test]
fn remote_failure_propagates_unrecovered() {
    let temp = tempfile::tempdir().unwrap();
    let client = MockClient::default(); // knows no urls
    let app = app_with(client, &temp);

    let err = app
        .view(
            &ItemId::Study("STUDY_A".to_string()),
            ViewTarget::Metadata,
            AmrMode::Deeparg,
        )
        .unwrap_err();
    assert_matches!(err, SpireError::SpireHttp(_));
}

#[test]
fn classification_routes_inputs() {
    assert_eq!(ItemId::classify("SAMEA104142075").kind(), "sample");
    assert_eq!(ItemId::classify("Rampelli_2015_Hadza").kind(), "study");
}
