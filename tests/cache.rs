use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use camino::Utf8PathBuf;

use spire_client::Table;
use spire_client::cache::DataCache;
use spire_client::client::SpireClient;
use spire_client::data;
use spire_client::error::SpireError;

#[derive(Default)]
struct MockClient {
    gzip: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockClient {
    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl SpireClient for MockClient {
    fn fetch_text(&self, url: &str) -> Result<String, SpireError> {
        self.calls.lock().unwrap().push(url.to_string());
        Err(SpireError::SpireHttp(format!("unexpected url: {url}")))
    }

    fn fetch_gzip_text(&self, url: &str) -> Result<String, SpireError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.gzip
            .get(url)
            .cloned()
            .ok_or_else(|| SpireError::SpireHttp(format!("unexpected url: {url}")))
    }

    fn download_file(&self, url: &str, _destination: &Path) -> Result<(), SpireError> {
        self.calls.lock().unwrap().push(url.to_string());
        Err(SpireError::SpireHttp(format!("unexpected url: {url}")))
    }
}

fn temp_cache(temp: &tempfile::TempDir) -> DataCache {
    DataCache::with_root(Utf8PathBuf::from_path_buf(temp.path().join("cache")).unwrap())
}

#[test]
fn put_get_roundtrip_and_clear() {
    let temp = tempfile::tempdir().unwrap();
    let cache = temp_cache(&temp);

    assert!(cache.get("cluster_metadata").unwrap().is_none());

    let table = Table::from_tsv_str("cluster_id\tdescription\nc1\tCluster 1\n").unwrap();
    cache.put("cluster_metadata", "mock://clusters", &table).unwrap();
    assert!(cache.contains("cluster_metadata"));

    let loaded = cache.get("cluster_metadata").unwrap().unwrap();
    assert_eq!(loaded, table);

    cache.clear("cluster_metadata").unwrap();
    assert!(!cache.contains("cluster_metadata"));
    assert!(cache.get("cluster_metadata").unwrap().is_none());
}

#[test]
fn reference_tables_fetch_once_per_cache_lifetime() {
    let temp = tempfile::tempdir().unwrap();
    let cache = temp_cache(&temp);

    let mut client = MockClient::default();
    client.gzip.insert(
        "https://swifter.embl.de/~fullam/spire/metadata/spire_v1_cluster_metadata.tsv.gz"
            .to_string(),
        "spire_cluster\tlineage\nc1\tBacteria\n".to_string(),
    );

    let first = data::cluster_metadata(&client, &cache).unwrap();
    assert_eq!(first.column("spire_cluster").unwrap(), vec!["c1"]);
    assert_eq!(client.call_count(), 1);

    // same process: cache hit
    let second = data::cluster_metadata(&client, &cache).unwrap();
    assert_eq!(second, first);
    assert_eq!(client.call_count(), 1);

    // fresh client over the same cache directory: still no network
    let cold_client = MockClient::default();
    let third = data::cluster_metadata(&cold_client, &cache).unwrap();
    assert_eq!(third, first);
    assert_eq!(cold_client.call_count(), 0);
}

#[test]
fn clearing_forces_a_refetch() {
    let temp = tempfile::tempdir().unwrap();
    let cache = temp_cache(&temp);

    let mut client = MockClient::default();
    client.gzip.insert(
        "https://swifter.embl.de/~fullam/spire/metadata/spire_v1_genome_metadata.tsv.gz"
            .to_string(),
        "spire_id\tderived_from_sample\nMAG_A\ts1\n".to_string(),
    );

    data::genome_metadata(&client, &cache).unwrap();
    assert_eq!(client.call_count(), 1);

    cache.clear("genome_metadata").unwrap();
    data::genome_metadata(&client, &cache).unwrap();
    assert_eq!(client.call_count(), 2);
}

#[test]
fn clear_all_removes_every_entry() {
    let temp = tempfile::tempdir().unwrap();
    let cache = temp_cache(&temp);

    let table = Table::from_tsv_str("a\n1\n").unwrap();
    cache.put("cluster_metadata", "mock://c", &table).unwrap();
    cache.put("genome_metadata", "mock://g", &table).unwrap();

    cache.clear_all().unwrap();
    assert!(!cache.contains("cluster_metadata"));
    assert!(!cache.contains("genome_metadata"));
}
