use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::SpireError;
use crate::table::Table;

/// On-disk memoization store for the process-wide reference tables.
///
/// The compiled cluster and genome metadata files are large, so fetched
/// tables are persisted under the user cache directory and survive process
/// restarts. Callers receive the cache as an explicit service object; there
/// is no hidden module-level state.
#[derive(Debug, Clone)]
pub struct DataCache {
    root: Utf8PathBuf,
}

/// Sidecar record written next to each cached table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub url: String,
    pub fetched_at: String,
}

impl DataCache {
    pub fn new() -> Result<Self, SpireError> {
        if let Ok(dir) = std::env::var("SPIRE_CACHE_DIR") {
            return Ok(Self {
                root: Utf8PathBuf::from(dir),
            });
        }
        let root = BaseDirs::new()
            .and_then(|dirs| {
                Utf8PathBuf::from_path_buf(dirs.home_dir().join(".cache").join("spire-client"))
                    .ok()
            })
            .ok_or_else(|| SpireError::Cache("unable to resolve cache directory".to_string()))?;
        Ok(Self { root })
    }

    pub fn with_root(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn table_path(&self, key: &str) -> Utf8PathBuf {
        self.root.join(format!("{key}.tsv"))
    }

    fn entry_path(&self, key: &str) -> Utf8PathBuf {
        self.root.join(format!("{key}.json"))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table_path(key).as_std_path().exists()
    }

    pub fn get(&self, key: &str) -> Result<Option<Table>, SpireError> {
        let path = self.table_path(key);
        if !path.as_std_path().exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path.as_std_path())
            .map_err(|err| SpireError::Cache(err.to_string()))?;
        Ok(Some(Table::from_tsv_str(&text)?))
    }

    pub fn put(&self, key: &str, url: &str, table: &Table) -> Result<(), SpireError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| SpireError::Cache(err.to_string()))?;
        write_atomic(&self.table_path(key), table.to_tsv_string().as_bytes())?;

        let entry = CacheEntry {
            key: key.to_string(),
            url: url.to_string(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
        };
        let content = serde_json::to_vec_pretty(&entry)
            .map_err(|err| SpireError::Cache(err.to_string()))?;
        write_atomic(&self.entry_path(key), &content)
    }

    /// Removes one persisted entry; the next fetch for `key` hits the network.
    pub fn clear(&self, key: &str) -> Result<(), SpireError> {
        for path in [self.table_path(key), self.entry_path(key)] {
            if path.as_std_path().exists() {
                fs::remove_file(path.as_std_path())
                    .map_err(|err| SpireError::Cache(err.to_string()))?;
            }
        }
        Ok(())
    }

    pub fn clear_all(&self) -> Result<(), SpireError> {
        if self.root.as_std_path().exists() {
            fs::remove_dir_all(self.root.as_std_path())
                .map_err(|err| SpireError::Cache(err.to_string()))?;
        }
        Ok(())
    }
}

fn write_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), SpireError> {
    let tmp_path = path.with_extension("tmp");
    fs::write(tmp_path.as_std_path(), content)
        .map_err(|err| SpireError::Cache(err.to_string()))?;
    fs::rename(tmp_path.as_std_path(), path.as_std_path())
        .map_err(|err| SpireError::Cache(err.to_string()))?;
    Ok(())
}
