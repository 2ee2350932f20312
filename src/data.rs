//! Process-wide reference tables.
//!
//! The compiled cluster and genome metadata cover every study in the archive
//! and weigh in at hundreds of megabytes, so each is fetched at most once per
//! cache lifetime and memoized through the injected [`DataCache`].

use crate::cache::DataCache;
use crate::client::SpireClient;
use crate::error::SpireError;
use crate::table::Table;

const CLUSTER_KEY: &str = "cluster_metadata";
const GENOME_KEY: &str = "genome_metadata";

pub fn cluster_metadata(
    client: &dyn SpireClient,
    cache: &DataCache,
) -> Result<Table, SpireError> {
    fetch_reference(
        client,
        cache,
        CLUSTER_KEY,
        &format!("{}/metadata/spire_v1_cluster_metadata.tsv.gz", client.bulk_url()),
    )
}

pub fn genome_metadata(client: &dyn SpireClient, cache: &DataCache) -> Result<Table, SpireError> {
    fetch_reference(
        client,
        cache,
        GENOME_KEY,
        &format!("{}/metadata/spire_v1_genome_metadata.tsv.gz", client.bulk_url()),
    )
}

fn fetch_reference(
    client: &dyn SpireClient,
    cache: &DataCache,
    key: &str,
    url: &str,
) -> Result<Table, SpireError> {
    if let Some(table) = cache.get(key)? {
        tracing::debug!(key, "reference table served from cache");
        return Ok(table);
    }
    tracing::info!(key, url, "reference table not cached, downloading");
    let text = client.fetch_gzip_text(url)?;
    let table = Table::from_tsv_str(&text)?;
    cache.put(key, url, &table)?;
    Ok(table)
}
