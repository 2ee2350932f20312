use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::cache::DataCache;
use crate::client::SpireClient;
use crate::data;
use crate::domain::AmrMode;
use crate::error::SpireError;
use crate::table::Table;

/// A sample from the SPIRE archive.
///
/// Every derived attribute is fetched lazily on first access and cached for
/// the lifetime of the instance; a second access never re-issues the remote
/// fetch. The owning study, when known, is carried as a name only; a sample
/// never owns its study.
#[derive(Debug)]
pub struct Sample {
    id: String,
    study: Option<String>,
    metadata: Option<Table>,
    mags: Option<Table>,
    eggnog: Option<Table>,
    amr: HashMap<AmrMode, Table>,
}

// The EggNOG export carries fixed emapper preamble and summary lines that are
// not part of the table proper.
const EGGNOG_HEADER_LINES: usize = 4;
const EGGNOG_FOOTER_LINES: usize = 3;

impl Sample {
    pub fn new(id: impl Into<String>, study: Option<String>) -> Self {
        Self {
            id: id.into(),
            study,
            metadata: None,
            mags: None,
            eggnog: None,
            amr: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn study(&self) -> Option<&str> {
        self.study.as_deref()
    }

    /// The sample's metadata row from the archive API. Fetched once.
    pub fn metadata(&mut self, client: &dyn SpireClient) -> Result<&Table, SpireError> {
        if self.metadata.is_none() {
            tracing::info!(sample = %self.id, "no sample metadata cached, fetching from SPIRE");
            let url = format!("{}/api/sample/{}?format=tsv", client.api_url(), self.id);
            let table = Table::from_tsv_str(&client.fetch_text(&url)?)?;
            self.metadata = Some(table);
        }
        Ok(self.metadata.as_ref().unwrap())
    }

    /// MAGs assembled from this sample: the rows of the process-wide genome
    /// metadata whose `derived_from_sample` matches this sample's id, in
    /// source order. Upstream duplicates are kept as-is.
    pub fn mags(
        &mut self,
        client: &dyn SpireClient,
        cache: &DataCache,
    ) -> Result<&Table, SpireError> {
        if self.mags.is_none() {
            self.metadata(client)?;
            let genomes = data::genome_metadata(client, cache)?;
            let mags = genomes.filter_eq("derived_from_sample", &self.id)?;
            self.mags = Some(mags);
        }
        Ok(self.mags.as_ref().unwrap())
    }

    /// EggNOG functional annotations for the sample's gene calls.
    pub fn eggnog_data(&mut self, client: &dyn SpireClient) -> Result<&Table, SpireError> {
        if self.eggnog.is_none() {
            let url = format!("{}/download_eggnog/{}", client.api_url(), self.id);
            let text = client.fetch_gzip_text(&url)?;
            let table = Table::from_tsv_str(&strip_emapper_framing(&text))?;
            self.eggnog = Some(table);
        }
        Ok(self.eggnog.as_ref().unwrap())
    }

    /// Antimicrobial-resistance annotations from one of the three tools the
    /// archive runs. Each tool is fetched and cached independently.
    pub fn amr_annotations(
        &mut self,
        mode: AmrMode,
        client: &dyn SpireClient,
    ) -> Result<&Table, SpireError> {
        if !self.amr.contains_key(&mode) {
            let url = mode.endpoint(client.api_url(), &self.id);
            let table = Table::from_tsv_str(&client.fetch_text(&url)?)?;
            self.amr.insert(mode, table);
        }
        Ok(&self.amr[&mode])
    }

    /// Downloads every MAG of this sample as an individual fasta file into
    /// `output/mags/`. Directories are created as needed.
    pub fn download_mags(
        &mut self,
        output: &Path,
        client: &dyn SpireClient,
        cache: &DataCache,
    ) -> Result<(), SpireError> {
        let mag_ids = self
            .mags(client, cache)?
            .column("spire_id")?
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>();

        let mag_dir = output.join("mags");
        fs::create_dir_all(&mag_dir).map_err(|err| SpireError::Filesystem(err.to_string()))?;
        for mag_id in mag_ids {
            let url = format!("{}/download_file/{mag_id}", client.api_url());
            client.download_file(&url, &mag_dir.join(format!("{mag_id}.fa.gz")))?;
        }
        Ok(())
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sample id: {} \tStudy: {}",
            self.id,
            self.study.as_deref().unwrap_or("-")
        )
    }
}

fn strip_emapper_framing(text: &str) -> String {
    let lines = text.lines().collect::<Vec<_>>();
    if lines.len() <= EGGNOG_HEADER_LINES + EGGNOG_FOOTER_LINES {
        return String::new();
    }
    let body = &lines[EGGNOG_HEADER_LINES..lines.len() - EGGNOG_FOOTER_LINES];
    let mut out = body.join("\n");
    out.push('\n');
    out
}
