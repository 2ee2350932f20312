use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::cache::DataCache;
use crate::client::SpireClient;
use crate::data;
use crate::domain::ArchiveKind;
use crate::error::SpireError;
use crate::sample::Sample;
use crate::table::Table;

/// A study from the SPIRE archive.
///
/// Metadata, the sample list, and the study's MAG set are fetched or derived
/// lazily and cached for the lifetime of the instance. The sample list is
/// built one Sample per metadata row, in row order, each carrying this
/// study's name as its back-reference.
#[derive(Debug)]
pub struct Study {
    name: String,
    metadata: Option<Table>,
    samples: Option<Vec<Sample>>,
    mags: Option<Table>,
}

impl Study {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: None,
            samples: None,
            mags: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Study metadata: one row per sample, always with a `sample_id` column.
    pub fn metadata(&mut self, client: &dyn SpireClient) -> Result<&Table, SpireError> {
        if self.metadata.is_none() {
            tracing::info!(study = %self.name, "no study metadata cached, fetching from SPIRE");
            let url = format!("{}/api/study/{}?format=tsv", client.api_url(), self.name);
            let table = Table::from_tsv_str(&client.fetch_text(&url)?)?;
            if table.column_index("sample_id").is_none() {
                return Err(SpireError::MissingColumn("sample_id".to_string()));
            }
            self.metadata = Some(table);
        }
        Ok(self.metadata.as_ref().unwrap())
    }

    /// The study's samples, one per metadata row, in metadata order. A second
    /// call returns the same cached slice without refetching.
    pub fn samples(&mut self, client: &dyn SpireClient) -> Result<&[Sample], SpireError> {
        if self.samples.is_none() {
            let ids = self
                .metadata(client)?
                .column("sample_id")?
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>();
            let samples = ids
                .into_iter()
                .map(|id| Sample::new(id, Some(self.name.clone())))
                .collect();
            self.samples = Some(samples);
        }
        Ok(self.samples.as_ref().unwrap())
    }

    /// Mutable access to the cached sample list, for walking samples and
    /// triggering their own lazy fetches.
    pub fn samples_mut(&mut self, client: &dyn SpireClient) -> Result<&mut [Sample], SpireError> {
        self.samples(client)?;
        Ok(self.samples.as_mut().unwrap())
    }

    /// The study's MAGs: rows of the process-wide genome metadata whose
    /// `derived_from_sample` belongs to this study, in source order, columns
    /// untouched. No per-sample join happens at study level.
    pub fn mags(
        &mut self,
        client: &dyn SpireClient,
        cache: &DataCache,
    ) -> Result<&Table, SpireError> {
        if self.mags.is_none() {
            let sample_ids = self
                .metadata(client)?
                .column("sample_id")?
                .iter()
                .map(|id| id.to_string())
                .collect::<HashSet<_>>();
            let genomes = data::genome_metadata(client, cache)?;
            let mags = genomes.filter_in("derived_from_sample", &sample_ids)?;
            self.mags = Some(mags);
        }
        Ok(self.mags.as_ref().unwrap())
    }

    /// The archive publishes no per-study manifest.
    pub fn manifest(&self) -> Result<Table, SpireError> {
        Err(SpireError::ManifestUnavailable(self.name.clone()))
    }

    /// Downloads the study's fixed-name bulk tar archive into a scratch
    /// directory, extracts it fully into a subdirectory of `output`, and
    /// drops the scratch download. Returns the extraction directory.
    pub fn download_archive(
        &self,
        kind: ArchiveKind,
        output: &Path,
        client: &dyn SpireClient,
    ) -> Result<PathBuf, SpireError> {
        let scratch =
            tempfile::tempdir().map_err(|err| SpireError::Filesystem(err.to_string()))?;
        let tar_path = scratch
            .path()
            .join(format!("{}_{}.tar", self.name, kind.subdir()));

        let url = kind.archive_url(client.bulk_url(), &self.name);
        tracing::info!(study = %self.name, url, "downloading bulk archive");
        client.download_file(&url, &tar_path)?;

        fs::create_dir_all(output).map_err(|err| SpireError::Filesystem(err.to_string()))?;
        let dest = output.join(kind.subdir());
        let file = File::open(&tar_path).map_err(|err| SpireError::Archive(err.to_string()))?;
        tar::Archive::new(file)
            .unpack(&dest)
            .map_err(|err| SpireError::Archive(err.to_string()))?;
        Ok(dest)
    }

    pub fn download_mags(
        &self,
        output: &Path,
        client: &dyn SpireClient,
    ) -> Result<PathBuf, SpireError> {
        self.download_archive(ArchiveKind::Mags, output, client)
    }

    pub fn download_assemblies(
        &self,
        output: &Path,
        client: &dyn SpireClient,
    ) -> Result<PathBuf, SpireError> {
        self.download_archive(ArchiveKind::Assemblies, output, client)
    }

    pub fn download_genecalls(
        &self,
        output: &Path,
        client: &dyn SpireClient,
    ) -> Result<PathBuf, SpireError> {
        self.download_archive(ArchiveKind::Genecalls, output, client)
    }

    pub fn download_proteins(
        &self,
        output: &Path,
        client: &dyn SpireClient,
    ) -> Result<PathBuf, SpireError> {
        self.download_archive(ArchiveKind::Proteins, output, client)
    }
}
