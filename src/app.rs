use std::path::Path;

use crate::cache::DataCache;
use crate::client::SpireClient;
use crate::domain::{AmrMode, DownloadTarget, ItemId, ViewTarget};
use crate::error::SpireError;
use crate::sample::Sample;
use crate::study::Study;

/// Orchestrates CLI verbs over studies and samples.
///
/// Dispatch is an exhaustive match on the (item kind, target) pair; pairs
/// with no operation return a typed [`SpireError::UnsupportedTarget`] rather
/// than silently doing nothing.
pub struct App<C: SpireClient> {
    client: C,
    cache: DataCache,
}

impl<C: SpireClient> App<C> {
    pub fn new(client: C, cache: DataCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    /// Renders the requested view of one item as TSV text.
    pub fn view(
        &self,
        item: &ItemId,
        target: ViewTarget,
        amr_mode: AmrMode,
    ) -> Result<String, SpireError> {
        match item {
            ItemId::Study(name) => {
                let mut study = Study::new(name.clone());
                match target {
                    ViewTarget::Metadata => Ok(study.metadata(&self.client)?.to_tsv_string()),
                    ViewTarget::Mags => {
                        Ok(study.mags(&self.client, &self.cache)?.to_tsv_string())
                    }
                    ViewTarget::Manifest => study.manifest().map(|table| table.to_tsv_string()),
                    ViewTarget::Amr | ViewTarget::Eggnog => Err(SpireError::UnsupportedTarget {
                        kind: "study",
                        target: target.to_string(),
                    }),
                }
            }
            ItemId::Sample(id) => {
                let mut sample = Sample::new(id.clone(), None);
                match target {
                    ViewTarget::Metadata => Ok(sample.metadata(&self.client)?.to_tsv_string()),
                    ViewTarget::Mags => {
                        Ok(sample.mags(&self.client, &self.cache)?.to_tsv_string())
                    }
                    ViewTarget::Eggnog => Ok(sample.eggnog_data(&self.client)?.to_tsv_string()),
                    ViewTarget::Amr => Ok(sample
                        .amr_annotations(amr_mode, &self.client)?
                        .to_tsv_string()),
                    ViewTarget::Manifest => Err(SpireError::UnsupportedTarget {
                        kind: "sample",
                        target: target.to_string(),
                    }),
                }
            }
        }
    }

    /// Downloads the requested artifact of one item into `output`.
    pub fn download(
        &self,
        item: &ItemId,
        target: DownloadTarget,
        output: &Path,
    ) -> Result<(), SpireError> {
        match item {
            ItemId::Study(name) => {
                let mut study = Study::new(name.clone());
                match target {
                    DownloadTarget::Metadata => {
                        let path = output.join(format!("{name}.tsv"));
                        study.metadata(&self.client)?.write_tsv(&path)
                    }
                    DownloadTarget::Mags => {
                        study.download_mags(output, &self.client).map(|_| ())
                    }
                    DownloadTarget::Proteins => {
                        study.download_proteins(output, &self.client).map(|_| ())
                    }
                    DownloadTarget::Genecalls => {
                        study.download_genecalls(output, &self.client).map(|_| ())
                    }
                }
            }
            ItemId::Sample(id) => {
                let mut sample = Sample::new(id.clone(), None);
                match target {
                    DownloadTarget::Metadata => {
                        let path = output.join(format!("{id}.tsv"));
                        sample.metadata(&self.client)?.write_tsv(&path)
                    }
                    DownloadTarget::Mags => {
                        sample.download_mags(output, &self.client, &self.cache)
                    }
                    DownloadTarget::Proteins | DownloadTarget::Genecalls => {
                        Err(SpireError::UnsupportedTarget {
                            kind: "sample",
                            target: target.to_string(),
                        })
                    }
                }
            }
        }
    }
}
