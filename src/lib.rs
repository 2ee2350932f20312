//! Client library for the SPIRE microbiome genomics archive.
//!
//! [`Study`] and [`Sample`] model the two archive entities; each exposes its
//! metadata, MAGs, and annotation sets as lazily fetched [`Table`]s. The two
//! large compiled reference tables are memoized on disk through
//! [`cache::DataCache`]. All I/O is blocking and goes through the
//! [`client::SpireClient`] trait.
//!
//! ```no_run
//! use spire_client::cache::DataCache;
//! use spire_client::client::SpireHttpClient;
//! use spire_client::study::Study;
//!
//! # fn main() -> Result<(), spire_client::error::SpireError> {
//! let client = SpireHttpClient::new()?;
//! let cache = DataCache::new()?;
//! let mut study = Study::new("Lloyd-Price_2019_HMP2IBD");
//! for sample in study.samples(&client)? {
//!     println!("{sample}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cache;
pub mod client;
pub mod data;
pub mod domain;
pub mod error;
pub mod sample;
pub mod study;
pub mod table;

pub use sample::Sample;
pub use study::Study;
pub use table::Table;
