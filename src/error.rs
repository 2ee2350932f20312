use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SpireError {
    #[error("invalid AMR tool: {0} (expected one of: deeparg, megares, vfdb)")]
    InvalidAmrMode(String),

    #[error("no {target} data available for a {kind}")]
    UnsupportedTarget { kind: &'static str, target: String },

    #[error("the archive provides no manifest for {0}")]
    ManifestUnavailable(String),

    #[error("SPIRE request failed: {0}")]
    SpireHttp(String),

    #[error("SPIRE returned status {status}: {message}")]
    SpireStatus { status: u16, message: String },

    #[error("failed to parse table: {0}")]
    TableParse(String),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("archive extraction failed: {0}")]
    Archive(String),

    #[error("cache error: {0}")]
    Cache(String),
}
