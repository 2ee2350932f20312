use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::SpireError;

pub const DEFAULT_API_URL: &str = "https://spire.embl.de";
pub const DEFAULT_BULK_URL: &str = "https://swifter.embl.de/~fullam/spire";

/// Blocking access to the SPIRE archive. Everything the library fetches goes
/// through this trait so tests can substitute canned payloads.
pub trait SpireClient: Send + Sync {
    fn fetch_text(&self, url: &str) -> Result<String, SpireError>;
    fn fetch_gzip_text(&self, url: &str) -> Result<String, SpireError>;
    fn download_file(&self, url: &str, destination: &Path) -> Result<(), SpireError>;

    fn api_url(&self) -> &str {
        DEFAULT_API_URL
    }

    fn bulk_url(&self) -> &str {
        DEFAULT_BULK_URL
    }
}

#[derive(Clone)]
pub struct SpireHttpClient {
    client: Client,
    api_url: String,
    bulk_url: String,
}

impl SpireHttpClient {
    pub fn new() -> Result<Self, SpireError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("spire-client/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SpireError::SpireHttp(err.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| SpireError::SpireHttp(err.to_string()))?;

        let api_url =
            std::env::var("SPIRE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let bulk_url =
            std::env::var("SPIRE_BULK_URL").unwrap_or_else(|_| DEFAULT_BULK_URL.to_string());

        Ok(Self {
            client,
            api_url,
            bulk_url,
        })
    }

    pub fn with_base_urls(api_url: String, bulk_url: String) -> Result<Self, SpireError> {
        let mut client = Self::new()?;
        client.api_url = api_url;
        client.bulk_url = bulk_url;
        Ok(client)
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, SpireError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| SpireError::SpireHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "SPIRE request failed".to_string());
            return Err(SpireError::SpireStatus { status, message });
        }
        Ok(response)
    }
}

impl SpireClient for SpireHttpClient {
    fn fetch_text(&self, url: &str) -> Result<String, SpireError> {
        tracing::debug!(url, "fetching");
        self.get(url)?
            .text()
            .map_err(|err| SpireError::SpireHttp(err.to_string()))
    }

    fn fetch_gzip_text(&self, url: &str) -> Result<String, SpireError> {
        tracing::debug!(url, "fetching gzip");
        let bytes = self
            .get(url)?
            .bytes()
            .map_err(|err| SpireError::SpireHttp(err.to_string()))?;
        let mut decoder = GzDecoder::new(bytes.as_ref());
        let mut text = String::new();
        decoder
            .read_to_string(&mut text)
            .map_err(|err| SpireError::SpireHttp(err.to_string()))?;
        Ok(text)
    }

    fn download_file(&self, url: &str, destination: &Path) -> Result<(), SpireError> {
        tracing::debug!(url, destination = %destination.display(), "downloading");
        let mut response = self.get(url)?;
        let mut file =
            File::create(destination).map_err(|err| SpireError::Filesystem(err.to_string()))?;
        std::io::copy(&mut response, &mut file)
            .map_err(|err| SpireError::Filesystem(err.to_string()))?;
        Ok(())
    }

    fn api_url(&self) -> &str {
        &self.api_url
    }

    fn bulk_url(&self) -> &str {
        &self.bulk_url
    }
}
