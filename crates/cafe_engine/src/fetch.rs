use std::io::{self, Read};
use std::time::Duration;

use engine_logging::engine_debug;
use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_TYPE};

use crate::decode::decode_html;
use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(20),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            accept_language: "en-GB,en;q=0.9".to_string(),
        }
    }
}

/// One blocking HTTP GET per call. No retries.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError>;

    /// Fetch and decode the body into UTF-8 HTML.
    fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let output = self.fetch(url)?;
        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref())?;
        engine_debug!(
            "Decoded {} bytes from {} as {}",
            output.metadata.byte_len,
            output.metadata.final_url,
            decoded.encoding_label
        );
        Ok(decoded.html)
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    // Built per call so no connection outlives a single fetch.
    fn build_client(&self) -> Result<reqwest::blocking::Client, FetchError> {
        reqwest::blocking::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(self.settings.redirect_limit))
            .user_agent(self.settings.user_agent.as_str())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

impl Fetcher for ReqwestFetcher {
    fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = self.build_client()?;

        engine_debug!("GET {}", parsed);
        let response = client
            .get(parsed)
            .header(ACCEPT_LANGUAGE, self.settings.accept_language.as_str())
            .send()
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        // Read one byte past the limit to detect bodies without a Content-Length.
        let mut bytes = Vec::new();
        response
            .take(self.settings.max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(map_io_error)?;
        if bytes.len() as u64 > self.settings.max_bytes {
            return Err(self.too_large(bytes.len() as u64));
        }

        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url,
                status: status.as_u16(),
                content_type,
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

fn map_io_error(err: io::Error) -> FetchError {
    if err.kind() == io::ErrorKind::TimedOut {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
