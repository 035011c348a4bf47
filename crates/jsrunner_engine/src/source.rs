use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::decode::decode_source;
use crate::{FailureKind, SourceError};

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub request_timeout: Duration,
    pub max_bytes: u64,
    /// Query parameter carrying the cache-busting timestamp.
    pub cache_param: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_bytes: 2 * 1024 * 1024,
            cache_param: "cache".to_string(),
        }
    }
}

/// Supplies the script text. Every call must return the current text, never
/// a cached copy.
#[async_trait::async_trait]
pub trait CodeSource: Send + Sync {
    async fn load(&self) -> Result<String, SourceError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Reads the script from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileCodeSource {
    path: PathBuf,
    max_bytes: u64,
}

impl FileCodeSource {
    pub fn new(path: impl Into<PathBuf>, settings: &SourceSettings) -> Self {
        Self {
            path: path.into(),
            max_bytes: settings.max_bytes,
        }
    }
}

#[async_trait::async_trait]
impl CodeSource for FileCodeSource {
    async fn load(&self) -> Result<String, SourceError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                SourceError::new(
                    FailureKind::NotFound,
                    format!("{} not found", self.path.display()),
                )
            } else {
                SourceError::new(
                    FailureKind::Io,
                    format!("could not read {}: {err}", self.path.display()),
                )
            }
        })?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(SourceError::new(
                FailureKind::TooLarge {
                    max_bytes: self.max_bytes,
                    actual: Some(bytes.len() as u64),
                },
                format!("{} is too large", self.path.display()),
            ));
        }
        decode_source(&bytes, None)
            .map(|decoded| decoded.text)
            .map_err(|err| SourceError::new(FailureKind::Decode, err.to_string()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fetches the script over HTTP, appending a timestamp so no cache answers.
#[derive(Debug, Clone)]
pub struct HttpCodeSource {
    url: Url,
    settings: SourceSettings,
    client: reqwest::Client,
}

impl HttpCodeSource {
    pub fn new(url: &str, settings: SourceSettings) -> Result<Self, SourceError> {
        let url = Url::parse(url)
            .map_err(|err| SourceError::new(FailureKind::InvalidLocation, err.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SourceError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            url,
            settings,
            client,
        })
    }

    /// The source URL with a fresh cache-busting parameter.
    pub fn busted_url(&self) -> Url {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair(&self.settings.cache_param, &stamp.to_string());
        url
    }
}

#[async_trait::async_trait]
impl CodeSource for HttpCodeSource {
    async fn load(&self) -> Result<String, SourceError> {
        let response = self
            .client
            .get(self.busted_url())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{} not found ({status})", self.url),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(len) = response.content_length().filter(|len| *len > max_bytes) {
            return Err(SourceError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(len),
                },
                "script too large",
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(SourceError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "script too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        decode_source(&bytes, content_type.as_deref())
            .map(|decoded| decoded.text)
            .map_err(|err| SourceError::new(FailureKind::Decode, err.to_string()))
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Picks an HTTP source for `http(s)://` locations and a file source otherwise.
pub fn source_for(
    location: &str,
    settings: SourceSettings,
) -> Result<Arc<dyn CodeSource>, SourceError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Arc::new(HttpCodeSource::new(location, settings)?))
    } else {
        Ok(Arc::new(FileCodeSource::new(location, &settings)))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        return SourceError::new(FailureKind::Timeout, err.to_string());
    }
    SourceError::new(FailureKind::Network, err.to_string())
}
