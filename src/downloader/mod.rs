//! Page downloader
//!
//! This module abstracts fetching a URL's raw content behind the
//! [`Downloader`] trait and provides the default HTTP implementation:
//! - reqwest client with user agent and timeouts
//! - any non-success status treated as a fetch error
//! - pooled byte buffers for reading response bodies

mod pool;

pub use pool::BufferPool;

use crate::FetchError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

/// Fetches the raw content behind a URL
///
/// Implementations must return bytes that remain valid after the call; a
/// body backed by transient storage has to be copied out before returning.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Default [`Downloader`] backed by a reqwest client and a buffer pool
///
/// Response bodies are streamed into a pooled buffer and copied into owned
/// [`Bytes`] before the buffer is recycled, so the returned body never
/// aliases pool storage.
#[derive(Debug)]
pub struct HttpDownloader {
    client: Client,
    pool: BufferPool,
}

impl HttpDownloader {
    /// Builds a downloader with the given request timeout and buffer pool
    pub fn new(timeout_secs: u64, pool: BufferPool) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("sitegraph/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, pool })
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        // Client::builder only fails on TLS backend misconfiguration, which
        // the rustls feature rules out at compile time.
        Self::new(2, BufferPool::default()).expect("default HTTP client")
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> Result<Bytes, FetchError> {
        let mut response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|source| FetchError::Request {
                    url: url.to_string(),
                    source,
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut buffer = self.pool.get();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => buffer.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(source) => {
                    self.pool.put(buffer);
                    return Err(FetchError::Request {
                        url: url.to_string(),
                        source,
                    });
                }
            }
        }

        let body = Bytes::copy_from_slice(&buffer);
        self.pool.put(buffer);

        Ok(body)
    }
}
