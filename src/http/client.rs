//! Streaming HTTP downloads.

use anyhow::{Context, Result, bail};
use log::debug;
use reqwest::Client;
use std::io::Write;

use super::status::describe_status_error;

/// Thin wrapper over a configured reqwest [`Client`].
///
/// One attempt per request: a failed download is reported to the caller, not retried.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Streams the body of `url` into the writer returned by `create_writer`.
    ///
    /// The writer is only created once the server answered with a success
    /// status. Returns the number of bytes written, and fails when that count
    /// disagrees with the `Content-Length` the server declared.
    #[tracing::instrument(skip(self, create_writer))]
    pub async fn download_file<W, F>(&self, url: &str, create_writer: F) -> Result<u64>
    where
        W: Write,
        F: FnOnce() -> Result<W>,
    {
        debug!("Downloading file from {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to start download request")?;

        let mut response = response.error_for_status().map_err(describe_status_error)?;
        let expected_len = response.content_length();

        let mut writer = create_writer()?;
        let mut downloaded_bytes: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read chunk from download stream")?
        {
            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            downloaded_bytes += chunk.len() as u64;
        }
        writer.flush().context("Failed to flush downloaded file")?;

        if let Some(expected) = expected_len {
            if expected != downloaded_bytes {
                bail!(
                    "Download of {} was truncated: received {} of {} bytes",
                    url,
                    downloaded_bytes,
                    expected
                );
            }
        }

        debug!(
            "Downloaded {:.2} MB",
            downloaded_bytes as f64 / (1024.0 * 1024.0)
        );

        Ok(downloaded_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpStatusError;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_download_file_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/ggml-base.en.bin")
            .with_status(200)
            .with_body("model bytes")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let mut buffer = Vec::new();
        let bytes = client
            .download_file(&format!("{}/ggml-base.en.bin", url), || Ok(&mut buffer))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, 11);
        assert_eq!(buffer, b"model bytes");
    }

    #[tokio::test]
    async fn test_download_file_follows_redirects() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _redirect = server
            .mock("GET", "/resolve/main/ggml-base.en.bin")
            .with_status(302)
            .with_header("location", &format!("{}/cdn/ggml-base.en.bin", url))
            .create_async()
            .await;
        let target = server
            .mock("GET", "/cdn/ggml-base.en.bin")
            .with_status(200)
            .with_body("redirected")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let mut buffer = Vec::new();
        client
            .download_file(
                &format!("{}/resolve/main/ggml-base.en.bin", url),
                || Ok(&mut buffer),
            )
            .await
            .unwrap();

        target.assert_async().await;
        assert_eq!(buffer, b"redirected");
    }

    #[tokio::test]
    async fn test_download_file_not_found_creates_no_writer() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/missing.bin")
            .with_status(404)
            .create_async()
            .await;

        let writer_created = AtomicBool::new(false);
        let client = HttpClient::new(Client::new());
        let result = client
            .download_file(&format!("{}/missing.bin", url), || {
                writer_created.store(true, Ordering::SeqCst);
                Ok(std::io::sink())
            })
            .await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<HttpStatusError>(),
            Some(&HttpStatusError::NotFound)
        );
        assert!(!writer_created.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_download_file_is_attempted_once() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/flaky.bin")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client
            .download_file(&format!("{}/flaky.bin", url), || Ok(std::io::sink()))
            .await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_download_file_writer_error_propagates() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/file.bin")
            .with_status(200)
            .with_body("content")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client
            .download_file(&format!("{}/file.bin", url), || {
                Err::<std::io::Sink, _>(anyhow::anyhow!("disk full"))
            })
            .await;

        assert!(result.unwrap_err().to_string().contains("disk full"));
    }
}
