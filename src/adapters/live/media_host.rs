//! Live media host: uploads a local file and returns its public URL.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;

use crate::error::{truncate_body, MediaError};
use crate::output::MAX_CARD_BYTES;
use crate::ports::media_host::{MediaHost, UploadFuture};

/// Uploads files as a multipart `image` part to a fixed URL.
pub struct HttpMediaHost {
    client: Client,
    upload_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpMediaHost {
    /// Create a host for `upload_url`, authenticating with `api_key` if set.
    #[must_use]
    pub fn new(upload_url: String, api_key: Option<String>, timeout: Duration) -> Self {
        Self { client: Client::new(), upload_url, api_key, timeout }
    }
}

impl MediaHost for HttpMediaHost {
    fn upload(&self, path: &Path) -> UploadFuture<'_> {
        let path = path.to_path_buf();
        Box::pin(async move {
            let data = std::fs::read(&path)?;
            if data.len() > MAX_CARD_BYTES {
                tracing::warn!(
                    path = %path.display(),
                    bytes = data.len(),
                    "Media file exceeds 5 MiB, platforms may reject it"
                );
            }
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("card.jpg")
                .to_string();
            let part = Part::bytes(data).file_name(file_name).mime_str(mime_for(&path))?;
            let form = Form::new().part("image", part);

            let mut request =
                self.client.post(&self.upload_url).timeout(self.timeout).multipart(form);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }
            let response = request.send().await?;

            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(MediaError::Upload {
                    status: status.as_u16(),
                    message: truncate_body(&body, 500),
                });
            }
            public_url(&body)
                .ok_or_else(|| MediaError::MalformedResponse(truncate_body(&body, 500)))
        })
    }
}

/// Pull the public URL out of `{"url": ..}` or `{"data": {"url": ..}}`.
fn public_url(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("url")
        .or_else(|| value.get("data").and_then(|d| d.get("url")))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn card_file(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("card.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        path
    }

    #[test]
    fn public_url_shapes() {
        assert_eq!(public_url(r#"{"url":"https://cdn/a.jpg"}"#).as_deref(), Some("https://cdn/a.jpg"));
        assert_eq!(
            public_url(r#"{"data":{"url":"https://cdn/b.jpg"}}"#).as_deref(),
            Some("https://cdn/b.jpg")
        );
        assert_eq!(public_url(r#"{"url":""}"#), None);
        assert_eq!(public_url("<html>"), None);
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("a.jpg")), "image/jpeg");
    }

    #[tokio::test]
    async fn uploads_and_returns_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header("authorization", "Bearer m-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"url": "https://cdn.test/c.jpg"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let host = HttpMediaHost::new(
            format!("{}/upload", server.uri()),
            Some("m-key".into()),
            Duration::from_secs(5),
        );
        let url = host.upload(&card_file(dir.path())).await.unwrap();
        assert_eq!(url, "https://cdn.test/c.jpg");
    }

    #[tokio::test]
    async fn rejected_upload_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(413).set_body_string("too large"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let host = HttpMediaHost::new(server.uri(), None, Duration::from_secs(5));
        let err = host.upload(&card_file(dir.path())).await.unwrap_err();
        assert!(matches!(err, MediaError::Upload { status: 413, .. }));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let host = HttpMediaHost::new("http://127.0.0.1:1".into(), None, Duration::from_secs(1));
        let err = host.upload(Path::new("/nonexistent/card.jpg")).await.unwrap_err();
        assert!(matches!(err, MediaError::Io(_)));
    }
}
