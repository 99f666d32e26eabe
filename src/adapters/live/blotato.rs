//! Live publish transport for the Blotato API.

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Client;

use crate::error::TransportError;
use crate::gateway::{AuthHeader, PostPayload};
use crate::ports::publisher::{PostTransport, SendFuture};
use crate::ports::TransportResponse;

/// Posts payloads to `{base_url}/posts`.
///
/// Retries belong to the gateway; this performs one request and reports
/// what came back.
pub struct BlotatoTransport {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl BlotatoTransport {
    /// Create a transport for the given API base URL.
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let endpoint = format!("{}/posts", base_url.trim_end_matches('/'));
        Self { client: Client::new(), endpoint, timeout }
    }
}

impl PostTransport for BlotatoTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn send(&self, payload: &PostPayload, auth: &AuthHeader) -> SendFuture<'_> {
        let payload = payload.clone();
        let header = auth_header_value(auth);
        Box::pin(async move {
            let (name, value) = header?;
            let response = self
                .client
                .post(&self.endpoint)
                .header(name, value)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(transport_error)?;
            Ok(TransportResponse { status, body })
        })
    }
}

/// Build the credential header, marked sensitive so it never shows up in
/// reqwest's debug output.
fn auth_header_value(auth: &AuthHeader) -> Result<(HeaderName, HeaderValue), TransportError> {
    let name = HeaderName::from_static(auth.name());
    let mut value = HeaderValue::from_str(auth.value()).map_err(|_| {
        TransportError::Network("API key contains characters not allowed in a header".into())
    })?;
    value.set_sensitive(true);
    Ok((name, value))
}

fn transport_error(e: reqwest::Error) -> TransportError {
    TransportError::Network(e.without_url().to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::gateway::{credential_header, Credentials};
    use crate::params::{ApiVersion, Platform};

    fn creds() -> Credentials {
        Credentials::new("blt-key", "acc-9").unwrap()
    }

    #[tokio::test]
    async fn posts_payload_with_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/posts"))
            .and(header("authorization", "Bearer blt-key"))
            .and(body_json(json!({
                "post": {
                    "accountId": "acc-9",
                    "content": {"text": "hello", "platform": "bluesky", "mediaUrls": []},
                    "target": {"targetType": "bluesky"}
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"postSubmissionId":"s1"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let transport =
            BlotatoTransport::new(&format!("{}/v2/", server.uri()), Duration::from_secs(5));
        assert_eq!(transport.endpoint(), format!("{}/v2/posts", server.uri()));
        let payload = PostPayload::new("acc-9", "hello", Platform::Bluesky, vec![]);
        let response =
            transport.send(&payload, &credential_header(ApiVersion::V2, &creds())).await.unwrap();
        assert_eq!(response.status, 201);
        assert!(response.body.contains("s1"));
    }

    #[tokio::test]
    async fn v1_uses_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("blotato-api-key", "blt-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = BlotatoTransport::new(&server.uri(), Duration::from_secs(5));
        let payload = PostPayload::new("acc-9", "hi", Platform::Twitter, vec![]);
        let response =
            transport.send(&payload, &credential_header(ApiVersion::V1, &creds())).await.unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn error_statuses_are_responses_not_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let transport = BlotatoTransport::new(&server.uri(), Duration::from_secs(5));
        let payload = PostPayload::new("acc-9", "hi", Platform::Twitter, vec![]);
        let response =
            transport.send(&payload, &credential_header(ApiVersion::V2, &creds())).await.unwrap();
        assert_eq!(response, TransportResponse { status: 503, body: "overloaded".into() });
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let transport = BlotatoTransport::new("http://127.0.0.1:1", Duration::from_secs(5));
        let payload = PostPayload::new("acc-9", "hi", Platform::Twitter, vec![]);
        let err = transport
            .send(&payload, &credential_header(ApiVersion::V2, &creds()))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }

    #[test]
    fn header_is_sensitive() {
        let header = credential_header(ApiVersion::V2, &creds());
        let (name, value) = auth_header_value(&header).unwrap();
        assert_eq!(name.as_str(), "authorization");
        assert!(value.is_sensitive());
        assert!(!format!("{value:?}").contains("blt-key"));
    }
}
