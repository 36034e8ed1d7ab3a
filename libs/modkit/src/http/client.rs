//! Traced HTTP client: every outgoing request gets its own span and a
//! `traceparent` header.

use reqwest::{Method, Request, RequestBuilder, Response};
use tracing::{field::Empty, Instrument, Level};

use crate::http::trace_context;

/// Thin wrapper around [`reqwest::Client`] that traces outgoing calls.
#[derive(Clone, Debug)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Execute a built request under an `outgoing_http` span.
    pub async fn execute(&self, mut req: Request) -> reqwest::Result<Response> {
        let span = tracing::span!(
            Level::INFO,
            "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            http.status_code = Empty,
            otel.kind = "client",
            error = Empty,
        );
        trace_context::inject_trace_context(req.headers_mut(), &span);

        let inner = self.inner.clone();
        async move {
            let result = inner.execute(req).await;
            let current = tracing::Span::current();
            match &result {
                Ok(response) => {
                    current.record("http.status_code", response.status().as_u16());
                    if response.status().is_client_error() || response.status().is_server_error() {
                        current.record("error", true);
                    }
                }
                Err(_) => {
                    current.record("error", true);
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Build and execute a prepared request builder.
    pub async fn send(&self, builder: RequestBuilder) -> reqwest::Result<Response> {
        let req = builder.build()?;
        self.execute(req).await
    }

    pub async fn get(&self, url: &str) -> reqwest::Result<Response> {
        self.send(self.inner.get(url)).await
    }

    /// Start a request builder on the wrapped client; finish with [`Self::send`].
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.inner.request(method, url)
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn injects_traceparent_header() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/ping").header_exists("traceparent");
            then.status(200).body("ok");
        });

        let client = TracedClient::default();
        let resp = client.get(&server.url("/ping")).await.unwrap();

        assert!(resp.status().is_success());
        m.assert();
    }

    #[tokio::test]
    async fn send_keeps_builder_headers_and_body() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/items")
                .header("authorization", "Bearer t")
                .header_exists("traceparent")
                .body("{\"a\":1}");
            then.status(201);
        });

        let client = TracedClient::default();
        let builder = client
            .request(Method::POST, &server.url("/items"))
            .bearer_auth("t")
            .header("content-type", "application/json")
            .body("{\"a\":1}");
        let resp = client.send(builder).await.unwrap();

        assert_eq!(resp.status().as_u16(), 201);
        m.assert();
    }

    #[tokio::test]
    async fn error_statuses_are_returned_not_raised() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let resp = TracedClient::default()
            .get(&server.url("/missing"))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 404);
    }
}
