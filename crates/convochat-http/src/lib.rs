//! # ConvoChat HTTP
//!
//! Default [`Transport`] for the ConvoChat client, built on `reqwest`.
//!
//! The request body is always JSON, for every verb, and the configured
//! timeout applies per call. Any HTTP status is handed back to the client:
//! the vendor reports application errors inside the JSON body.

use async_trait::async_trait;
use convochat_core::{HttpRequest, HttpResponse, Method, Transport, TransportFailure};
use tracing::debug;

/// reqwest-backed transport.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client (proxy settings, custom TLS roots...).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn failure(err: reqwest::Error) -> TransportFailure {
    let message = if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };
    TransportFailure {
        message,
        code: err.status().map(|s| s.as_u16()),
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut builder = self
            .http
            .request(to_reqwest(request.method), &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let res = builder.json(&request.body).send().await.map_err(failure)?;
        let status = res.status().as_u16();
        let body = res.text().await.map_err(failure)?;

        debug!(status, url = %request.url, "ConvoChat response received");

        Ok(HttpResponse { status, body })
    }
}
