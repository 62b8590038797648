//! HTTP transport seam

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

use super::error::TransportError;

/// Fully built request handed to a transport
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// Response read in full by a transport
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Issues one HTTP request.
///
/// `Ok(None)` means the call completed without a response; the executor
/// treats that as success with an empty body.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<Option<TransportResponse>, TransportError>;
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<Option<TransportResponse>, TransportError> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = body_or_fault(status, response.text().await)?;

        Ok(Some(TransportResponse {
            status,
            headers,
            body,
        }))
    }
}

/// A 5xx answer stays a server fault even when its body cannot be read
fn body_or_fault<E>(status: StatusCode, body: Result<String, E>) -> Result<String, TransportError>
where
    E: Into<TransportError>,
{
    match body {
        Ok(body) => Ok(body),
        Err(err) if status.is_server_error() => {
            let err: TransportError = err.into();
            tracing::debug!(%status, error = %err, "dropping unreadable server fault body");
            Ok(String::new())
        }
        Err(err) => Err(err.into()),
    }
}
