//! Guarded HTTP request and response types

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use thiserror::Error;

use super::error::HttpError;
use super::transport::TransportRequest;

/// Methods the guarded HTTP executor issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method().as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported http method '{0}', expected GET or POST")]
pub struct UnsupportedMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _ => Err(UnsupportedMethod(s.to_string())),
        }
    }
}

/// One HTTP call to run under a command.
///
/// `data` is serialized to JSON for POST requests and ignored for GET.
///
/// ```
/// use breakwater_core::http::RequestSpec;
/// use std::time::Duration;
///
/// let request = RequestSpec::post("http://localhost:8080/api/v1/create")
///     .with_data(serde_json::json!({ "name": "Faris", "age": "28" }))
///     .with_header("X-Request-Id", "42")
///     .with_timeout(Duration::from_millis(500));
/// assert_eq!(request.effective_timeout(Duration::from_secs(5)), Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct RequestSpec<B = serde_json::Value> {
    pub url: String,
    pub method: HttpMethod,
    pub data: Option<B>,
    /// Sent verbatim, in order
    pub headers: Vec<(String, String)>,
    /// Per-call deadline; the executor default applies when absent
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Get)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Post)
    }

    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            data: None,
            headers: Vec::new(),
            timeout: None,
        }
    }
}

impl<B> RequestSpec<B> {
    /// Attach a payload, changing the payload type
    pub fn with_data<D: Serialize>(self, data: D) -> RequestSpec<D> {
        RequestSpec {
            url: self.url,
            method: self.method,
            data: Some(data),
            headers: self.headers,
            timeout: self.timeout,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn effective_timeout(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}

impl<B: Serialize> RequestSpec<B> {
    /// Build the transport request, encoding the POST payload.
    ///
    /// A payload that fails to encode short-circuits here, before any
    /// network work is started.
    pub(crate) fn to_transport(&self) -> Result<TransportRequest, HttpError> {
        let mut headers = self.headers.clone();
        let body = match (&self.method, &self.data) {
            (HttpMethod::Post, Some(data)) => {
                let bytes = serde_json::to_vec(data)?;
                let has_content_type = headers
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
                if !has_content_type {
                    headers.push((CONTENT_TYPE.as_str().to_string(), "application/json".to_string()));
                }
                Some(bytes)
            }
            _ => None,
        };

        Ok(TransportRequest {
            method: self.method.as_method(),
            url: self.url.clone(),
            headers,
            body,
        })
    }
}

/// Status line and headers of a response
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// Result of a guarded HTTP call.
///
/// `response` is `None` when the transport completed without producing one.
#[derive(Debug, Clone, Default)]
pub struct HttpOutcome {
    pub response: Option<ResponseHead>,
    pub body: String,
}

impl HttpOutcome {
    pub fn status(&self) -> Option<StatusCode> {
        self.response.as_ref().map(|head| head.status)
    }
}
