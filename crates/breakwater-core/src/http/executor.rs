//! Guarded HTTP executor

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::error::{HttpError, TransportError};
use super::request::{HttpOutcome, RequestSpec, ResponseHead};
use super::transport::{HttpTransport, ReqwestTransport, TransportResponse};
use crate::config::DEFAULT_HTTP_TIMEOUT;
use crate::error::GuardError;
use crate::executor::GuardedExecutor;
use crate::policy::CommandRegistry;

type TransportResult = Result<Option<TransportResponse>, TransportError>;

/// Issues HTTP requests as guarded units of work.
///
/// Each call races the transport against a per-request deadline. Responses
/// with a 5xx status become [`HttpError::ServerFault`], so server-side
/// failures reach the trip policy like transport failures do.
#[derive(Clone)]
pub struct HttpExecutor {
    guarded: GuardedExecutor,
    transport: Arc<dyn HttpTransport>,
    default_timeout: Duration,
    abort_on_deadline: bool,
}

impl HttpExecutor {
    /// Create an executor over a default `reqwest` transport
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self::with_transport(registry, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(registry: Arc<CommandRegistry>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            guarded: GuardedExecutor::new(registry),
            transport,
            default_timeout: DEFAULT_HTTP_TIMEOUT,
            abort_on_deadline: false,
        }
    }

    /// Deadline for requests that carry none
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Abort the in-flight transport task when the deadline or the caller
    /// wins the race, instead of leaving it to finish unobserved
    pub fn abort_on_deadline(mut self, abort: bool) -> Self {
        self.abort_on_deadline = abort;
        self
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        self.guarded.registry()
    }

    /// Run one HTTP request under `command`.
    ///
    /// `ctx` stands in for the caller's context: cancelling it stops the wait
    /// with [`HttpError::Cancelled`].
    ///
    /// A 5xx answer is returned as `GuardError::Failed(HttpError::ServerFault)`;
    /// its status, headers and body stay available through
    /// [`HttpError::outcome`].
    #[instrument(skip(self, ctx, request), fields(method = %request.method, url = %request.url))]
    pub async fn run_guarded_http<B>(
        &self,
        ctx: &CancellationToken,
        command: &str,
        request: &RequestSpec<B>,
    ) -> Result<HttpOutcome, GuardError<HttpError>>
    where
        B: Serialize,
    {
        self.guarded
            .run_guarded(command, || self.dispatch(ctx, request))
            .await
    }

    async fn dispatch<B>(
        &self,
        ctx: &CancellationToken,
        request: &RequestSpec<B>,
    ) -> Result<HttpOutcome, HttpError>
    where
        B: Serialize,
    {
        let limit = request.effective_timeout(self.default_timeout);
        let deadline = tokio::time::sleep(limit);
        tokio::pin!(deadline);

        let transport_request = request.to_transport()?;
        if ctx.is_cancelled() {
            return Err(HttpError::Cancelled);
        }

        let transport = Arc::clone(&self.transport);
        let mut call = tokio::spawn(async move { transport.send(transport_request).await });

        // Deadline is polled first: when it and the transport are both ready,
        // the deadline wins.
        tokio::select! {
            biased;
            _ = &mut deadline => {
                self.leave_in_flight(&call);
                debug!(?limit, "http deadline elapsed before completion");
                Err(HttpError::Timeout { limit })
            }
            _ = ctx.cancelled() => {
                self.leave_in_flight(&call);
                debug!("http request cancelled by caller");
                Err(HttpError::Cancelled)
            }
            joined = &mut call => classify(joined),
        }
    }

    fn leave_in_flight(&self, call: &tokio::task::JoinHandle<TransportResult>) {
        if self.abort_on_deadline {
            call.abort();
        }
    }
}

fn classify(joined: Result<TransportResult, JoinError>) -> Result<HttpOutcome, HttpError> {
    let response = match joined {
        Err(join_error) => return Err(HttpError::Dispatch(join_error.to_string())),
        Ok(Err(transport_error)) => return Err(HttpError::Transport(transport_error)),
        Ok(Ok(None)) => return Ok(HttpOutcome::default()),
        Ok(Ok(Some(response))) => response,
    };

    if response.status.as_u16() >= 500 {
        return Err(HttpError::ServerFault {
            status: response.status,
            headers: response.headers,
            body: response.body,
        });
    }

    Ok(HttpOutcome {
        response: Some(ResponseHead {
            status: response.status,
            headers: response.headers,
        }),
        body: response.body,
    })
}
