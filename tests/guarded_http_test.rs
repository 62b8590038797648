//! Guarded HTTP integration test
//!
//! Drives the HTTP executor through a scripted transport to check the
//! concurrency gate, the deadline race and 5xx classification together.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use breakwater::http::{TransportError, TransportRequest, TransportResponse};
use breakwater::{
    CommandConfig, CommandRegistry, ErrorKind, GuardError, HttpError, HttpExecutor,
    HttpTransport, Rejection, RequestSpec,
};
use reqwest::StatusCode;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Holds every request until released, then answers with a fixed status
struct GatedTransport {
    release: Notify,
    entered: AtomicUsize,
    status: StatusCode,
}

impl GatedTransport {
    fn new(status: StatusCode) -> Arc<Self> {
        Arc::new(Self {
            release: Notify::new(),
            entered: AtomicUsize::new(0),
            status,
        })
    }
}

#[async_trait]
impl HttpTransport for GatedTransport {
    async fn send(
        &self,
        _request: TransportRequest,
    ) -> Result<Option<TransportResponse>, TransportError> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(Some(TransportResponse::new(self.status, "released")))
    }
}

fn registry_with(command: &str, config: CommandConfig) -> Arc<CommandRegistry> {
    let registry = Arc::new(CommandRegistry::new());
    registry.register(command, config).unwrap();
    registry
}

async fn wait_for_entry(transport: &GatedTransport) {
    while transport.entered.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_single_slot_command_admits_one_of_ten() {
    let transport = GatedTransport::new(StatusCode::OK);
    let registry = registry_with("do.get", CommandConfig::new().with_max_concurrency(1));
    let executor = HttpExecutor::with_transport(Arc::clone(&registry), transport.clone());
    let ctx = CancellationToken::new();

    let first = {
        let executor = executor.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            executor
                .run_guarded_http(&ctx, "do.get", &RequestSpec::get("http://backend.test/"))
                .await
        })
    };
    wait_for_entry(&transport).await;

    let mut rejected = 0;
    for _ in 0..9 {
        let result = executor
            .run_guarded_http(&ctx, "do.get", &RequestSpec::get("http://backend.test/"))
            .await;
        if matches!(
            result,
            Err(GuardError::Rejected(Rejection::MaxConcurrency { .. }))
        ) {
            rejected += 1;
        }
    }
    assert_eq!(rejected, 9);

    transport.release.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome.body, "released");
    assert_eq!(transport.entered.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_deadline_returns_before_late_response() {
    let transport = GatedTransport::new(StatusCode::OK);
    let registry = registry_with(
        "do.get",
        CommandConfig::new().with_triggering_error(ErrorKind::Timeout),
    );
    let executor = HttpExecutor::with_transport(Arc::clone(&registry), transport.clone());

    let started = Instant::now();
    let request = RequestSpec::get("http://backend.test/").with_timeout(Duration::from_millis(100));
    let err = executor
        .run_guarded_http(&CancellationToken::new(), "do.get", &request)
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(err.to_string().contains("timeout"));

    // The late answer has nobody left to deliver to.
    transport.release.notify_one();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let stats = registry.breakers().stats("do.get").unwrap();
    assert_eq!(stats.total_calls, 1);
    assert_eq!(stats.total_failures, 1);
}

#[tokio::test]
async fn test_server_fault_counts_only_when_listed() {
    for (config, expected_failures) in [
        (CommandConfig::new(), 0),
        (CommandConfig::new().with_triggering_error("503 Service Unavailable"), 1),
        (CommandConfig::new().with_triggering_error(ErrorKind::ServerFault), 1),
    ] {
        let transport = GatedTransport::new(StatusCode::SERVICE_UNAVAILABLE);
        transport.release.notify_one();
        let registry = registry_with("do.get", config);
        let executor = HttpExecutor::with_transport(Arc::clone(&registry), transport);

        let err = executor
            .run_guarded_http(&CancellationToken::new(), "do.get", &RequestSpec::get("http://x"))
            .await
            .unwrap_err();

        match err {
            GuardError::Failed(HttpError::ServerFault { status, body, .. }) => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "released");
            }
            other => panic!("expected server fault, got {other:?}"),
        }

        let stats = registry.breakers().stats("do.get").unwrap();
        assert_eq!(stats.total_failures, expected_failures);
    }
}
