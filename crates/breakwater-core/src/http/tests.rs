//! Tests for the guarded HTTP executor

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use futures::future::join_all;
    use parking_lot::Mutex;
    use reqwest::StatusCode;
    use tokio_util::sync::CancellationToken;

    use super::super::error::{ErrorKind, HttpError, TransportError};
    use super::super::executor::HttpExecutor;
    use super::super::request::RequestSpec;
    use super::super::transport::{HttpTransport, TransportRequest, TransportResponse};
    use crate::config::CommandConfig;
    use crate::error::{GuardError, Rejection};
    use crate::policy::CommandRegistry;

    /// Answers every request with the same canned result
    struct CannedTransport {
        result: Result<Option<TransportResponse>, TransportError>,
        requests: Mutex<Vec<TransportRequest>>,
    }

    impl CannedTransport {
        fn new(result: Result<Option<TransportResponse>, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn status(status: StatusCode, body: &str) -> Arc<Self> {
            Self::new(Ok(Some(TransportResponse::new(status, body))))
        }

        fn calls(&self) -> usize {
            self.requests.lock().len()
        }
    }

    #[async_trait]
    impl HttpTransport for CannedTransport {
        async fn send(
            &self,
            request: TransportRequest,
        ) -> Result<Option<TransportResponse>, TransportError> {
            self.requests.lock().push(request);
            self.result.clone()
        }
    }

    /// Completes after a delay and records whether it got that far
    struct SlowTransport {
        delay: Duration,
        completed: AtomicBool,
        started: AtomicUsize,
    }

    impl SlowTransport {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                completed: AtomicBool::new(false),
                started: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for SlowTransport {
        async fn send(
            &self,
            _request: TransportRequest,
        ) -> Result<Option<TransportResponse>, TransportError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.completed.store(true, Ordering::SeqCst);
            Ok(Some(TransportResponse::new(StatusCode::OK, "late")))
        }
    }

    fn executor(
        command: &str,
        config: CommandConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> HttpExecutor {
        let registry = Arc::new(CommandRegistry::new());
        registry.register(command, config).unwrap();
        HttpExecutor::with_transport(registry, transport)
    }

    #[tokio::test]
    async fn test_success_returns_response_and_body() {
        let transport = CannedTransport::status(StatusCode::OK, "hello");
        let executor = executor("do.get", CommandConfig::new(), transport.clone());

        let request = RequestSpec::get("http://backend.test/items").with_header("X-Trace", "1");
        let outcome = executor
            .run_guarded_http(&CancellationToken::new(), "do.get", &request)
            .await
            .unwrap();

        assert_eq!(outcome.status(), Some(StatusCode::OK));
        assert_eq!(outcome.body, "hello");

        let sent = transport.requests.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "http://backend.test/items");
        assert_eq!(sent[0].headers, vec![("X-Trace".to_string(), "1".to_string())]);
    }

    #[tokio::test]
    async fn test_post_sends_json_payload() {
        let transport = CannedTransport::status(StatusCode::CREATED, "{}");
        let executor = executor("do.post", CommandConfig::new(), transport.clone());

        let request = RequestSpec::post("http://backend.test/create")
            .with_data(serde_json::json!({"name": "Faris", "salary": "20000"}));
        executor
            .run_guarded_http(&CancellationToken::new(), "do.post", &request)
            .await
            .unwrap();

        let sent = transport.requests.lock();
        let body: serde_json::Value =
            serde_json::from_slice(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Faris");
    }

    #[tokio::test]
    async fn test_server_fault_is_an_error_with_response() {
        let transport = CannedTransport::status(StatusCode::SERVICE_UNAVAILABLE, "maintenance");
        let executor = executor(
            "do.get",
            CommandConfig::new().with_triggering_error(ErrorKind::ServerFault),
            transport,
        );

        let err = executor
            .run_guarded_http(&CancellationToken::new(), "do.get", &RequestSpec::get("http://x"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Service Unavailable"));
        let http = err.failure().unwrap();
        assert_eq!(http.kind(), ErrorKind::ServerFault);
        assert_eq!(http.outcome().unwrap().body, "maintenance");

        let stats = executor.registry().breakers().stats("do.get").unwrap();
        assert_eq!(stats.total_failures, 1);
    }

    #[tokio::test]
    async fn test_server_fault_follows_trip_policy() {
        let transport = CannedTransport::status(StatusCode::INTERNAL_SERVER_ERROR, "");
        let executor = executor("quiet", CommandConfig::new(), transport);

        let err = executor
            .run_guarded_http(&CancellationToken::new(), "quiet", &RequestSpec::get("http://x"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "500 Internal Server Error");
        let stats = executor.registry().breakers().stats("quiet").unwrap();
        assert_eq!(stats.total_failures, 0);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_server_faults() {
        let transport = CannedTransport::status(StatusCode::NOT_FOUND, "missing");
        let executor = executor("do.get", CommandConfig::new(), transport);

        let outcome = executor
            .run_guarded_http(&CancellationToken::new(), "do.get", &RequestSpec::get("http://x"))
            .await
            .unwrap();
        assert_eq!(outcome.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_deadline_beats_slow_transport() {
        let transport = SlowTransport::new(Duration::from_secs(2));
        let executor = executor(
            "do.get",
            CommandConfig::new().with_triggering_error(ErrorKind::Timeout),
            transport.clone(),
        );

        let started = Instant::now();
        let request = RequestSpec::get("http://x").with_timeout(Duration::from_millis(100));
        let err = executor
            .run_guarded_http(&CancellationToken::new(), "do.get", &request)
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(matches!(
            err,
            GuardError::Failed(HttpError::Timeout { limit }) if limit == Duration::from_millis(100)
        ));
        assert!(!transport.completed.load(Ordering::SeqCst));

        let stats = executor.registry().breakers().stats("do.get").unwrap();
        assert_eq!(stats.total_failures, 1);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_abandoned_call_runs_to_completion() {
        let transport = SlowTransport::new(Duration::from_millis(100));
        let executor = executor("do.get", CommandConfig::new(), transport.clone());

        let request = RequestSpec::get("http://x").with_timeout(Duration::from_millis(10));
        let err = executor
            .run_guarded_http(&CancellationToken::new(), "do.get", &request)
            .await
            .unwrap_err();
        assert_eq!(err.failure().map(HttpError::kind), Some(ErrorKind::Timeout));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(transport.completed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_abort_on_deadline_stops_transport() {
        let transport = SlowTransport::new(Duration::from_millis(100));
        let executor = executor("do.get", CommandConfig::new(), transport.clone())
            .abort_on_deadline(true);

        let request = RequestSpec::get("http://x").with_timeout(Duration::from_millis(10));
        let _ = executor
            .run_guarded_http(&CancellationToken::new(), "do.get", &request)
            .await;

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!transport.completed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_wins_simultaneous_completion() {
        let transport = SlowTransport::new(Duration::from_millis(50));
        let executor = executor("do.get", CommandConfig::new(), transport);

        let request = RequestSpec::get("http://x").with_timeout(Duration::from_millis(50));
        let err = executor
            .run_guarded_http(&CancellationToken::new(), "do.get", &request)
            .await
            .unwrap_err();

        assert_eq!(err.failure().map(HttpError::kind), Some(ErrorKind::Timeout));
    }

    #[tokio::test]
    async fn test_default_timeout_applies() {
        let transport = SlowTransport::new(Duration::from_secs(2));
        let executor = executor("do.get", CommandConfig::new(), transport)
            .with_default_timeout(Duration::from_millis(20));

        let err = executor
            .run_guarded_http(&CancellationToken::new(), "do.get", &RequestSpec::get("http://x"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GuardError::Failed(HttpError::Timeout { limit }) if limit == Duration::from_millis(20)
        ));
    }

    #[tokio::test]
    async fn test_transport_error_is_reported() {
        let transport = CannedTransport::new(Err(TransportError::new("connection refused")));
        let executor = executor(
            "do.get",
            CommandConfig::new().with_triggering_error("connection refused"),
            transport,
        );

        let err = executor
            .run_guarded_http(&CancellationToken::new(), "do.get", &RequestSpec::get("http://x"))
            .await
            .unwrap_err();

        assert_eq!(err.failure().map(HttpError::kind), Some(ErrorKind::Transport));
        let stats = executor.registry().breakers().stats("do.get").unwrap();
        assert_eq!(stats.total_failures, 1);
    }

    #[tokio::test]
    async fn test_missing_response_is_empty_success() {
        let transport = CannedTransport::new(Ok(None));
        let executor = executor("do.get", CommandConfig::new(), transport);

        let outcome = executor
            .run_guarded_http(&CancellationToken::new(), "do.get", &RequestSpec::get("http://x"))
            .await
            .unwrap();

        assert!(outcome.response.is_none());
        assert!(outcome.body.is_empty());
    }

    #[tokio::test]
    async fn test_serialization_failure_skips_network() {
        let transport = CannedTransport::status(StatusCode::OK, "");
        let executor = executor("do.post", CommandConfig::new(), transport.clone());

        let mut data = HashMap::new();
        data.insert(vec![1u8], "non-string key");
        let request = RequestSpec::post("http://x").with_data(data);

        let err = executor
            .run_guarded_http(&CancellationToken::new(), "do.post", &request)
            .await
            .unwrap_err();

        assert_eq!(
            err.failure().map(HttpError::kind),
            Some(ErrorKind::Serialization)
        );
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_caller_cancellation() {
        let transport = SlowTransport::new(Duration::from_secs(2));
        let executor = executor("do.get", CommandConfig::new(), transport.clone());
        let ctx = CancellationToken::new();

        let canceller = {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                ctx.cancel();
            })
        };

        let err = executor
            .run_guarded_http(&ctx, "do.get", &RequestSpec::get("http://x"))
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert_eq!(err.failure().map(HttpError::kind), Some(ErrorKind::Cancelled));
        assert_eq!(transport.started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_context_never_dispatches() {
        let transport = CannedTransport::status(StatusCode::OK, "");
        let executor = executor("do.get", CommandConfig::new(), transport.clone());
        let ctx = CancellationToken::new();
        ctx.cancel();

        let err = executor
            .run_guarded_http(&ctx, "do.get", &RequestSpec::get("http://x"))
            .await
            .unwrap_err();

        assert_eq!(err.failure().map(HttpError::kind), Some(ErrorKind::Cancelled));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_open_breaker_rejects_before_dispatch() {
        let transport = CannedTransport::status(StatusCode::OK, "");
        let executor = executor("do.get", CommandConfig::new(), transport.clone());
        executor.registry().breakers().trip("do.get");

        let err = executor
            .run_guarded_http(&CancellationToken::new(), "do.get", &RequestSpec::get("http://x"))
            .await
            .unwrap_err();

        assert!(err.is_rejection());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_single_slot_command_rejects_concurrent_calls() {
        let transport = SlowTransport::new(Duration::from_millis(200));
        let executor = executor(
            "do.get",
            CommandConfig::new().with_max_concurrency(1),
            transport.clone(),
        );
        let ctx = CancellationToken::new();
        let request = RequestSpec::get("http://x");

        let results = join_all(
            (0..10).map(|_| executor.run_guarded_http(&ctx, "do.get", &request)),
        )
        .await;

        assert!(results[0].is_ok());
        for result in &results[1..] {
            assert!(matches!(
                result,
                Err(GuardError::Rejected(Rejection::MaxConcurrency { limit: 1, .. }))
            ));
        }
        assert_eq!(transport.started.load(Ordering::SeqCst), 1);

        let stats = executor.registry().breakers().stats("do.get").unwrap();
        assert_eq!(stats.total_rejections, 9);
    }
}
