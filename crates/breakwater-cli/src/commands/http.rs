//! `breakwater http`: guarded requests against a URL

use std::sync::Arc;

use anyhow::Context;
use breakwater_core::{
    CommandRegistry, GuardError, HttpError, HttpExecutor, HttpMethod, HttpOutcome, RequestSpec,
};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::print_stats;
use crate::args::HttpArgs;

pub async fn run(registry: Arc<CommandRegistry>, args: HttpArgs) -> anyhow::Result<()> {
    let request = build_request(&args)?;
    let executor = HttpExecutor::new(Arc::clone(&registry)).abort_on_deadline(args.abort_on_deadline);

    let ctx = CancellationToken::new();
    let interrupt = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctx.cancel();
            }
        })
    };

    for round in 1..=args.rounds {
        let calls = (0..args.concurrency)
            .map(|_| executor.run_guarded_http(&ctx, &args.command, &request));
        for result in join_all(calls).await {
            report(round, &result);
        }

        if ctx.is_cancelled() {
            warn!("Interrupted, stopping after round {}", round);
            break;
        }
        if round < args.rounds {
            tokio::select! {
                _ = tokio::time::sleep(args.interval) => {}
                _ = ctx.cancelled() => {}
            }
        }
    }

    interrupt.abort();
    print_stats(&registry);
    Ok(())
}

fn build_request(args: &HttpArgs) -> anyhow::Result<RequestSpec> {
    let mut request = RequestSpec::new(&args.url, args.method);
    if let Some(raw) = &args.data {
        if args.method != HttpMethod::Post {
            warn!("--data is only sent with POST requests");
        }
        let data: serde_json::Value =
            serde_json::from_str(raw).context("--data is not valid JSON")?;
        request = request.with_data(data);
    }
    for (name, value) in &args.headers {
        request = request.with_header(name, value);
    }
    if let Some(timeout) = args.timeout {
        request = request.with_timeout(timeout);
    }
    Ok(request)
}

fn report(round: u32, result: &Result<HttpOutcome, GuardError<HttpError>>) {
    match result {
        Ok(outcome) => match outcome.status() {
            Some(status) => info!(round, %status, bytes = outcome.body.len(), "Request succeeded"),
            None => info!(round, "Request succeeded without a response"),
        },
        Err(GuardError::Rejected(rejection)) => warn!(round, "Rejected: {}", rejection),
        Err(GuardError::Failed(err)) => warn!(round, kind = %err.kind(), "Request failed: {}", err),
        Err(err) => warn!(round, "Request failed: {}", err),
    }
}
