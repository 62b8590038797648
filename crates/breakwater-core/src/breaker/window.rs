//! Rolling success/failure counts in one-second buckets

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Bucket {
    second: u64,
    successes: u64,
    failures: u64,
}

#[derive(Debug)]
pub(super) struct RollingWindow {
    origin: Instant,
    buckets: VecDeque<Bucket>,
    span_secs: u64,
}

impl RollingWindow {
    pub(super) fn new(span: Duration) -> Self {
        Self {
            origin: Instant::now(),
            buckets: VecDeque::new(),
            span_secs: span.as_secs().max(1),
        }
    }

    pub(super) fn record(&mut self, now: Instant, success: bool) {
        let second = self.second_of(now);
        self.evict(second);

        match self.buckets.back_mut() {
            Some(bucket) if bucket.second == second => {
                if success {
                    bucket.successes += 1;
                } else {
                    bucket.failures += 1;
                }
            }
            _ => self.buckets.push_back(Bucket {
                second,
                successes: u64::from(success),
                failures: u64::from(!success),
            }),
        }
    }

    /// Returns `(successes, failures)` inside the window ending at `now`
    pub(super) fn totals(&mut self, now: Instant) -> (u64, u64) {
        self.evict(self.second_of(now));
        self.buckets.iter().fold((0, 0), |(s, f), bucket| {
            (s + bucket.successes, f + bucket.failures)
        })
    }

    pub(super) fn clear(&mut self) {
        self.buckets.clear();
    }

    fn second_of(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.origin).as_secs()
    }

    fn evict(&mut self, current: u64) {
        while let Some(front) = self.buckets.front() {
            if front.second + self.span_secs <= current {
                self.buckets.pop_front();
            } else {
                break;
            }
        }
    }
}
