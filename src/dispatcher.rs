//! Bounded-concurrency fan-out of proxy tests.

use crate::error::ValidationError;
use crate::tester::Probe;

use log::{info, warn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Proxies that passed validation. Cloning yields another handle to the same set.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    proxies: Arc<Mutex<HashSet<String>>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a passing proxy. Returns `false` if it was already present.
    pub fn insert(&self, proxy: impl Into<String>) -> bool {
        self.proxies.lock().insert(proxy.into())
    }

    pub fn contains(&self, proxy: &str) -> bool {
        self.proxies.lock().contains(proxy)
    }

    pub fn len(&self) -> usize {
        self.proxies.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.lock().is_empty()
    }

    /// Take every proxy out of the set, in no particular order.
    pub fn drain(&self) -> Vec<String> {
        self.proxies.lock().drain().collect()
    }
}

/// Runs a [`Probe`] over many candidates with at most `limit` in flight.
pub struct Dispatcher<P> {
    probe: Arc<P>,
    limit: usize,
}

impl<P: Probe> Dispatcher<P> {
    /// A `limit` of zero is treated as one.
    pub fn new(probe: Arc<P>, limit: usize) -> Self {
        Self {
            probe,
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Test every candidate and wait for all of them.
    ///
    /// A task is only spawned once a permit is free, so no more than `limit`
    /// tests exist at any instant. `report` is called once per finished test.
    pub async fn run<F>(&self, candidates: Vec<String>, report: F) -> ResultSet
    where
        F: Fn(&str, &Result<(), ValidationError>) + Send + Sync + 'static,
    {
        let results = ResultSet::new();
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let report = Arc::new(report);
        let total = candidates.len();

        info!("Testing {} candidates, {} at a time", total, self.limit);

        // Finished tasks are reaped on every admission, so the set tracks
        // `limit` rather than the input size.
        let mut tasks = JoinSet::new();
        for candidate in candidates {
            // The semaphore is never closed, so acquiring only waits for a slot.
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            while let Some(joined) = tasks.try_join_next() {
                log_aborted(joined);
            }

            let probe = Arc::clone(&self.probe);
            let results = results.clone();
            let report = Arc::clone(&report);
            tasks.spawn(async move {
                let outcome = probe.probe(&candidate).await;
                report(&candidate, &outcome);
                if outcome.is_ok() {
                    results.insert(candidate);
                }
                drop(permit);
            });
        }

        while let Some(joined) = tasks.join_next().await {
            log_aborted(joined);
        }

        info!("Finished testing: {}/{} passed", results.len(), total);
        results
    }
}

fn log_aborted(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        warn!("proxy test task aborted: {}", e);
    }
}
