//! Fan-out of validated identifiers onto republish workers.
//!
//! The [`Dispatcher`] owns one run: every identifier it is given is resolved
//! exactly once, and [`Dispatcher::run`] only returns after the last worker
//! has settled. Workers never report errors upward; the dispatcher just tallies
//! their [`RepublishOutcome`]s into a [`RunSummary`].
//!
//! Each worker runs as its own Tokio task so a panicking worker is contained
//! and counted instead of tearing down the run.

use crate::{
    common::{ContentId, RepublishOutcome, RunSummary},
    worker::Republisher,
};
use core::num::NonZeroUsize;
use std::sync::Arc;
use tokio::{
    sync::{OwnedSemaphorePermit, Semaphore},
    task::{JoinError, JoinSet},
};
use tokio_util::sync::CancellationToken;

/// How workers are scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchMode {
    /// One worker at a time, in input order.
    Sequential,
    /// One task per identifier. `max_in_flight` caps how many run at once;
    /// `None` spawns every identifier immediately.
    Concurrent { max_in_flight: Option<NonZeroUsize> },
}

impl Default for DispatchMode {
    fn default() -> Self {
        Self::Concurrent {
            max_in_flight: None,
        }
    }
}

pub struct Dispatcher {
    republisher: Arc<Republisher>,
    mode: DispatchMode,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub const fn new(
        republisher: Arc<Republisher>,
        mode: DispatchMode,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            republisher,
            mode,
            cancel,
        }
    }

    /// Resolves every identifier and waits for all workers to finish.
    ///
    /// After cancellation, identifiers that have not started are counted as
    /// [`RepublishOutcome::Cancelled`] without touching the network.
    pub async fn run(&self, ids: Vec<ContentId>) -> RunSummary {
        tracing::info!("Dispatching {} identifiers ({:?})", ids.len(), self.mode);

        let summary = match self.mode {
            DispatchMode::Sequential => self.run_sequential(ids).await,
            DispatchMode::Concurrent { max_in_flight } => {
                self.run_concurrent(ids, max_in_flight).await
            }
        };

        tracing::info!("Republish finished: {summary}");
        summary
    }

    async fn run_sequential(&self, ids: Vec<ContentId>) -> RunSummary {
        let mut summary = RunSummary::default();
        for id in ids {
            if self.cancel.is_cancelled() {
                summary.record(&RepublishOutcome::Cancelled);
                continue;
            }
            let result = tokio::spawn(self.worker(id, None)).await;
            record_result(&mut summary, result);
        }
        summary
    }

    async fn run_concurrent(
        &self,
        ids: Vec<ContentId>,
        max_in_flight: Option<NonZeroUsize>,
    ) -> RunSummary {
        let limiter = max_in_flight.map(|n| Arc::new(Semaphore::new(n.get())));
        let mut summary = RunSummary::default();
        let mut workers = JoinSet::new();

        for id in ids {
            let permit = match &limiter {
                Some(limiter) => {
                    let acquired = tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => None,
                        permit = Arc::clone(limiter).acquire_owned() => permit.ok(),
                    };
                    let Some(permit) = acquired else {
                        summary.record(&RepublishOutcome::Cancelled);
                        continue;
                    };
                    Some(permit)
                }
                None if self.cancel.is_cancelled() => {
                    summary.record(&RepublishOutcome::Cancelled);
                    continue;
                }
                None => None,
            };
            workers.spawn(self.worker(id, permit));
        }

        while let Some(result) = workers.join_next().await {
            record_result(&mut summary, result);
        }
        summary
    }

    /// Builds the task body for one identifier. The permit, if any, is held
    /// until the worker settles.
    fn worker(
        &self,
        id: ContentId,
        permit: Option<OwnedSemaphorePermit>,
    ) -> impl Future<Output = RepublishOutcome> + Send + 'static {
        let republisher = Arc::clone(&self.republisher);
        let cancel = self.cancel.clone();
        async move {
            let _permit = permit;
            republisher.republish(&id, &cancel).await
        }
    }
}

fn record_result(summary: &mut RunSummary, result: Result<RepublishOutcome, JoinError>) {
    match result {
        Ok(outcome) => summary.record(&outcome),
        Err(e) => {
            tracing::error!("Republish worker did not complete: {e}");
            summary.panicked += 1;
        }
    }
}
