//! Concurrent fetch phase.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use flood_core::{FetchTarget, Observation, SourceAdapter, SourceUnavailable};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::config::SourceConfig;

/// Outcome of one fetch phase.
///
/// Both lists follow adapter order. Every adapter lands in exactly one.
#[derive(Debug, Default)]
pub struct Collected {
    pub observations: Vec<Observation>,
    pub unavailable: Vec<SourceUnavailable>,
}

impl Collected {
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

enum Slot {
    Pending,
    Done(Result<Observation, SourceUnavailable>),
}

/// Run every adapter concurrently for `target`.
///
/// Each call is bounded by `config.per_source_timeout`; the phase as a whole
/// by `config.deadline`. Adapters still running at the deadline are
/// abandoned and reported as timed out. A panicking adapter is reported
/// unavailable rather than taking the phase down.
pub async fn collect_observations(
    adapters: &[Arc<dyn SourceAdapter>],
    target: &FetchTarget,
    config: &SourceConfig,
) -> Collected {
    let deadline = Instant::now() + config.deadline;
    let per_source = config.per_source_timeout;

    let mut in_flight: FuturesUnordered<_> = adapters
        .iter()
        .enumerate()
        .map(|(index, adapter)| async move {
            let kind = adapter.kind();
            let call = AssertUnwindSafe(timeout(per_source, adapter.fetch(target))).catch_unwind();
            let outcome = match call.await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(SourceUnavailable::timed_out(kind)),
                Err(_) => Err(SourceUnavailable::new(kind, "adapter panicked")),
            };
            (index, outcome)
        })
        .collect();

    let mut slots: Vec<Slot> = adapters.iter().map(|_| Slot::Pending).collect();

    loop {
        match timeout_at(deadline, in_flight.next()).await {
            Ok(Some((index, outcome))) => {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Slot::Done(outcome);
                }
            }
            Ok(None) => break,
            Err(_) => {
                warn!(
                    region_id = target.region_id,
                    deadline_ms = config.deadline.as_millis() as u64,
                    "Fetch deadline reached with sources outstanding"
                );
                break;
            }
        }
    }

    let mut collected = Collected::default();
    for (adapter, slot) in adapters.iter().zip(slots) {
        match slot {
            Slot::Done(Ok(observation)) => {
                debug!(source = %adapter.kind(), metrics = observation.metrics.len(), "Source answered");
                collected.observations.push(observation);
            }
            Slot::Done(Err(unavailable)) => collected.unavailable.push(unavailable),
            Slot::Pending => collected
                .unavailable
                .push(SourceUnavailable::timed_out(adapter.kind())),
        }
    }

    info!(
        region_id = target.region_id,
        observations = collected.observations.len(),
        unavailable = collected.unavailable.len(),
        "Fetch phase complete"
    );

    collected
}
