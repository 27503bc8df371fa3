//! Test doubles for every collaborator seam.
//!
//! - [`StaticSource`] - Returns a canned observation or failure
//! - [`ScriptedProvider`] - Records sends, fails or panics for chosen addresses, can hold sends at a gate
//! - [`StaticResolver`] - Returns a fixed recipient list or a lookup failure
//! - [`MemoryAssessmentStore`] / [`MemoryAlertLog`] - In-process stores

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::time::sleep;

use crate::alert::AlertLogEntry;
use crate::error::{ResolveError, SourceUnavailable, StoreError};
use crate::observation::{Observation, SourceKind};
use crate::recipient::{Channel, ChannelProvider, DeliveryResult, Recipient, RecipientResolver};
use crate::risk::RiskAssessment;
use crate::source::{FetchTarget, SourceAdapter};
use crate::store::{AlertLog, AssessmentStore};
use crate::RegionId;

/// A source adapter that always returns the same outcome.
pub struct StaticSource {
    kind: SourceKind,
    outcome: Result<Observation, String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn returning(observation: Observation) -> Self {
        Self {
            kind: observation.source,
            outcome: Ok(observation),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(kind: SourceKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            outcome: Err(reason.into()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer only after `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for StaticSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, _target: &FetchTarget) -> Result<Observation, SourceUnavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.outcome
            .clone()
            .map_err(|reason| SourceUnavailable::new(self.kind, reason))
    }
}

/// A channel provider that records every send.
pub struct ScriptedProvider {
    channel: Channel,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    delay: Duration,
    gate: Option<Arc<Semaphore>>,
    sent: Mutex<Vec<(String, String)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            failing: HashSet::new(),
            panicking: HashSet::new(),
            delay: Duration::ZERO,
            gate: None,
            sent: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Report a failure for this address.
    pub fn fail_for(mut self, address: impl Into<String>) -> Self {
        self.failing.insert(address.into());
        self
    }

    /// Panic when sending to this address.
    pub fn panic_for(mut self, address: impl Into<String>) -> Self {
        self.panicking.insert(address.into());
        self
    }

    /// Hold every send for `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Each send takes one permit from `gate` before completing.
    ///
    /// A send is recorded in [`sent`](Self::sent) before it waits, so tests
    /// can tell which sends are in flight and release them with
    /// [`Semaphore::add_permits`].
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Every (address, message) pair sent so far, successful or not.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Highest number of sends observed running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelProvider for ScriptedProvider {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(&self, address: &str, message: &str) -> DeliveryResult {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Ok(mut sent) = self.sent.lock() {
            sent.push((address.to_string(), message.to_string()));
        }
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.contains(address) {
            panic!("scripted provider panic for {}", address);
        }
        if self.failing.contains(address) {
            return DeliveryResult::failed(format!("scripted failure for {}", address));
        }
        DeliveryResult::Sent
    }
}

/// A resolver with a fixed answer.
pub struct StaticResolver {
    outcome: Result<Vec<Recipient>, String>,
}

impl StaticResolver {
    pub fn new(recipients: Vec<Recipient>) -> Self {
        Self {
            outcome: Ok(recipients),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
        }
    }
}

#[async_trait]
impl RecipientResolver for StaticResolver {
    async fn resolve(&self, region_id: RegionId) -> Result<Vec<Recipient>, ResolveError> {
        match &self.outcome {
            Ok(recipients) => Ok(recipients
                .iter()
                .filter(|r| r.region_id == region_id)
                .cloned()
                .collect()),
            Err(reason) => Err(ResolveError(reason.clone())),
        }
    }
}

type RegionHistory = Arc<Mutex<Vec<(i64, RiskAssessment)>>>;

/// In-process assessment store.
///
/// Each region has its own lock, so writers for distinct regions only share
/// the brief map lookup.
#[derive(Default)]
pub struct MemoryAssessmentStore {
    next_id: AtomicI64,
    regions: RwLock<HashMap<RegionId, RegionHistory>>,
}

impl MemoryAssessmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn history(&self, region_id: RegionId) -> Result<RegionHistory, StoreError> {
        if let Some(history) = self
            .regions
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?
            .get(&region_id)
        {
            return Ok(history.clone());
        }

        let mut regions = self
            .regions
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(regions.entry(region_id).or_default().clone())
    }

    /// Every stored assessment for a region, oldest first.
    pub fn all_for(&self, region_id: RegionId) -> Vec<RiskAssessment> {
        let Ok(history) = self.history(region_id) else {
            return Vec::new();
        };
        let entries = match history.lock() {
            Ok(entries) => entries.iter().map(|(_, a)| a.clone()).collect(),
            Err(_) => Vec::new(),
        };
        entries
    }
}

#[async_trait]
impl AssessmentStore for MemoryAssessmentStore {
    async fn store(&self, assessment: &RiskAssessment) -> Result<i64, StoreError> {
        let history = self.history(assessment.region_id)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        history
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?
            .push((id, assessment.clone()));
        Ok(id)
    }

    async fn latest_for(&self, region_id: RegionId) -> Result<Option<RiskAssessment>, StoreError> {
        let history = self.history(region_id)?;
        let history = history
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        let latest = history
            .iter()
            .max_by_key(|(id, a)| (a.computed_at, *id))
            .map(|(_, a)| a.clone());
        Ok(latest)
    }
}

/// In-process alert log.
#[derive(Default)]
pub struct MemoryAlertLog {
    entries: Mutex<Vec<AlertLogEntry>>,
}

impl MemoryAlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AlertLogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AlertLog for MemoryAlertLog {
    async fn append(&self, entry: &AlertLogEntry) -> Result<i64, StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        entries.push(entry.clone());
        Ok(entries.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn assessment(region_id: RegionId, score: u8, minutes: i64) -> RiskAssessment {
        let computed_at =
            Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap() + ChronoDuration::minutes(minutes);
        RiskAssessment {
            region_id,
            risk_score: score,
            risk_level: RiskLevel::from_score(score),
            factors: Vec::new(),
            computed_at,
            valid_until: computed_at + ChronoDuration::hours(24),
            inputs: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_latest_is_by_timestamp() {
        let store = MemoryAssessmentStore::new();
        store.store(&assessment(1, 40, 10)).await.unwrap();
        store.store(&assessment(1, 20, 5)).await.unwrap();
        store.store(&assessment(2, 90, 60)).await.unwrap();

        let latest = store.latest_for(1).await.unwrap().unwrap();
        assert_eq!(latest.risk_score, 40);
        assert!(store.latest_for(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_ids_are_unique_under_concurrency() {
        let store = Arc::new(MemoryAssessmentStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.store(&assessment(i % 4, 10, i)).await.unwrap()
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 32);
    }

    #[tokio::test]
    async fn test_gated_provider_holds_sends_until_released() {
        let gate = Arc::new(Semaphore::new(0));
        let provider = Arc::new(ScriptedProvider::new(Channel::Sms).gated(gate.clone()));

        let send = {
            let provider = provider.clone();
            tokio::spawn(async move { provider.send("+1", "hi").await })
        };
        while provider.sent().is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(!send.is_finished());

        gate.add_permits(1);
        assert_eq!(send.await.unwrap(), DeliveryResult::Sent);
    }

    #[tokio::test]
    async fn test_static_resolver_filters_by_region() {
        let resolver = StaticResolver::new(vec![
            Recipient::new(1, "+1", 10, [Channel::Sms]),
            Recipient::new(2, "+2", 11, [Channel::Sms]),
        ]);
        let found = resolver.resolve(10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }
}
