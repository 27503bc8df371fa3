//! End-to-end broadcast tests: resolve, dispatch, log.

use std::sync::Arc;
use std::time::Duration;

use broadcaster::{AlertService, DispatchConfig, Dispatcher};
use flood_core::testing::{MemoryAlertLog, ScriptedProvider, StaticResolver};
use flood_core::{BroadcastRequest, Channel, ChannelTally, Recipient, RiskLevel};
use tokio::sync::watch;

fn request(region_id: i64) -> BroadcastRequest {
    BroadcastRequest {
        region_id,
        risk_level: RiskLevel::High,
        message: "Brahmaputra above danger mark. Move to relief camps.".to_string(),
        issued_by: "district-control".to_string(),
    }
}

#[tokio::test]
async fn test_mixed_outcomes_are_reported_and_logged() {
    let sms = Arc::new(ScriptedProvider::new(Channel::Sms).fail_for("+91100"));
    let whatsapp = Arc::new(ScriptedProvider::new(Channel::Whatsapp));
    let log = Arc::new(MemoryAlertLog::new());

    let resolver = StaticResolver::new(vec![
        Recipient::new(1, "+91100", 4, [Channel::Sms]),
        Recipient::new(2, "+91200", 4, [Channel::Sms, Channel::Whatsapp]),
        Recipient::new(3, "+91300", 4, [Channel::Sms, Channel::Whatsapp]).inactive(),
    ]);
    let dispatcher = Dispatcher::new(DispatchConfig::default())
        .with_provider(sms.clone())
        .with_provider(whatsapp.clone());
    let service = AlertService::new(Arc::new(resolver), dispatcher, log.clone());

    let outcome = service.broadcast(request(4)).await.unwrap();
    let report = outcome.report;

    assert_eq!(report.succeeded_count, 1);
    assert_eq!(report.attempted_count, 2);
    assert_eq!(report.per_channel[&Channel::Sms], ChannelTally { attempted: 2, succeeded: 1 });
    assert_eq!(
        report.per_channel[&Channel::Whatsapp],
        ChannelTally { attempted: 1, succeeded: 1 }
    );

    // The inactive recipient was never contacted.
    assert!(sms.sent().iter().all(|(to, _)| to != "+91300"));
    assert!(whatsapp.sent().iter().all(|(to, _)| to != "+91300"));

    let entries = log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].succeeded_count, 1);
    assert_eq!(entries[0].attempted_count, 2);
    assert_eq!(entries[0].risk_level, RiskLevel::High);
    assert_eq!(outcome.log_id, Some(1));
}

#[tokio::test]
async fn test_all_sends_failing_still_returns_report() {
    let sms = Arc::new(ScriptedProvider::new(Channel::Sms).fail_for("+1").fail_for("+2"));
    let log = Arc::new(MemoryAlertLog::new());
    let resolver = StaticResolver::new(vec![
        Recipient::new(1, "+1", 4, [Channel::Sms]),
        Recipient::new(2, "+2", 4, [Channel::Sms]),
    ]);
    let service = AlertService::new(
        Arc::new(resolver),
        Dispatcher::new(DispatchConfig::default()).with_provider(sms),
        log.clone(),
    );

    let report = service.broadcast(request(4)).await.unwrap().report;

    assert_eq!(report.attempted_count, 2);
    assert_eq!(report.succeeded_count, 0);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(log.entries()[0].succeeded_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_lets_in_flight_sends_finish() {
    let sms = Arc::new(ScriptedProvider::new(Channel::Sms).delayed(Duration::from_millis(100)));
    let log = Arc::new(MemoryAlertLog::new());
    let recipients: Vec<Recipient> = (1..=5)
        .map(|i| Recipient::new(i, format!("+{}", i), 4, [Channel::Sms]))
        .collect();
    let service = Arc::new(AlertService::new(
        Arc::new(StaticResolver::new(recipients)),
        Dispatcher::new(DispatchConfig {
            concurrency: 1,
            ..DispatchConfig::default()
        })
        .with_provider(sms.clone()),
        log.clone(),
    ));

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let task = {
        let service = service.clone();
        tokio::spawn(async move { service.broadcast_with_cancel(request(4), cancel_rx).await })
    };

    // Virtual clock: the first send completes at 100ms, the second is in flight at 150ms.
    tokio::time::sleep(Duration::from_millis(150)).await;
    cancel_tx.send(true).unwrap();

    let report = task.await.unwrap().unwrap().report;

    assert!(report.cancelled);
    assert_eq!(report.attempted_count, 2);
    assert_eq!(report.succeeded_count, 2);
    assert_eq!(report.skipped_count, 3);
    assert_eq!(sms.sent().len(), 2);
    assert!(report.failures.is_empty());

    // Cancelled broadcasts are still audited.
    assert_eq!(log.entries().len(), 1);
    assert_eq!(log.entries()[0].succeeded_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_broadcasts_to_different_regions_run_in_parallel() {
    let sms = Arc::new(ScriptedProvider::new(Channel::Sms).delayed(Duration::from_millis(100)));
    let log = Arc::new(MemoryAlertLog::new());
    let resolver = StaticResolver::new(vec![
        Recipient::new(1, "+1", 1, [Channel::Sms]),
        Recipient::new(2, "+2", 2, [Channel::Sms]),
    ]);
    let service = Arc::new(AlertService::new(
        Arc::new(resolver),
        Dispatcher::new(DispatchConfig {
            concurrency: 1,
            ..DispatchConfig::default()
        })
        .with_provider(sms.clone()),
        log.clone(),
    ));

    let started = tokio::time::Instant::now();
    let (a, b) = tokio::join!(service.broadcast(request(1)), service.broadcast(request(2)));
    let elapsed = started.elapsed();

    assert_eq!(a.unwrap().report.succeeded_count, 1);
    assert_eq!(b.unwrap().report.succeeded_count, 1);
    // Each broadcast has its own worker bound, so they overlap.
    assert_eq!(sms.peak_in_flight(), 2);
    assert!(elapsed < Duration::from_millis(200));
    assert_eq!(log.entries().len(), 2);
}
