//! End-to-end tests driving the governor over the in-memory transport.

use ringfence::prelude::*;
use std::sync::{Arc, Mutex};

fn record(sender: &str, receiver: &str, amount: f64, ts: &str) -> LedgerRecord {
    LedgerRecord {
        sender_id: sender.into(),
        receiver_id: receiver.into(),
        amount: amount.to_string(),
        kind: "TRANSFER".into(),
        timestamp: ts.into(),
    }
}

struct Harness {
    governor: Governor,
    feed: Arc<MemoryLedger>,
    alerts: Arc<MemoryAlertLog>,
    banned: Arc<Mutex<Vec<String>>>,
}

fn harness(config: GovernorConfig) -> Harness {
    let feed = Arc::new(MemoryLedger::new());
    let alerts = Arc::new(MemoryAlertLog::new());
    let banned = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&banned);
    let governor = Governor::new(
        config,
        Arc::clone(&feed) as Arc<dyn LedgerFeed>,
        Arc::clone(&alerts) as Arc<dyn AlertSink>,
        Arc::new(move |account: &str| sink.lock().unwrap().push(account.to_owned())),
    )
    .unwrap();
    Harness {
        governor,
        feed,
        alerts,
        banned,
    }
}

fn fast_config() -> GovernorConfig {
    let mut config = GovernorConfig::default();
    config.loop_.fetch_wait_ms = 5;
    config
}

/// Four accounts relaying large, similar amounts around a ring, with two
/// smaller cross transfers that close the loop early in the filtration.
fn push_laundering_ring(feed: &MemoryLedger) {
    feed.push(record("acc-a", "acc-b", 100_000.0, "2024-03-01 12:00:00"));
    feed.push(record("acc-b", "acc-c", 100_000.0, "2024-03-01 12:00:05"));
    feed.push(record("acc-c", "acc-d", 100_000.0, "2024-03-01 12:00:10"));
    feed.push(record("acc-d", "acc-a", 100_000.0, "2024-03-01 12:00:15"));
    feed.push(record("acc-a", "acc-c", 80_000.0, "2024-03-01 12:00:20"));
    feed.push(record("acc-b", "acc-d", 80_000.0, "2024-03-01 12:00:25"));
}

fn layering_alerts(alerts: &[Alert]) -> Vec<&Alert> {
    alerts
        .iter()
        .filter(|a| a.alert_type == AlertType::Layering)
        .collect()
}

#[tokio::test]
async fn scenario_ring_raises_one_layering_alert_and_bans_all_members() {
    let mut h = harness(fast_config());
    push_laundering_ring(&h.feed);

    let report = h.governor.run_cycle().await;
    assert!(report.analyzed);
    assert_eq!(report.layering, 1);

    let alerts = h.alerts.snapshot();
    let layering = layering_alerts(&alerts);
    assert_eq!(layering.len(), 1);
    assert_eq!(layering[0].count, 1);
    assert_eq!(
        layering[0].details.involved_accounts(),
        vec!["acc-a", "acc-b", "acc-c", "acc-d"]
    );

    for account in ["acc-a", "acc-b", "acc-c", "acc-d"] {
        assert!(h.governor.registry().contains(account));
        assert!(h.banned.lock().unwrap().contains(&account.to_owned()));
    }
}

#[tokio::test]
async fn scenario_dispersed_ring_raises_no_layering_alert() {
    let mut h = harness(fast_config());
    // Same shape, wildly varying amounts.
    h.feed
        .push(record("acc-a", "acc-b", 100_000.0, "2024-03-01 12:00:00"));
    h.feed
        .push(record("acc-b", "acc-c", 5_000.0, "2024-03-01 12:00:05"));
    h.feed
        .push(record("acc-c", "acc-d", 100_000.0, "2024-03-01 12:00:10"));
    h.feed
        .push(record("acc-d", "acc-a", 5_000.0, "2024-03-01 12:00:15"));
    h.feed
        .push(record("acc-a", "acc-c", 50_000.0, "2024-03-01 12:00:20"));
    h.feed
        .push(record("acc-b", "acc-d", 2_500.0, "2024-03-01 12:00:25"));

    let report = h.governor.run_cycle().await;
    assert!(report.analyzed);
    assert_eq!(report.layering, 0);
    assert!(layering_alerts(&h.alerts.snapshot()).is_empty());
}

#[tokio::test]
async fn scenario_hub_dispersal_raises_one_smurfing_alert() {
    let mut h = harness(fast_config());
    for i in 0..9 {
        h.feed.push(record(
            "hub",
            &format!("spoke-{i}"),
            900.0,
            &format!("2024-03-01 12:00:0{i}"),
        ));
    }

    let report = h.governor.run_cycle().await;
    assert!(report.analyzed);
    assert_eq!(report.smurfing, 1);

    let alerts = h.alerts.snapshot();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::Smurfing);
    let involved = alerts[0].details.involved_accounts();
    assert_eq!(involved.len(), 10);
    assert!(involved.contains(&"hub".to_owned()));
    assert_eq!(h.governor.registry().len(), 10);
}

#[tokio::test]
async fn scenario_civilian_noise_raises_nothing() {
    let mut h = harness(fast_config());
    let civilians = ["u-0", "u-1", "u-2", "u-3", "u-4", "u-5"];
    let mut t = 0;
    for (i, sender) in civilians.iter().enumerate() {
        for receiver in civilians.iter().skip(i + 1) {
            let amount = 10.0 + (t as f64) * 2.5;
            h.feed.push(record(
                sender,
                receiver,
                amount,
                &format!("2024-03-01 12:00:{t:02}"),
            ));
            t += 1;
        }
    }

    let report = h.governor.run_cycle().await;
    assert!(report.analyzed);
    assert_eq!(report.layering, 0);
    assert_eq!(report.smurfing, 0);
    assert_eq!(report.structuring, 0);
    assert!(h.alerts.is_empty());
    assert!(h.governor.registry().is_empty());
}

#[tokio::test]
async fn scenario_consumed_cursor_range_never_retriggers() {
    let mut h = harness(fast_config());
    push_laundering_ring(&h.feed);
    h.governor.run_cycle().await;
    let cursor = h.governor.cursor();
    let alerts_before = h.alerts.len();

    let report = h.governor.run_cycle().await;
    assert_eq!(report.fetched, 0);
    assert!(!report.analyzed);
    assert_eq!(h.governor.cursor(), cursor);
    assert_eq!(h.alerts.len(), alerts_before);
}

#[tokio::test]
async fn banned_ring_disappears_from_later_analysis() {
    let mut h = harness(fast_config());
    push_laundering_ring(&h.feed);
    h.governor.run_cycle().await;
    let alerts_before = h.alerts.len();
    assert!(alerts_before >= 1);

    // The ring keeps moving money; a couple of civilians transact too.
    h.feed
        .push(record("acc-a", "acc-b", 100_000.0, "2024-03-01 12:01:00"));
    h.feed
        .push(record("acc-c", "acc-d", 100_000.0, "2024-03-01 12:01:05"));
    h.feed
        .push(record("u-0", "u-1", 20.0, "2024-03-01 12:01:10"));
    h.feed
        .push(record("u-1", "u-2", 20.0, "2024-03-01 12:01:15"));

    let report = h.governor.run_cycle().await;
    assert_eq!(report.fetched, 4);
    // Banned accounts drop out, leaving too few usable entries.
    assert!(!report.analyzed);
    assert_eq!(h.alerts.len(), alerts_before);
}

#[tokio::test]
async fn system_accounts_are_never_banned() {
    let mut config = fast_config();
    config.loop_.system_accounts = vec!["acc-a".into()];
    let mut h = harness(config);
    push_laundering_ring(&h.feed);

    h.governor.run_cycle().await;
    assert!(!h.governor.registry().contains("acc-a"));
    for account in ["acc-b", "acc-c", "acc-d"] {
        assert!(h.governor.registry().contains(account));
    }
}

#[tokio::test]
async fn malformed_feed_records_do_not_poison_a_batch() {
    let mut h = harness(fast_config());
    push_laundering_ring(&h.feed);
    h.feed.push(LedgerRecord {
        sender_id: "junk".into(),
        receiver_id: "junk2".into(),
        amount: "not-money".into(),
        kind: "???".into(),
        timestamp: "whenever".into(),
    });

    let report = h.governor.run_cycle().await;
    assert!(report.analyzed);
    assert_eq!(report.layering, 1);
}

#[tokio::test]
async fn alert_payload_serializes_with_pattern_tags() {
    let mut h = harness(fast_config());
    push_laundering_ring(&h.feed);
    h.governor.run_cycle().await;

    let alerts = h.alerts.snapshot();
    let layering = layering_alerts(&alerts);
    let json = serde_json::to_string(layering[0]).unwrap();
    assert!(json.contains("\"type\":\"Layering\""));
    assert!(json.contains("\"pattern\":\"Layering\""));
    assert!(json.contains("acc-a"));
}
