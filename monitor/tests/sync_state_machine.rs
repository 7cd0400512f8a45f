//! Sync monitor state machine tests
//!
//! Drives `SyncMonitor::poll_once` against a scripted chain and records
//! every notice and restart request.

mod common;

use common::fixtures::*;
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use monitor::errors::RpcError;
use monitor::health::{SyncMonitor, SyncOutcome, SyncSettings};
use monitor::services::NoticeEvent;

const MAX_RETRIES: u32 = 6;

struct Harness {
    monitor: SyncMonitor,
    chain: Arc<ScriptedChain>,
    notifier: Arc<RecordingNotifier>,
    actuator: Arc<RecordingActuator>,
}

fn harness(chain: ScriptedChain, max_retries: u32) -> Harness {
    let chain = Arc::new(chain);
    let notifier = Arc::new(RecordingNotifier::default());
    let actuator = Arc::new(RecordingActuator::default());
    let monitor = SyncMonitor::new(
        NODE,
        MACHINE,
        chain.clone(),
        notifier.clone(),
        actuator.clone(),
        SyncSettings {
            interval: Duration::from_secs(600),
            max_retries,
            max_block_walk_depth: 8,
        },
    );
    Harness {
        monitor,
        chain,
        notifier,
        actuator,
    }
}

fn script(not_synced_polls: usize, then_synced: bool) -> ScriptedChain {
    let mut states: Vec<Result<_, RpcError>> =
        (0..not_synced_polls).map(|_| Ok(not_synced(100, 40))).collect();
    if then_synced {
        states.push(Ok(synced(100)));
    }
    ScriptedChain::new(states)
}

#[tokio::test]
async fn test_healthy_node_is_silent() {
    let mut h = harness(ScriptedChain::new(vec![Ok(synced(500))]), MAX_RETRIES);

    for _ in 0..3 {
        assert_eq!(h.monitor.poll_once().await, SyncOutcome::Healthy);
    }

    assert_eq!(h.notifier.count(), 0);
    assert_eq!(h.actuator.count(), 0);
    assert_eq!(h.monitor.state().retry_count, 0);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(5)]
#[case(6)]
#[tokio::test]
async fn test_waits_spend_one_retry_each(#[case] polls: u32) {
    let mut h = harness(script(polls as usize, false), MAX_RETRIES);

    for attempt in 1..=polls {
        assert_eq!(h.monitor.poll_once().await, SyncOutcome::Waiting { attempt });
        assert_eq!(h.monitor.state().retry_count, attempt);
    }

    assert!(h.monitor.state().awaiting_auto_recover);
    assert!(!h.monitor.state().restarted);
    assert_eq!(h.actuator.count(), 0);
    assert_eq!(h.notifier.count_of(NoticeEvent::BlockchainNotSynced), polls as usize);
}

#[tokio::test]
async fn test_six_waits_then_synced_recovers_without_restart() {
    let mut h = harness(script(6, true), MAX_RETRIES);

    for _ in 0..6 {
        h.monitor.poll_once().await;
    }
    let outcome = h.monitor.poll_once().await;

    assert_eq!(
        outcome,
        SyncOutcome::Recovered {
            after_restart: false
        }
    );
    assert_eq!(h.notifier.count_of(NoticeEvent::BlockchainNotSynced), 6);
    assert_eq!(h.notifier.count_of(NoticeEvent::BlockchainSynced), 1);
    assert_eq!(h.actuator.count(), 0);

    let state = h.monitor.state();
    assert_eq!(state.retry_count, 0);
    assert!(!state.awaiting_auto_recover);
    assert!(!state.restarted);
}

#[tokio::test]
async fn test_seventh_not_synced_poll_forces_one_restart() {
    let mut h = harness(script(7, false), MAX_RETRIES);

    let mut outcomes = Vec::new();
    for _ in 0..7 {
        outcomes.push(h.monitor.poll_once().await);
    }

    let waiting = outcomes
        .iter()
        .filter(|o| matches!(o, SyncOutcome::Waiting { .. }))
        .count();
    assert_eq!(waiting, 6);
    assert_eq!(outcomes.last(), Some(&SyncOutcome::ForcedRestart));

    assert_eq!(h.notifier.count_of(NoticeEvent::BlockchainNotSynced), 7);
    assert_eq!(h.actuator.count(), 1);
    assert_eq!(h.actuator.calls()[0].0, NODE);

    let state = h.monitor.state();
    assert_eq!(state.retry_count, 0);
    assert!(state.restarted);
}

#[tokio::test]
async fn test_restart_grants_fresh_budget_then_announces_restart_recovery() {
    let mut h = harness(script(8, true), MAX_RETRIES);

    for _ in 0..7 {
        h.monitor.poll_once().await;
    }
    assert_eq!(
        h.monitor.poll_once().await,
        SyncOutcome::Waiting { attempt: 1 }
    );
    assert_eq!(
        h.monitor.poll_once().await,
        SyncOutcome::Recovered {
            after_restart: true
        }
    );

    assert_eq!(h.actuator.count(), 1);
    let last = h.notifier.last().unwrap();
    assert_eq!(last.event, NoticeEvent::BlockchainSynced);
    assert!(last.detail.contains("after restart"));
}

#[tokio::test]
async fn test_transport_failure_restarts_immediately() {
    let chain = ScriptedChain::new(vec![
        Err(transport("get_blockchain_state", "connection refused")),
        Ok(synced(100)),
    ]);
    let mut h = harness(chain, MAX_RETRIES);

    let outcome = h.monitor.poll_once().await;
    assert!(matches!(outcome, SyncOutcome::RpcFailed { .. }));
    assert_eq!(h.actuator.count(), 1);
    assert!(h.monitor.state().restarted);

    let notice = h.notifier.last().unwrap();
    assert_eq!(notice.event, NoticeEvent::StateRpcError);
    assert_eq!(notice.detail, "connection refused");
    assert!(notice.remark.contains(NODE));

    assert_eq!(
        h.monitor.poll_once().await,
        SyncOutcome::Recovered {
            after_restart: true
        }
    );
}

#[tokio::test]
async fn test_unsuccessful_response_is_reported_as_failed() {
    let chain = ScriptedChain::new(vec![Err(RpcError::Rpc {
        endpoint: "get_blockchain_state".to_string(),
        message: "Service not started".to_string(),
    })]);
    let mut h = harness(chain, MAX_RETRIES);

    h.monitor.poll_once().await;

    assert_eq!(h.notifier.count_of(NoticeEvent::StateRpcFailed), 1);
    assert_eq!(h.actuator.count(), 1);
}

#[tokio::test]
async fn test_decode_failure_mid_budget_restarts_and_keeps_count() {
    let chain = ScriptedChain::new(vec![Ok(not_synced(100, 40)), Ok(not_synced(100, 50))]);
    chain.push(Err(RpcError::Decode {
        endpoint: "get_blockchain_state".to_string(),
        reason: "expected value at line 1 column 1".to_string(),
    }));
    chain.push(Ok(not_synced(100, 60)));
    let mut h = harness(chain, MAX_RETRIES);

    h.monitor.poll_once().await;
    h.monitor.poll_once().await;
    assert_eq!(h.monitor.state().retry_count, 2);

    assert!(matches!(
        h.monitor.poll_once().await,
        SyncOutcome::RpcFailed { .. }
    ));
    assert_eq!(h.monitor.state().retry_count, 2);
    assert!(h.monitor.state().restarted);
    assert_eq!(h.actuator.count(), 1);
    assert_eq!(h.notifier.count_of(NoticeEvent::StateRpcError), 1);
    assert!(h.notifier.last().unwrap().detail.starts_with("malformed response"));

    assert_eq!(
        h.monitor.poll_once().await,
        SyncOutcome::Waiting { attempt: 3 }
    );
    assert_eq!(h.actuator.count(), 1);
}

#[tokio::test]
async fn test_synced_poll_clears_partial_budget() {
    let chain = ScriptedChain::new(vec![
        Ok(not_synced(100, 40)),
        Ok(not_synced(100, 60)),
        Ok(synced(100)),
        Ok(not_synced(200, 150)),
    ]);
    let mut h = harness(chain, MAX_RETRIES);

    h.monitor.poll_once().await;
    h.monitor.poll_once().await;
    assert_eq!(h.monitor.state().retry_count, 2);

    h.monitor.poll_once().await;
    assert_eq!(h.monitor.state().retry_count, 0);

    assert_eq!(
        h.monitor.poll_once().await,
        SyncOutcome::Waiting { attempt: 1 }
    );
}

#[tokio::test]
async fn test_waiting_notice_describes_progress() {
    let mut h = harness(script(1, false), MAX_RETRIES);

    h.monitor.poll_once().await;

    let notice = h.notifier.last().unwrap();
    assert_eq!(notice.machine_name, MACHINE);
    assert!(notice.detail.contains("attempt 1/6"));
    assert!(notice.detail.contains("tip height 100, progress height 40"));
    assert!(!notice.detail.contains("unknown"));
}

#[tokio::test]
async fn test_unresolvable_block_time_does_not_stop_the_cycle() {
    // Peak without a timestamp and no block records to walk
    let chain = ScriptedChain::new(vec![Ok(peak_without_timestamp(40, "0xorphan"))]);
    let mut h = harness(chain, MAX_RETRIES);

    assert_eq!(
        h.monitor.poll_once().await,
        SyncOutcome::Waiting { attempt: 1 }
    );
    assert!(h.notifier.last().unwrap().detail.ends_with("latest block time unknown"));
    assert_eq!(h.chain.block_fetches(), 1);
}

#[tokio::test]
async fn test_status_is_published_after_each_poll() {
    let mut h = harness(script(2, false), MAX_RETRIES);
    let status = h.monitor.subscribe();
    assert!(status.borrow().last_check.is_none());

    h.monitor.poll_once().await;
    h.monitor.poll_once().await;

    let current = status.borrow().clone();
    assert_eq!(current.name, NODE);
    assert!(current.last_check.is_some());
    assert_eq!(current.sync_state.unwrap().retry_count, 2);
    assert_eq!(current.sync_outcome, Some(SyncOutcome::Waiting { attempt: 2 }));
}

#[tokio::test]
async fn test_run_stops_on_cancel() {
    let h = harness(ScriptedChain::new(vec![Ok(synced(1))]), MAX_RETRIES);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(h.monitor.run(cancel.clone()));

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("monitor did not stop")
        .unwrap();
}
