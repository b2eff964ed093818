use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::market_data::client::MarketApi;
use crate::market_data::types::MarketSnapshot;

/// Events the polling task emits to the UI task.
#[derive(Debug)]
pub enum MarketEvent {
    /// A fetch succeeded; the snapshot fully supersedes the previous one.
    Snapshot(MarketSnapshot),
    /// The first fetch of this poller's lifetime failed. Terminal for the
    /// data path until the user retries (which spawns a fresh poller).
    InitialFetchFailed(String),
    /// A periodic refresh failed. The last good snapshot stays valid; the
    /// UI marks it stale until the next success.
    RefreshFailed(String),
}

/// Spawn the background refresh task: one immediate fetch, then one fetch
/// per `interval` tick, forever. The returned handle is the only way to
/// stop it — the caller aborts it on teardown or retry, so a dead view is
/// never fetched against.
pub fn spawn_poller(
    api: Arc<dyn MarketApi>,
    interval: Duration,
    tx: mpsc::Sender<MarketEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match api.fetch_snapshot().await {
            Ok(snapshot) => {
                if tx.send(MarketEvent::Snapshot(snapshot)).await.is_err() {
                    return;
                }
            }
            Err(err) => {
                warn!(error = %err, "initial market fetch failed");
                if tx
                    .send(MarketEvent::InitialFetchFailed(err.to_string()))
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // interval fires immediately on the first tick; the initial fetch
        // above already covered that.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            debug!("periodic market refresh");
            let event = match api.fetch_snapshot().await {
                Ok(snapshot) => MarketEvent::Snapshot(snapshot),
                Err(err) => {
                    warn!(error = %err, "periodic market refresh failed");
                    MarketEvent::RefreshFailed(err.to_string())
                }
            };
            if tx.send(event).await.is_err() {
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::client::FetchError;
    use crate::market_data::types::{Item, RawNumber};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyApi {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MarketApi for FlakyApi {
        async fn fetch_snapshot(&self) -> Result<MarketSnapshot, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                Err(FetchError::Decode(
                    serde_json::from_str::<MarketSnapshot>("not json").unwrap_err(),
                ))
            } else {
                Ok(MarketSnapshot {
                    gold: vec![Item {
                        name: "Gold Ounce".into(),
                        symbol: "XAUUSD".into(),
                        price: RawNumber::Number(2300.0),
                        unit: "USD".into(),
                        change_percent: RawNumber::Number(0.4),
                        date: "1402-01-01".into(),
                        time: "09:00".into(),
                        description: None,
                    }],
                    ..Default::default()
                })
            }
        }
    }

    #[tokio::test]
    async fn failing_then_succeeding_api_emits_initial_failure_then_snapshot() {
        let (tx, mut rx) = mpsc::channel(8);
        let api = Arc::new(FlakyApi {
            calls: AtomicUsize::new(0),
        });
        let handle = spawn_poller(api, Duration::from_millis(10), tx);

        match rx.recv().await {
            Some(MarketEvent::InitialFetchFailed(_)) => {}
            other => panic!("expected initial failure, got {other:?}"),
        }
        match rx.recv().await {
            Some(MarketEvent::Snapshot(snapshot)) => {
                assert_eq!(snapshot.gold[0].symbol, "XAUUSD");
            }
            other => panic!("expected snapshot, got {other:?}"),
        }

        handle.abort();
    }

    #[tokio::test]
    async fn aborted_poller_stops_emitting() {
        let (tx, mut rx) = mpsc::channel(8);
        let api = Arc::new(FlakyApi {
            calls: AtomicUsize::new(1),
        });
        let handle = spawn_poller(api, Duration::from_millis(10), tx);

        assert!(matches!(rx.recv().await, Some(MarketEvent::Snapshot(_))));
        handle.abort();

        // Once the task is gone the channel drains and closes.
        while let Some(_event) = rx.recv().await {}
    }
}
