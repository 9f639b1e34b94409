//! Fixed-interval collection scheduler with reconnect backoff.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::snapshot::SnapshotAssembler;
use crate::transport::CollectorClient;

/// Bounded exponential backoff state for reconnect attempts.
///
/// Delay doubles per failed attempt up to `max` and resets to `initial`
/// after a successful send.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Current delay; advances the state for the next failure.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Drives collection cycles at a fixed interval.
///
/// Each tick assembles a snapshot and attempts one send. Transport
/// failures drop that cycle's snapshot (nothing is queued), schedule a
/// reconnect after the current backoff delay, and never terminate the
/// loop; only the shutdown signal does.
pub struct Scheduler {
    interval: Duration,
    assembler: SnapshotAssembler,
    client: CollectorClient,
    backoff: Backoff,
}

impl Scheduler {
    pub fn new(config: AgentConfig) -> Self {
        let backoff = Backoff::new(
            Duration::from_secs(config.collector.backoff_initial_secs),
            Duration::from_secs(config.collector.backoff_max_secs),
        );
        Self {
            interval: Duration::from_secs(config.probe.interval_secs),
            assembler: SnapshotAssembler::new(config.probe),
            client: CollectorClient::new(config.collector.url),
            backoff,
        }
    }

    /// Run until the shutdown channel flips. An in-flight cycle finishes
    /// before the loop observes shutdown; the connection is closed on the
    /// way out.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_secs = self.interval.as_secs(), "scheduler started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("shutdown signal received");
                    break;
                }
                _ = ticker.tick() => {
                    if self.cycle(&mut shutdown).await {
                        break;
                    }
                }
            }
        }

        self.client.close().await;
        info!("scheduler stopped");
    }

    /// One collection cycle. Returns `true` when shutdown was observed
    /// while waiting out a backoff delay.
    async fn cycle(&mut self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let snapshot = self.assembler.assemble().await;

        if !self.client.is_connected() && self.client.connect().await.is_err() {
            warn!("collector unreachable, snapshot dropped");
            return self.wait_backoff(shutdown).await;
        }

        match self.client.send(&snapshot).await {
            Ok(()) => {
                self.backoff.reset();
                debug!("snapshot delivered");
                false
            }
            Err(e) => {
                warn!(error = %e, "send failed, snapshot dropped");
                if self.wait_backoff(shutdown).await {
                    return true;
                }
                // Reconnect before the next tick so the next cycle can
                // send immediately. The backoff only resets once a send
                // succeeds; a collector that accepts handshakes but drops
                // every write must not pin the delay at its initial value.
                let _ = self.client.connect().await;
                false
            }
        }
    }

    /// Sleep out the current backoff delay, staying responsive to
    /// shutdown. Returns `true` if shutdown fired.
    async fn wait_backoff(&mut self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let delay = self.backoff.next_delay();
        debug!(delay_secs = delay.as_secs(), "backing off before reconnect");
        tokio::select! {
            _ = shutdown.changed() => true,
            _ = tokio::time::sleep(delay) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_up_to_max() {
        let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(8));
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(4));
        assert_eq!(backoff.next_delay(), Duration::from_secs(8));
        assert_eq!(backoff.next_delay(), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_reset() {
        let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(8));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    }

    fn quiet_config(url: String) -> crate::config::AgentConfig {
        use crate::config::{AgentConfig, CollectorConfig, EnabledProbes, ProbeConfig};

        AgentConfig {
            collector: CollectorConfig {
                url,
                backoff_initial_secs: 1,
                backoff_max_secs: 64,
            },
            probe: ProbeConfig {
                interval_secs: 3600,
                enable: EnabledProbes {
                    hardware: false,
                    os: false,
                    firewall: false,
                    disk: false,
                    network: false,
                    battery: false,
                    bluetooth: false,
                    ssh: false,
                    port_scan: false,
                },
                ..ProbeConfig::default()
            },
            logging: Default::default(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_grows_when_collector_drops_every_write() {
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Collector accepts every handshake, then drops the connection.
        tokio::spawn(async move {
            loop {
                let (tcp, _) = listener.accept().await.unwrap();
                if let Ok(ws) = tokio_tungstenite::accept_async(tcp).await {
                    drop(ws);
                }
            }
        });

        let (_tx, mut shutdown) = watch::channel(false);
        let mut scheduler = Scheduler::new(quiet_config(format!("ws://{addr}/serverws")));

        // A write only fails once the dropped connection is observed,
        // which can take a cycle or two. Once one does, the delay must
        // stay grown across the reconnect instead of snapping back.
        let mut grew = false;
        for _ in 0..10 {
            scheduler.cycle(&mut shutdown).await;
            if scheduler.backoff.current > scheduler.backoff.initial {
                grew = true;
                break;
            }
        }
        assert!(grew, "backoff never grew past its initial delay");
    }

    #[tokio::test]
    async fn test_scheduler_stops_on_shutdown() {
        // Nothing listens on port 9; every cycle takes the backoff path.
        let config = quiet_config("ws://127.0.0.1:9/serverws".to_string());

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(Scheduler::new(config).run(rx));

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .expect("scheduler did not stop on shutdown")
            .unwrap();
    }
}
