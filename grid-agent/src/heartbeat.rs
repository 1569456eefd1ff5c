//! Heartbeat loop
//!
//! Keeps exactly one node record alive on the hub. Registration and
//! heartbeat are the same idempotent call, so a node that went offline
//! recovers on the next successful tick with no handshake.

use async_trait::async_trait;
use grid_client::HubClient;
use grid_core::dto::node::RegisterNode;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Anything a registration can be sent to
#[async_trait]
pub trait Registrar: Send + Sync {
    async fn register(&self, req: &RegisterNode) -> grid_client::Result<()>;
}

#[async_trait]
impl Registrar for HubClient {
    async fn register(&self, req: &RegisterNode) -> grid_client::Result<()> {
        self.register_node(req).await.map(|_| ())
    }
}

/// Periodically re-registers this node with the hub
pub struct HeartbeatAgent<R: Registrar + ?Sized> {
    registrar: Arc<R>,
    registration: RegisterNode,
    interval: Duration,
    initial_retry_delay: Duration,
    max_retry_delay: Duration,
}

impl<R: Registrar + ?Sized> HeartbeatAgent<R> {
    /// Creates an agent sending `registration` every `interval`
    pub fn new(registrar: Arc<R>, registration: RegisterNode, interval: Duration) -> Self {
        Self {
            registrar,
            registration,
            interval,
            initial_retry_delay: INITIAL_RETRY_DELAY,
            max_retry_delay: MAX_RETRY_DELAY,
        }
    }

    /// Overrides the backoff used until the first registration succeeds
    pub fn with_retry_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_retry_delay = initial;
        self.max_retry_delay = max;
        self
    }

    /// Registers, then heartbeats until `shutdown` resolves
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown requested before registration completed");
                return;
            }
            _ = self.register_with_retry() => {}
        }

        info!("Heartbeat loop started (interval: {:?})", self.interval);

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; registration just happened.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => self.beat().await,
            }
        }

        info!("Heartbeat loop stopped");
    }

    /// Sends one heartbeat; failures are left to the next tick
    async fn beat(&self) {
        debug!("Sending heartbeat");

        if let Err(e) = self.registrar.register(&self.registration).await {
            warn!("Failed to send heartbeat: {}", e);
        }
    }

    /// Register with exponential backoff
    ///
    /// The hub may not be up yet when the agent starts (common in container
    /// environments), so this keeps trying until it succeeds.
    async fn register_with_retry(&self) {
        let mut attempt = 0u32;
        let mut delay = self.initial_retry_delay;

        loop {
            attempt += 1;

            match self.registrar.register(&self.registration).await {
                Ok(()) => {
                    info!("Registered with hub after {} attempt(s)", attempt);
                    return;
                }
                Err(e) => {
                    warn!("Failed to register with hub (attempt {}): {}", attempt, e);
                    warn!("Retrying in {:?}...", delay);

                    time::sleep(delay).await;

                    // Exponential backoff with cap
                    delay = (delay * 2).min(self.max_retry_delay);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_client::ClientError;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Records every registration and fails the scripted call numbers
    struct FakeHub {
        calls: Mutex<Vec<RegisterNode>>,
        fail_on: HashSet<usize>,
        stop_after: usize,
        stop: Notify,
    }

    impl FakeHub {
        fn new(fail_on: impl IntoIterator<Item = usize>, stop_after: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail_on: fail_on.into_iter().collect(),
                stop_after,
                stop: Notify::new(),
            })
        }

        fn calls(&self) -> Vec<RegisterNode> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Registrar for FakeHub {
        async fn register(&self, req: &RegisterNode) -> grid_client::Result<()> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(req.clone());
                calls.len()
            };

            if n == self.stop_after {
                self.stop.notify_one();
            }

            if self.fail_on.contains(&n) {
                Err(ClientError::from_status(503, "hub unavailable"))
            } else {
                Ok(())
            }
        }
    }

    fn registration() -> RegisterNode {
        RegisterNode {
            id: Some("n1".to_string()),
            name: Some("worker".to_string()),
            specs: Some(HashMap::from([
                ("cpu".to_string(), "4 vCPU".into()),
                ("ram".to_string(), "8GB".into()),
            ])),
        }
    }

    fn agent(hub: &Arc<FakeHub>) -> HeartbeatAgent<FakeHub> {
        HeartbeatAgent::new(Arc::clone(hub), registration(), Duration::from_millis(5))
            .with_retry_delays(Duration::from_millis(1), Duration::from_millis(4))
    }

    #[tokio::test]
    async fn test_retries_registration_then_heartbeats() {
        let hub = FakeHub::new([1, 2, 3], 6);

        agent(&hub).run(hub.stop.notified()).await;

        let calls = hub.calls();
        assert_eq!(calls.len(), 6);
        for call in &calls {
            assert_eq!(call.id.as_deref(), Some("n1"));
            assert_eq!(call.specs, registration().specs);
        }
    }

    #[tokio::test]
    async fn test_heartbeat_failures_do_not_stop_loop() {
        let hub = FakeHub::new([2, 3, 4], 7);

        agent(&hub).run(hub.stop.notified()).await;

        assert_eq!(hub.calls().len(), 7);
    }

    #[tokio::test]
    async fn test_shutdown_while_hub_unreachable() {
        let hub = FakeHub::new(1..=100, 3);

        agent(&hub).run(hub.stop.notified()).await;

        assert_eq!(hub.calls().len(), 3);
    }
}
