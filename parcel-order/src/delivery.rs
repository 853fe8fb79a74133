use crate::commands::{Command, DeliverOrder};
use crate::manager::{OrderError, SharedStore};
use crate::models::OrderId;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{error, info};

/// Runs deliveries after a fixed delay.
///
/// Tasks are spawned with `spawn_local`, so the scheduler must be used from
/// inside a `tokio::task::LocalSet`. Once scheduled a delivery always fires;
/// its outcome is collected by [`DeliveryScheduler::drain`].
pub struct DeliveryScheduler {
    store: SharedStore,
    delay: Duration,
    pending: JoinSet<Result<OrderId, OrderError>>,
}

impl DeliveryScheduler {
    pub fn new(store: SharedStore, delay: Duration) -> Self {
        Self {
            store,
            delay,
            pending: JoinSet::new(),
        }
    }

    /// Queue a delivery for the given order
    pub fn schedule(&mut self, order_id: OrderId) {
        let store = self.store.clone();
        let delay = self.delay;

        info!(order_id = %order_id, delay = ?delay, "Scheduling delivery");
        self.pending.spawn_local(async move {
            sleep(delay).await;
            DeliverOrder::new(order_id, store).execute()
        });
    }

    /// Number of deliveries not yet collected
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Wait for every scheduled delivery and collect the outcomes in completion order
    pub async fn drain(&mut self) -> Vec<Result<OrderId, OrderError>> {
        let mut outcomes = Vec::with_capacity(self.pending.len());

        while let Some(joined) = self.pending.join_next().await {
            match joined {
                Ok(outcome) => {
                    if let Err(e) = &outcome {
                        error!("Delivery failed: {}", e);
                    }
                    outcomes.push(outcome);
                }
                Err(e) => error!("Delivery task aborted: {}", e),
            }
        }

        outcomes
    }
}
