use anyhow::Context;
use parcel_core::Config;
use parcel_demo::Buyer;
use parcel_order::{DeliveryScheduler, OrderRecord, OrderStore};
use tokio::task::LocalSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    LocalSet::new().run_until(run(config)).await
}

async fn run(config: Config) -> anyhow::Result<()> {
    let [first, second, third] = config.buyers.as_slice() else {
        anyhow::bail!("Expected exactly three buyers, found {}", config.buyers.len());
    };

    let store = OrderStore::shared();
    let mut scheduler = DeliveryScheduler::new(store.clone(), config.delivery.delay());

    let buyer1 = Buyer::new(first.address.clone(), store.clone());
    let buyer2 = Buyer::new(second.address.clone(), store.clone());
    let buyer3 = Buyer::new(third.address.clone(), store.clone());

    buyer1.create_and_ship_order(&mut scheduler)?;
    buyer2.create_and_ship_order(&mut scheduler)?;
    buyer1.create_and_ship_order(&mut scheduler)?;
    buyer1.create_change_change_and_cancel_order()?;
    buyer3.complex_order_with_undo(&mut scheduler)?;

    tracing::info!("Waiting on {} deliveries", scheduler.pending());
    let failed = scheduler.drain().await.into_iter().filter(Result::is_err).count();
    if failed > 0 {
        tracing::warn!("{} deliveries did not complete", failed);
    }

    let orders: Vec<OrderRecord> = store.borrow().orders().cloned().collect();
    tracing::info!("Final orders: {}", serde_json::to_string_pretty(&orders)?);
    Ok(())
}
