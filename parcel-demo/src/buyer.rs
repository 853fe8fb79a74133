use parcel_order::{
    CancelOrder, Command, CreateOrder, DeliveryScheduler, OrderError, OrderId, ShipOrder,
    SharedStore, UpdateAddress,
};
use tracing::info;

/// Drives orders for one shipping address through the command layer
pub struct Buyer {
    address: String,
    store: SharedStore,
}

impl Buyer {
    pub fn new(address: impl Into<String>, store: SharedStore) -> Self {
        Self {
            address: address.into(),
            store,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Create an order, ship it and hand it to the courier
    pub fn create_and_ship_order(
        &self,
        scheduler: &mut DeliveryScheduler,
    ) -> Result<OrderId, OrderError> {
        let id = CreateOrder::new(self.address.clone(), self.store.clone()).execute()?;
        ShipOrder::new(id, self.store.clone()).execute()?;

        scheduler.schedule(id);
        Ok(id)
    }

    /// Create an order, change its address twice, then give up on it
    pub fn create_change_change_and_cancel_order(&self) -> Result<OrderId, OrderError> {
        let id = CreateOrder::new(self.address.clone(), self.store.clone()).execute()?;
        UpdateAddress::new(id, format!("{} 1", self.address), self.store.clone()).execute()?;
        UpdateAddress::new(id, format!("{} 2", self.address), self.store.clone()).execute()?;
        CancelOrder::new(id, self.store.clone()).execute()?;

        Ok(id)
    }

    /// Exercise undo on update, ship and cancel before finally shipping
    pub fn complex_order_with_undo(
        &self,
        scheduler: &mut DeliveryScheduler,
    ) -> Result<OrderId, OrderError> {
        let id = CreateOrder::new(self.address.clone(), self.store.clone()).execute()?;
        UpdateAddress::new(id, format!("{} - NEW", self.address), self.store.clone()).execute()?;

        let mut update = UpdateAddress::new(id, format!("{} - NEW 2", self.address), self.store.clone());
        update.execute()?;
        update.undo()?;

        let mut ship = ShipOrder::new(id, self.store.clone());
        ship.execute()?;
        ship.undo()?;

        let mut cancel = CancelOrder::new(id, self.store.clone());
        cancel.execute()?;
        cancel.undo()?;

        ShipOrder::new(id, self.store.clone()).execute()?;
        info!(order_id = %id, "Complex order shipped after undo sequence");

        scheduler.schedule(id);
        Ok(id)
    }
}
