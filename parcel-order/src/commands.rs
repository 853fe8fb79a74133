//! Reversible commands over a shared [`OrderStore`](crate::OrderStore).
//!
//! Every command performs one store call in `execute` and keeps just enough
//! prior state to reverse that call in `undo`. A snapshot is consumed by a
//! successful undo, so the same command can be executed again afterwards.

use crate::manager::{OrderError, SharedStore};
use crate::models::{OrderId, OrderRecord, OrderStatus};
use tracing::debug;

/// A single reversible action against the order store
pub trait Command {
    /// Apply the action, returning the id of the order it touched
    fn execute(&mut self) -> Result<OrderId, OrderError>;

    /// Reverse the last successful `execute`. Does nothing if there is none.
    fn undo(&mut self) -> Result<(), OrderError>;
}

pub struct CreateOrder {
    address: String,
    store: SharedStore,
    created: Option<OrderId>,
}

impl CreateOrder {
    pub fn new(address: impl Into<String>, store: SharedStore) -> Self {
        Self {
            address: address.into(),
            store,
            created: None,
        }
    }
}

impl Command for CreateOrder {
    fn execute(&mut self) -> Result<OrderId, OrderError> {
        let id = self.store.borrow_mut().create_order(self.address.clone());
        debug!(order_id = %id, "create executed");
        self.created = Some(id);
        Ok(id)
    }

    fn undo(&mut self) -> Result<(), OrderError> {
        let Some(id) = self.created else {
            debug!("create undo skipped, nothing executed");
            return Ok(());
        };
        self.store.borrow_mut().retract(id)?;
        self.created = None;
        debug!(order_id = %id, "create undone");
        Ok(())
    }
}

pub struct ShipOrder {
    id: OrderId,
    store: SharedStore,
    prior_status: Option<OrderStatus>,
}

impl ShipOrder {
    pub fn new(id: OrderId, store: SharedStore) -> Self {
        Self {
            id,
            store,
            prior_status: None,
        }
    }
}

impl Command for ShipOrder {
    fn execute(&mut self) -> Result<OrderId, OrderError> {
        self.prior_status = None;
        let mut store = self.store.borrow_mut();
        let prior = store.order(self.id)?.status;
        store.ship_order(self.id)?;

        debug!(order_id = %self.id, from = %prior, "ship executed");
        self.prior_status = Some(prior);
        Ok(self.id)
    }

    fn undo(&mut self) -> Result<(), OrderError> {
        let Some(prior) = self.prior_status else {
            debug!(order_id = %self.id, "ship undo skipped, nothing executed");
            return Ok(());
        };
        self.store
            .borrow_mut()
            .revert_status(self.id, OrderStatus::Shipped, prior)?;
        self.prior_status = None;
        debug!(order_id = %self.id, to = %prior, "ship undone");
        Ok(())
    }
}

pub struct HaltShipment {
    id: OrderId,
    store: SharedStore,
    prior_status: Option<OrderStatus>,
}

impl HaltShipment {
    pub fn new(id: OrderId, store: SharedStore) -> Self {
        Self {
            id,
            store,
            prior_status: None,
        }
    }
}

impl Command for HaltShipment {
    fn execute(&mut self) -> Result<OrderId, OrderError> {
        self.prior_status = None;
        let mut store = self.store.borrow_mut();
        let prior = store.order(self.id)?.status;
        store.halt_shipment(self.id)?;

        debug!(order_id = %self.id, from = %prior, "halt executed");
        self.prior_status = Some(prior);
        Ok(self.id)
    }

    fn undo(&mut self) -> Result<(), OrderError> {
        let Some(prior) = self.prior_status else {
            debug!(order_id = %self.id, "halt undo skipped, nothing executed");
            return Ok(());
        };
        self.store
            .borrow_mut()
            .revert_status(self.id, OrderStatus::Scheduled, prior)?;
        self.prior_status = None;
        debug!(order_id = %self.id, to = %prior, "halt undone");
        Ok(())
    }
}

pub struct UpdateAddress {
    id: OrderId,
    address: String,
    store: SharedStore,
    prior_address: Option<String>,
}

impl UpdateAddress {
    pub fn new(id: OrderId, address: impl Into<String>, store: SharedStore) -> Self {
        Self {
            id,
            address: address.into(),
            store,
            prior_address: None,
        }
    }
}

impl Command for UpdateAddress {
    fn execute(&mut self) -> Result<OrderId, OrderError> {
        self.prior_address = None;
        let mut store = self.store.borrow_mut();
        let prior = store.order(self.id)?.address.clone();
        store.update_address(self.id, self.address.clone())?;

        debug!(order_id = %self.id, from = %prior, to = %self.address, "update executed");
        self.prior_address = Some(prior);
        Ok(self.id)
    }

    fn undo(&mut self) -> Result<(), OrderError> {
        let Some(prior) = self.prior_address.clone() else {
            debug!(order_id = %self.id, "update undo skipped, nothing executed");
            return Ok(());
        };
        self.store.borrow_mut().revert_address(self.id, prior)?;
        self.prior_address = None;
        debug!(order_id = %self.id, "update undone");
        Ok(())
    }
}

pub struct CancelOrder {
    id: OrderId,
    store: SharedStore,
    removed: Option<OrderRecord>,
}

impl CancelOrder {
    pub fn new(id: OrderId, store: SharedStore) -> Self {
        Self {
            id,
            store,
            removed: None,
        }
    }
}

impl Command for CancelOrder {
    fn execute(&mut self) -> Result<OrderId, OrderError> {
        self.removed = None;
        let removed = self.store.borrow_mut().cancel_order(self.id)?;
        debug!(order_id = %self.id, "cancel executed");
        self.removed = Some(removed);
        Ok(self.id)
    }

    fn undo(&mut self) -> Result<(), OrderError> {
        let Some(record) = self.removed.take() else {
            debug!(order_id = %self.id, "cancel undo skipped, nothing executed");
            return Ok(());
        };
        self.store.borrow_mut().reinstate(record);
        debug!(order_id = %self.id, "cancel undone");
        Ok(())
    }
}

/// Marks a shipped order delivered.
///
/// Delivery captures no snapshot, so `undo` is always a no-op: a delivered
/// order stays delivered.
pub struct DeliverOrder {
    id: OrderId,
    store: SharedStore,
}

impl DeliverOrder {
    pub fn new(id: OrderId, store: SharedStore) -> Self {
        Self { id, store }
    }
}

impl Command for DeliverOrder {
    fn execute(&mut self) -> Result<OrderId, OrderError> {
        self.store.borrow_mut().deliver_order(self.id)?;
        debug!(order_id = %self.id, "deliver executed");
        Ok(self.id)
    }

    fn undo(&mut self) -> Result<(), OrderError> {
        debug!(order_id = %self.id, "deliver cannot be undone");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::OrderStore;
    use crate::models::Transition;

    fn contents(store: &SharedStore) -> Vec<OrderRecord> {
        store.borrow().orders().cloned().collect()
    }

    fn shipped_order(store: &SharedStore) -> OrderId {
        let id = store.borrow_mut().create_order("1234 Main Street");
        store.borrow_mut().ship_order(id).unwrap();
        id
    }

    #[test]
    fn test_create_undo_removes_order() {
        let store = OrderStore::shared();
        let before = contents(&store);

        let mut create = CreateOrder::new("1234 Main Street", store.clone());
        let id = create.execute().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().status, OrderStatus::Scheduled);

        create.undo().unwrap();
        assert_eq!(contents(&store), before);

        // The undone id is not handed out again
        let next = store.borrow_mut().create_order("elsewhere");
        assert!(next > id);
    }

    #[test]
    fn test_ship_undo_restores_status() {
        let store = OrderStore::shared();
        let id = store.borrow_mut().create_order("A");
        let before = contents(&store);

        let mut ship = ShipOrder::new(id, store.clone());
        ship.execute().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().status, OrderStatus::Shipped);

        ship.undo().unwrap();
        assert_eq!(contents(&store), before);
    }

    #[test]
    fn test_halt_undo_restores_status() {
        let store = OrderStore::shared();
        let id = shipped_order(&store);
        let before = contents(&store);

        let mut halt = HaltShipment::new(id, store.clone());
        halt.execute().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().status, OrderStatus::Scheduled);

        halt.undo().unwrap();
        assert_eq!(contents(&store), before);
    }

    #[test]
    fn test_update_snapshots_are_per_execution() {
        let store = OrderStore::shared();
        let id = store.borrow_mut().create_order("A");

        let mut first = UpdateAddress::new(id, "B", store.clone());
        first.execute().unwrap();
        first.undo().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().address, "A");

        first.execute().unwrap();
        let mut second = UpdateAddress::new(id, "C", store.clone());
        second.execute().unwrap();
        second.undo().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().address, "B");
    }

    #[test]
    fn test_cancel_undo_restores_identical_record() {
        let store = OrderStore::shared();
        let id = store.borrow_mut().create_order("1111 Unknown Address");
        store.borrow_mut().update_address(id, "1111 Unknown Address - NEW").unwrap();
        let before = contents(&store);

        let mut cancel = CancelOrder::new(id, store.clone());
        cancel.execute().unwrap();
        assert!(store.borrow().get_order(id).is_none());

        // Other commands can no longer resolve the id
        let mut ship = ShipOrder::new(id, store.clone());
        assert_eq!(ship.execute(), Err(OrderError::NotFound(id)));

        cancel.undo().unwrap();
        assert_eq!(contents(&store), before);
    }

    #[test]
    fn test_undo_before_execute_is_noop() {
        let store = OrderStore::shared();
        let id = shipped_order(&store);
        let before = contents(&store);

        let mut commands: Vec<Box<dyn Command>> = vec![
            Box::new(CreateOrder::new("A", store.clone())),
            Box::new(ShipOrder::new(id, store.clone())),
            Box::new(HaltShipment::new(id, store.clone())),
            Box::new(UpdateAddress::new(id, "B", store.clone())),
            Box::new(CancelOrder::new(id, store.clone())),
            Box::new(DeliverOrder::new(id, store.clone())),
        ];

        for command in commands.iter_mut() {
            command.undo().unwrap();
        }
        assert_eq!(contents(&store), before);
    }

    #[test]
    fn test_failed_execute_leaves_no_snapshot() {
        let store = OrderStore::shared();
        let id = shipped_order(&store);

        let mut ship = ShipOrder::new(id, store.clone());
        assert!(matches!(
            ship.execute(),
            Err(OrderError::InvalidTransition { from: OrderStatus::Shipped, action: Transition::Ship, .. })
        ));

        ship.undo().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().status, OrderStatus::Shipped);
    }

    #[test]
    fn test_failed_reexecute_discards_ship_snapshot() {
        let store = OrderStore::shared();
        let id = store.borrow_mut().create_order("A");

        let mut ship = ShipOrder::new(id, store.clone());
        ship.execute().unwrap();
        assert!(ship.execute().is_err());

        ship.undo().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().status, OrderStatus::Shipped);
    }

    #[test]
    fn test_failed_reexecute_discards_halt_snapshot() {
        let store = OrderStore::shared();
        let id = shipped_order(&store);

        let mut halt = HaltShipment::new(id, store.clone());
        halt.execute().unwrap();
        assert!(halt.execute().is_err());

        halt.undo().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().status, OrderStatus::Scheduled);
    }

    #[test]
    fn test_failed_reexecute_discards_update_snapshot() {
        let store = OrderStore::shared();
        let id = store.borrow_mut().create_order("A");

        let mut update = UpdateAddress::new(id, "B", store.clone());
        update.execute().unwrap();
        store.borrow_mut().ship_order(id).unwrap();
        assert!(update.execute().is_err());
        store.borrow_mut().halt_shipment(id).unwrap();

        update.undo().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().address, "B");
    }

    #[test]
    fn test_failed_reexecute_discards_cancel_snapshot() {
        let store = OrderStore::shared();
        let id = store.borrow_mut().create_order("A");

        let mut cancel = CancelOrder::new(id, store.clone());
        cancel.execute().unwrap();
        assert_eq!(cancel.execute(), Err(OrderError::NotFound(id)));

        cancel.undo().unwrap();
        assert!(store.borrow().get_order(id).is_none());
    }

    #[test]
    fn test_guard_failure_keeps_snapshot_for_retry() {
        let store = OrderStore::shared();
        let id = store.borrow_mut().create_order("A");

        let mut update = UpdateAddress::new(id, "B", store.clone());
        update.execute().unwrap();
        store.borrow_mut().ship_order(id).unwrap();

        assert!(matches!(
            update.undo(),
            Err(OrderError::InvalidTransition { action: Transition::Revert, .. })
        ));
        assert_eq!(store.borrow().order(id).unwrap().address, "B");

        store.borrow_mut().halt_shipment(id).unwrap();
        update.undo().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().address, "A");

        // Snapshot consumed by the successful retry
        update.undo().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().address, "A");
    }

    #[test]
    fn test_second_undo_has_no_effect() {
        let store = OrderStore::shared();
        let id = store.borrow_mut().create_order("A");

        let mut ship = ShipOrder::new(id, store.clone());
        ship.execute().unwrap();
        ship.undo().unwrap();
        ship.undo().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().status, OrderStatus::Scheduled);

        let mut cancel = CancelOrder::new(id, store.clone());
        cancel.execute().unwrap();
        cancel.undo().unwrap();
        cancel.undo().unwrap();
        assert_eq!(store.borrow().len(), 1);
    }

    #[test]
    fn test_command_is_reusable_after_undo() {
        let store = OrderStore::shared();
        let id = store.borrow_mut().create_order("A");

        let mut ship = ShipOrder::new(id, store.clone());
        ship.execute().unwrap();
        ship.undo().unwrap();
        ship.execute().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().status, OrderStatus::Shipped);

        ship.undo().unwrap();
        assert_eq!(store.borrow().order(id).unwrap().status, OrderStatus::Scheduled);
    }

    #[test]
    fn test_deliver_undo_is_inert() {
        let store = OrderStore::shared();
        let id = shipped_order(&store);

        let mut deliver = DeliverOrder::new(id, store.clone());
        deliver.execute().unwrap();
        deliver.undo().unwrap();

        assert_eq!(store.borrow().order(id).unwrap().status, OrderStatus::Delivered);
    }

    #[test]
    fn test_stale_ship_undo_cannot_leave_delivered() {
        let store = OrderStore::shared();
        let id = store.borrow_mut().create_order("A");

        let mut ship = ShipOrder::new(id, store.clone());
        ship.execute().unwrap();
        DeliverOrder::new(id, store.clone()).execute().unwrap();

        assert!(ship.undo().is_err());
        assert_eq!(store.borrow().order(id).unwrap().status, OrderStatus::Delivered);
    }
}
