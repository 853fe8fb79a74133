use crate::models::{OrderId, OrderRecord, OrderStatus, Transition};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::info;

/// Store handle shared by every command issued against it
pub type SharedStore = Rc<RefCell<OrderStore>>;

/// Owns order records and enforces lifecycle transitions
pub struct OrderStore {
    orders: BTreeMap<OrderId, OrderRecord>,
    last_id: u64,
}

impl OrderStore {
    pub fn new() -> Self {
        Self {
            orders: BTreeMap::new(),
            last_id: 0,
        }
    }

    /// Wrap a fresh store for use by commands
    pub fn shared() -> SharedStore {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Create a new scheduled order
    pub fn create_order(&mut self, address: impl Into<String>) -> OrderId {
        self.last_id += 1;
        let id = OrderId(self.last_id);
        let record = OrderRecord::new(id, address.into());

        info!(order_id = %id, address = %record.address, "Creating order scheduled to ship");
        self.orders.insert(id, record);
        id
    }

    /// Get an order by ID
    pub fn get_order(&self, order_id: OrderId) -> Option<&OrderRecord> {
        self.orders.get(&order_id)
    }

    /// Get an order by ID, failing when it does not exist
    pub fn order(&self, order_id: OrderId) -> Result<&OrderRecord, OrderError> {
        self.orders
            .get(&order_id)
            .ok_or(OrderError::NotFound(order_id))
    }

    /// All orders in ascending id order
    pub fn orders(&self) -> impl Iterator<Item = &OrderRecord> {
        self.orders.values()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Transition: Scheduled → Shipped
    pub fn ship_order(&mut self, order_id: OrderId) -> Result<(), OrderError> {
        let order = self.get_order_mut(order_id)?;
        require(order, OrderStatus::Scheduled, Transition::Ship)?;

        order.status = OrderStatus::Shipped;
        info!(order_id = %order_id, "Shipping order");
        Ok(())
    }

    /// Transition: Shipped → Scheduled
    pub fn halt_shipment(&mut self, order_id: OrderId) -> Result<(), OrderError> {
        let order = self.get_order_mut(order_id)?;
        require(order, OrderStatus::Shipped, Transition::HaltShipment)?;

        order.status = OrderStatus::Scheduled;
        info!(order_id = %order_id, "Halting shipment");
        Ok(())
    }

    /// Overwrite the address of a scheduled order
    pub fn update_address(
        &mut self,
        order_id: OrderId,
        new_address: impl Into<String>,
    ) -> Result<(), OrderError> {
        let order = self.get_order_mut(order_id)?;
        require(order, OrderStatus::Scheduled, Transition::UpdateAddress)?;

        order.address = new_address.into();
        info!(order_id = %order_id, address = %order.address, "Updating order address");
        Ok(())
    }

    /// Remove a scheduled order, handing back the removed record
    pub fn cancel_order(&mut self, order_id: OrderId) -> Result<OrderRecord, OrderError> {
        let order = self.get_order_mut(order_id)?;
        require(order, OrderStatus::Scheduled, Transition::Cancel)?;

        let removed = self.orders.remove(&order_id).ok_or(OrderError::NotFound(order_id))?;
        info!(order_id = %order_id, "Canceling order");
        Ok(removed)
    }

    /// Transition: Shipped → Delivered (final state)
    pub fn deliver_order(&mut self, order_id: OrderId) -> Result<(), OrderError> {
        let order = self.get_order_mut(order_id)?;
        require(order, OrderStatus::Shipped, Transition::Deliver)?;

        order.status = OrderStatus::Delivered;
        info!(order_id = %order_id, address = %order.address, "Delivering order");
        Ok(())
    }

    /// Put back a status captured before a transition, as long as the
    /// order still sits in the status that transition produced
    pub(crate) fn revert_status(
        &mut self,
        order_id: OrderId,
        expected: OrderStatus,
        prior: OrderStatus,
    ) -> Result<(), OrderError> {
        let order = self.get_order_mut(order_id)?;
        require(order, expected, Transition::Revert)?;

        order.status = prior;
        info!(order_id = %order_id, status = %prior, "Reverting order status");
        Ok(())
    }

    /// Put back a captured address; only scheduled orders take address changes
    pub(crate) fn revert_address(
        &mut self,
        order_id: OrderId,
        prior: String,
    ) -> Result<(), OrderError> {
        let order = self.get_order_mut(order_id)?;
        require(order, OrderStatus::Scheduled, Transition::Revert)?;

        order.address = prior;
        info!(order_id = %order_id, address = %order.address, "Reverting order address");
        Ok(())
    }

    /// Delete a freshly created order. The id stays consumed.
    pub(crate) fn retract(&mut self, order_id: OrderId) -> Result<OrderRecord, OrderError> {
        let order = self.get_order_mut(order_id)?;
        require(order, OrderStatus::Scheduled, Transition::Revert)?;

        let removed = self.orders.remove(&order_id).ok_or(OrderError::NotFound(order_id))?;
        info!(order_id = %order_id, "Retracting order");
        Ok(removed)
    }

    /// Reinsert a record removed by cancellation
    pub(crate) fn reinstate(&mut self, record: OrderRecord) {
        info!(order_id = %record.id, address = %record.address, "Reinstating order");
        self.orders.insert(record.id, record);
    }

    /// Helper to get mutable order reference
    fn get_order_mut(&mut self, order_id: OrderId) -> Result<&mut OrderRecord, OrderError> {
        self.orders
            .get_mut(&order_id)
            .ok_or(OrderError::NotFound(order_id))
    }
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

fn require(order: &OrderRecord, expected: OrderStatus, action: Transition) -> Result<(), OrderError> {
    if order.status != expected {
        return Err(OrderError::InvalidTransition {
            id: order.id,
            from: order.status,
            action,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    NotFound(OrderId),

    #[error("Cannot {action} order {id} while it is {from}")]
    InvalidTransition {
        id: OrderId,
        from: OrderStatus,
        action: Transition,
    },
}
