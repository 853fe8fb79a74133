use serde::Serialize;
use std::fmt;

/// Sequential order identifier, allocated by the store and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Scheduled,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Delivered has no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Scheduled => "SCHEDULED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
        };
        f.write_str(label)
    }
}

/// The operation attempted when a transition is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Ship,
    HaltShipment,
    UpdateAddress,
    Cancel,
    Deliver,
    /// Writing an undo snapshot back
    Revert,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Transition::Ship => "ship",
            Transition::HaltShipment => "halt shipment",
            Transition::UpdateAddress => "update address",
            Transition::Cancel => "cancel",
            Transition::Deliver => "deliver",
            Transition::Revert => "revert",
        };
        f.write_str(label)
    }
}

/// One customer order as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub address: String,
    pub status: OrderStatus,
}

impl OrderRecord {
    pub fn new(id: OrderId, address: String) -> Self {
        Self {
            id,
            address,
            status: OrderStatus::Scheduled,
        }
    }
}
