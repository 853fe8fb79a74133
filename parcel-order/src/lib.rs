pub mod models;
pub mod manager;
pub mod commands;
pub mod delivery;

pub use models::{OrderId, OrderRecord, OrderStatus, Transition};
pub use manager::{OrderError, OrderStore, SharedStore};
pub use commands::{
    CancelOrder, Command, CreateOrder, DeliverOrder, HaltShipment, ShipOrder, UpdateAddress,
};
pub use delivery::DeliveryScheduler;
