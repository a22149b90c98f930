//! Business logic services for the Stockyard platform

pub mod alert;
pub mod delivery;
pub mod dispatch;
pub mod inventory;
pub mod stock_request;

pub use alert::AlertService;
pub use delivery::DeliveryService;
pub use dispatch::DispatchService;
pub use inventory::InventoryService;
pub use stock_request::{StockRequestService, SubmissionPolicy};
