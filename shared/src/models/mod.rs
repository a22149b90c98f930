//! Domain models for the Stockyard platform

mod alert;
mod delivery;
mod dispatch;
mod inventory;
mod permission;
mod stock_request;

pub use alert::*;
pub use delivery::*;
pub use dispatch::*;
pub use inventory::*;
pub use permission::*;
pub use stock_request::*;
