//! HTTP request handlers

pub mod alert;
pub mod delivery;
pub mod dispatch;
pub mod health;
pub mod inventory;
pub mod stock_request;

pub use alert::*;
pub use delivery::*;
pub use dispatch::*;
pub use health::*;
pub use inventory::*;
pub use stock_request::*;
