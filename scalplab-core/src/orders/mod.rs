//! Order lifecycle tracking with JSON persistence.

pub mod order;
pub mod store;

pub use order::{Order, OrderId, OrderStatus, OrderTicket};
pub use store::{OrderStats, OrderStore, OrderStoreError};
