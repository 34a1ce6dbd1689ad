pub mod order;

pub use order::{InsertOrder, MarkOrderPaid, OrderItem, OrderRecord, OrderStatus};
