mod retry;
mod tx_ref;

pub use retry::retry_with_backoff;
pub use tx_ref::{customer_id_from_tx_ref, new_order_id, new_tx_ref};
