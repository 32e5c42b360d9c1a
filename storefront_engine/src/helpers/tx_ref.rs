//! Transaction reference generation and parsing.
//!
//! References have the shape `cart-{customer_id}-{unix_ts}-{nonce}`. The embedded customer id keeps a payment
//! session traceable back to a cart without a lookup table, and the timestamp + nonce make the reference globally
//! unique. The customer id may itself contain dashes, so parsing strips the fixed prefix and the two trailing
//! segments rather than splitting on every dash.
use chrono::Utc;

use crate::db_types::TxRef;

const TX_REF_PREFIX: &str = "cart-";

pub fn new_tx_ref(customer_id: &str) -> TxRef {
    let ts = Utc::now().timestamp();
    let nonce: u16 = rand::random();
    TxRef::from(format!("{TX_REF_PREFIX}{customer_id}-{ts}-{nonce:04x}"))
}

/// Recovers the customer id embedded in a transaction reference, if the reference has the expected shape.
pub fn customer_id_from_tx_ref(tx_ref: &TxRef) -> Option<String> {
    let rest = tx_ref.as_str().strip_prefix(TX_REF_PREFIX)?;
    let mut parts = rest.rsplitn(3, '-');
    let _nonce = parts.next()?;
    let _ts = parts.next()?;
    let customer_id = parts.next()?;
    if customer_id.is_empty() {
        return None;
    }
    Some(customer_id.to_string())
}

/// A fresh public order identifier.
pub fn new_order_id() -> String {
    format!("ord-{:016x}", rand::random::<u64>())
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn round_trips_the_customer_id() {
        let tx_ref = new_tx_ref("cust-42");
        assert_eq!(customer_id_from_tx_ref(&tx_ref).as_deref(), Some("cust-42"));
    }

    #[test]
    fn rejects_foreign_references() {
        let tx_ref = TxRef::from_str("order-xyz-123").unwrap();
        assert!(customer_id_from_tx_ref(&tx_ref).is_none());
        let empty = TxRef::from_str("cart--12345-ffff").unwrap();
        assert!(customer_id_from_tx_ref(&empty).is_none());
    }

    #[test]
    fn references_are_unique() {
        let a = new_tx_ref("alice");
        let b = new_tx_ref("alice");
        assert_ne!(a, b);
    }
}
