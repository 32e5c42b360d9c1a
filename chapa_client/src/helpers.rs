use serde_json::Value;
use storefront_common::Birr;

use crate::ChapaApiError;

/// The gateway expresses amounts either as JSON numbers or as decimal strings.
pub fn parse_gateway_amount(value: &Value) -> Result<Birr, ChapaApiError> {
    match value {
        Value::Number(n) => {
            let amount = n.as_f64().ok_or_else(|| ChapaApiError::InvalidCurrencyAmount(n.to_string()))?;
            Ok(Birr::from_cents((amount * 100.0).round() as i64))
        },
        Value::String(s) => parse_decimal_string(s),
        other => Err(ChapaApiError::InvalidCurrencyAmount(other.to_string())),
    }
}

fn parse_decimal_string(price: &str) -> Result<Birr, ChapaApiError> {
    let mut parts = price.split('.');
    let whole_units = parts
        .next()
        .ok_or_else(|| ChapaApiError::InvalidCurrencyAmount(price.to_string()))?
        .parse::<i64>()
        .map_err(|e| ChapaApiError::InvalidCurrencyAmount(format!("Invalid price value: {price}. {e}.")))?;
    let cents = match parts.next() {
        None => 0,
        Some(s) => {
            let frac = format!("{s:0<2}");
            frac[..2]
                .parse::<i64>()
                .map_err(|e| ChapaApiError::InvalidCurrencyAmount(format!("Invalid price value: {price}. {e}.")))?
        },
    };
    Ok(Birr::from_cents(100 * whole_units + cents))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_numbers_and_strings() {
        assert_eq!(parse_gateway_amount(&json!(25.0)).unwrap(), Birr::from_cents(2500));
        assert_eq!(parse_gateway_amount(&json!(10.05)).unwrap(), Birr::from_cents(1005));
        assert_eq!(parse_gateway_amount(&json!("25.00")).unwrap(), Birr::from_cents(2500));
        assert_eq!(parse_gateway_amount(&json!("25")).unwrap(), Birr::from_cents(2500));
        assert_eq!(parse_gateway_amount(&json!("25.5")).unwrap(), Birr::from_cents(2550));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_gateway_amount(&json!("2x.00")).is_err());
        assert!(parse_gateway_amount(&json!(null)).is_err());
    }
}
