//! Attribute-value helpers
//!
//! DynamoDB numbers travel as strings; these helpers keep the conversion to
//! and from `rust_decimal::Decimal` in one place so every service writes
//! balances and quantities with the same textual form.

use aws_sdk_dynamodb::types::AttributeValue;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// String attribute.
pub fn attr_s(value: impl Into<String>) -> AttributeValue {
    AttributeValue::S(value.into())
}

/// Number attribute from a decimal.
pub fn attr_n(value: Decimal) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

/// Number attribute from an integer (timestamps).
pub fn attr_i(value: i64) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

/// Read a string attribute from an item.
pub fn get_s(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|av| av.as_s().ok()).cloned()
}

/// Read a number attribute as a decimal.
pub fn get_n(item: &HashMap<String, AttributeValue>, name: &str) -> Option<Decimal> {
    item.get(name)
        .and_then(|av| av.as_n().ok())
        .and_then(|n| Decimal::from_str(n).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_round_trip() {
        let mut item = HashMap::new();
        item.insert("usd_available".to_string(), attr_n(dec!(950000.00000001)));
        assert_eq!(get_n(&item, "usd_available"), Some(dec!(950000.00000001)));
    }

    #[test]
    fn test_string_round_trip() {
        let mut item = HashMap::new();
        item.insert("order_id".to_string(), attr_s("ord-1"));

        assert_eq!(get_s(&item, "order_id").as_deref(), Some("ord-1"));
        assert_eq!(get_s(&item, "missing"), None);
        assert_eq!(get_n(&item, "order_id"), None);
    }

    #[test]
    fn test_integer_attribute_form() {
        assert_eq!(attr_i(1708123456), AttributeValue::N("1708123456".to_string()));
        assert_eq!(attr_i(-1), AttributeValue::N("-1".to_string()));
    }
}
