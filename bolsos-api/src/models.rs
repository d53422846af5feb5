//! Wire shapes for the bags API and the mapping from stored rows

use bolsos_common::BagRow;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for create and update
///
/// Fields are kept as raw JSON values so that a missing field or one of the
/// wrong type is reported by validation with its name, not as an opaque
/// body error. JSON `null` reads as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BagInput {
    pub name: Option<Value>,
    pub description: Option<Value>,
    pub price: Option<Value>,
    pub category: Option<Value>,
    pub stock: Option<Value>,
    pub sku: Option<Value>,
    pub active: Option<Value>,
}

/// Bag as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BagResponse {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub stock: i32,
    pub sku: String,
    pub active: bool,
}

impl From<BagRow> for BagResponse {
    fn from(row: BagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            // Every DECIMAL(10,2) value is representable; to_f64 never fails here
            price: row.price.to_f64().unwrap_or_default(),
            category: row.category,
            stock: row.stock,
            sku: row.sku,
            active: row.active != 0,
        }
    }
}

/// Body returned by a successful delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub message: String,
    pub id: u64,
}

impl DeleteConfirmation {
    pub fn new(id: u64) -> Self {
        Self {
            message: "Bag deleted".to_string(),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn row(active: i64) -> BagRow {
        BagRow {
            id: 3,
            name: "Tote A".to_string(),
            description: None,
            price: Decimal::new(2550, 2),
            category: "tote".to_string(),
            stock: 3,
            sku: "TOT-001".to_string(),
            active,
        }
    }

    #[test]
    fn test_price_becomes_float() {
        let response = BagResponse::from(row(1));
        assert_eq!(response.price, 25.50);
    }

    #[test]
    fn test_active_is_strict_boolean() {
        assert!(BagResponse::from(row(1)).active);
        assert!(!BagResponse::from(row(0)).active);
        // Any non-zero integer-like value counts as set
        assert!(BagResponse::from(row(-1)).active);
    }

    #[test]
    fn test_response_serializes_absent_description_as_null() {
        let value = serde_json::to_value(BagResponse::from(row(1))).unwrap();
        assert!(value["description"].is_null());
        assert_eq!(value["active"], true);
        assert_eq!(value["price"], 25.5);
    }
}
