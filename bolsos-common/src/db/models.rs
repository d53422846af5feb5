//! Database models for the `bolso` table

use rust_decimal::Decimal;

/// Name of the catalog table
pub const BAG_TABLE: &str = "bolso";

/// One stored row of the `bolso` table, as the storage returns it
///
/// `price` stays fixed-point and `active` stays integer-like here; the
/// conversion to wire types happens at the response boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct BagRow {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub stock: i32,
    pub sku: String,
    pub active: i64,
}

/// Validated, normalized field set written by create and update
///
/// Every write supplies every column (full replace).
#[derive(Debug, Clone, PartialEq)]
pub struct NewBag {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub stock: i32,
    pub sku: String,
    pub active: bool,
}
