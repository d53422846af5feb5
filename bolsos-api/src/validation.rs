//! Input validation and normalization for bag writes
//!
//! Fields are checked in a fixed order (name, description, price, category,
//! stock, sku, active) and the first violation is reported with the field's
//! name. That includes a field sent with the wrong JSON type.

use bolsos_common::NewBag;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Number, Value};

use crate::error::{ApiError, ApiResult};
use crate::models::BagInput;

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 1000;
pub const CATEGORY_MAX_LEN: usize = 50;
pub const SKU_MAX_LEN: usize = 50;

/// Largest value a DECIMAL(10,2) column holds
const PRICE_MAX_CENTS: i64 = 9_999_999_999;

/// Validate a request body and normalize it into the stored field set
///
/// Normalization: text fields are trimmed, sku is upper-cased, a blank
/// description becomes absent, price is rounded to cents, `active`
/// defaults to true.
pub fn validate_bag(input: BagInput) -> ApiResult<NewBag> {
    let name = required_text("name", input.name, NAME_MAX_LEN)?;
    let description = optional_text("description", input.description, DESCRIPTION_MAX_LEN)?;
    let price = parse_price(input.price)?;
    let category = required_text("category", input.category, CATEGORY_MAX_LEN)?;
    let stock = parse_stock(input.stock)?;
    let sku = required_text("sku", input.sku, SKU_MAX_LEN)?.to_uppercase();
    let active = parse_active(input.active)?;

    Ok(NewBag {
        name,
        description,
        price,
        category,
        stock,
        sku,
        active,
    })
}

fn text(field: &'static str, value: Option<Value>) -> ApiResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ApiError::validation(field, "must be a string")),
    }
}

fn required_text(field: &'static str, value: Option<Value>, max_len: usize) -> ApiResult<String> {
    let value = text(field, value)?.ok_or_else(|| ApiError::validation(field, "is required"))?;
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ApiError::validation(field, "must not be empty"));
    }
    check_length(field, trimmed, max_len)?;

    Ok(trimmed.to_string())
}

fn optional_text(
    field: &'static str,
    value: Option<Value>,
    max_len: usize,
) -> ApiResult<Option<String>> {
    match text(field, value)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            check_length(field, trimmed, max_len)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn check_length(field: &'static str, value: &str, max_len: usize) -> ApiResult<()> {
    // Column limits count characters, not bytes
    if value.chars().count() > max_len {
        return Err(ApiError::validation(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }
    Ok(())
}

fn number(field: &'static str, value: Option<Value>, expected: &str) -> ApiResult<Number> {
    match value {
        None => Err(ApiError::validation(field, "is required")),
        Some(Value::Number(n)) => Ok(n),
        Some(_) => Err(ApiError::validation(field, format!("must be {}", expected))),
    }
}

fn parse_price(value: Option<Value>) -> ApiResult<Decimal> {
    let value = number("price", value, "a number")?
        .as_f64()
        .ok_or_else(|| ApiError::validation("price", "must be a number"))?;

    if !value.is_finite() {
        return Err(ApiError::validation("price", "must be a finite number"));
    }
    if value < 0.0 {
        return Err(ApiError::validation("price", "must be non-negative"));
    }

    let mut cents = if value == 0.0 {
        Decimal::ZERO
    } else {
        Decimal::from_f64(value)
            .ok_or_else(|| ApiError::validation("price", "is out of range"))?
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };
    cents.rescale(2);

    if cents > Decimal::new(PRICE_MAX_CENTS, 2) {
        return Err(ApiError::validation(
            "price",
            format!("must be at most {}", Decimal::new(PRICE_MAX_CENTS, 2)),
        ));
    }

    Ok(cents)
}

fn parse_stock(value: Option<Value>) -> ApiResult<i32> {
    let n = number("stock", value, "an integer")?;
    let too_large = || ApiError::validation("stock", format!("must be at most {}", i32::MAX));

    // 3.0 counts as the integer 3; 3.5 does not
    let value = match (n.as_i64(), n.as_u64(), n.as_f64()) {
        (Some(i), _, _) => i,
        (None, Some(_), _) => return Err(too_large()),
        (None, None, Some(f)) if f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => f as i64,
        _ => return Err(ApiError::validation("stock", "must be an integer")),
    };

    if value < 0 {
        return Err(ApiError::validation("stock", "must be non-negative"));
    }

    i32::try_from(value).map_err(|_| too_large())
}

fn parse_active(value: Option<Value>) -> ApiResult<bool> {
    match value {
        None => Ok(true),
        Some(Value::Bool(active)) => Ok(active),
        Some(_) => Err(ApiError::validation("active", "must be a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "name": "Tote A",
            "price": 25.50,
            "category": "tote",
            "stock": 3,
            "sku": "tot-001"
        })
    }

    /// Validate `valid()` with `field` replaced by `value`
    fn with(field: &str, value: Value) -> ApiResult<NewBag> {
        let mut body = valid();
        body[field] = value;
        validate(body)
    }

    /// Validate `valid()` with `field` removed
    fn without(field: &str) -> ApiResult<NewBag> {
        let mut body = valid();
        body.as_object_mut().unwrap().remove(field);
        validate(body)
    }

    fn validate(body: Value) -> ApiResult<NewBag> {
        let input: BagInput = serde_json::from_value(body).expect("Any JSON object should parse");
        validate_bag(input)
    }

    fn field_of(result: ApiResult<NewBag>) -> &'static str {
        match result {
            Err(ApiError::Validation { field, .. }) => field,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_input_is_normalized() {
        let mut body = valid();
        body["name"] = json!("  Tote A  ");
        body["sku"] = json!("  tot-001 ");
        body["description"] = json!("   ");
        let bag = validate(body).unwrap();

        assert_eq!(bag.name, "Tote A");
        assert_eq!(bag.sku, "TOT-001");
        assert_eq!(bag.description, None);
        assert_eq!(bag.price, Decimal::new(2550, 2));
        assert_eq!(bag.stock, 3);
        assert!(bag.active, "active defaults to true");
    }

    #[test]
    fn test_description_is_trimmed_when_present() {
        let bag = with("description", json!("  Piel  ")).unwrap();
        assert_eq!(bag.description.as_deref(), Some("Piel"));
    }

    #[test]
    fn test_explicit_inactive_is_kept() {
        let bag = with("active", json!(false)).unwrap();
        assert!(!bag.active);
    }

    #[test]
    fn test_missing_fields_are_named() {
        for field in ["name", "price", "category", "stock", "sku"] {
            assert_eq!(field_of(without(field)), field);
        }
    }

    #[test]
    fn test_null_reads_as_absent() {
        assert_eq!(field_of(with("price", Value::Null)), "price");

        let bag = with("description", Value::Null).unwrap();
        assert_eq!(bag.description, None);
        assert!(with("active", Value::Null).unwrap().active);
    }

    #[test]
    fn test_wrong_types_are_named() {
        assert_eq!(field_of(with("name", json!(42))), "name");
        assert_eq!(field_of(with("description", json!(["a"]))), "description");
        assert_eq!(field_of(with("price", json!("25.50"))), "price");
        assert_eq!(field_of(with("category", json!(true))), "category");
        assert_eq!(field_of(with("stock", json!(3.5))), "stock");
        assert_eq!(field_of(with("stock", json!("3"))), "stock");
        assert_eq!(field_of(with("sku", json!({"code": 1}))), "sku");
        assert_eq!(field_of(with("active", json!("yes"))), "active");
    }

    #[test]
    fn test_whole_float_stock_accepted() {
        let bag = with("stock", json!(4.0)).unwrap();
        assert_eq!(bag.stock, 4);
    }

    #[test]
    fn test_blank_name_rejected() {
        assert_eq!(field_of(with("name", json!(" \t "))), "name");
    }

    #[test]
    fn test_name_length_counts_characters() {
        let at_limit = "ñ".repeat(NAME_MAX_LEN);
        assert!(with("name", json!(at_limit)).is_ok());

        let over = "a".repeat(NAME_MAX_LEN + 1);
        assert_eq!(field_of(with("name", json!(over))), "name");
    }

    #[test]
    fn test_negative_price_rejected() {
        assert_eq!(field_of(with("price", json!(-1))), "price");
    }

    #[test]
    fn test_zero_price_allowed() {
        let bag = with("price", json!(0)).unwrap();
        assert_eq!(bag.price, Decimal::ZERO);
    }

    #[test]
    fn test_price_rounded_to_cents() {
        // 10.125 is exact in binary, so this is a true midpoint
        let bag = with("price", json!(10.125)).unwrap();
        assert_eq!(bag.price, Decimal::new(1013, 2));
        assert_eq!(bag.price.to_string(), "10.13");

        let bag = with("price", json!(7)).unwrap();
        assert_eq!(bag.price.to_string(), "7.00");
    }

    #[test]
    fn test_price_above_column_limit_rejected() {
        assert_eq!(field_of(with("price", json!(100_000_000.0))), "price");
        assert!(with("price", json!(99_999_999.99)).is_ok());
    }

    #[test]
    fn test_stock_bounds() {
        assert_eq!(field_of(with("stock", json!(-1))), "stock");
        assert_eq!(field_of(with("stock", json!(i64::from(i32::MAX) + 1))), "stock");
        assert_eq!(field_of(with("stock", json!(u64::MAX))), "stock");
        assert_eq!(with("stock", json!(0)).unwrap().stock, 0);
        assert_eq!(with("stock", json!(i32::MAX)).unwrap().stock, i32::MAX);
    }

    #[test]
    fn test_first_violation_wins() {
        let mut body = valid();
        body.as_object_mut().unwrap().remove("name");
        body["price"] = json!(-5.0);
        assert_eq!(field_of(validate(body)), "name");

        let mut body = valid();
        body["price"] = json!("free");
        body["stock"] = json!(1.5);
        assert_eq!(field_of(validate(body)), "price");
    }

    #[test]
    fn test_overlong_sku_and_category_rejected() {
        let long = "x".repeat(51);
        assert_eq!(field_of(with("sku", json!(long.clone()))), "sku");
        assert_eq!(field_of(with("category", json!(long))), "category");
    }
}
