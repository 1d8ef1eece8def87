use super::Rejection;
use crate::models::NewProduct;
use crate::utils::sanitize;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Number, Value};
use std::str::FromStr;
use validator::ValidateLength;

pub const NAME_MIN_LEN: u64 = 3;
pub const NAME_MAX_LEN: u64 = 100;

/// 999999.99
pub const PRICE_MAX: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// Runs the create-product rules in order; the first failing rule decides the
/// rejection. On success the returned value replaces the caller's input.
pub fn validate_create(body: &Value) -> Result<NewProduct, Rejection> {
    let name = validate_name(body.get("name"))?;
    let price = validate_price(body.get("price"))?;
    Ok(NewProduct { name, price })
}

fn validate_name(raw: Option<&Value>) -> Result<String, Rejection> {
    let raw = match raw {
        None | Some(Value::Null) => return Err(Rejection::Field("name required")),
        Some(value) => value,
    };
    let Value::String(raw) = raw else {
        return Err(Rejection::Field("name must be a string"));
    };

    let name = sanitize(raw);
    if name.is_empty() {
        return Err(Rejection::Field("name cannot be empty"));
    }
    // Lengths count characters, not bytes.
    if !name.validate_length(Some(NAME_MIN_LEN), None, None) {
        return Err(Rejection::Field("name too short"));
    }
    if !name.validate_length(None, Some(NAME_MAX_LEN), None) {
        return Err(Rejection::Field("name too long"));
    }
    Ok(name)
}

fn validate_price(raw: Option<&Value>) -> Result<Decimal, Rejection> {
    let raw = match raw {
        None | Some(Value::Null) => return Err(Rejection::Field("price required")),
        Some(value) => value,
    };
    let Value::Number(number) = raw else {
        return Err(Rejection::Field("price must be a number"));
    };

    let Some(approx) = number.as_f64().filter(|v| !v.is_nan()) else {
        return Err(Rejection::Field("price invalid"));
    };
    let price = match to_decimal(number, approx) {
        Some(price) => price,
        // Beyond what a Decimal can hold; the sign alone decides the rule.
        None if approx < 0.0 => return Err(Rejection::Field("price must be non-negative")),
        None if approx > 0.0 => return Err(Rejection::Field("price exceeds maximum")),
        None => return Err(Rejection::Field("price invalid")),
    };

    if price < Decimal::ZERO {
        return Err(Rejection::Field("price must be non-negative"));
    }
    if price > PRICE_MAX {
        return Err(Rejection::Field("price exceeds maximum"));
    }

    // `-0.0` is accepted but stored unsigned.
    let price = round_price(price);
    Ok(if price.is_zero() { Decimal::ZERO } else { price })
}

/// Works from the number's decimal text so `19.999` is seen as written,
/// not as its nearest binary double.
fn to_decimal(number: &Number, approx: f64) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .or_else(|_| Decimal::try_from(approx))
        .ok()
}

/// Half-up at two places (prices are never negative here).
pub fn round_price(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
