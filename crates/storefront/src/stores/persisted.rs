//! Decoding of the local storage mirrors.
//!
//! Persisted payloads may have been written by older builds or edited by
//! hand, so every field is coerced loosely and anything unusable is dropped
//! instead of failing the whole payload.

use std::collections::HashSet;
use std::str::FromStr;

use ceramic_artistry_core::{CartItem, ProductId, User, UserId};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Decode the persisted user.
///
/// Returns `None` unless the payload is an object with a numeric `id` and a
/// non-empty `phoneNumber`.
pub(crate) fn decode_user(raw: &str) -> Option<User> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;

    let id = integral(object.get("id")?.as_f64()?)?;
    if !is_truthy(object.get("phoneNumber")) {
        return None;
    }

    Some(User {
        id: UserId::new(id),
        username: text(object.get("username")),
        phone_number: text(object.get("phoneNumber")),
        email: text(object.get("email")),
        address: text(object.get("address")),
        pincode: text(object.get("pincode")),
    })
}

/// Decode the persisted cart.
///
/// Malformed JSON or a non-array payload yields an empty cart. Entries
/// without a positive integral id or a name are dropped; when two entries
/// share an id the first one wins.
pub(crate) fn decode_items(raw: &str) -> Vec<CartItem> {
    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(|entry| decode_item(entry.as_object()?))
        .filter(|item| seen.insert(item.id))
        .collect()
}

fn decode_item(entry: &Map<String, Value>) -> Option<CartItem> {
    let id = number(entry.get("id")).and_then(integral).filter(|id| *id > 0)?;
    let name = text(entry.get("name"));
    if name.is_empty() {
        return None;
    }

    let price = decimal(entry.get("price"))
        .filter(|price| !price.is_sign_negative())
        .unwrap_or_default();

    Some(CartItem {
        id: ProductId::new(id),
        name,
        price,
        qty: quantity(entry.get("qty")),
        image: optional_text(entry.get("image")),
        slug: optional_text(entry.get("slug")),
    })
}

/// Whether a JSON value would count as "set": non-empty string, non-zero
/// number, `true`, or any array/object.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Coerce to a string; unset values and compound values become empty.
fn text(value: Option<&Value>) -> String {
    if !is_truthy(value) {
        return String::new();
    }
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn optional_text(value: Option<&Value>) -> Option<String> {
    Some(text(value)).filter(|s| !s.is_empty())
}

/// Coerce a number or numeric string to a finite `f64`.
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Coerce a number or numeric string to an exact decimal.
fn decimal(value: Option<&Value>) -> Option<Decimal> {
    let raw = match value? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}

/// Quantities are floored and clamped to at least one.
fn quantity(value: Option<&Value>) -> u32 {
    number(value).map_or(1, |n| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to u32 range first
        let qty = n.floor().clamp(1.0, f64::from(u32::MAX)) as u32;
        qty
    })
}

/// Integral value of `n`, if it has no fractional part and fits an `i64`.
fn integral(n: f64) -> Option<i64> {
    #[allow(clippy::cast_precision_loss)] // bounds check only
    let in_range = n >= i64::MIN as f64 && n < i64::MAX as f64;
    #[allow(clippy::cast_possible_truncation)] // fract() == 0 and in range
    let id = n as i64;
    (n.is_finite() && n.fract() == 0.0 && in_range).then_some(id)
}
