//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, UserId};

/// Product details needed to put something in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl Product {
    /// Whether this product can be put in the cart: a positive id, a name,
    /// and a price that is not negative.
    #[must_use]
    pub fn is_cartable(&self) -> bool {
        self.id.as_i64() > 0 && !self.name.trim().is_empty() && !self.price.is_sign_negative()
    }
}

/// A line in the cart.
///
/// A cart never holds two items with the same `id`, and an item whose
/// quantity drops to zero is removed rather than stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl CartItem {
    /// Build a line for `product` with the given quantity.
    #[must_use]
    pub fn new(product: Product, qty: u32) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            qty,
            image: product.image,
            slug: product.slug,
        }
    }

    /// Price multiplied by quantity, saturating at the decimal range.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.qty))
    }
}

/// Quantity update sent to the backend cart endpoint.
///
/// `id` is always `0`, which the backend treats as "create or replace".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSync {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartSync {
    /// Create a sync request for `product_id` at `quantity` on behalf of `user_id`.
    #[must_use]
    pub const fn new(user_id: UserId, product_id: ProductId, quantity: u32) -> Self {
        Self {
            id: 0,
            user_id,
            product_id,
            quantity,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mug() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Mug".to_string(),
            price: Decimal::new(19_950, 2),
            image: None,
            slug: Some("stoneware-mug".to_string()),
        }
    }

    #[test]
    fn test_line_total() {
        let item = CartItem::new(mug(), 3);
        assert_eq!(item.line_total(), Decimal::new(59_850, 2));
    }

    #[test]
    fn test_line_total_saturates() {
        let item = CartItem::new(
            Product {
                price: Decimal::MAX,
                ..mug()
            },
            2,
        );
        assert_eq!(item.line_total(), Decimal::MAX);
    }

    #[test]
    fn test_is_cartable() {
        assert!(mug().is_cartable());
        assert!(
            Product {
                price: Decimal::ZERO,
                ..mug()
            }
            .is_cartable()
        );
        assert!(
            !Product {
                id: ProductId::new(0),
                ..mug()
            }
            .is_cartable()
        );
        assert!(
            !Product {
                name: "  ".to_string(),
                ..mug()
            }
            .is_cartable()
        );
        assert!(
            !Product {
                price: Decimal::new(-5, 0),
                ..mug()
            }
            .is_cartable()
        );
    }

    #[test]
    fn test_price_serializes_as_number() {
        let item = CartItem::new(mug(), 1);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json["price"].is_number());
        assert_eq!(json["qty"], 1);
        assert!(json.get("image").is_none());
        assert_eq!(json["slug"], "stoneware-mug");
    }

    #[test]
    fn test_cart_sync_wire_shape() {
        let sync = CartSync::new(UserId::new(4), ProductId::new(9), 2);
        let json = serde_json::to_value(sync).unwrap();
        assert_eq!(json["id"], 0);
        assert_eq!(json["userId"], 4);
        assert_eq!(json["productId"], 9);
        assert_eq!(json["quantity"], 2);
    }
}
