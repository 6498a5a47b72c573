//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! ca-cli cart add --id 1 --name "Speckled Mug" --price 200 --qty 2
//! ca-cli cart set 1 5
//! ca-cli cart inc 1
//! ca-cli cart dec 1 --by 2
//! ca-cli cart show
//! ca-cli cart clear
//! ```
//!
//! Changes only apply once the backend accepted them, which needs a logged-in
//! account. `clear` always empties the local cart.

use ceramic_artistry_core::{Product, ProductId};
use ceramic_artistry_storefront::stores::CartStore;

use super::CliError;

/// List the cart with its totals.
pub fn show(cart: &CartStore) {
    let items = cart.items();
    if items.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    for item in &items {
        tracing::info!(
            "{:>6}  {} x{} @ {} = {}",
            item.id,
            item.name,
            item.qty,
            item.price,
            item.line_total()
        );
    }
    tracing::info!("Items: {}  Subtotal: {}", cart.total_qty(), cart.subtotal());
}

/// Add `qty` of a product.
///
/// # Errors
///
/// Returns `InvalidProduct` for a product the cart cannot hold, and
/// `CartNotUpdated` if the backend did not accept the change.
pub async fn add(cart: &CartStore, product: Product, qty: i64) -> Result<(), CliError> {
    if !product.is_cartable() {
        return Err(CliError::InvalidProduct(product.id.to_string()));
    }
    let id = product.id;
    let name = product.name.clone();
    applied(cart.add_item(product, qty).await)?;
    tracing::info!("{name} now x{}", cart.get_qty(id));
    Ok(())
}

/// Set the quantity of a line; zero or less removes it.
///
/// # Errors
///
/// Returns `CartNotUpdated` if the backend did not accept the change.
pub async fn set(cart: &CartStore, id: ProductId, qty: i64) -> Result<(), CliError> {
    applied(cart.set_qty(id, qty).await)?;
    report_line(cart, id);
    Ok(())
}

/// Increase a line by `by`.
///
/// # Errors
///
/// Returns `CartNotUpdated` if the backend did not accept the change.
pub async fn inc(cart: &CartStore, id: ProductId, by: i64) -> Result<(), CliError> {
    applied(cart.inc(id, by).await)?;
    report_line(cart, id);
    Ok(())
}

/// Decrease a line by `by`, removing it at zero.
///
/// # Errors
///
/// Returns `CartNotUpdated` if the backend did not accept the change.
pub async fn dec(cart: &CartStore, id: ProductId, by: i64) -> Result<(), CliError> {
    applied(cart.dec(id, by).await)?;
    report_line(cart, id);
    Ok(())
}

/// Empty the cart.
pub async fn clear(cart: &CartStore) {
    cart.clear().await;
    tracing::info!("Cart cleared");
}

fn applied(synced: bool) -> Result<(), CliError> {
    if synced {
        Ok(())
    } else {
        Err(CliError::CartNotUpdated)
    }
}

fn report_line(cart: &CartStore, id: ProductId) {
    match cart.get_qty(id) {
        0 => tracing::info!("Product {id} removed from cart"),
        qty => tracing::info!("Product {id} now x{qty}"),
    }
}
