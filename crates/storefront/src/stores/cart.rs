//! Cart store: line items synced to the backend.
//!
//! Every quantity change is first written to the backend cart of the current
//! account. Most changes are [`MutationPolicy::Gated`]: the local list only
//! changes once the backend accepted the write, so local and remote carts do
//! not drift apart. Clearing is [`MutationPolicy::BestEffort`]: the local list
//! is emptied whatever the backend says.
//!
//! Only logged-in carts are synced. Without an account every sync reports
//! failure, so gated mutations are refused.

use std::sync::{Arc, RwLock};

use ceramic_artistry_core::{CartItem, CartSync, Product, ProductId};
use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use super::identity::IdentityStore;
use super::{persisted, read_lock, write_lock};
use crate::api::ShopApi;
use crate::error::add_breadcrumb;
use crate::storage::{CART_KEY, LocalStorage, StorageError, write_json};

/// How a local change relates to its remote sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPolicy {
    /// Apply locally only after the remote write succeeded.
    Gated,
    /// Apply locally regardless of the remote outcome.
    BestEffort,
}

impl MutationPolicy {
    /// Whether the local change goes ahead given the sync outcome.
    #[must_use]
    pub const fn applies(self, synced: bool) -> bool {
        match self {
            Self::Gated => synced,
            Self::BestEffort => true,
        }
    }
}

#[derive(Debug, Default)]
struct CartState {
    items: Vec<CartItem>,
    initialized: bool,
}

/// The shopping cart.
pub struct CartStore {
    api: Arc<dyn ShopApi>,
    storage: Arc<dyn LocalStorage>,
    identity: Arc<IdentityStore>,
    state: RwLock<CartState>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create an empty, not yet hydrated cart bound to `identity`.
    #[must_use]
    pub fn new(
        api: Arc<dyn ShopApi>,
        storage: Arc<dyn LocalStorage>,
        identity: Arc<IdentityStore>,
    ) -> Self {
        Self {
            api,
            storage,
            identity,
            state: RwLock::default(),
        }
    }

    /// Load the persisted cart, once.
    ///
    /// Unreadable storage or a malformed payload leaves the cart empty; the
    /// store is marked initialized either way.
    pub fn hydrate(&self) {
        let mut state = write_lock(&self.state);
        if state.initialized {
            return;
        }

        match self.read_persisted() {
            Ok(items) => state.items = items,
            Err(e) => warn!(error = %e, "Failed to read persisted cart"),
        }
        state.initialized = true;
        debug!(items = state.items.len(), "Cart store hydrated");
    }

    /// Whether [`hydrate`](Self::hydrate) has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        read_lock(&self.state).initialized
    }

    /// Snapshot of the line items in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        read_lock(&self.state).items.clone()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_qty(&self) -> u64 {
        read_lock(&self.state)
            .items
            .iter()
            .map(|item| u64::from(item.qty))
            .sum()
    }

    /// Sum of price times quantity over all items, saturating at the
    /// decimal range.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        read_lock(&self.state)
            .items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Quantity of `id` in the cart, or 0.
    #[must_use]
    pub fn get_qty(&self, id: ProductId) -> u32 {
        self.find_qty(id).unwrap_or(0)
    }

    /// Add `qty` (at least 1) of `product`, merging with an existing line.
    ///
    /// Returns whether the backend accepted the new quantity; the cart only
    /// changes when it did. Products without a positive id, a name, or a
    /// non-negative price are refused before any request.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(&self, product: Product, qty: i64) -> bool {
        if !product.is_cartable() {
            warn!(name = %product.name, price = %product.price, "Refusing malformed product");
            return false;
        }

        let qty = clamp_qty(qty.max(1));
        let existing = self.find_qty(product.id);
        let target = existing.map_or(qty, |current| current.saturating_add(qty));

        let synced = self.sync_cart_item(product.id, i64::from(target)).await;
        if !MutationPolicy::Gated.applies(synced) {
            return false;
        }

        let id = product.id;
        self.mutate(|items| {
            if let Some(item) = items.iter_mut().find(|item| item.id == id) {
                item.qty = target;
            } else if existing.is_none() {
                items.push(CartItem::new(product, target));
            }
        });
        let (id_text, qty_text) = (id.to_string(), target.to_string());
        add_breadcrumb(
            "cart",
            "Added item",
            Some(&[("product_id", id_text.as_str()), ("qty", qty_text.as_str())]),
        );
        true
    }

    /// Set the quantity of an existing line; 0 (or less) removes it.
    ///
    /// Returns `false` without contacting the backend if the line does not
    /// exist, and `false` without changing the cart if the sync fails.
    #[instrument(skip(self))]
    pub async fn set_qty(&self, id: ProductId, qty: i64) -> bool {
        let qty = clamp_qty(qty.max(0));
        if self.find_qty(id).is_none() {
            return false;
        }

        let synced = self.sync_cart_item(id, i64::from(qty)).await;
        if !MutationPolicy::Gated.applies(synced) {
            return false;
        }

        self.mutate(|items| {
            if qty == 0 {
                items.retain(|item| item.id != id);
            } else if let Some(item) = items.iter_mut().find(|item| item.id == id) {
                item.qty = qty;
            }
        });
        let (id_text, qty_text) = (id.to_string(), qty.to_string());
        add_breadcrumb(
            "cart",
            "Set quantity",
            Some(&[("product_id", id_text.as_str()), ("qty", qty_text.as_str())]),
        );
        true
    }

    /// Raise the quantity of `id` by `by` (at least 1).
    pub async fn inc(&self, id: ProductId, by: i64) -> bool {
        let target = i64::from(self.get_qty(id)).saturating_add(by.max(1));
        self.set_qty(id, target).await
    }

    /// Lower the quantity of `id` by `by` (at least 1); reaching 0 removes it.
    pub async fn dec(&self, id: ProductId, by: i64) -> bool {
        let target = i64::from(self.get_qty(id)).saturating_sub(by.max(1));
        self.set_qty(id, target).await
    }

    /// Empty the cart.
    ///
    /// When logged in, every line is synced to 0 concurrently first. Sync
    /// outcomes are ignored and the local cart is always emptied.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        let ids: Vec<ProductId> = read_lock(&self.state)
            .items
            .iter()
            .map(|item| item.id)
            .collect();

        let mut synced = true;
        if self.identity.is_authenticated() && !ids.is_empty() {
            let outcomes = join_all(ids.iter().map(|id| self.sync_cart_item(*id, 0))).await;
            let failed = outcomes.iter().filter(|ok| !**ok).count();
            if failed > 0 {
                debug!(failed, total = ids.len(), "Some cart lines were not cleared remotely");
            }
            synced = failed == 0;
        }

        if MutationPolicy::BestEffort.applies(synced) {
            self.mutate(Vec::clear);
        }
        add_breadcrumb("cart", "Cleared cart", None);
    }

    /// Write the current items to storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the write.
    pub fn persist(&self) -> Result<(), StorageError> {
        let items = self.items();
        write_json(self.storage.as_ref(), CART_KEY, &items)
    }

    /// Push one line quantity to the backend cart of the current account.
    ///
    /// Returns `false` without a request when nobody is logged in, and
    /// `false` when the request fails. Failures are logged, never raised.
    async fn sync_cart_item(&self, product_id: ProductId, quantity: i64) -> bool {
        let Some(user_id) = self.identity.user_id() else {
            debug!(%product_id, "Not logged in, skipping cart sync");
            return false;
        };

        let sync = CartSync::new(user_id, product_id, clamp_qty(quantity.max(0)));
        match self.api.sync_cart(sync).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, %product_id, "Failed to sync cart item with backend");
                false
            }
        }
    }

    fn find_qty(&self, id: ProductId) -> Option<u32> {
        read_lock(&self.state)
            .items
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.qty)
    }

    /// Apply `f` to the item list, then mirror the result to storage.
    fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut Vec<CartItem>),
    {
        let snapshot = {
            let mut state = write_lock(&self.state);
            f(&mut state.items);
            state.items.clone()
        };
        if let Err(e) = write_json(self.storage.as_ref(), CART_KEY, &snapshot) {
            warn!(error = %e, "Failed to persist cart");
        }
    }

    /// Read the persisted cart. Absent or malformed data is an empty cart.
    fn read_persisted(&self) -> Result<Vec<CartItem>, StorageError> {
        Ok(self
            .storage
            .get_item(CART_KEY)?
            .map(|raw| persisted::decode_items(&raw))
            .unwrap_or_default())
    }
}

/// Clamp a non-negative quantity into `u32`.
fn clamp_qty(qty: i64) -> u32 {
    u32::try_from(qty.max(0)).unwrap_or(u32::MAX)
}
