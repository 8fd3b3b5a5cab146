//! Member carts.

use tracing::{instrument, warn};

use rocky_gym_core::{CartItemId, ProductId, UserId};

use crate::models::{Cart, CartItem, CartLine, NewCartItem, Product};
use crate::supabase::{Backend, BackendError, Filter, Order, Query, Table};

/// Cart operations for one member.
pub struct CartService<'a> {
    backend: &'a dyn Backend,
    user: UserId,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend, user: UserId) -> Self {
        Self { backend, user }
    }

    fn items(&self) -> Table<'a, CartItem> {
        Table::new(self.backend)
    }

    /// Only rows owned by this member.
    fn own_item(&self, item: CartItemId) -> Filter {
        Filter::eq("id", item.as_i64()).and_eq("user_id", self.user.to_string())
    }

    /// The member's cart, each row joined with its product.
    ///
    /// Rows whose product can no longer be read are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart rows cannot be read.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn list_cart(&self) -> Result<Cart, BackendError> {
        let items = self
            .items()
            .fetch(
                &Query::all()
                    .eq("user_id", self.user.to_string())
                    .order_by("id", Order::Ascending),
            )
            .await?;

        let products = Table::<Product>::new(self.backend);
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            match products
                .fetch_one(Query::all().eq("id", item.product_id.as_i64()))
                .await
            {
                Ok(Some(product)) => lines.push(CartLine { item, product }),
                Ok(None) => {
                    warn!(item = %item.id, product = %item.product_id, "Cart item references a missing product");
                }
                Err(e) => {
                    warn!(item = %item.id, error = %e, "Failed to load product for cart item");
                }
            }
        }

        Ok(Cart::new(lines))
    }

    /// Put one unit of a product in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    #[instrument(skip(self), fields(user = %self.user, product = %product))]
    pub async fn add_to_cart(&self, product: ProductId) -> Result<CartItem, BackendError> {
        self.items()
            .insert(&NewCartItem {
                product_id: product,
                quantity: 1,
                user_id: self.user,
            })
            .await
    }

    /// Set a row's quantity and return the refreshed cart.
    ///
    /// Quantities below one leave the row untouched; use
    /// [`CartService::remove_item`] to drop it.
    ///
    /// # Errors
    ///
    /// Returns an error if the update or the refresh fails.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn update_quantity(
        &self,
        item: CartItemId,
        quantity: i64,
    ) -> Result<Cart, BackendError> {
        if let Ok(quantity @ 1..) = u32::try_from(quantity) {
            self.items()
                .update(
                    &self.own_item(item),
                    &serde_json::json!({ "quantity": quantity }),
                )
                .await?;
        }
        self.list_cart().await
    }

    /// Delete a row and return the refreshed cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete or the refresh fails.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn remove_item(&self, item: CartItemId) -> Result<Cart, BackendError> {
        self.items().delete(&self.own_item(item)).await?;
        self.list_cart().await
    }
}
