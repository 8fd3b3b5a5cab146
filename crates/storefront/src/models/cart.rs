//! Cart rows and the assembled cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rocky_gym_core::{CartItemId, Price, ProductId, UserId};

use super::Product;
use crate::supabase::Record;

/// A row in `cart_items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub user_id: UserId,
}

impl Record for CartItem {
    const TABLE: &'static str = "cart_items";
}

/// Insert payload for `cart_items`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub user_id: UserId,
}

/// A cart row joined with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

impl CartLine {
    /// Product price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.price().times(self.item.quantity)
    }
}

/// A member's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub total: Price,
}

impl Cart {
    /// Assemble a cart, computing the total over `lines`.
    #[must_use]
    pub fn new(lines: Vec<CartLine>) -> Self {
        let amount: Decimal = lines.iter().map(|line| line.subtotal().amount).sum();
        Self {
            lines,
            total: Price::egp(amount),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
