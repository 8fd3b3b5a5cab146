//! Products, supplements and exercises.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rocky_gym_core::{ExerciseId, Price, ProductId, SupplementId};

use crate::supabase::Record;

/// Gear sold at the front desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    /// Public image URL.
    #[serde(default, alias = "image_url")]
    pub image: Option<String>,
}

impl Product {
    #[must_use]
    pub const fn price(&self) -> Price {
        Price::egp(self.price)
    }
}

impl Record for Product {
    const TABLE: &'static str = "products";
}

/// A nutritional supplement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplement {
    pub id: SupplementId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default, alias = "image_url")]
    pub image: Option<String>,
    /// Dosage instructions.
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
}

impl Supplement {
    #[must_use]
    pub const fn price(&self) -> Price {
        Price::egp(self.price)
    }
}

impl Record for Supplement {
    const TABLE: &'static str = "supplements";
}

/// An exercise with its Arabic and English names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    #[serde(rename = "exercise_in_arabic")]
    pub arabic: String,
    #[serde(rename = "exercise_in_english")]
    pub english: String,
}

impl Record for Exercise {
    const TABLE: &'static str = "exercises";
}
