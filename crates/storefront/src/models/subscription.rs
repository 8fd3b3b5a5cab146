//! Price list and member subscriptions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rocky_gym_core::{Price, PriceListId, SubscriptionDuration, SubscriptionId};

use crate::supabase::Record;

/// A row of `gym_pricelist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceListItem {
    pub id: PriceListId,
    /// Subscription type, as offered to members.
    pub title: String,
    pub price: Decimal,
    /// Duration label (e.g., "month", "3 months").
    pub duration: String,
}

impl PriceListItem {
    #[must_use]
    pub const fn price(&self) -> Price {
        Price::egp(self.price)
    }

    #[must_use]
    pub fn duration(&self) -> SubscriptionDuration {
        SubscriptionDuration::from_label(&self.duration)
    }
}

impl Record for PriceListItem {
    const TABLE: &'static str = "gym_pricelist";
}

/// A row of `users_subscription`.
///
/// `status` stays empty until staff confirm the subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_email: String,
    pub subscription_type: String,
    pub created_at: NaiveDate,
    pub will_finish_at: NaiveDate,
    #[serde(default)]
    pub status: Option<String>,
}

impl Subscription {
    /// Whether staff have confirmed this subscription.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

impl Record for Subscription {
    const TABLE: &'static str = "users_subscription";
}

/// Insert payload for `users_subscription`.
#[derive(Debug, Clone, Serialize)]
pub struct NewSubscription {
    pub user_email: String,
    pub subscription_type: String,
    pub created_at: NaiveDate,
    pub will_finish_at: NaiveDate,
}
