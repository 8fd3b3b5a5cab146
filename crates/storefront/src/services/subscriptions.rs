//! Gym price list and member subscriptions.
//!
//! Subscribing only records the request. Staff confirm it by filling in the
//! row's `status`, after which the member no longer sees the subscribe
//! option.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use rocky_gym_core::Email;

use crate::models::{NewSubscription, PriceListItem, Subscription};
use crate::supabase::{Backend, BackendError, Order, Query, Record, Table};

/// Errors from subscription operations.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The member already has a subscription row.
    #[error("you are already subscribed, please contact the gym staff to change your subscription")]
    AlreadySubscribed,

    /// No price list entry has this title.
    #[error("unknown subscription type: {0}")]
    UnknownType(String),
}

/// Where a member stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionStatus {
    /// The member's subscription row, if any.
    pub subscription: Option<Subscription>,
    /// Whether the subscribe action should be offered.
    pub can_subscribe: bool,
}

/// Subscription operations.
pub struct SubscriptionService<'a> {
    backend: &'a dyn Backend,
}

impl<'a> SubscriptionService<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    fn subscriptions(&self) -> Table<'a, Subscription> {
        Table::new(self.backend)
    }

    /// All price list entries, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn price_list(&self) -> Result<Vec<PriceListItem>, BackendError> {
        Table::<PriceListItem>::new(self.backend)
            .fetch(&Query::all().order_by("id", Order::Ascending))
            .await
    }

    /// The member's subscription, if they have one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn status(&self, email: &Email) -> Result<SubscriptionStatus, BackendError> {
        let subscription = self
            .subscriptions()
            .fetch_one(
                Query::all()
                    .eq("user_email", email.as_str())
                    .order_by("id", Order::Ascending),
            )
            .await?;

        let can_subscribe = !subscription.as_ref().is_some_and(Subscription::is_confirmed);
        Ok(SubscriptionStatus {
            subscription,
            can_subscribe,
        })
    }

    /// Request a subscription of the given type starting `today`.
    ///
    /// # Errors
    ///
    /// Returns `SubscriptionError::AlreadySubscribed` if the member has any
    /// subscription row, or `SubscriptionError::UnknownType` if the type is
    /// not on the price list.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn subscribe(
        &self,
        email: &Email,
        subscription_type: &str,
        today: NaiveDate,
    ) -> Result<Subscription, SubscriptionError> {
        // Only the row count matters.
        let existing = self
            .backend
            .select(
                Subscription::TABLE,
                &Query::all().columns("id").eq("user_email", email.as_str()),
            )
            .await?;
        if !existing.is_empty() {
            return Err(SubscriptionError::AlreadySubscribed);
        }

        let entry = self
            .price_list()
            .await?
            .into_iter()
            .find(|item| item.title == subscription_type)
            .ok_or_else(|| SubscriptionError::UnknownType(subscription_type.to_string()))?;

        let subscription = self
            .subscriptions()
            .insert(&NewSubscription {
                user_email: email.as_str().to_string(),
                subscription_type: entry.title.clone(),
                created_at: today,
                will_finish_at: entry.duration().finish_date(today),
            })
            .await?;

        info!(
            subscription_type = %subscription.subscription_type,
            will_finish_at = %subscription.will_finish_at,
            "Subscription requested"
        );
        Ok(subscription)
    }
}
