//! Products, supplements and exercises.
//!
//! Catalog tables change rarely, so whole listings are cached for 5 minutes.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use rocky_gym_core::{ProductId, SupplementId};

use crate::models::{Exercise, Product, Supplement};
use crate::supabase::{Backend, BackendError, Order, Query, Record, Table};

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("supplement {0} not found")]
    SupplementNotFound(SupplementId),
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Products,
    Supplements,
    Exercises,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Supplements(Arc<Vec<Supplement>>),
    Exercises(Arc<Vec<Exercise>>),
}

/// A prefilled chat message asking about an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inquiry {
    pub message: String,
    /// Chat link with the message attached.
    pub link: Url,
}

/// Read access to the catalog.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    backend: Arc<dyn Backend>,
    contact_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, contact_url: Url) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner {
                backend,
                contact_url,
                cache,
            }),
        }
    }

    async fn fetch_all<R: Record>(&self) -> Result<Vec<R>, BackendError> {
        Table::<R>::new(self.inner.backend.as_ref())
            .fetch(&Query::all().order_by("id", Order::Ascending))
            .await
    }

    /// All products, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = Arc::new(self.fetch_all::<Product>().await?);
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// All supplements, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn list_supplements(&self) -> Result<Arc<Vec<Supplement>>, CatalogError> {
        if let Some(CacheValue::Supplements(supplements)) =
            self.inner.cache.get(&CacheKey::Supplements).await
        {
            debug!("Cache hit for supplements");
            return Ok(supplements);
        }

        let supplements = Arc::new(self.fetch_all::<Supplement>().await?);
        self.inner
            .cache
            .insert(
                CacheKey::Supplements,
                CacheValue::Supplements(Arc::clone(&supplements)),
            )
            .await;
        Ok(supplements)
    }

    /// All exercises, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn list_exercises(&self) -> Result<Arc<Vec<Exercise>>, CatalogError> {
        if let Some(CacheValue::Exercises(exercises)) =
            self.inner.cache.get(&CacheKey::Exercises).await
        {
            debug!("Cache hit for exercises");
            return Ok(exercises);
        }

        let exercises = Arc::new(self.fetch_all::<Exercise>().await?);
        self.inner
            .cache
            .insert(
                CacheKey::Exercises,
                CacheValue::Exercises(Arc::clone(&exercises)),
            )
            .await;
        Ok(exercises)
    }

    /// Look up a product in the cached listing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if no product has this id.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.list_products()
            .await?
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Look up a supplement in the cached listing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::SupplementNotFound` if no supplement has this id.
    pub async fn get_supplement(&self, id: SupplementId) -> Result<Supplement, CatalogError> {
        self.list_supplements()
            .await?
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(CatalogError::SupplementNotFound(id))
    }

    /// "I'm interested in this product" message for the gym chat.
    #[must_use]
    pub fn product_inquiry(&self, product: &Product) -> Inquiry {
        self.inquiry(format!("مرحبًا، أنا مهتم بالمنتج: {}", product.name))
    }

    /// "I'm interested in this supplement" message for the gym chat.
    #[must_use]
    pub fn supplement_inquiry(&self, supplement: &Supplement) -> Inquiry {
        self.inquiry(format!(
            "مرحبًا، أنا مهتم بالمكمل الغذائي: {}",
            supplement.name
        ))
    }

    /// The bare chat link, for "talk to a coach" buttons.
    #[must_use]
    pub fn contact_url(&self) -> &Url {
        &self.inner.contact_url
    }

    fn inquiry(&self, message: String) -> Inquiry {
        let mut link = self.inner.contact_url.clone();
        link.query_pairs_mut().append_pair("text", &message);
        Inquiry { message, link }
    }

    /// Drop every cached listing.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
