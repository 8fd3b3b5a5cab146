//! Typed access to backend tables.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Backend, BackendError, Filter, Query};

/// A row type stored in a backend table.
pub trait Record: DeserializeOwned + Send {
    /// Table name.
    const TABLE: &'static str;
}

/// Typed view over one table.
pub struct Table<'a, R> {
    backend: &'a dyn Backend,
    _row: PhantomData<fn() -> R>,
}

impl<'a, R: Record> Table<'a, R> {
    #[must_use]
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            _row: PhantomData,
        }
    }

    /// Fetch rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a row does not decode.
    pub async fn fetch(&self, query: &Query) -> Result<Vec<R>, BackendError> {
        let rows = self.backend.select(R::TABLE, query).await?;
        decode_rows(rows)
    }

    /// Fetch the first row matching `query`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the row does not decode.
    pub async fn fetch_one(&self, query: Query) -> Result<Option<R>, BackendError> {
        let rows = self.fetch(&query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert a row and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the stored row does not decode.
    pub async fn insert(&self, row: &(impl Serialize + Sync)) -> Result<R, BackendError> {
        let stored = self
            .backend
            .insert(R::TABLE, serde_json::to_value(row)?)
            .await?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Patch rows matching `filter`, returning the changed rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a row does not decode.
    pub async fn update(
        &self,
        filter: &Filter,
        patch: &(impl Serialize + Sync),
    ) -> Result<Vec<R>, BackendError> {
        let rows = self
            .backend
            .update(R::TABLE, filter, serde_json::to_value(patch)?)
            .await?;
        decode_rows(rows)
    }

    /// Delete rows matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, filter: &Filter) -> Result<u64, BackendError> {
        self.backend.delete(R::TABLE, filter).await
    }
}

fn decode_rows<R: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<R>, BackendError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(BackendError::from))
        .collect()
}
