//! Request handling for the bag catalog
//!
//! Validates input, calls the storage layer and maps rows to response
//! shapes. Storage absence (`None` / `false`) becomes `NotFound` here; a
//! write that finds no row right after a successful existence check is an
//! `Internal` error, never a silent success.

use bolsos_common::BagStore;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::{ApiError, ApiResult};
use crate::models::{BagInput, BagResponse, DeleteConfirmation};
use crate::validation::validate_bag;

/// Bag operations over an injected storage handle
#[derive(Clone)]
pub struct BagService {
    store: Arc<dyn BagStore>,
}

impl BagService {
    pub fn new(store: Arc<dyn BagStore>) -> Self {
        Self { store }
    }

    /// All bags, most recently created first
    pub async fn list(&self) -> ApiResult<Vec<BagResponse>> {
        debug!(operation = "list", "Listing bags");

        let rows = self.store.list_all().await.map_err(|e| {
            error!(operation = "list", error = %e, "Storage failure");
            ApiError::from(e)
        })?;

        Ok(rows.into_iter().map(BagResponse::from).collect())
    }

    pub async fn get(&self, id: u64) -> ApiResult<BagResponse> {
        debug!(operation = "get", id, "Fetching bag");

        match self.fetch("get", id).await? {
            Some(bag) => Ok(bag),
            None => {
                debug!(operation = "get", id, "Bag not found");
                Err(ApiError::NotFound(id))
            }
        }
    }

    /// Validate, insert, then re-read the stored row
    pub async fn create(&self, input: BagInput) -> ApiResult<BagResponse> {
        debug!(operation = "create", "Creating bag");

        let bag = validate_bag(input).inspect_err(|e| {
            warn!(operation = "create", error = %e, "Rejected input");
        })?;

        let id = self.store.create(&bag).await.map_err(|e| {
            error!(operation = "create", sku = %bag.sku, error = %e, "Storage failure");
            ApiError::from(e)
        })?;

        self.fetch("create", id).await?.ok_or_else(|| {
            error!(operation = "create", id, "Created bag vanished before re-read");
            ApiError::Internal(format!("Bag {} was created but could not be read back", id))
        })
    }

    /// Full replace of bag `id`
    ///
    /// The existence check runs before validation, so an unknown id is
    /// reported as NotFound even when the body is also invalid.
    pub async fn update(&self, id: u64, input: BagInput) -> ApiResult<BagResponse> {
        debug!(operation = "update", id, "Updating bag");

        if self.fetch("update", id).await?.is_none() {
            debug!(operation = "update", id, "Bag not found");
            return Err(ApiError::NotFound(id));
        }

        let bag = validate_bag(input).inspect_err(|e| {
            warn!(operation = "update", id, error = %e, "Rejected input");
        })?;

        let updated = self.store.update(id, &bag).await.map_err(|e| {
            error!(operation = "update", id, error = %e, "Storage failure");
            ApiError::from(e)
        })?;

        if !updated {
            error!(operation = "update", id, "Bag disappeared between existence check and update");
            return Err(ApiError::Internal(format!("Bag {} could not be updated", id)));
        }

        self.fetch("update", id).await?.ok_or_else(|| {
            error!(operation = "update", id, "Updated bag vanished before re-read");
            ApiError::Internal(format!("Bag {} was updated but could not be read back", id))
        })
    }

    pub async fn delete(&self, id: u64) -> ApiResult<DeleteConfirmation> {
        debug!(operation = "delete", id, "Deleting bag");

        if self.fetch("delete", id).await?.is_none() {
            debug!(operation = "delete", id, "Bag not found");
            return Err(ApiError::NotFound(id));
        }

        let deleted = self.store.delete(id).await.map_err(|e| {
            error!(operation = "delete", id, error = %e, "Storage failure");
            ApiError::from(e)
        })?;

        if !deleted {
            error!(operation = "delete", id, "Bag disappeared between existence check and delete");
            return Err(ApiError::Internal(format!("Bag {} could not be deleted", id)));
        }

        Ok(DeleteConfirmation::new(id))
    }

    async fn fetch(&self, operation: &'static str, id: u64) -> ApiResult<Option<BagResponse>> {
        let row = self.store.get_by_id(id).await.map_err(|e| {
            error!(operation, id, error = %e, "Storage failure");
            ApiError::from(e)
        })?;

        Ok(row.map(BagResponse::from))
    }
}
