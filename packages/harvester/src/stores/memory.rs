//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::Result;
use crate::traits::store::RecordStore;
use crate::types::{checkpoint::ScanCheckpoint, product::ProductRecord};

#[derive(Default)]
struct MemoryState {
    checkpoint: Option<ScanCheckpoint>,
    checkpoint_saves: usize,
    products: HashMap<(String, i64), ProductRecord>,
}

/// In-memory storage for the checkpoint and product records.
///
/// Clones share state, so a test can hand one clone to a driver and inspect
/// the other afterwards. Not suitable for production as data is lost on
/// restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `checkpoint`.
    pub fn with_checkpoint(checkpoint: ScanCheckpoint) -> Self {
        let store = Self::new();
        store.state.write().unwrap().checkpoint = Some(checkpoint);
        store
    }

    /// Current checkpoint.
    pub fn checkpoint(&self) -> Option<ScanCheckpoint> {
        self.state.read().unwrap().checkpoint
    }

    /// Number of `save_checkpoint` calls (seeding not included).
    pub fn checkpoint_saves(&self) -> usize {
        self.state.read().unwrap().checkpoint_saves
    }

    /// Get the number of stored products.
    pub fn product_count(&self) -> usize {
        self.state.read().unwrap().products.len()
    }

    /// All stored products ordered by stock code.
    pub fn products(&self) -> Vec<ProductRecord> {
        let mut products: Vec<_> = self
            .state
            .read()
            .unwrap()
            .products
            .values()
            .cloned()
            .collect();
        products.sort_by(|a, b| {
            (a.stock_code, a.store_id.as_str()).cmp(&(b.stock_code, b.store_id.as_str()))
        });
        products
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap();
        *state = MemoryState::default();
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_checkpoint(&self) -> Result<Option<ScanCheckpoint>> {
        Ok(self.state.read().unwrap().checkpoint)
    }

    async fn save_checkpoint(&self, checkpoint: &ScanCheckpoint) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.checkpoint = Some(*checkpoint);
        state.checkpoint_saves += 1;
        Ok(())
    }

    async fn create_product(&self, product: &ProductRecord) -> Result<()> {
        self.state.write().unwrap().products.insert(
            (product.store_id.clone(), product.stock_code),
            product.clone(),
        );
        Ok(())
    }

    async fn find_product(
        &self,
        store_id: &str,
        stock_code: i64,
    ) -> Result<Option<ProductRecord>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .products
            .get(&(store_id.to_string(), stock_code))
            .cloned())
    }

    async fn count_products(&self) -> Result<u64> {
        Ok(self.state.read().unwrap().products.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_checkpoint_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.find_checkpoint().await.unwrap(), None);

        store
            .save_checkpoint(&ScanCheckpoint::new(1, 7000))
            .await
            .unwrap();
        assert_eq!(
            store.find_checkpoint().await.unwrap(),
            Some(ScanCheckpoint::new(1, 7000))
        );
        assert_eq!(store.checkpoint_saves(), 1);
    }

    #[tokio::test]
    async fn test_create_product_replaces_same_key() {
        let store = MemoryStore::new();
        let first = ProductRecord::new("W01", 42, Decimal::new(350, 2)).with_name("Milk");
        let second = ProductRecord::new("W01", 42, Decimal::new(399, 2)).with_name("Milk 2L");
        let other_store = ProductRecord::new("W02", 42, Decimal::new(100, 2));

        store.create_product(&first).await.unwrap();
        store.create_product(&second).await.unwrap();
        store.create_product(&other_store).await.unwrap();

        assert_eq!(store.count_products().await.unwrap(), 2);
        let found = store.find_product("W01", 42).await.unwrap().unwrap();
        assert_eq!(found.price, Decimal::new(399, 2));
        assert_eq!(found.name.as_deref(), Some("Milk 2L"));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::with_checkpoint(ScanCheckpoint::new(1, 2));
        let clone = store.clone();

        clone
            .create_product(&ProductRecord::new("W01", 1, Decimal::ONE))
            .await
            .unwrap();
        assert_eq!(store.product_count(), 1);

        store.clear();
        assert_eq!(clone.checkpoint(), None);
        assert_eq!(clone.product_count(), 0);
    }
}
