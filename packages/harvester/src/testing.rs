//! Testing utilities.
//!
//! Canned upstream payloads and store doubles for exercising the harvester
//! without network or database access. `MockFetcher`, `MemoryStore` and
//! `MemoryActivityLog` are re-exported here for convenience.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};

use crate::error::{HarvestError, Result};
use crate::traits::store::RecordStore;
use crate::types::{checkpoint::ScanCheckpoint, product::ProductRecord};

pub use crate::activity::MemoryActivityLog;
pub use crate::fetchers::MockFetcher;
pub use crate::stores::MemoryStore;

/// A complete upstream detail payload for `id`.
///
/// Price 3.50, department "Dairy", aisle "Milk", allergens `"Milk, Soy"` /
/// `"Gluten"` and a one-row nutrition panel.
pub fn product_body(id: i64) -> Value {
    json!({
        "Product": {
            "Stockcode": id,
            "CupString": "$1.75 / 1L",
            "SmallImageFile": format!("https://cdn.example.com/small/{}.jpg", id),
            "MediumImageFile": format!("https://cdn.example.com/medium/{}.jpg", id),
            "LargeImageFile": format!("https://cdn.example.com/large/{}.jpg", id),
            "UrlFriendlyName": format!("test-product-{}", id),
            "Price": 3.5,
            "Description": format!("Test Product {}", id),
            "RichDescription": "<p>Fresh full cream milk</p>"
        },
        "PrimaryCategory": {
            "Department": "Dairy",
            "Aisle": "Milk"
        },
        "AdditionalAttributes": {
            "ingredients": "Milk, Soy Lecithin",
            "allergencontains": "Milk, Soy",
            "allergenmaybepresent": "Gluten",
            "allergystatement": "Contains milk and soy."
        },
        "NutritionalInformation": [
            {
                "Name": "Energy",
                "Values": {
                    "Avg Qty Per Serving": "680kJ",
                    "Avg Qty Per 100g": "272kJ"
                },
                "ServingSize": "250mL",
                "ServingsPerPack": "8"
            }
        ]
    })
}

/// Upstream payload for an identifier with no product.
pub fn missing_product_body() -> Value {
    json!({ "Product": null })
}

/// Store whose product writes always fail.
///
/// Serves a fixed checkpoint and counts checkpoint saves so tests can assert
/// a failed run never advanced it.
#[derive(Clone)]
pub struct FailingStore {
    checkpoint: ScanCheckpoint,
    checkpoint_saves: Arc<RwLock<usize>>,
}

impl FailingStore {
    pub fn new(checkpoint: ScanCheckpoint) -> Self {
        Self {
            checkpoint,
            checkpoint_saves: Arc::new(RwLock::new(0)),
        }
    }

    pub fn checkpoint_saves(&self) -> usize {
        *self.checkpoint_saves.read().unwrap()
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn find_checkpoint(&self) -> Result<Option<ScanCheckpoint>> {
        Ok(Some(self.checkpoint))
    }

    async fn save_checkpoint(&self, _checkpoint: &ScanCheckpoint) -> Result<()> {
        *self.checkpoint_saves.write().unwrap() += 1;
        Ok(())
    }

    async fn create_product(&self, product: &ProductRecord) -> Result<()> {
        Err(HarvestError::storage(std::io::Error::other(format!(
            "write rejected for stock code {}",
            product.stock_code
        ))))
    }

    async fn find_product(
        &self,
        _store_id: &str,
        _stock_code: i64,
    ) -> Result<Option<ProductRecord>> {
        Ok(None)
    }

    async fn count_products(&self) -> Result<u64> {
        Ok(0)
    }
}
