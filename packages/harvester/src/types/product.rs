//! Canonical product record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One harvested catalog item in canonical form.
///
/// Keyed by `(store_id, stock_code)`. Allergen lists are always present
/// (possibly empty) once a record has been normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Deployment-wide store identifier (e.g. "W01")
    pub store_id: String,

    /// Resolved catalog code; may differ from the scanned identifier
    pub stock_code: i64,

    pub cup_string: Option<String>,
    pub small_image: Option<String>,
    pub medium_image: Option<String>,
    pub large_image: Option<String>,
    pub url_friendly_name: Option<String>,

    /// Shelf price, kept as an exact decimal
    pub price: Decimal,

    /// Short display name (upstream `Description`)
    pub name: Option<String>,

    /// Long description (upstream `RichDescription`)
    pub description: Option<String>,

    pub department: Option<String>,
    pub category: Option<String>,
    pub ingredients: Option<String>,

    #[serde(default)]
    pub nutritional_information: Vec<NutritionEntry>,

    #[serde(default)]
    pub allergen_contains: Vec<String>,

    #[serde(default)]
    pub allergen_may_be_present: Vec<String>,

    pub allergy_statement: Option<String>,
}

impl ProductRecord {
    /// Create a record with only the required fields set.
    pub fn new(store_id: impl Into<String>, stock_code: i64, price: Decimal) -> Self {
        Self {
            store_id: store_id.into(),
            stock_code,
            cup_string: None,
            small_image: None,
            medium_image: None,
            large_image: None,
            url_friendly_name: None,
            price,
            name: None,
            description: None,
            department: None,
            category: None,
            ingredients: None,
            nutritional_information: Vec::new(),
            allergen_contains: Vec::new(),
            allergen_may_be_present: Vec::new(),
            allergy_statement: None,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Short label used in activity log lines.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// One row of a product's nutrition panel.
///
/// Every field is optional: upstream panels routinely omit values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionEntry {
    pub name: Option<String>,
    pub avg_qty_per_serving: Option<String>,
    pub avg_qty_per_100g: Option<String>,
    pub serving_size: Option<String>,
    pub servings_per_pack: Option<String>,
}
