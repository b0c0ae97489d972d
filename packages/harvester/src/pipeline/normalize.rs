//! Record normalization: raw catalog payload → `ProductRecord`.
//!
//! Upstream payloads are loosely shaped. Missing sections degrade to empty
//! fields; only structural violations (wrong JSON kind where an object or
//! number is required) are reported as `NormalizeError::Schema`.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{NormalizeError, NormalizeResult};
use crate::types::{
    payload::RawPayload,
    product::{NutritionEntry, ProductRecord},
};

const PRODUCT: &str = "Product";
const PRIMARY_CATEGORY: &str = "PrimaryCategory";
const ADDITIONAL_ATTRIBUTES: &str = "AdditionalAttributes";
const NUTRITIONAL_INFORMATION: &str = "NutritionalInformation";

/// Allergen field as it arrives, before coercion to a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllergenInput {
    /// Null, missing, or a JSON kind that carries no allergen text
    Absent,

    /// Free text such as `"Milk, Soy"` or `"Gluten|Egg"`
    ScalarString(String),

    /// Already a list (e.g. from a previous normalization pass)
    AlreadySequence(Vec<String>),
}

impl AllergenInput {
    /// Classify a raw JSON value.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => AllergenInput::ScalarString(s.clone()),
            Some(Value::Array(items)) => {
                AllergenInput::AlreadySequence(items.iter().filter_map(loose_text).collect())
            }
            _ => AllergenInput::Absent,
        }
    }
}

/// Coerce an allergen input into a list of trimmed names.
///
/// Strings split on `,` if one is present, otherwise on `|`, otherwise
/// become a single element. Lists pass through unchanged.
pub fn coerce_allergens(input: AllergenInput) -> Vec<String> {
    match input {
        AllergenInput::Absent => Vec::new(),
        AllergenInput::AlreadySequence(items) => items,
        AllergenInput::ScalarString(raw) => split_allergens(&raw),
    }
}

fn split_allergens(raw: &str) -> Vec<String> {
    let delimiter = if raw.contains(',') {
        Some(',')
    } else if raw.contains('|') {
        Some('|')
    } else {
        None
    };

    match delimiter {
        Some(d) => raw.split(d).map(|item| item.trim().to_string()).collect(),
        None => vec![raw.trim().to_string()],
    }
}

/// Normalize one payload.
///
/// Returns `Ok(None)` when the payload has no product or no price: the
/// identifier does not resolve to a sellable item.
pub fn normalize(raw: &RawPayload, store_id: &str) -> NormalizeResult<Option<ProductRecord>> {
    let root = raw.body.as_object().ok_or_else(|| {
        NormalizeError::schema("$", format!("expected object, found {}", kind(&raw.body)))
    })?;

    let Some(product) = section(root, PRODUCT)? else {
        return Ok(None);
    };
    let Some(price) = parse_price(product.get("Price"))? else {
        return Ok(None);
    };

    let stock_code = match parse_stock_code(product.get("Stockcode"))? {
        Some(code) => code,
        None => {
            debug!(id = raw.id, "payload has no Stockcode, using scanned id");
            raw.id
        }
    };

    let mut record = ProductRecord::new(store_id, stock_code, price);
    record.cup_string = text(product, PRODUCT, "CupString")?;
    record.small_image = text(product, PRODUCT, "SmallImageFile")?;
    record.medium_image = text(product, PRODUCT, "MediumImageFile")?;
    record.large_image = text(product, PRODUCT, "LargeImageFile")?;
    record.url_friendly_name = text(product, PRODUCT, "UrlFriendlyName")?;
    record.name = text(product, PRODUCT, "Description")?;
    record.description = text(product, PRODUCT, "RichDescription")?;

    if let Some(category) = section(root, PRIMARY_CATEGORY)? {
        record.department = text(category, PRIMARY_CATEGORY, "Department")?;
        record.category = text(category, PRIMARY_CATEGORY, "Aisle")?;
    }

    if let Some(attributes) = section(root, ADDITIONAL_ATTRIBUTES)? {
        record.ingredients = text(attributes, ADDITIONAL_ATTRIBUTES, "ingredients")?;
        record.allergen_contains = coerce_allergens(AllergenInput::from_value(
            attributes.get("allergencontains"),
        ));
        record.allergen_may_be_present = coerce_allergens(AllergenInput::from_value(
            attributes.get("allergenmaybepresent"),
        ));
        record.allergy_statement = text(attributes, ADDITIONAL_ATTRIBUTES, "allergystatement")?;
    }

    record.nutritional_information = nutrition(root.get(NUTRITIONAL_INFORMATION));

    Ok(Some(record))
}

fn section<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
) -> NormalizeResult<Option<&'a Map<String, Value>>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(NormalizeError::schema(
            key,
            format!("expected object, found {}", kind(other)),
        )),
    }
}

fn text(obj: &Map<String, Value>, section: &str, key: &str) -> NormalizeResult<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value @ (Value::Array(_) | Value::Object(_))) => Err(NormalizeError::schema(
            format!("{}.{}", section, key),
            format!("expected string, found {}", kind(value)),
        )),
        Some(value) => Ok(loose_text(value)),
    }
}

/// Scalar JSON as text; `None` for null, arrays and objects.
fn loose_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_price(value: Option<&Value>) -> NormalizeResult<Option<Decimal>> {
    let invalid = |found: &str| {
        NormalizeError::schema("Product.Price", format!("expected number, found {}", found))
    };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => decimal_from_str(&n.to_string())
            .map(Some)
            .ok_or_else(|| invalid(&n.to_string())),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => decimal_from_str(s.trim())
            .map(Some)
            .ok_or_else(|| invalid(&format!("\"{}\"", s))),
        Some(other) => Err(invalid(kind(other))),
    }
}

fn decimal_from_str(s: &str) -> Option<Decimal> {
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

fn parse_stock_code(value: Option<&Value>) -> NormalizeResult<Option<i64>> {
    let invalid = |found: String| {
        NormalizeError::schema(
            "Product.Stockcode",
            format!("expected integer, found {}", found),
        )
    };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(code) = n.as_i64() {
                return Ok(Some(code));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                _ => Err(invalid(n.to_string())),
            }
        }
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(format!("\"{}\"", s))),
        Some(other) => Err(invalid(kind(other).to_string())),
    }
}

/// Map the nutrition panel; anything but an array yields an empty list.
fn nutrition(value: Option<&Value>) -> Vec<NutritionEntry> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| {
            let values = item.get("Values").and_then(Value::as_object);
            let nested = |key: &str| values.and_then(|v| v.get(key)).and_then(loose_text);
            NutritionEntry {
                name: item.get("Name").and_then(loose_text),
                avg_qty_per_serving: nested("Avg Qty Per Serving"),
                avg_qty_per_100g: nested("Avg Qty Per 100g"),
                serving_size: item.get("ServingSize").and_then(loose_text),
                servings_per_pack: item.get("ServingsPerPack").and_then(loose_text),
            }
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::product_body;
    use serde_json::json;

    fn payload(body: Value) -> RawPayload {
        RawPayload::new(5, body)
    }

    #[test]
    fn test_full_product() {
        let record = normalize(&payload(product_body(5)), "W01")
            .unwrap()
            .unwrap();

        assert_eq!(record.store_id, "W01");
        assert_eq!(record.stock_code, 5);
        assert_eq!(record.price, Decimal::new(350, 2));
        assert_eq!(record.name.as_deref(), Some("Test Product 5"));
        assert_eq!(record.department.as_deref(), Some("Dairy"));
        assert_eq!(record.category.as_deref(), Some("Milk"));
        assert_eq!(record.allergen_contains, vec!["Milk", "Soy"]);
        assert_eq!(record.allergen_may_be_present, vec!["Gluten"]);
        assert_eq!(record.nutritional_information.len(), 1);
        assert_eq!(
            record.nutritional_information[0].avg_qty_per_100g.as_deref(),
            Some("272kJ")
        );
    }

    #[test]
    fn test_null_product_is_absent() {
        assert!(normalize(&payload(json!({ "Product": null })), "W01")
            .unwrap()
            .is_none());
        assert!(normalize(&payload(json!({})), "W01").unwrap().is_none());
    }

    #[test]
    fn test_null_price_is_absent() {
        let mut body = product_body(5);
        body["Product"]["Price"] = Value::Null;
        assert!(normalize(&payload(body), "W01").unwrap().is_none());
    }

    #[test]
    fn test_non_object_body_is_schema_error() {
        let err = normalize(&payload(json!([1, 2, 3])), "W01").unwrap_err();
        assert!(matches!(err, NormalizeError::Schema { ref field, .. } if field == "$"));
    }

    #[test]
    fn test_product_wrong_kind_is_schema_error() {
        let err = normalize(&payload(json!({ "Product": "gone" })), "W01").unwrap_err();
        assert!(matches!(err, NormalizeError::Schema { ref field, .. } if field == "Product"));
    }

    #[test]
    fn test_unparseable_price_is_schema_error() {
        let mut body = product_body(5);
        body["Product"]["Price"] = json!("three fifty");
        assert!(normalize(&payload(body), "W01").is_err());
    }

    #[test]
    fn test_string_price_is_parsed() {
        let mut body = product_body(5);
        body["Product"]["Price"] = json!(" 4.20 ");
        let record = normalize(&payload(body), "W01").unwrap().unwrap();
        assert_eq!(record.price, Decimal::new(420, 2));
    }

    #[test]
    fn test_stock_code_differs_from_scan_index() {
        let mut body = product_body(5);
        body["Product"]["Stockcode"] = json!(123456);
        let record = normalize(&payload(body), "W01").unwrap().unwrap();
        assert_eq!(record.stock_code, 123456);
    }

    #[test]
    fn test_missing_stock_code_falls_back_to_id() {
        let mut body = product_body(5);
        body["Product"]
            .as_object_mut()
            .unwrap()
            .remove("Stockcode");
        let record = normalize(&RawPayload::new(77, body), "W01")
            .unwrap()
            .unwrap();
        assert_eq!(record.stock_code, 77);
    }

    #[test]
    fn test_null_category_and_attributes() {
        let mut body = product_body(5);
        body["PrimaryCategory"] = Value::Null;
        body["AdditionalAttributes"] = Value::Null;

        let record = normalize(&payload(body), "W01").unwrap().unwrap();
        assert!(record.department.is_none());
        assert!(record.category.is_none());
        assert!(record.ingredients.is_none());
        assert!(record.allergy_statement.is_none());
        assert!(record.allergen_contains.is_empty());
        assert!(record.allergen_may_be_present.is_empty());
    }

    #[test]
    fn test_blank_allergen_string_is_kept() {
        let mut body = product_body(5);
        body["AdditionalAttributes"]["allergencontains"] = json!("  ");
        body["AdditionalAttributes"]["allergenmaybepresent"] = json!("");

        let record = normalize(&payload(body), "W01").unwrap().unwrap();
        assert_eq!(record.allergen_contains, vec![""]);
        assert_eq!(record.allergen_may_be_present, vec![""]);
    }

    #[test]
    fn test_nutrition_absent_or_wrong_kind_is_empty() {
        let mut body = product_body(5);
        body.as_object_mut().unwrap().remove(NUTRITIONAL_INFORMATION);
        let record = normalize(&payload(body.clone()), "W01").unwrap().unwrap();
        assert!(record.nutritional_information.is_empty());

        body[NUTRITIONAL_INFORMATION] = json!("n/a");
        let record = normalize(&payload(body), "W01").unwrap().unwrap();
        assert!(record.nutritional_information.is_empty());
    }

    #[test]
    fn test_nutrition_missing_values_propagate_none() {
        let mut body = product_body(5);
        body[NUTRITIONAL_INFORMATION] = json!([
            { "Name": "Energy", "ServingSize": "250mL" },
            "garbage",
            { "Name": "Protein", "Values": { "Avg Qty Per Serving": "8.5g" } }
        ]);

        let record = normalize(&payload(body), "W01").unwrap().unwrap();
        let panel = &record.nutritional_information;
        assert_eq!(panel.len(), 2);
        assert_eq!(panel[0].name.as_deref(), Some("Energy"));
        assert!(panel[0].avg_qty_per_serving.is_none());
        assert_eq!(panel[0].serving_size.as_deref(), Some("250mL"));
        assert_eq!(panel[1].avg_qty_per_serving.as_deref(), Some("8.5g"));
        assert!(panel[1].avg_qty_per_100g.is_none());
    }

    #[test]
    fn test_text_field_holding_object_is_schema_error() {
        let mut body = product_body(5);
        body["Product"]["Description"] = json!({ "en": "Milk" });
        let err = normalize(&payload(body), "W01").unwrap_err();
        assert!(
            matches!(err, NormalizeError::Schema { ref field, .. } if field == "Product.Description")
        );
    }

    #[test]
    fn test_allergen_classification() {
        assert_eq!(AllergenInput::from_value(None), AllergenInput::Absent);
        assert_eq!(
            AllergenInput::from_value(Some(&Value::Null)),
            AllergenInput::Absent
        );
        assert_eq!(
            AllergenInput::from_value(Some(&json!(12))),
            AllergenInput::Absent
        );
        assert_eq!(
            AllergenInput::from_value(Some(&json!("Milk"))),
            AllergenInput::ScalarString("Milk".to_string())
        );
        assert_eq!(
            AllergenInput::from_value(Some(&json!(["Milk", "Soy"]))),
            AllergenInput::AlreadySequence(vec!["Milk".to_string(), "Soy".to_string()])
        );
    }

    #[test]
    fn test_allergen_splitting() {
        let coerce = |s: &str| coerce_allergens(AllergenInput::ScalarString(s.to_string()));

        assert_eq!(coerce("Milk, Soy"), vec!["Milk", "Soy"]);
        assert_eq!(coerce("Gluten|Egg | Sesame"), vec!["Gluten", "Egg", "Sesame"]);
        assert_eq!(coerce("Milk|Egg, Soy"), vec!["Milk|Egg", "Soy"]);
        assert_eq!(coerce("  Gluten "), vec!["Gluten"]);
        assert_eq!(coerce("   "), vec![""]);
        assert_eq!(coerce(""), vec![""]);
        assert!(coerce_allergens(AllergenInput::Absent).is_empty());
    }

    mod properties {
        use super::super::*;
        use proptest::prelude::*;

        fn coerce(s: &str) -> Vec<String> {
            coerce_allergens(AllergenInput::ScalarString(s.to_string()))
        }

        proptest! {
            #[test]
            fn sequences_pass_through(items in prop::collection::vec(".{0,12}", 0..6)) {
                prop_assert_eq!(
                    coerce_allergens(AllergenInput::AlreadySequence(items.clone())),
                    items
                );
            }

            #[test]
            fn comma_wins_over_pipe(s in "[A-Za-z |]{0,8}(,[A-Za-z |]{0,8}){1,4}") {
                let expected: Vec<String> = s.split(',').map(|p| p.trim().to_string()).collect();
                prop_assert_eq!(coerce(&s), expected);
            }

            #[test]
            fn pipe_split_without_comma(s in "[A-Za-z ]{0,8}(\\|[A-Za-z ]{0,8}){1,4}") {
                let expected: Vec<String> = s.split('|').map(|p| p.trim().to_string()).collect();
                prop_assert_eq!(coerce(&s), expected);
            }

            #[test]
            fn plain_string_is_single_element(s in "[A-Za-z \t]{0,12}") {
                prop_assert_eq!(coerce(&s), vec![s.trim().to_string()]);
            }

            #[test]
            fn coercion_is_idempotent(s in "[A-Za-z ,|]{0,24}") {
                let once = coerce(&s);
                let as_json = serde_json::json!(once.clone());
                let twice = coerce_allergens(AllergenInput::from_value(Some(&as_json)));
                prop_assert_eq!(twice, once);
            }
        }
    }
}
