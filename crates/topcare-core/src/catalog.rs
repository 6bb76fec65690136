//! # Catalog
//!
//! The read-only listing snapshot that search runs against, and the
//! ingestion step that turns listing-store records into it.
//!
//! ## Ingestion
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Ingestion                                  │
//! │                                                                         │
//! │  GET /api/listings (newest first)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<RawListing>        loose: "_id"/"id", "title"/"name",             │
//! │       │                 price as number or "S$38.99", free strings     │
//! │       ▼                                                                 │
//! │  Catalog::ingest() ← THIS MODULE                                       │
//! │       │                                                                 │
//! │       ├── valid ──────► CatalogItem (enums, Money, DateTime<Utc>)      │
//! │       │                                                                 │
//! │       └── invalid ────► Rejection { index, id, reason }  (logged)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records with an unknown category, condition or gender are rejected here
//! rather than reaching the filter as values that can never match.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::filter::{self, FilterCriteria};
use crate::money::Money;
use crate::types::{Category, Condition, Gender};
use crate::validation::{validate_listing_id, validate_price};

// =============================================================================
// Catalog Item
// =============================================================================

/// A validated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub category: Category,
    /// Free-form: "M", "42", "One Size".
    pub size: String,
    pub condition: Condition,
    pub gender: Gender,
    /// Seller handle.
    pub seller: String,
    #[ts(as = "String")]
    pub posted_at: DateTime<Utc>,
}

// =============================================================================
// Raw Listing
// =============================================================================

/// A listing record as the listings store returns it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    #[serde(default, alias = "_id")]
    pub id: Value,

    #[serde(default, alias = "title")]
    pub name: Option<String>,

    #[serde(default)]
    pub price: Value,

    #[serde(default)]
    pub category: Option<String>,

    /// Text, or a number for shoe sizes.
    #[serde(default)]
    pub size: Value,

    #[serde(default)]
    pub condition: Option<String>,

    #[serde(default)]
    pub gender: Option<String>,

    /// A handle, or a populated user document.
    #[serde(default, alias = "user")]
    pub seller: Value,

    #[serde(default, alias = "createdAt", alias = "datePosted")]
    pub posted_at: Option<String>,
}

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| required(field))
}

/// Trimmed text from a string or number value.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl RawListing {
    /// The identifier as text, when there is one.
    pub fn id_text(&self) -> Option<String> {
        value_text(&self.id)
    }

    fn seller_handle(&self) -> String {
        let handle = match &self.seller {
            Value::String(s) => Some(s.as_str()),
            Value::Object(user) => ["username", "name"]
                .iter()
                .find_map(|key| user.get(*key).and_then(Value::as_str)),
            _ => None,
        };
        handle.unwrap_or_default().trim().to_string()
    }
}

/// Reads RFC 3339 timestamps, and the zone-less `2024-10-15T14:30:00` form
/// used by seed data (taken as UTC).
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

impl TryFrom<RawListing> for CatalogItem {
    type Error = ValidationError;

    fn try_from(raw: RawListing) -> Result<Self, Self::Error> {
        let id = raw.id_text().ok_or_else(|| required("id"))?;
        validate_listing_id(&id)?;

        if raw.price.is_null() {
            return Err(required("price"));
        }
        let price = Money::from_untrusted(&raw.price);
        validate_price(price)?;

        let seller = raw.seller_handle();
        let posted_at = match raw.posted_at.as_deref() {
            None => DateTime::<Utc>::default(),
            Some(text) => parse_timestamp(text).unwrap_or_else(|| {
                warn!(id = %id, posted_at = %text, "Unreadable listing timestamp, using epoch");
                DateTime::<Utc>::default()
            }),
        };

        Ok(CatalogItem {
            name: required_text(raw.name, "name")?,
            price,
            category: required_text(raw.category, "category")?.parse()?,
            size: value_text(&raw.size).ok_or_else(|| required("size"))?,
            condition: required_text(raw.condition, "condition")?.parse()?,
            gender: required_text(raw.gender, "gender")?.parse()?,
            seller,
            posted_at,
            id,
        })
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// An ordered, immutable listing snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

/// A record that did not make it into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Position in the input.
    pub index: usize,
    pub id: Option<String>,
    pub reason: ValidationError,
}

/// Result of [`Catalog::ingest`].
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub catalog: Catalog,
    pub rejected: Vec<Rejection>,
}

impl Catalog {
    /// Wraps already-validated items, keeping their order.
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Catalog { items }
    }

    /// Validates listing-store records, keeping the valid ones in order.
    pub fn ingest(raw: Vec<RawListing>) -> IngestReport {
        Self::ingest_records(raw.into_iter().map(Ok))
    }

    /// Like [`Catalog::ingest`], for records not yet deserialized.
    ///
    /// A record whose fields have the wrong JSON shape (`"name": 5`, a bare
    /// number instead of an object) is rejected on its own.
    pub fn ingest_values(records: Vec<Value>) -> IngestReport {
        Self::ingest_records(records.into_iter().map(|record| {
            let id = record
                .get("_id")
                .or_else(|| record.get("id"))
                .and_then(value_text);
            serde_json::from_value::<RawListing>(record).map_err(|err| {
                let reason = ValidationError::InvalidFormat {
                    field: "listing".to_string(),
                    reason: err.to_string(),
                };
                (id, reason)
            })
        }))
    }

    fn ingest_records<I>(records: I) -> IngestReport
    where
        I: IntoIterator<Item = Result<RawListing, (Option<String>, ValidationError)>>,
    {
        let mut items = Vec::new();
        let mut rejected = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let outcome = record.and_then(|raw| {
                let id = raw.id_text();
                CatalogItem::try_from(raw).map_err(|reason| (id, reason))
            });
            match outcome {
                Ok(item) => items.push(item),
                Err((id, reason)) => {
                    warn!(index, id = ?id, reason = %reason, "Rejected listing");
                    rejected.push(Rejection { index, id, reason });
                }
            }
        }

        debug!(accepted = items.len(), rejected = rejected.len(), "Catalog ingested");
        IngestReport {
            catalog: Catalog { items },
            rejected,
        }
    }

    /// Parses a JSON array of listings and ingests it.
    ///
    /// Accepts either a bare array or `{"listings": [...]}`. Only malformed
    /// JSON or a different envelope fails the load; bad records are
    /// rejected one by one.
    pub fn ingest_json(json: &str) -> Result<IngestReport, serde_json::Error> {
        let records = match serde_json::from_str::<Value>(json)? {
            Value::Array(records) => records,
            Value::Object(mut body) => match body.remove("listings") {
                Some(Value::Array(records)) => records,
                _ => return Err(envelope_error()),
            },
            _ => return Err(envelope_error()),
        };
        Ok(Catalog::ingest_values(records))
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Runs the filter over this snapshot.
    pub fn search(&self, criteria: &FilterCriteria) -> Vec<&CatalogItem> {
        filter::filter(&self.items, criteria)
    }
}

fn envelope_error() -> serde_json::Error {
    serde_json::Error::custom("expected an array of listings or {\"listings\": [...]}")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawListing {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_backend_listing_is_ingested() {
        let record = raw(json!({
            "_id": "665f1c2e9b1e8a0012ab34cd",
            "title": "Checkered H&M Shirt",
            "price": 38.99,
            "category": "Top",
            "size": "M",
            "condition": "Good",
            "gender": "Men",
            "user": { "_id": "u1", "username": "fashionista22" },
            "createdAt": "2024-10-15T14:30:00.000Z"
        }));

        let item = CatalogItem::try_from(record).unwrap();
        assert_eq!(item.id, "665f1c2e9b1e8a0012ab34cd");
        assert_eq!(item.price, Money::from_cents(3899));
        assert_eq!(item.category, Category::Tops);
        assert_eq!(item.seller, "fashionista22");
        assert_eq!(item.posted_at.to_rfc3339(), "2024-10-15T14:30:00+00:00");
    }

    #[test]
    fn test_seed_listing_shape_is_ingested() {
        let record = raw(json!({
            "id": "8",
            "name": "Summer Sundress",
            "price": "45.00",
            "category": "Dresses",
            "size": "One Size",
            "condition": "Like new",
            "gender": "Women",
            "seller": "summer_vibes",
            "datePosted": "2024-08-15T13:40:00"
        }));

        let item = CatalogItem::try_from(record).unwrap();
        assert_eq!(item.price, Money::from_cents(4500));
        assert_eq!(item.condition, Condition::LikeNew);
        assert_eq!(item.posted_at.to_rfc3339(), "2024-08-15T13:40:00+00:00");
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let record = raw(json!({
            "id": "x", "name": "Bucket Hat", "price": 12, "category": "Hats",
            "size": "M", "condition": "Good", "gender": "Unisex"
        }));
        assert!(matches!(
            CatalogItem::try_from(record),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let no_price = raw(json!({
            "id": "x", "name": "Tee", "category": "Tops",
            "size": "M", "condition": "Good", "gender": "Men"
        }));
        assert_eq!(
            CatalogItem::try_from(no_price),
            Err(ValidationError::Required { field: "price".to_string() })
        );

        let no_id = raw(json!({ "name": "Tee" }));
        assert_eq!(
            CatalogItem::try_from(no_id),
            Err(ValidationError::Required { field: "id".to_string() })
        );
    }

    #[test]
    fn test_ingest_keeps_order_and_reports_rejections() {
        let json = r#"{"listings": [
            {"id": "1", "name": "A", "price": 10, "category": "Tops", "size": "S", "condition": "Good", "gender": "Men"},
            {"id": "2", "name": "B", "price": 10, "category": "Hats", "size": "S", "condition": "Good", "gender": "Men"},
            {"id": "3", "name": "C", "price": -4, "category": "Tops", "size": "S", "condition": "Good", "gender": "Men"},
            {"id": "4", "name": "D", "price": 10, "category": "Bottoms", "size": "S", "condition": "Fair", "gender": "Women"}
        ]}"#;

        let report = Catalog::ingest_json(json).unwrap();
        let ids: Vec<&str> = report.catalog.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);

        let rejected: Vec<usize> = report.rejected.iter().map(|r| r.index).collect();
        assert_eq!(rejected, vec![1, 2]);
        assert_eq!(report.rejected[0].id.as_deref(), Some("2"));
    }

    #[test]
    fn test_wrong_typed_record_is_rejected_alone() {
        let json = r#"[
            {"_id": "1", "title": "Tee", "price": 10, "category": "Tops", "size": "M", "condition": "Good", "gender": "Men"},
            {"_id": "2", "title": 5, "price": 10, "category": "Tops", "size": "M", "condition": "Good", "gender": "Men"},
            {"_id": "3", "title": "Loafers", "price": 45, "category": "Shoes", "size": 42, "condition": "Good", "gender": "Men"},
            {"_id": "4", "title": "Skirt", "price": 20, "category": null, "size": "S", "condition": "Good", "gender": "Women"},
            17
        ]"#;

        let report = Catalog::ingest_json(json).unwrap();
        let ids: Vec<&str> = report.catalog.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(report.catalog.get("3").unwrap().size, "42");

        let rejected: Vec<(usize, Option<&str>)> = report
            .rejected
            .iter()
            .map(|r| (r.index, r.id.as_deref()))
            .collect();
        assert_eq!(rejected, vec![(1, Some("2")), (3, Some("4")), (4, None)]);
        assert!(matches!(report.rejected[0].reason, ValidationError::InvalidFormat { .. }));
        assert_eq!(
            report.rejected[1].reason,
            ValidationError::Required {
                field: "category".to_string()
            }
        );
    }

    #[test]
    fn test_price_above_ceiling_is_rejected() {
        let record = raw(json!({
            "id": "1", "name": "Gold Coat", "price": 9e16, "category": "Outerwear",
            "size": "L", "condition": "Good", "gender": "Women"
        }));
        assert!(matches!(
            CatalogItem::try_from(record),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_unexpected_envelope_fails_the_load() {
        assert!(Catalog::ingest_json(r#"{"items": []}"#).is_err());
        assert!(Catalog::ingest_json("42").is_err());
        assert!(Catalog::ingest_json("[]").unwrap().catalog.is_empty());
    }

    #[test]
    fn test_bad_timestamp_falls_back_to_epoch() {
        let record = raw(json!({
            "id": "1", "name": "A", "price": 10, "category": "Tops", "size": "S",
            "condition": "Good", "gender": "Men", "createdAt": "yesterday"
        }));
        let item = CatalogItem::try_from(record).unwrap();
        assert_eq!(item.posted_at.timestamp(), 0);
    }
}
