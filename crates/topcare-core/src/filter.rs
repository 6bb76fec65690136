//! # Catalog Filter Engine
//!
//! Narrows a catalog snapshot to the listings matching the shopper's
//! search box and filter panel.
//!
//! ## Matching Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      filter(catalog, criteria)                          │
//! │                                                                         │
//! │  item ──► query     name contains query (case-insensitive)   ─┐        │
//! │      ──► category  ∈ categories     (empty set = any)         │        │
//! │      ──► size      ∈ sizes          (empty set = any)         ├─ AND   │
//! │      ──► condition ∈ conditions     (empty set = any)         │        │
//! │      ──► gender    ∈ genders        (empty set = any)         │        │
//! │      ──► price     in ANY bucket    (min ≤ price ≤ max)      ─┘        │
//! │                                                                         │
//! │  Output keeps catalog order. Sorting is a separate step.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## URL Round Trip
//! The search screen keeps its filters in the URL:
//! ```text
//! ?query=shirt&categories=Tops,Dresses&conditions=Like%20new&priceRangeIds=p1
//!         │                                                    ▲
//!         ▼                                                    │
//!  parse_criteria_from_query_params()          FilterCriteria::to_query_string()
//!         │                                                    │
//!         └──────────────────► FilterCriteria ─────────────────┘
//! ```
//! Unrecognized values are dropped with a warning. A facet left with no
//! recognized values places no constraint.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::catalog::CatalogItem;
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Category, Condition, Gender};
use crate::validation::normalize_search_query;

/// Sizes offered by the filter panel. Listings may carry others ("42").
pub const STANDARD_SIZES: [&str; 7] = ["XS", "S", "M", "L", "XL", "XXL", "One Size"];

// =============================================================================
// Price Bucket
// =============================================================================

/// An inclusive price range. `None` leaves that side open.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBucket {
    pub min: Option<Money>,
    pub max: Option<Money>,
    /// Set for the standard buckets (`p1`..`p5`).
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: String,
}

impl PriceBucket {
    /// A custom range with a generated label.
    pub fn new(min: Option<Money>, max: Option<Money>) -> Self {
        let label = match (min, max) {
            (Some(min), Some(max)) => format!("{}-{}", min, max),
            (None, Some(max)) => format!("Under {}", max),
            (Some(min), None) => format!("Over {}", min),
            (None, None) => "Any price".to_string(),
        };
        PriceBucket {
            min,
            max,
            id: None,
            label,
        }
    }

    fn standard_entry(id: &str, label: &str, min: i64, max: Option<i64>) -> Self {
        PriceBucket {
            min: Some(Money::from_major_minor(min, 0)),
            max: max.map(|m| Money::from_major_minor(m, 0)),
            id: Some(id.to_string()),
            label: label.to_string(),
        }
    }

    /// The filter panel's price ranges.
    pub fn standard() -> Vec<PriceBucket> {
        vec![
            Self::standard_entry("p1", "Under $25", 0, Some(25)),
            Self::standard_entry("p2", "$25-$50", 25, Some(50)),
            Self::standard_entry("p3", "$50-$100", 50, Some(100)),
            Self::standard_entry("p4", "$100-$200", 100, Some(200)),
            Self::standard_entry("p5", "Over $200", 200, None),
        ]
    }

    /// Looks up a standard bucket by id, ignoring case.
    pub fn standard_by_id(id: &str) -> Option<PriceBucket> {
        let id = id.trim();
        Self::standard()
            .into_iter()
            .find(|bucket| bucket.id.as_deref().is_some_and(|b| b.eq_ignore_ascii_case(id)))
    }

    /// Reads a `min-max` range; either side may be empty.
    ///
    /// A bound that is not a number is logged and left open, so
    /// `"abc-30"` behaves like `"-30"`.
    ///
    /// ```rust
    /// use topcare_core::filter::PriceBucket;
    /// use topcare_core::money::Money;
    ///
    /// let bucket = PriceBucket::parse_range("25-50");
    /// assert_eq!(bucket.min, Some(Money::from_cents(2500)));
    /// assert_eq!(bucket.max, Some(Money::from_cents(5000)));
    ///
    /// assert_eq!(PriceBucket::parse_range("200-").max, None);
    /// ```
    pub fn parse_range(text: &str) -> PriceBucket {
        let (min, max) = text.trim().split_once('-').unwrap_or((text.trim(), ""));
        PriceBucket::new(parse_bound(min, "min"), parse_bound(max, "max"))
    }

    /// Inclusive on both ends.
    pub fn contains(&self, price: Money) -> bool {
        self.min.map_or(true, |min| price >= min) && self.max.map_or(true, |max| price <= max)
    }

    /// True when this is exactly one of [`PriceBucket::standard`].
    pub fn is_standard(&self) -> bool {
        self.id
            .as_deref()
            .and_then(PriceBucket::standard_by_id)
            .is_some_and(|standard| &standard == self)
    }

    fn range_param(&self) -> String {
        let side = |bound: Option<Money>| bound.map(|m| m.to_decimal_string()).unwrap_or_default();
        format!("{}-{}", side(self.min), side(self.max))
    }
}

fn parse_bound(text: &str, side: &str) -> Option<Money> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match Money::parse(text) {
        Ok(bound) => Some(bound),
        Err(err) => {
            warn!(bound = text, side, error = %err, "Malformed price bound, leaving it open");
            None
        }
    }
}

// =============================================================================
// Filter Criteria
// =============================================================================

/// The shopper's active search and filter selections.
///
/// Facets are sets: selecting the same value twice is one selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub query: String,
    pub categories: BTreeSet<Category>,
    pub sizes: BTreeSet<String>,
    pub conditions: BTreeSet<Condition>,
    pub genders: BTreeSet<Gender>,
    pub price_buckets: BTreeSet<PriceBucket>,
}

/// One removable chip in the active-filters row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "facet", content = "value", rename_all = "camelCase")]
pub enum FacetSelection {
    Query(String),
    Category(Category),
    Size(String),
    Condition(Condition),
    Gender(Gender),
    PriceBucket(PriceBucket),
}

impl FacetSelection {
    /// Chip text.
    pub fn label(&self) -> String {
        match self {
            FacetSelection::Query(query) => format!("\"{}\"", query),
            FacetSelection::Category(category) => category.to_string(),
            FacetSelection::Size(size) => size.clone(),
            FacetSelection::Condition(condition) => condition.to_string(),
            FacetSelection::Gender(gender) => gender.to_string(),
            FacetSelection::PriceBucket(bucket) => bucket.label.clone(),
        }
    }
}

impl FilterCriteria {
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = normalize_search_query(query);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.insert(category);
        self
    }

    pub fn with_size(mut self, size: &str) -> Self {
        insert_size(&mut self.sizes, size);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.insert(condition);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.genders.insert(gender);
        self
    }

    pub fn with_price_bucket(mut self, bucket: PriceBucket) -> Self {
        self.price_buckets.insert(bucket);
        self
    }

    /// Whether a single item passes every facet.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        self.matches_lowered(item, &self.query.trim().to_lowercase())
    }

    fn matches_lowered(&self, item: &CatalogItem, needle: &str) -> bool {
        (needle.is_empty() || item.name.to_lowercase().contains(needle))
            && (self.categories.is_empty() || self.categories.contains(&item.category))
            && (self.sizes.is_empty()
                || self
                    .sizes
                    .iter()
                    .any(|size| size.trim().eq_ignore_ascii_case(item.size.trim())))
            && (self.conditions.is_empty() || self.conditions.contains(&item.condition))
            && (self.genders.is_empty() || self.genders.contains(&item.gender))
            && (self.price_buckets.is_empty()
                || self.price_buckets.iter().any(|bucket| bucket.contains(item.price)))
    }

    /// Every active selection, query first, in panel order.
    pub fn active_selections(&self) -> Vec<FacetSelection> {
        let mut chips = Vec::with_capacity(self.active_filter_count());
        if !self.query.trim().is_empty() {
            chips.push(FacetSelection::Query(self.query.trim().to_string()));
        }
        chips.extend(self.categories.iter().copied().map(FacetSelection::Category));
        chips.extend(self.sizes.iter().cloned().map(FacetSelection::Size));
        chips.extend(self.conditions.iter().copied().map(FacetSelection::Condition));
        chips.extend(self.genders.iter().copied().map(FacetSelection::Gender));
        chips.extend(self.price_buckets.iter().cloned().map(FacetSelection::PriceBucket));
        chips
    }

    /// Number of chips; a non-empty query counts as one.
    pub fn active_filter_count(&self) -> usize {
        usize::from(!self.query.trim().is_empty())
            + self.categories.len()
            + self.sizes.len()
            + self.conditions.len()
            + self.genders.len()
            + self.price_buckets.len()
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0
    }

    /// Removes one chip. Returns false when it was not active.
    pub fn remove(&mut self, selection: &FacetSelection) -> bool {
        match selection {
            FacetSelection::Query(query) => {
                let active = !self.query.is_empty() && self.query.trim() == query.trim();
                if active {
                    self.query.clear();
                }
                active
            }
            FacetSelection::Category(category) => self.categories.remove(category),
            FacetSelection::Size(size) => {
                let before = self.sizes.len();
                self.sizes
                    .retain(|active| !active.eq_ignore_ascii_case(size.trim()));
                self.sizes.len() < before
            }
            FacetSelection::Condition(condition) => self.conditions.remove(condition),
            FacetSelection::Gender(gender) => self.genders.remove(gender),
            FacetSelection::PriceBucket(bucket) => self.price_buckets.remove(bucket),
        }
    }

    pub fn clear(&mut self) {
        *self = FilterCriteria::default();
    }

    /// Encodes the criteria as URL query parameters.
    ///
    /// Standard buckets are written as `priceRangeIds`, custom ones as
    /// `priceRanges`. Empty facets are omitted; no criteria gives `""`.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        let query = self.query.trim();
        if !query.is_empty() {
            pairs.push(("query", urlencoding::encode(query).into_owned()));
        }

        push_list(&mut pairs, "categories", self.categories.iter().map(|c| c.as_str().to_string()));
        push_list(&mut pairs, "sizes", self.sizes.iter().cloned());
        push_list(&mut pairs, "conditions", self.conditions.iter().map(|c| c.as_str().to_string()));
        push_list(&mut pairs, "genders", self.genders.iter().map(|g| g.as_str().to_string()));

        let (standard, custom): (Vec<&PriceBucket>, Vec<&PriceBucket>) =
            self.price_buckets.iter().partition(|bucket| bucket.is_standard());
        push_list(&mut pairs, "priceRangeIds", standard.iter().filter_map(|b| b.id.clone()));
        push_list(&mut pairs, "priceRanges", custom.iter().map(|b| b.range_param()));

        pairs
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn push_list<I>(pairs: &mut Vec<(&'static str, String)>, key: &'static str, values: I)
where
    I: Iterator<Item = String>,
{
    let encoded: Vec<String> = values
        .map(|value| urlencoding::encode(&value).into_owned())
        .collect();
    if !encoded.is_empty() {
        pairs.push((key, encoded.join(",")));
    }
}

// =============================================================================
// Query Parameter Decoding
// =============================================================================

/// `+` is a space in query strings; `%XX` escapes are then decoded.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            warn!(value = raw, "Parameter is not UTF-8 once decoded, using it verbatim");
            spaced
        }
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|part| !part.is_empty())
}

fn insert_parsed<T>(set: &mut BTreeSet<T>, key: &str, value: &str)
where
    T: FromStr<Err = ValidationError> + Ord,
{
    for raw in split_list(value) {
        match raw.parse::<T>() {
            Ok(parsed) => {
                set.insert(parsed);
            }
            Err(err) => warn!(key, value = raw, error = %err, "Dropping unrecognized filter value"),
        }
    }
}

/// Builds criteria from URL-style `(key, value)` pairs.
///
/// Repeated keys accumulate. List values are comma-separated, trimmed,
/// percent-decoded and deduplicated. Unknown keys are ignored.
///
/// ```rust
/// use topcare_core::filter::parse_criteria_from_query_params;
/// use topcare_core::types::Category;
///
/// let criteria = parse_criteria_from_query_params([
///     ("q", "shirt"),
///     ("categories", "Tops,Hats"),
/// ]);
/// assert_eq!(criteria.query, "shirt");
/// assert!(criteria.categories.contains(&Category::Tops));
/// assert_eq!(criteria.categories.len(), 1);
/// ```
pub fn parse_criteria_from_query_params<I, K, V>(params: I) -> FilterCriteria
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut criteria = FilterCriteria::default();

    for (key, value) in params {
        let key = decode_component(key.as_ref());
        let value = decode_component(value.as_ref());

        match key.trim() {
            "query" | "q" => {
                let query = normalize_search_query(&value);
                if !query.is_empty() {
                    criteria.query = query;
                }
            }
            "categories" => insert_parsed(&mut criteria.categories, "categories", &value),
            "conditions" => insert_parsed(&mut criteria.conditions, "conditions", &value),
            "genders" => insert_parsed(&mut criteria.genders, "genders", &value),
            "sizes" => {
                for size in split_list(&value) {
                    insert_size(&mut criteria.sizes, size);
                }
            }
            "priceRangeIds" => {
                for id in split_list(&value) {
                    match PriceBucket::standard_by_id(id) {
                        Some(bucket) => {
                            criteria.price_buckets.insert(bucket);
                        }
                        None => warn!(id, "Dropping unknown price range id"),
                    }
                }
            }
            "priceRanges" => {
                criteria
                    .price_buckets
                    .extend(split_list(&value).map(PriceBucket::parse_range));
            }
            other => debug!(key = other, "Ignoring unknown filter parameter"),
        }
    }

    debug!(active = criteria.active_filter_count(), "Parsed filter criteria");
    criteria
}

/// Standard sizes take their panel spelling ("one size" → "One Size");
/// other sizes keep the first spelling seen.
fn insert_size(sizes: &mut BTreeSet<String>, size: &str) {
    let size = size.trim();
    if size.is_empty() || sizes.iter().any(|active| active.eq_ignore_ascii_case(size)) {
        return;
    }
    let canonical = STANDARD_SIZES
        .iter()
        .find(|standard| standard.eq_ignore_ascii_case(size))
        .map_or_else(|| size.to_string(), |standard| standard.to_string());
    sizes.insert(canonical);
}

/// Parses a raw query string such as `?q=shirt&sizes=M`.
pub fn parse_query_string(query_string: &str) -> FilterCriteria {
    let pairs = query_string
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")));
    parse_criteria_from_query_params(pairs)
}

// =============================================================================
// Filtering
// =============================================================================

/// Returns the items matching `criteria`, in their original order.
pub fn filter<'a>(items: &'a [CatalogItem], criteria: &FilterCriteria) -> Vec<&'a CatalogItem> {
    let needle = criteria.query.trim().to_lowercase();
    let matched: Vec<&CatalogItem> = items
        .iter()
        .filter(|item| criteria.matches_lowered(item, &needle))
        .collect();

    debug!(
        candidates = items.len(),
        matched = matched.len(),
        active_filters = criteria.active_filter_count(),
        "Catalog filtered"
    );
    matched
}

// =============================================================================
// Sorting
// =============================================================================

/// Result ordering offered by the search screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SortOrder {
    /// Most recently posted first.
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "price-asc")]
    PriceLowToHigh,
    #[serde(rename = "price-desc")]
    PriceHighToLow,
    #[serde(rename = "name")]
    NameAscending,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Newest,
        SortOrder::PriceLowToHigh,
        SortOrder::PriceHighToLow,
        SortOrder::NameAscending,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::PriceLowToHigh => "price-asc",
            SortOrder::PriceHighToLow => "price-desc",
            SortOrder::NameAscending => "name",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "newest" | "latest" => Ok(SortOrder::Newest),
            "price-asc" | "price-low-to-high" => Ok(SortOrder::PriceLowToHigh),
            "price-desc" | "price-high-to-low" => Ok(SortOrder::PriceHighToLow),
            "name" | "name-asc" => Ok(SortOrder::NameAscending),
            _ => Err(ValidationError::NotAllowed {
                field: "sort".to_string(),
                allowed: SortOrder::ALL.iter().map(|o| o.as_str().to_string()).collect(),
            }),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orders filter results in place. Ties keep their existing order.
pub fn sort_results(results: &mut [&CatalogItem], order: SortOrder) {
    match order {
        SortOrder::Newest => results.sort_by(|a, b| b.posted_at.cmp(&a.posted_at)),
        SortOrder::PriceLowToHigh => results.sort_by_key(|item| item.price),
        SortOrder::PriceHighToLow => results.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::NameAscending => results.sort_by_cached_key(|item| item.name.to_lowercase()),
    }
}

// =============================================================================
// Facet Counts & Options
// =============================================================================

/// How many items carry each facet value, for option labels like
/// "Tops (4)". Every standard value is present, zero or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FacetCounts {
    pub total: u32,
    pub categories: BTreeMap<Category, u32>,
    pub sizes: BTreeMap<String, u32>,
    pub conditions: BTreeMap<Condition, u32>,
    pub genders: BTreeMap<Gender, u32>,
    /// Keyed by standard bucket id. Buckets share their edges, so an item
    /// priced exactly $25.00 counts toward both `p1` and `p2`.
    pub price_buckets: BTreeMap<String, u32>,
}

impl FacetCounts {
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a CatalogItem>,
    {
        let buckets = PriceBucket::standard();
        let mut counts = FacetCounts {
            total: 0,
            categories: Category::ALL.iter().map(|c| (*c, 0)).collect(),
            sizes: STANDARD_SIZES.iter().map(|s| (s.to_string(), 0)).collect(),
            conditions: Condition::ALL.iter().map(|c| (*c, 0)).collect(),
            genders: Gender::ALL.iter().map(|g| (*g, 0)).collect(),
            price_buckets: buckets
                .iter()
                .filter_map(|b| b.id.clone())
                .map(|id| (id, 0))
                .collect(),
        };

        for item in items {
            counts.total += 1;
            *counts.categories.entry(item.category).or_default() += 1;
            *counts.sizes.entry(item.size.trim().to_string()).or_default() += 1;
            *counts.conditions.entry(item.condition).or_default() += 1;
            *counts.genders.entry(item.gender).or_default() += 1;
            for bucket in buckets.iter().filter(|b| b.contains(item.price)) {
                if let Some(id) = &bucket.id {
                    *counts.price_buckets.entry(id.clone()).or_default() += 1;
                }
            }
        }

        counts
    }
}

/// Everything the filter panel offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub categories: Vec<Category>,
    pub sizes: Vec<String>,
    pub conditions: Vec<Condition>,
    pub genders: Vec<Gender>,
    pub price_buckets: Vec<PriceBucket>,
    pub sort_orders: Vec<SortOrder>,
}

impl FilterOptions {
    pub fn standard() -> Self {
        FilterOptions {
            categories: Category::ALL.to_vec(),
            sizes: STANDARD_SIZES.iter().map(|s| s.to_string()).collect(),
            conditions: Condition::ALL.to_vec(),
            genders: Gender::ALL.to_vec(),
            price_buckets: PriceBucket::standard(),
            sort_orders: SortOrder::ALL.to_vec(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[allow(clippy::too_many_arguments)]
    fn item(
        id: &str,
        name: &str,
        cents: i64,
        category: Category,
        size: &str,
        condition: Condition,
        gender: Gender,
        day: u32,
    ) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            price: Money::from_cents(cents),
            category,
            size: size.to_string(),
            condition,
            gender,
            seller: "seller".to_string(),
            posted_at: Utc.with_ymd_and_hms(2024, 10, day, 12, 0, 0).unwrap(),
        }
    }

    /// Newest first, the way the listings store returns them.
    fn mock_catalog() -> Vec<CatalogItem> {
        use Category::*;
        use Condition::*;
        use Gender::*;
        vec![
            item("1", "Checkered H&M Shirt", 3899, Tops, "M", Good, Men, 20),
            item("2", "Varsity Jacket", 8990, Outerwear, "L", LikeNew, Men, 19),
            item("3", "Safety Boots", 4704, Footwear, "42", Good, Men, 18),
            item("4", "Patchwork Shirt", 3010, Tops, "S", Good, Men, 17),
            item("5", "Green Henley Top", 2220, Tops, "M", Good, Women, 16),
            item("6", "Designer Jeans", 12050, Bottoms, "XS", NewWithTags, Unisex, 15),
            item("7", "Vintage Leather Jacket", 19999, Outerwear, "L", Excellent, Men, 14),
            item("8", "Summer Sundress", 4500, Dresses, "One Size", LikeNew, Women, 13),
            item("9", "Beach Shorts", 1850, Bottoms, "M", Fair, Unisex, 12),
            item("10", "Glamour Hys Girl Black T-shirt", 3000, Tops, "S", Good, Women, 11),
        ]
    }

    fn ids(items: &[&CatalogItem]) -> Vec<String> {
        items.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_empty_criteria_returns_catalog_in_order() {
        let catalog = mock_catalog();
        let result = filter(&catalog, &FilterCriteria::default());
        let expected: Vec<&CatalogItem> = catalog.iter().collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_query_matches_name_case_insensitively() {
        let catalog = mock_catalog();
        let result = filter(&catalog, &FilterCriteria::default().with_query("shirt"));
        assert_eq!(ids(&result), vec!["1", "4", "10"]);
        assert!(!result.iter().any(|i| i.name == "Varsity Jacket"));

        let upper = filter(&catalog, &FilterCriteria::default().with_query("  SHIRT "));
        assert_eq!(upper, result);
    }

    #[test]
    fn test_price_bucket_bounds_are_inclusive() {
        let catalog = mock_catalog();
        let bucket = PriceBucket::new(Some(Money::zero()), Some(Money::from_cents(3000)));
        let result = filter(&catalog, &FilterCriteria::default().with_price_bucket(bucket));

        assert_eq!(ids(&result), vec!["5", "9", "10"]);
        assert!(result.iter().any(|i| i.price == Money::from_cents(3000)));
        assert!(!result.iter().any(|i| i.price == Money::from_cents(3010)));
    }

    #[test]
    fn test_facets_are_conjunctive() {
        let catalog = mock_catalog();
        let criteria = FilterCriteria::default()
            .with_category(Category::Tops)
            .with_gender(Gender::Women);
        let result = filter(&catalog, &criteria);

        assert_eq!(ids(&result), vec!["5", "10"]);
        assert!(result
            .iter()
            .all(|i| i.category == Category::Tops && i.gender == Gender::Women));
    }

    #[test]
    fn test_values_within_a_facet_are_alternatives() {
        let catalog = mock_catalog();
        let criteria = FilterCriteria::default()
            .with_price_bucket(PriceBucket::standard_by_id("p1").unwrap())
            .with_price_bucket(PriceBucket::standard_by_id("p5").unwrap())
            .with_size("m");
        let result = filter(&catalog, &criteria);

        // p1 or p5, and size M (case-insensitive)
        assert_eq!(ids(&result), vec!["5", "9"]);
    }

    #[test]
    fn test_filter_is_deterministic() {
        let catalog = mock_catalog();
        let criteria = parse_query_string("q=a&priceRangeIds=p2,p3");
        assert_eq!(filter(&catalog, &criteria), filter(&catalog, &criteria));
    }

    #[test]
    fn test_no_match_is_an_empty_result() {
        let catalog = mock_catalog();
        let criteria = FilterCriteria::default()
            .with_category(Category::Dresses)
            .with_gender(Gender::Men);
        assert!(filter(&catalog, &criteria).is_empty());
    }

    #[test]
    fn test_params_are_decoded_trimmed_and_deduplicated() {
        let criteria = parse_criteria_from_query_params([
            ("conditions", "Like%20new,New+with+tags"),
            ("sizes", " M, M,,S "),
            ("sizes", "M"),
            ("categories", "tops,Tops"),
        ]);

        assert_eq!(
            criteria.conditions,
            BTreeSet::from([Condition::LikeNew, Condition::NewWithTags])
        );
        assert_eq!(
            criteria.sizes,
            BTreeSet::from(["M".to_string(), "S".to_string()])
        );
        assert_eq!(criteria.categories, BTreeSet::from([Category::Tops]));
    }

    #[test]
    fn test_sizes_are_case_insensitive_selections() {
        let criteria = parse_criteria_from_query_params([("sizes", "m,M,one size,Eu42,EU42")]);
        assert_eq!(
            criteria.sizes,
            BTreeSet::from(["Eu42".to_string(), "M".to_string(), "One Size".to_string()])
        );
        assert_eq!(criteria.active_filter_count(), 3);
        assert_eq!(criteria.to_query_string(), "sizes=Eu42,M,One%20Size");

        let mut built = FilterCriteria::default().with_size("xl").with_size("XL");
        assert_eq!(built.sizes, BTreeSet::from(["XL".to_string()]));
        assert!(built.remove(&FacetSelection::Size("xl".to_string())));
        assert!(!built.has_active_filters());
    }

    #[test]
    fn test_long_query_is_not_cut() {
        let long_name = "Oversized ".repeat(12);
        let mut catalog = mock_catalog();
        catalog[0].name = long_name.clone();

        let exact = filter(&catalog, &FilterCriteria::default().with_query(&long_name));
        assert_eq!(ids(&exact), vec!["1"]);

        let past_the_name = format!("{}zzz", &long_name[..100]);
        let criteria = FilterCriteria::default().with_query(&past_the_name);
        assert_eq!(criteria.query.len(), 103);
        assert!(filter(&catalog, &criteria).is_empty());
    }

    #[test]
    fn test_unknown_keys_and_values_are_dropped() {
        let criteria = parse_criteria_from_query_params([
            ("colour", "red"),
            ("genders", "Kids"),
            ("priceRangeIds", "p9"),
        ]);
        assert_eq!(criteria, FilterCriteria::default());
        assert!(!criteria.has_active_filters());
    }

    #[test]
    fn test_malformed_bound_is_left_open() {
        let criteria = parse_criteria_from_query_params([("priceRanges", "abc-30")]);
        let bucket = criteria.price_buckets.iter().next().unwrap();
        assert_eq!(bucket.min, None);
        assert_eq!(bucket.max, Some(Money::from_cents(3000)));

        let catalog = mock_catalog();
        assert_eq!(ids(&filter(&catalog, &criteria)), vec!["5", "9", "10"]);
    }

    #[test]
    fn test_query_string_round_trip() {
        let criteria = FilterCriteria::default()
            .with_query("summer dress")
            .with_category(Category::Dresses)
            .with_category(Category::Tops)
            .with_condition(Condition::LikeNew)
            .with_price_bucket(PriceBucket::standard_by_id("p1").unwrap())
            .with_price_bucket(PriceBucket::new(Some(Money::from_cents(1000)), None));

        let encoded = criteria.to_query_string();
        assert_eq!(
            encoded,
            "query=summer%20dress&categories=Tops,Dresses&conditions=Like%20new\
             &priceRangeIds=p1&priceRanges=10.00-"
        );
        assert_eq!(parse_query_string(&encoded), criteria);
        assert_eq!(FilterCriteria::default().to_query_string(), "");
    }

    #[test]
    fn test_chips_remove_and_clear() {
        let mut criteria = parse_query_string("?q=jacket&categories=Outerwear&genders=Men");
        assert_eq!(criteria.active_filter_count(), 3);
        assert_eq!(
            criteria.active_selections()[0],
            FacetSelection::Query("jacket".to_string())
        );

        assert!(criteria.remove(&FacetSelection::Category(Category::Outerwear)));
        assert!(!criteria.remove(&FacetSelection::Category(Category::Outerwear)));
        assert_eq!(criteria.active_filter_count(), 2);

        assert!(criteria.remove(&FacetSelection::Query("jacket".to_string())));
        assert_eq!(criteria.query, "");

        criteria.clear();
        assert!(!criteria.has_active_filters());
    }

    #[test]
    fn test_sort_orders() {
        let catalog = mock_catalog();
        let mut results = filter(&catalog, &FilterCriteria::default());

        sort_results(&mut results, SortOrder::PriceLowToHigh);
        assert_eq!(ids(&results), vec!["9", "5", "10", "4", "1", "8", "3", "2", "6", "7"]);

        sort_results(&mut results, SortOrder::PriceHighToLow);
        assert_eq!(results[0].id, "7");

        sort_results(&mut results, SortOrder::NameAscending);
        assert_eq!(results[0].name, "Beach Shorts");

        sort_results(&mut results, SortOrder::Newest);
        assert_eq!(ids(&results), ids(&catalog.iter().collect::<Vec<_>>()));
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut catalog = mock_catalog();
        catalog[1].price = Money::from_cents(3899);
        let mut results: Vec<&CatalogItem> = catalog.iter().take(2).collect();

        sort_results(&mut results, SortOrder::PriceLowToHigh);
        assert_eq!(ids(&results), vec!["1", "2"]);
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("price-asc".parse::<SortOrder>(), Ok(SortOrder::PriceLowToHigh));
        assert_eq!("PRICE_DESC".parse::<SortOrder>(), Ok(SortOrder::PriceHighToLow));
        assert!("popular".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_facet_counts() {
        let catalog = mock_catalog();
        let counts = FacetCounts::from_items(&catalog);

        assert_eq!(counts.total, 10);
        assert_eq!(counts.categories[&Category::Tops], 4);
        assert_eq!(counts.categories[&Category::Dresses], 1);
        assert_eq!(counts.genders[&Gender::Unisex], 2);
        assert_eq!(counts.sizes["42"], 1);
        assert_eq!(counts.sizes["XXL"], 0);
        assert_eq!(counts.price_buckets["p1"], 2);
        assert_eq!(counts.price_buckets["p2"], 5);
        assert_eq!(counts.price_buckets["p3"], 1);
        assert_eq!(counts.price_buckets["p4"], 2);
        assert_eq!(counts.price_buckets["p5"], 0);
    }

    #[test]
    fn test_standard_options() {
        let options = FilterOptions::standard();
        assert_eq!(options.sizes.len(), 7);
        assert_eq!(options.price_buckets.len(), 5);
        assert_eq!(options.price_buckets[4].label, "Over $200");
        assert_eq!(options.price_buckets[4].max, None);
        assert!(options.price_buckets.iter().all(PriceBucket::is_standard));
    }
}
