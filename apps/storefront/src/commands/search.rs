//! # Search Commands
//!
//! Catalog search, filter options and catalog refresh.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Search screen                                                          │
//! │                                                                         │
//! │  ┌────────────────────────────────────────────────────────────────┐    │
//! │  │  🔍 shirt                                          [Filters]   │    │
//! │  │  [Tops ✕] [Women ✕] [Under $25 ✕]                 Clear all    │    │
//! │  ├────────────────────────────────────────────────────────────────┤    │
//! │  │  Green Henley Top                S$22.20      M · Good         │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  route ?q=shirt&categories=Tops&genders=Women&priceRangeIds=p1         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  search_catalog(catalog, params, sort)                                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  { items, total, activeFilters, queryString, facets }                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use topcare_core::catalog::Catalog;
use topcare_core::filter::{
    self, parse_criteria_from_query_params, sort_results, FacetCounts, FacetSelection,
    FilterCriteria, FilterOptions, SortOrder,
};
use topcare_core::CatalogItem;

use crate::error::ApiError;
use crate::state::CatalogState;

/// One chip in the active-filters row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilter {
    pub label: String,
    /// Passed back to remove the chip.
    pub selection: FacetSelection,
}

/// Search results for one screen render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub criteria: FilterCriteria,
    /// Canonical form of the criteria, for the route.
    pub query_string: String,
    pub active_filters: Vec<ActiveFilter>,
    pub sort: SortOrder,
    pub total: usize,
    pub items: Vec<CatalogItem>,
    /// Counts over the whole snapshot, for option labels.
    pub facets: FacetCounts,
}

/// A catalog refresh result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogLoadResponse {
    pub accepted: usize,
    pub rejected: Vec<RejectedListing>,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedListing {
    pub index: usize,
    pub id: Option<String>,
    pub reason: String,
}

/// Runs a search from URL-style parameters.
///
/// ## Arguments
/// * `params` - `(key, value)` pairs as found in the route
/// * `sort` - result order
pub fn search_catalog(
    catalog: &CatalogState,
    params: &[(String, String)],
    sort: SortOrder,
) -> SearchResponse {
    debug!(params = params.len(), sort = %sort, "search_catalog command");
    let criteria =
        parse_criteria_from_query_params(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    search_with_criteria(catalog, criteria, sort)
}

/// Runs a search from already-built criteria.
pub fn search_with_criteria(
    catalog: &CatalogState,
    criteria: FilterCriteria,
    sort: SortOrder,
) -> SearchResponse {
    let snapshot = catalog.snapshot();

    let mut matched = filter::filter(snapshot.items(), &criteria);
    sort_results(&mut matched, sort);

    let active_filters = criteria
        .active_selections()
        .into_iter()
        .map(|selection| ActiveFilter {
            label: selection.label(),
            selection,
        })
        .collect();

    SearchResponse {
        query_string: criteria.to_query_string(),
        active_filters,
        sort,
        total: matched.len(),
        items: matched.into_iter().cloned().collect(),
        facets: FacetCounts::from_items(snapshot.items()),
        criteria,
    }
}

/// Options for the filter panel.
pub fn get_filter_options() -> FilterOptions {
    debug!("get_filter_options command");
    FilterOptions::standard()
}

/// Replaces the catalog snapshot with freshly fetched listings.
///
/// Accepts the listings endpoint's JSON: a bare array or
/// `{"listings": [...]}`. Invalid records are skipped and reported.
pub fn load_catalog(catalog: &CatalogState, json: &str) -> Result<CatalogLoadResponse, ApiError> {
    let report = Catalog::ingest_json(json)?;
    let accepted = report.catalog.len();

    let rejected = report
        .rejected
        .into_iter()
        .map(|r| RejectedListing {
            index: r.index,
            id: r.id,
            reason: r.reason.to_string(),
        })
        .collect::<Vec<_>>();

    catalog.replace(report.catalog);
    info!(accepted, rejected = rejected.len(), "Catalog snapshot replaced");

    Ok(CatalogLoadResponse {
        accepted,
        rejected,
        loaded_at: catalog.loaded_at(),
    })
}
