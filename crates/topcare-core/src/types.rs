//! # Domain Types
//!
//! Small value types shared by the cart, pricing and catalog modules.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │    Category     │   │   Condition     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Tops           │   │  New with tags  │       │
//! │  │  800 = 8%       │   │  Bottoms        │   │  Like new       │       │
//! │  └─────────────────┘   │  Outerwear      │   │  Excellent      │       │
//! │                        │  Footwear       │   │  Good           │       │
//! │  ┌─────────────────┐   │  Dresses        │   │  Fair           │       │
//! │  │     Gender      │   └─────────────────┘   │  Poor           │       │
//! │  │  Men/Women/     │                         └─────────────────┘       │
//! │  │  Unisex         │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Closed Sets
//! Category, condition and gender arrive as free strings from the listings
//! store and the URL. They are parsed into enums once, at the boundary
//! (`FromStr`, case-insensitive), so the filter never compares raw strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 800 bps = 8%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for configuration input).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

/// Lowercases and collapses separators so "Like-New", "like_new" and
/// " LIKE  new " compare equal.
fn normalize_label(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn not_allowed(field: &str, allowed: &[&str]) -> ValidationError {
    ValidationError::NotAllowed {
        field: field.to_string(),
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
    }
}

// =============================================================================
// Category
// =============================================================================

/// Listing category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Category {
    Tops,
    Bottoms,
    Outerwear,
    Footwear,
    Dresses,
}

impl Category {
    /// Every category, in the order the filter panel lists them.
    pub const ALL: [Category; 5] = [
        Category::Tops,
        Category::Bottoms,
        Category::Outerwear,
        Category::Footwear,
        Category::Dresses,
    ];

    /// Display label, also the wire value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Tops => "Tops",
            Category::Bottoms => "Bottoms",
            Category::Outerwear => "Outerwear",
            Category::Footwear => "Footwear",
            Category::Dresses => "Dresses",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    /// Case-insensitive. The backend schema stores singular names
    /// (`Top`, `Bottom`), which map onto the plural set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "tops" | "top" => Ok(Category::Tops),
            "bottoms" | "bottom" => Ok(Category::Bottoms),
            "outerwear" => Ok(Category::Outerwear),
            "footwear" | "shoes" => Ok(Category::Footwear),
            "dresses" | "dress" => Ok(Category::Dresses),
            _ => Err(not_allowed(
                "category",
                &Category::ALL.map(|c| c.as_str()),
            )),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Condition
// =============================================================================

/// Wear condition of a second-hand item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Condition {
    #[serde(rename = "New with tags")]
    NewWithTags,
    #[serde(rename = "Like new")]
    LikeNew,
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Condition {
    /// Every condition, best first.
    pub const ALL: [Condition; 6] = [
        Condition::NewWithTags,
        Condition::LikeNew,
        Condition::Excellent,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
    ];

    /// Display label, also the wire value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Condition::NewWithTags => "New with tags",
            Condition::LikeNew => "Like new",
            Condition::Excellent => "Excellent",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }
}

impl FromStr for Condition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "new with tags" | "nwt" => Ok(Condition::NewWithTags),
            "like new" => Ok(Condition::LikeNew),
            "excellent" => Ok(Condition::Excellent),
            "good" => Ok(Condition::Good),
            "fair" => Ok(Condition::Fair),
            "poor" => Ok(Condition::Poor),
            _ => Err(not_allowed(
                "condition",
                &Condition::ALL.map(|c| c.as_str()),
            )),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Gender
// =============================================================================

/// Target gender of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Gender {
    Men,
    Women,
    Unisex,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Men, Gender::Women, Gender::Unisex];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "Men",
            Gender::Women => "Women",
            Gender::Unisex => "Unisex",
        }
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "men" | "male" | "man" => Ok(Gender::Men),
            "women" | "female" | "woman" => Ok(Gender::Women),
            "unisex" => Ok(Gender::Unisex),
            _ => Err(not_allowed("gender", &Gender::ALL.map(|g| g.as_str()))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
