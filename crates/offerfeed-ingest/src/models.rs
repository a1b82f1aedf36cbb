//! Catalog entry and run outcome models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Compound natural key identifying one catalog entry.
///
/// Globally unique in the catalog; a row without both halves never reaches
/// the sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductKey {
    pub merchant_id: i64,
    pub merchant_product_id: String,
}

/// Price sub-record of a catalog entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub store_price: Option<f64>,
    pub display_price: Option<f64>,
    pub currency: Option<String>,
}

/// Category sub-record of a catalog entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// One product offer as mapped from a feed row.
///
/// The key halves are optional here because mapping is total; the pipeline
/// enforces key presence before the entry reaches the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub merchant_id: Option<i64>,
    pub merchant_product_id: Option<String>,
    pub merchant_name: Option<String>,
    pub product_name: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    pub deeplink_url: Option<String>,
    pub category: Category,
    pub commission_group: Option<String>,
    pub language: Option<String>,
    /// Source-reported last-updated timestamp
    pub last_updated_at: Option<DateTime<Utc>>,
    /// Time of this ingestion run
    pub ingested_at: DateTime<Utc>,
}

impl CatalogEntry {
    /// Return the compound key if both halves are present.
    pub fn key(&self) -> Option<ProductKey> {
        match (self.merchant_id, self.merchant_product_id.as_ref()) {
            (Some(merchant_id), Some(product_id)) => Some(ProductKey {
                merchant_id,
                merchant_product_id: product_id.clone(),
            }),
            _ => None,
        }
    }
}

/// Counters collected during one pipeline attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub processed_rows: u64,
    pub skipped_rows: u64,
    pub duration_ms: u64,
}

impl RunOutcome {
    pub fn total_rows(&self) -> u64 {
        self.processed_rows + self.skipped_rows
    }
}
