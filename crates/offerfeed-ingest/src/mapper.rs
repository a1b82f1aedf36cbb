//! Feed row to catalog entry mapping
//!
//! Column names follow the affiliate network's feed layout. An absent or
//! empty column maps to `None`; mapping itself never fails.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv_async::StringRecord;

use crate::models::{CatalogEntry, Category, Price};
use crate::price::parse_price;

pub const COL_MERCHANT_ID: &str = "merchant_id";
pub const COL_PRODUCT_ID: &str = "aw_product_id";
pub const COL_MERCHANT_NAME: &str = "merchant_name";
pub const COL_PRODUCT_NAME: &str = "product_name";
pub const COL_STORE_PRICE: &str = "store_price";
pub const COL_DISPLAY_PRICE: &str = "display_price";
pub const COL_CURRENCY: &str = "currency";
pub const COL_IMAGE_URL: &str = "aw_image_url";
pub const COL_DEEPLINK: &str = "aw_deep_link";
pub const COL_CATEGORY_ID: &str = "category_id";
pub const COL_CATEGORY_NAME: &str = "category_name";
pub const COL_COMMISSION_GROUP: &str = "commission_group";
pub const COL_LANGUAGE: &str = "language";
pub const COL_LAST_UPDATED: &str = "last_updated";

/// Column-name to field-index lookup, built once per stream from the
/// feed's header record.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new(headers: &StringRecord) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { columns }
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.get(column).copied()
    }
}

/// One feed row, borrowed from the parser. Consumed immediately by
/// [`map_row`]; never persisted.
#[derive(Debug)]
pub struct RawRow<'a> {
    index: &'a HeaderIndex,
    record: &'a StringRecord,
}

impl<'a> RawRow<'a> {
    pub fn new(index: &'a HeaderIndex, record: &'a StringRecord) -> Self {
        Self { index, record }
    }

    /// Field value by column name. Absent columns and empty values both
    /// read as `None`; the source feed uses empty strings for "no value".
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.index
            .position(column)
            .and_then(|i| self.record.get(i))
            .filter(|v| !v.is_empty())
    }
}

/// Map one raw feed row into a catalog entry draft.
///
/// Key presence is not validated here; that is the pipeline's job.
pub fn map_row(row: &RawRow<'_>) -> CatalogEntry {
    CatalogEntry {
        merchant_id: row
            .get(COL_MERCHANT_ID)
            .and_then(|v| v.trim().parse::<i64>().ok()),
        merchant_product_id: row.get(COL_PRODUCT_ID).map(str::to_string),
        merchant_name: row.get(COL_MERCHANT_NAME).map(str::to_string),
        product_name: row.get(COL_PRODUCT_NAME).map(str::to_string),
        price: Price {
            store_price: row.get(COL_STORE_PRICE).and_then(parse_price),
            display_price: row.get(COL_DISPLAY_PRICE).and_then(parse_price),
            currency: row.get(COL_CURRENCY).map(str::to_string),
        },
        image_url: row.get(COL_IMAGE_URL).map(str::to_string),
        deeplink_url: row.get(COL_DEEPLINK).map(str::to_string),
        category: Category {
            id: row.get(COL_CATEGORY_ID).map(str::to_string),
            name: row.get(COL_CATEGORY_NAME).map(str::to_string),
        },
        commission_group: row.get(COL_COMMISSION_GROUP).map(str::to_string),
        language: row.get(COL_LANGUAGE).map(str::to_string),
        last_updated_at: row.get(COL_LAST_UPDATED).and_then(parse_timestamp),
        ingested_at: Utc::now(),
    }
}

/// Parse the feed's last-updated column. The network publishes
/// "YYYY-MM-DD HH:MM:SS"; RFC 3339 and bare dates are accepted too.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(headers: &[&str], fields: &[&str]) -> (StringRecord, StringRecord) {
        (
            StringRecord::from(headers.to_vec()),
            StringRecord::from(fields.to_vec()),
        )
    }

    #[test]
    fn test_map_full_row() {
        let (headers, fields) = record(
            &[
                "merchant_id",
                "aw_product_id",
                "merchant_name",
                "product_name",
                "store_price",
                "display_price",
                "currency",
                "aw_image_url",
                "aw_deep_link",
                "category_id",
                "category_name",
                "commission_group",
                "language",
                "last_updated",
            ],
            &[
                "1001",
                "SKU-1",
                "Acme Store",
                "Blue Widget",
                "1.234,56",
                "1,234.56",
                "EUR",
                "https://img.example/1.jpg",
                "https://deep.example/1",
                "77",
                "Widgets",
                "DEFAULT",
                "de",
                "2026-08-29 14:30:00",
            ],
        );
        let index = HeaderIndex::new(&headers);
        let entry = map_row(&RawRow::new(&index, &fields));

        assert_eq!(entry.merchant_id, Some(1001));
        assert_eq!(entry.merchant_product_id.as_deref(), Some("SKU-1"));
        assert_eq!(entry.price.store_price, Some(1234.56));
        assert_eq!(entry.price.display_price, Some(1234.56));
        assert_eq!(entry.price.currency.as_deref(), Some("EUR"));
        assert_eq!(entry.category.id.as_deref(), Some("77"));
        assert_eq!(entry.commission_group.as_deref(), Some("DEFAULT"));
        assert!(entry.last_updated_at.is_some());
        assert!(entry.key().is_some());
    }

    #[test]
    fn test_empty_fields_map_to_none() {
        let (headers, fields) = record(
            &["merchant_id", "aw_product_id", "product_name"],
            &["1001", "SKU-1", ""],
        );
        let index = HeaderIndex::new(&headers);
        let entry = map_row(&RawRow::new(&index, &fields));

        assert_eq!(entry.product_name, None);
        assert_eq!(entry.merchant_name, None);
    }

    #[test]
    fn test_non_numeric_merchant_id_is_none() {
        let (headers, fields) = record(&["merchant_id", "aw_product_id"], &["abc", "SKU-1"]);
        let index = HeaderIndex::new(&headers);
        let entry = map_row(&RawRow::new(&index, &fields));

        assert_eq!(entry.merchant_id, None);
        assert!(entry.key().is_none());
    }

    #[test]
    fn test_unparseable_timestamp_is_none() {
        let (headers, fields) = record(
            &["merchant_id", "aw_product_id", "last_updated"],
            &["1001", "SKU-1", "yesterday"],
        );
        let index = HeaderIndex::new(&headers);
        let entry = map_row(&RawRow::new(&index, &fields));

        assert_eq!(entry.last_updated_at, None);
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp("2026-08-29 14:30:00").is_some());
        assert!(parse_timestamp("2026-08-29T14:30:00Z").is_some());
        assert!(parse_timestamp("2026-08-29").is_some());
        assert!(parse_timestamp("29/08/2026").is_none());
    }
}
