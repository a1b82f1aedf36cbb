//! Catalog sink
//!
//! Insert-or-fully-replace writes into the durable product catalog, keyed by
//! the compound natural key. Defaults (`is_active`) apply on insert only;
//! an update overwrites every mapped field and nothing else.

use async_trait::async_trait;
use offerfeed_common::FeedError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

use crate::models::{CatalogEntry, ProductKey};

/// Abstract upsert target for the pipeline
#[async_trait]
pub trait CatalogSink: Send + Sync {
    /// Insert the entry if the key is absent, otherwise overwrite all of
    /// its fields. Errors here are per-row; the pipeline counts them as
    /// skipped and continues.
    async fn upsert(&self, key: &ProductKey, entry: &CatalogEntry) -> anyhow::Result<()>;
}

const CREATE_PRODUCTS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    merchant_id          BIGINT NOT NULL,
    merchant_product_id  TEXT NOT NULL,
    merchant_name        TEXT,
    product_name         TEXT,
    store_price          DOUBLE PRECISION,
    display_price        DOUBLE PRECISION,
    currency             TEXT,
    image_url            TEXT,
    deeplink_url         TEXT,
    category_id          TEXT,
    category_name        TEXT,
    commission_group     TEXT,
    language             TEXT,
    last_updated_at      TIMESTAMPTZ,
    ingested_at          TIMESTAMPTZ NOT NULL,
    is_active            BOOLEAN NOT NULL DEFAULT TRUE,
    PRIMARY KEY (merchant_id, merchant_product_id)
)
"#;

// is_active takes its column default on insert and is deliberately absent
// from the update clause.
const UPSERT_PRODUCT_SQL: &str = r#"
INSERT INTO products (
    merchant_id, merchant_product_id, merchant_name, product_name,
    store_price, display_price, currency, image_url, deeplink_url,
    category_id, category_name, commission_group, language,
    last_updated_at, ingested_at
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
ON CONFLICT (merchant_id, merchant_product_id) DO UPDATE SET
    merchant_name    = EXCLUDED.merchant_name,
    product_name     = EXCLUDED.product_name,
    store_price      = EXCLUDED.store_price,
    display_price    = EXCLUDED.display_price,
    currency         = EXCLUDED.currency,
    image_url        = EXCLUDED.image_url,
    deeplink_url     = EXCLUDED.deeplink_url,
    category_id      = EXCLUDED.category_id,
    category_name    = EXCLUDED.category_name,
    commission_group = EXCLUDED.commission_group,
    language         = EXCLUDED.language,
    last_updated_at  = EXCLUDED.last_updated_at,
    ingested_at      = EXCLUDED.ingested_at
"#;

/// Postgres-backed catalog sink
pub struct PgCatalogSink {
    pool: PgPool,
}

impl PgCatalogSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a small dedicated pool for the ingestion job.
    pub async fn connect(database_url: &str) -> offerfeed_common::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(|e| FeedError::Database(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Create the products table and its compound key if absent.
    pub async fn ensure_schema(&self) -> offerfeed_common::Result<()> {
        sqlx::query(CREATE_PRODUCTS_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| FeedError::Database(e.to_string()))?;
        info!("Catalog schema ensured");
        Ok(())
    }
}

#[async_trait]
impl CatalogSink for PgCatalogSink {
    async fn upsert(&self, key: &ProductKey, entry: &CatalogEntry) -> anyhow::Result<()> {
        sqlx::query(UPSERT_PRODUCT_SQL)
            .bind(key.merchant_id)
            .bind(&key.merchant_product_id)
            .bind(&entry.merchant_name)
            .bind(&entry.product_name)
            .bind(entry.price.store_price)
            .bind(entry.price.display_price)
            .bind(&entry.price.currency)
            .bind(&entry.image_url)
            .bind(&entry.deeplink_url)
            .bind(&entry.category.id)
            .bind(&entry.category.name)
            .bind(&entry.commission_group)
            .bind(&entry.language)
            .bind(entry.last_updated_at)
            .bind(entry.ingested_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-memory sinks for pipeline and orchestrator tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records every upsert; repeated keys overwrite, as in the catalog.
    #[derive(Default)]
    pub struct MemorySink {
        pub entries: Mutex<HashMap<ProductKey, CatalogEntry>>,
        pub upsert_calls: Mutex<u64>,
    }

    #[async_trait]
    impl CatalogSink for MemorySink {
        async fn upsert(&self, key: &ProductKey, entry: &CatalogEntry) -> anyhow::Result<()> {
            *self.upsert_calls.lock().unwrap() += 1;
            self.entries
                .lock()
                .unwrap()
                .insert(key.clone(), entry.clone());
            Ok(())
        }
    }

    /// Fails upserts for the configured merchant product ids.
    #[derive(Default)]
    pub struct FlakySink {
        pub inner: MemorySink,
        pub fail_product_ids: Vec<String>,
    }

    #[async_trait]
    impl CatalogSink for FlakySink {
        async fn upsert(&self, key: &ProductKey, entry: &CatalogEntry) -> anyhow::Result<()> {
            if self.fail_product_ids.contains(&key.merchant_product_id) {
                anyhow::bail!("simulated write failure for {}", key.merchant_product_id);
            }
            self.inner.upsert(key, entry).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_sql_binds_every_column_once() {
        // 15 placeholders: 2 key halves + 13 fields.
        for i in 1..=15 {
            assert!(
                UPSERT_PRODUCT_SQL.contains(&format!("${i}")),
                "missing placeholder ${i}"
            );
        }
        assert!(!UPSERT_PRODUCT_SQL.contains("$16"));
    }

    #[test]
    fn test_upsert_never_updates_is_active() {
        let update_clause = UPSERT_PRODUCT_SQL
            .split("DO UPDATE SET")
            .nth(1)
            .unwrap();
        assert!(!update_clause.contains("is_active"));
    }

    #[test]
    fn test_schema_defaults_is_active_on_insert() {
        assert!(CREATE_PRODUCTS_SQL.contains("is_active"));
        assert!(CREATE_PRODUCTS_SQL.contains("DEFAULT TRUE"));
        assert!(CREATE_PRODUCTS_SQL.contains("PRIMARY KEY (merchant_id, merchant_product_id)"));
    }
}
