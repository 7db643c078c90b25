//! API ingestion path: four concurrent table fetches plus an optional
//! uploaded workbook for the store-visits sheet.

use crate::core::workbook;
use crate::domain::model::{RawRecord, Sheet, SheetSet};
use crate::domain::ports::{ConfigProvider, Ingestor};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// In-memory fetch cache, scoped to one aggregate-ingestion invocation and
/// passed by reference into the call. Each fetch writes a distinct slot
/// keyed by source name.
#[derive(Debug, Default)]
pub struct FetchCache {
    entries: Mutex<HashMap<String, Sheet>>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Sheet> {
        self.entries.lock().await.get(key).cloned()
    }

    pub async fn insert(&self, key: &str, table: Sheet) {
        self.entries.lock().await.insert(key.to_string(), table);
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

/// Fetches the four positional record tables concurrently and merges in the
/// optional workbook-supplied store-visits sheet.
pub struct ApiMerger<C: ConfigProvider> {
    client: Client,
    config: C,
    visits_workbook: Option<Vec<u8>>,
}

impl<C: ConfigProvider> ApiMerger<C> {
    pub fn new(config: C) -> Self {
        Self {
            client: Client::new(),
            config,
            visits_workbook: None,
        }
    }

    /// Supplies workbook bytes whose first sheet becomes the store-visits
    /// table.
    pub fn with_visits_workbook(mut self, bytes: Vec<u8>) -> Self {
        self.visits_workbook = Some(bytes);
        self
    }

    /// Runs the merge against an explicit, caller-scoped cache.
    ///
    /// A failure in any fetch aborts the whole ingestion; there is no
    /// partial-result mode.
    pub async fn extract_with_cache(&self, cache: &FetchCache) -> Result<SheetSet> {
        let (leads, test_drives, complete_journey, billed) = tokio::try_join!(
            self.cached_fetch(cache, "leads", self.config.leads_endpoint()),
            self.cached_fetch(cache, "testdrive", self.config.test_drives_endpoint()),
            self.cached_fetch(cache, "geral", self.config.journeys_endpoint()),
            self.cached_fetch(cache, "faturados", self.config.billed_endpoint()),
        )?;

        let store_visits = match &self.visits_workbook {
            Some(bytes) => workbook::parse_first_sheet(bytes)?,
            None => Vec::new(),
        };

        Ok(SheetSet {
            leads,
            test_drives,
            complete_journey,
            billed,
            store_visits,
        })
    }

    async fn cached_fetch(&self, cache: &FetchCache, key: &str, url: &str) -> Result<Sheet> {
        if let Some(hit) = cache.get(key).await {
            tracing::debug!(key, "fetch cache hit");
            return Ok(hit);
        }

        tracing::debug!(key, url, "fetching table");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body: Value = response.json().await?;

        let table = extract_result_table(&body);
        tracing::info!(key, rows = table.len(), "table fetched");
        cache.insert(key, table.clone()).await;
        Ok(table)
    }
}

#[async_trait]
impl<C: ConfigProvider> Ingestor for ApiMerger<C> {
    async fn extract(&self) -> Result<SheetSet> {
        let cache = FetchCache::new();
        self.extract_with_cache(&cache).await
    }
}

/// Pulls the record array out of the `{ ResultSets: { Table1: [...] } }`
/// response shape, tolerating case variants. A missing or misshapen body
/// yields an empty table, not an error.
fn extract_result_table(body: &Value) -> Sheet {
    let result_sets = body
        .get("ResultSets")
        .or_else(|| body.get("resultSets"))
        .unwrap_or(&Value::Null);
    let table = result_sets
        .get("Table1")
        .or_else(|| result_sets.get("table1"))
        .unwrap_or(&Value::Null);

    match table {
        Value::Array(items) => items
            .iter()
            .filter(|item| item.is_object())
            .map(|item| RawRecord::from_value(item.clone()))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_result_table_canonical_shape() {
        let body = json!({"ResultSets": {"Table1": [{"Dealer": "A"}, {"Dealer": "B"}]}});
        assert_eq!(extract_result_table(&body).len(), 2);
    }

    #[test]
    fn test_extract_result_table_lowercase_shape() {
        let body = json!({"resultSets": {"table1": [{"Dealer": "A"}]}});
        assert_eq!(extract_result_table(&body).len(), 1);
    }

    #[test]
    fn test_extract_result_table_missing_shape() {
        assert!(extract_result_table(&json!({})).is_empty());
        assert!(extract_result_table(&json!({"ResultSets": {}})).is_empty());
        assert!(extract_result_table(&json!([1, 2, 3])).is_empty());
        assert!(extract_result_table(&json!({"ResultSets": {"Table1": "oops"}})).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_cache_roundtrip() {
        let cache = FetchCache::new();
        assert!(cache.get("leads").await.is_none());

        cache
            .insert("leads", vec![RawRecord::from_value(json!({"id": 1}))])
            .await;
        assert_eq!(cache.get("leads").await.unwrap().len(), 1);

        cache.clear().await;
        assert!(cache.get("leads").await.is_none());
    }
}
