use anyhow::{anyhow, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Discount, Masterclass};

/// Thin client for the storefront API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All discounts ("remises"). Malformed records are skipped.
    pub async fn discounts(&self) -> Result<Vec<Discount>> {
        self.get_list("/api/remise").await
    }

    /// All masterclasses. Malformed records are skipped.
    pub async fn masterclasses(&self) -> Result<Vec<Masterclass>> {
        self.get_list("/api/masterclass").await
    }

    /// One masterclass by slug
    pub async fn masterclass_by_slug(&self, slug: &str) -> Result<Masterclass> {
        let path = format!("/api/masterclass/slug/{}", slug);
        match self.fetch(&path).await? {
            Some(masterclass) => Ok(masterclass),
            None => Err(anyhow!("Masterclass not found: {}", slug)),
        }
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let records: Vec<Value> = self
            .fetch(path)
            .await?
            .ok_or_else(|| anyhow!("Not found: {}", path))?;
        Ok(decode_records(path, records))
    }

    /// GET + decode. `None` on 404.
    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");

        let response = self.http.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response.error_for_status()?;
        Ok(Some(response.json().await?))
    }
}

/// Decode each record on its own so one bad entry doesn't sink the list.
fn decode_records<T: DeserializeOwned>(path: &str, records: Vec<Value>) -> Vec<T> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            serde_json::from_value(record)
                .map_err(|e| warn!(%path, index, "Skipping malformed record: {e}"))
                .ok()
        })
        .collect()
}
