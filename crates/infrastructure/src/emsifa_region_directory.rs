//! Region directory backed by the emsifa wilayah dataset.
//!
//! The dataset is served as static JSON files, one per parent region, so
//! every lookup is a single GET.

use async_trait::async_trait;
use serde::Deserialize;

use butik_application::{Region, RegionDirectory};
use butik_core::{AppError, AppResult};

/// HTTP adapter for the Indonesian administrative region directory.
pub struct EmsifaRegionDirectory {
    http_client: reqwest::Client,
    /// Dataset root, e.g. `https://www.emsifa.com/api-wilayah-indonesia/api`.
    base_url: String,
}

impl EmsifaRegionDirectory {
    /// Creates the adapter. A trailing slash on `base_url` is tolerated.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: String) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    async fn fetch(&self, path: &str) -> AppResult<Vec<Region>> {
        let url = format!("{}/{path}", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("region lookup failed: {error}")))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "region lookup returned {}",
                response.status()
            )));
        }

        let regions: Vec<RegionEntry> = response
            .json()
            .await
            .map_err(|error| AppError::Internal(format!("invalid region response: {error}")))?;

        Ok(regions
            .into_iter()
            .map(|entry| Region {
                id: entry.id,
                name: entry.name,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct RegionEntry {
    id: String,
    name: String,
}

#[async_trait]
impl RegionDirectory for EmsifaRegionDirectory {
    async fn provinces(&self) -> AppResult<Vec<Region>> {
        self.fetch("provinces.json").await
    }

    async fn regencies(&self, province_id: &str) -> AppResult<Vec<Region>> {
        self.fetch(&format!("regencies/{province_id}.json")).await
    }

    async fn districts(&self, regency_id: &str) -> AppResult<Vec<Region>> {
        self.fetch(&format!("districts/{regency_id}.json")).await
    }

    async fn villages(&self, district_id: &str) -> AppResult<Vec<Region>> {
        self.fetch(&format!("villages/{district_id}.json")).await
    }
}
