//! mp3quran API client wrapper

use anyhow::{Context, Result, bail};

use super::catalog::{Reciter, RecitersResponse, SurahInfo, SuwarResponse};

const API_BASE: &str = "https://mp3quran.net/api/v3";

/// Catalog language requested from the API.
pub const CATALOG_LANGUAGE: &str = "eng";

/// Client for the public mp3quran.net catalog API.
///
/// The API is unauthenticated; failures (network, non-2xx, malformed JSON)
/// are hard errors surfaced to the caller, never retried here.
#[derive(Clone)]
pub struct QuranApiClient {
    http: reqwest::Client,
}

impl QuranApiClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    pub async fn fetch_reciters(&self, language: &str) -> Result<Vec<Reciter>> {
        let url = format!("{}/reciters?language={}", API_BASE, language);
        tracing::debug!(url = %url, "fetching reciter catalog");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("reciter catalog request failed")?;
        if !response.status().is_success() {
            bail!("reciter catalog request returned {}", response.status());
        }

        let payload: RecitersResponse = response
            .json()
            .await
            .context("malformed reciter catalog payload")?;
        tracing::info!(count = payload.reciters.len(), "reciter catalog loaded");
        Ok(payload.reciters)
    }

    pub async fn fetch_surah_names(&self, language: &str) -> Result<Vec<SurahInfo>> {
        let url = format!("{}/suwar?language={}", API_BASE, language);
        tracing::debug!(url = %url, "fetching surah index");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("surah index request failed")?;
        if !response.status().is_success() {
            bail!("surah index request returned {}", response.status());
        }

        let payload: SuwarResponse = response
            .json()
            .await
            .context("malformed surah index payload")?;
        Ok(payload.suwar)
    }
}

impl Default for QuranApiClient {
    fn default() -> Self {
        Self::new()
    }
}
