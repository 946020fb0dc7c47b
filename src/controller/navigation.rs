//! Catalog and surah text loading

use crate::model::{CATALOG_LANGUAGE, SurahText};

use super::AppController;

impl AppController {
    /// Fetch the reciter catalog and the surah name index.
    ///
    /// A failed reciter fetch is a hard error surfaced to the user (no
    /// automatic retry); the surah index only provides sidebar labels, so
    /// its failure just logs and the labels fall back to numbers.
    pub async fn load_catalog(&self) {
        let model = self.model.lock().await;
        model.set_catalog_loading(true).await;
        let Some(api) = model.get_api_client().await else {
            return;
        };
        drop(model);

        match api.fetch_reciters(CATALOG_LANGUAGE).await {
            Ok(reciters) => {
                let model = self.model.lock().await;
                model.set_reciters(reciters).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "reciter catalog load failed");
                let model = self.model.lock().await;
                model.set_catalog_loading(false).await;
                let error_msg = Self::format_error(&e);
                model.set_error(error_msg).await;
            }
        }

        match api.fetch_surah_names(CATALOG_LANGUAGE).await {
            Ok(names) => {
                let model = self.model.lock().await;
                model.set_surah_names(names).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "surah index load failed, using numeric labels");
            }
        }
    }

    /// Load the display text for a surah into the model (placeholder
    /// fallback keeps the reading panel populated either way).
    pub async fn load_surah_text(&self, surah: u16) {
        let text = SurahText::load(surah).await;
        if text.from_placeholder {
            tracing::debug!(surah, "no text asset, reading panel shows placeholder");
        }
        let model = self.model.lock().await;
        model.set_surah_text(text).await;
    }
}
