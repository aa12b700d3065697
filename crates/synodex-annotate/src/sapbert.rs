//! SAPBERT annotation client.
//!
//! Endpoint: `POST {base}/annotate/` with `{text, model_name, count}`,
//! returning a ranked list of `{curie, name, score, category}` objects.

use async_trait::async_trait;
use synodex_common::{Result, RetryClient, SynodexError};
use tracing::{debug, instrument};

use crate::{Annotator, AnnotatorHit};

pub const DEFAULT_SAPBERT_URL: &str = "https://sap-qdrant.apps.renci.org";

pub struct SapbertAnnotator {
    base_url: String,
    client: RetryClient,
}

impl SapbertAnnotator {
    pub fn new(base_url: impl Into<String>, client: RetryClient) -> Self {
        Self { base_url: base_url.into(), client }
    }
}

#[async_trait]
impl Annotator for SapbertAnnotator {
    fn name(&self) -> &str {
        "SAPBert"
    }

    #[instrument(skip(self))]
    async fn annotate(&self, text: &str, limit: usize) -> Result<Vec<AnnotatorHit>> {
        let url = format!("{}/annotate/", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "text": text,
            "model_name": "sapbert",
            "count": limit,
        });
        let resp = self.client.execute(self.client.post(&url).json(&body)).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SynodexError::Api {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        let hits: Vec<AnnotatorHit> = resp.json().await?;
        debug!(n_hits = hits.len(), "SAPBERT annotate returned");
        Ok(hits)
    }
}
