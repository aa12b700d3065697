//! Name Resolver lookup client.
//!
//! Endpoint: `GET {base}/lookup?string=…&limit=…`, returning a ranked list of
//! `{curie, label, score, …}` objects.

use async_trait::async_trait;
use synodex_common::{Result, RetryClient};
use tracing::{debug, instrument};

use crate::{Annotator, AnnotatorHit};

pub const DEFAULT_NAMERES_URL: &str = "https://name-resolution-sri.renci.org";

pub struct NameResAnnotator {
    base_url: String,
    client: RetryClient,
}

impl NameResAnnotator {
    pub fn new(base_url: impl Into<String>, client: RetryClient) -> Self {
        Self { base_url: base_url.into(), client }
    }
}

#[async_trait]
impl Annotator for NameResAnnotator {
    fn name(&self) -> &str {
        "NameRes"
    }

    #[instrument(skip(self))]
    async fn annotate(&self, text: &str, limit: usize) -> Result<Vec<AnnotatorHit>> {
        let url = format!("{}/lookup", self.base_url.trim_end_matches('/'));
        let query = [
            ("string", text.to_string()),
            ("limit", limit.to_string()),
        ];
        let hits: Vec<AnnotatorHit> = self.client.get_json(&url, &query).await?;
        debug!(n_hits = hits.len(), "NameRes lookup returned");
        Ok(hits)
    }
}
