//! Identifier normalization: reverse lookup and node-normalization client.
//!
//! Two upstream services back the `Normalizer` trait:
//!   reverse lookup:  `POST {nameres}/reverse_lookup` with `{curies: […]}`
//!   node metadata:   `GET  {nodenorm}/get_normalized_nodes?curie=…`
//!
//! Description and taxon-name lookups are enrichments: a curie the service
//! does not know resolves to `None` rather than an error, and the caller
//! decides how to degrade.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use synodex_common::{Result, RetryClient, SynodexError};
use tracing::{debug, instrument, warn};

pub const DEFAULT_NODENORM_URL: &str = "https://nodenormalization-sri.renci.org";

/// Per-curie metadata from the reverse lookup.
#[derive(Debug, Clone, Default)]
pub struct NodeMetadata {
    pub label: Option<String>,
    pub biolink_type: Option<String>,
    pub taxa: Vec<String>,
}

/// A collaborator mapping identifiers to canonical metadata.
#[async_trait]
pub trait Normalizer: Send + Sync {
    /// Batched lookup of label/class/taxa for a set of curies. Curies the
    /// service does not know are simply absent from the result map.
    async fn reverse_lookup(&self, curies: &[String]) -> Result<HashMap<String, NodeMetadata>>;

    /// Free-text description for one curie, if the service has one.
    async fn get_description(&self, curie: &str) -> Result<Option<String>>;

    /// Canonical display label for one curie, if the service has one.
    async fn get_label(&self, curie: &str) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// SRI client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ReverseLookupEntry {
    preferred_name: Option<String>,
    #[serde(default)]
    taxa: Vec<String>,
    #[serde(default)]
    types: Vec<String>,
}

pub struct SriNormalizer {
    nameres_url: String,
    nodenorm_url: String,
    client: RetryClient,
}

impl SriNormalizer {
    pub fn new(
        nameres_url: impl Into<String>,
        nodenorm_url: impl Into<String>,
        client: RetryClient,
    ) -> Self {
        Self {
            nameres_url: nameres_url.into(),
            nodenorm_url: nodenorm_url.into(),
            client,
        }
    }

    /// One `get_normalized_nodes` call, returning the raw per-curie JSON.
    async fn normalized_node(
        &self,
        curie: &str,
        with_description: bool,
    ) -> Result<Option<serde_json::Value>> {
        let url = format!(
            "{}/get_normalized_nodes",
            self.nodenorm_url.trim_end_matches('/')
        );
        let mut query = vec![("curie", curie.to_string())];
        if with_description {
            query.push(("conflate", "true".to_string()));
            query.push(("drug_chemical_conflate", "true".to_string()));
            query.push(("description", "true".to_string()));
        }
        let resp = self.client.execute(self.client.get(&url).query(&query)).await?;
        if !resp.status().is_success() {
            warn!(curie, status = resp.status().as_u16(), "node normalization lookup failed");
            return Ok(None);
        }
        let body: serde_json::Value = resp.json().await?;
        Ok(body.get(curie).filter(|v| !v.is_null()).cloned())
    }
}

#[async_trait]
impl Normalizer for SriNormalizer {
    #[instrument(skip(self, curies), fields(n_curies = curies.len()))]
    async fn reverse_lookup(&self, curies: &[String]) -> Result<HashMap<String, NodeMetadata>> {
        let url = format!("{}/reverse_lookup", self.nameres_url.trim_end_matches('/'));
        let body = serde_json::json!({ "curies": curies });
        let resp = self.client.execute(self.client.post(&url).json(&body)).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SynodexError::Api {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        let raw: HashMap<String, ReverseLookupEntry> = resp.json().await?;
        debug!(n_resolved = raw.len(), "reverse lookup resolved");
        Ok(raw
            .into_iter()
            .map(|(curie, entry)| {
                (
                    curie,
                    NodeMetadata {
                        label: entry.preferred_name,
                        biolink_type: entry.types.into_iter().next(),
                        taxa: entry.taxa,
                    },
                )
            })
            .collect())
    }

    async fn get_description(&self, curie: &str) -> Result<Option<String>> {
        let node = self.normalized_node(curie, true).await?;
        Ok(node
            .as_ref()
            .and_then(|n| n["id"]["description"].as_str())
            .map(String::from))
    }

    async fn get_label(&self, curie: &str) -> Result<Option<String>> {
        let node = self.normalized_node(curie, false).await?;
        Ok(node
            .as_ref()
            .and_then(|n| n["id"]["label"].as_str())
            .map(String::from))
    }
}
