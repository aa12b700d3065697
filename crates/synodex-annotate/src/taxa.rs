//! Process-lifetime taxon name cache.
//!
//! Taxon ids recur across mentions and abstracts; each is resolved through
//! the normalizer at most once per run. The cache is append-only and
//! mutex-guarded so per-mention processing could be parallelized without a
//! redesign — a duplicate concurrent fetch of the same key is safe, merely
//! wasteful.

use std::collections::HashMap;
use std::sync::Mutex;

use synodex_common::Result;
use tracing::debug;

use crate::Normalizer;

#[derive(Debug, Default)]
pub struct TaxonCache {
    inner: Mutex<HashMap<String, String>>,
}

impl TaxonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, taxon_id: &str) -> Option<String> {
        self.inner.lock().expect("taxon cache poisoned").get(taxon_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("taxon cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display name for a taxon id, fetching and caching on first sighting.
    /// Returns `None` when the normalizer does not know the taxon.
    pub async fn display_name(
        &self,
        taxon_id: &str,
        normalizer: &dyn Normalizer,
    ) -> Result<Option<String>> {
        if let Some(name) = self.get(taxon_id) {
            return Ok(Some(name));
        }
        let name = normalizer.get_label(taxon_id).await?;
        if let Some(ref name) = name {
            debug!(taxon_id, name = %name, "caching taxon display name");
            self.inner
                .lock()
                .expect("taxon cache poisoned")
                .insert(taxon_id.to_string(), name.clone());
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeMetadata;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub normalizer that counts label lookups.
    struct CountingNormalizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Normalizer for CountingNormalizer {
        async fn reverse_lookup(
            &self,
            _curies: &[String],
        ) -> Result<HashMap<String, NodeMetadata>> {
            Ok(HashMap::new())
        }

        async fn get_description(&self, _curie: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn get_label(&self, curie: &str) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if curie == "NCBITaxon:9606" {
                Ok(Some("Homo sapiens".to_string()))
            } else {
                Ok(None)
            }
        }
    }

    #[tokio::test]
    async fn test_second_lookup_is_a_cache_hit() {
        let cache = TaxonCache::new();
        let normalizer = CountingNormalizer { calls: AtomicUsize::new(0) };

        let first = cache.display_name("NCBITaxon:9606", &normalizer).await.unwrap();
        let second = cache.display_name("NCBITaxon:9606", &normalizer).await.unwrap();

        assert_eq!(first.as_deref(), Some("Homo sapiens"));
        assert_eq!(second.as_deref(), Some("Homo sapiens"));
        assert_eq!(normalizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_taxon_is_not_cached() {
        let cache = TaxonCache::new();
        let normalizer = CountingNormalizer { calls: AtomicUsize::new(0) };

        assert!(cache.display_name("NCBITaxon:0", &normalizer).await.unwrap().is_none());
        assert!(cache.is_empty());
        // Unknown taxa are retried on next sighting rather than negatively cached
        cache.display_name("NCBITaxon:0", &normalizer).await.unwrap();
        assert_eq!(normalizer.calls.load(Ordering::SeqCst), 2);
    }
}
