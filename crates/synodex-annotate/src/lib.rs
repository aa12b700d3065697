//! synodex-annotate — Clients for the candidate-producing NER services and
//! the identifier normalization service.

pub mod nameres;
pub mod normalizer;
pub mod sapbert;
pub mod taxa;

pub use nameres::NameResAnnotator;
pub use normalizer::{NodeMetadata, Normalizer, SriNormalizer};
pub use sapbert::SapbertAnnotator;
pub use taxa::TaxonCache;

use async_trait::async_trait;
use serde::Deserialize;
use synodex_common::Result;

/// One ranked hit from an annotator, rank implied by list position.
///
/// Fields are optional at the decode boundary on purpose: the services
/// occasionally return partial items, and completeness is enforced by the
/// merger (a missing field there is fatal for the mention).
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotatorHit {
    pub curie: Option<String>,
    #[serde(alias = "name")]
    pub label: Option<String>,
    pub score: Option<f64>,
}

/// A service mapping free text to ranked candidate identifiers.
#[async_trait]
pub trait Annotator: Send + Sync {
    /// Source name recorded in provenance entries.
    fn name(&self) -> &str;

    /// Return up to `limit` ranked candidates for `text`.
    async fn annotate(&self, text: &str, limit: usize) -> Result<Vec<AnnotatorHit>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_decodes_nameres_shape() {
        let hit: AnnotatorHit =
            serde_json::from_str(r#"{"curie":"MONDO:0005109","label":"HIV infection","score":0.9}"#)
                .unwrap();
        assert_eq!(hit.curie.as_deref(), Some("MONDO:0005109"));
        assert_eq!(hit.label.as_deref(), Some("HIV infection"));
    }

    #[test]
    fn test_hit_decodes_sapbert_shape_with_name_alias() {
        let hit: AnnotatorHit = serde_json::from_str(
            r#"{"curie":"NCBITaxon:11676","name":"Human immunodeficiency virus","score":0.95,"category":"biolink:OrganismTaxon"}"#,
        )
        .unwrap();
        assert_eq!(hit.label.as_deref(), Some("Human immunodeficiency virus"));
    }

    #[test]
    fn test_hit_tolerates_missing_fields() {
        let hit: AnnotatorHit = serde_json::from_str(r#"{"curie":"CHEBI:15365"}"#).unwrap();
        assert!(hit.label.is_none());
        assert!(hit.score.is_none());
    }
}
