//! Core data types for the reconciliation pipeline.
//!
//! A `CandidateRecord` lives for exactly one mention's processing pass: it is
//! created empty on first sighting of its curie during merge, mutated in
//! place through augmentation and classification, and finally grouped into
//! per-synonym-type buckets for output.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Synonym type
// ---------------------------------------------------------------------------

/// Oracle-assigned relationship between a mention and a candidate label.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum SynonymType {
    Exact,
    Narrow,
    Broad,
    Related,
    /// Default for every candidate never addressed by a verdict. The `other`
    /// attribute also absorbs nonstandard strings an oracle may emit.
    #[default]
    #[serde(other)]
    Unrelated,
}

impl SynonymType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynonymType::Exact => "exact",
            SynonymType::Narrow => "narrow",
            SynonymType::Broad => "broad",
            SynonymType::Related => "related",
            SynonymType::Unrelated => "unrelated",
        }
    }
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// One annotator's sighting of a candidate: which source returned it, with
/// what score, at what 1-based rank within that source's ranked output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provenance {
    pub source: String,
    pub score: f64,
    pub rank: usize,
}

// ---------------------------------------------------------------------------
// Candidate record
// ---------------------------------------------------------------------------

/// A merged candidate keyed by its curie, accumulated across annotator
/// sources and enriched by the normalizer before classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub curie: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biolink_type: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub taxa: Vec<String>,
    /// One entry per (source, occurrence), never deduplicated across sources.
    pub return_parameters: Vec<Provenance>,
    #[serde(default)]
    pub synonym_type: SynonymType,
}

impl CandidateRecord {
    /// A fresh record with every field initialized; inserted on first
    /// sighting of `curie` during merge.
    pub fn new(curie: impl Into<String>) -> Self {
        Self {
            curie: curie.into(),
            label: String::new(),
            biolink_type: None,
            description: String::new(),
            taxa: Vec::new(),
            return_parameters: Vec::new(),
            synonym_type: SynonymType::Unrelated,
        }
    }
}

// ---------------------------------------------------------------------------
// Corpus records
// ---------------------------------------------------------------------------

/// A query term as extracted from an abstract, with the optional
/// subject/object qualifier the extraction step attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    #[serde(rename = "entity")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

/// One parsed abstract with its gold entity mentions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbstractRecord {
    pub abstract_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub entities: Vec<Mention>,
}

impl AbstractRecord {
    /// Distinct mention texts in first-seen order. The extraction step emits
    /// one entry per triple role, so the same surface text recurs.
    pub fn distinct_mentions(&self) -> Vec<&Mention> {
        let mut seen = std::collections::HashSet::new();
        self.entities
            .iter()
            .filter(|m| seen.insert(m.text.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonym_type_roundtrip() {
        let t: SynonymType = serde_json::from_str("\"narrow\"").unwrap();
        assert_eq!(t, SynonymType::Narrow);
        assert_eq!(serde_json::to_string(&SynonymType::Exact).unwrap(), "\"exact\"");
    }

    #[test]
    fn test_synonym_type_unknown_string_is_unrelated() {
        let t: SynonymType = serde_json::from_str("\"close-ish\"").unwrap();
        assert_eq!(t, SynonymType::Unrelated);
    }

    #[test]
    fn test_new_record_is_fully_initialized() {
        let r = CandidateRecord::new("MONDO:0005109");
        assert!(r.return_parameters.is_empty());
        assert_eq!(r.synonym_type, SynonymType::Unrelated);
        assert_eq!(r.description, "");
        assert!(r.taxa.is_empty());
    }

    #[test]
    fn test_distinct_mentions_dedup_by_text() {
        let rec = AbstractRecord {
            abstract_id: "PMID:1".to_string(),
            title: None,
            abstract_text: "…".to_string(),
            entities: vec![
                Mention { text: "HIV".into(), qualifier: Some("subject".into()) },
                Mention { text: "AIDS".into(), qualifier: Some("object".into()) },
                Mention { text: "HIV".into(), qualifier: Some("object".into()) },
            ],
        };
        let distinct = rec.distinct_mentions();
        assert_eq!(distinct.len(), 2);
        // First occurrence wins, including its qualifier
        assert_eq!(distinct[0].qualifier.as_deref(), Some("subject"));
    }
}
