//! End-to-end pipeline test with in-memory collaborators: two annotator
//! sources disagreeing on the identifier for "HIV", a normalizer supplying
//! class metadata, and an oracle that answers in prose around a JSON array.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use synodex_annotate::{Annotator, AnnotatorHit, NodeMetadata, Normalizer};
use synodex_common::{AbstractRecord, Mention, Result, SynonymType};
use synodex_llm::{AuditSink, Oracle, OracleAuditEntry};
use synodex_pipeline::{FailureKind, Pipeline, PipelineConfig};

// ── Stub collaborators ───────────────────────────────────────────────────────

struct StubAnnotator {
    source: &'static str,
    hits_by_term: HashMap<String, serde_json::Value>,
}

#[async_trait]
impl Annotator for StubAnnotator {
    fn name(&self) -> &str {
        self.source
    }

    async fn annotate(&self, text: &str, _limit: usize) -> Result<Vec<AnnotatorHit>> {
        let raw = self
            .hits_by_term
            .get(text)
            .cloned()
            .unwrap_or_else(|| serde_json::json!([]));
        Ok(serde_json::from_value(raw)?)
    }
}

struct StubNormalizer;

#[async_trait]
impl Normalizer for StubNormalizer {
    async fn reverse_lookup(&self, curies: &[String]) -> Result<HashMap<String, NodeMetadata>> {
        let mut out = HashMap::new();
        for curie in curies {
            let meta = match curie.as_str() {
                "MONDO:123" => NodeMetadata {
                    label: Some("HIV infection".to_string()),
                    biolink_type: Some("Disease".to_string()),
                    taxa: vec![],
                },
                // A taxon is not itself taxon-qualified
                "NCBITaxon:11676" => NodeMetadata {
                    label: Some("Human immunodeficiency virus".to_string()),
                    biolink_type: Some("OrganismTaxon".to_string()),
                    taxa: vec![],
                },
                _ => continue,
            };
            out.insert(curie.clone(), meta);
        }
        Ok(out)
    }

    async fn get_description(&self, _curie: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn get_label(&self, _curie: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

struct StubOracle;

#[async_trait]
impl Oracle for StubOracle {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if prompt.contains("query_term: HIV") {
            Ok(r#"Looking at the abstract, my assessment is:
            [
                { "synonym": "HIV infection", "vocabulary class": "Disease", "synonymType": "exact" }
            ]"#
            .to_string())
        } else {
            // No structured answer at all
            Ok("I could not find any synonyms for this term.".to_string())
        }
    }

    fn model_id(&self) -> &str {
        "stub-oracle"
    }
}

#[derive(Default)]
struct CountingAudit {
    calls: AtomicUsize,
}

impl AuditSink for &'static CountingAudit {
    fn record(&self, _entry: &OracleAuditEntry) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

fn hiv_abstract() -> AbstractRecord {
    AbstractRecord {
        abstract_id: "PMID:100".to_string(),
        title: None,
        abstract_text: "We examined HIV progression in a treatment cohort.".to_string(),
        entities: vec![
            Mention { text: "HIV".to_string(), qualifier: Some("subject".to_string()) },
            Mention { text: "glargle".to_string(), qualifier: Some("object".to_string()) },
        ],
    }
}

fn build_pipeline(audit: &'static CountingAudit) -> Pipeline {
    let nameres = StubAnnotator {
        source: "NameRes",
        hits_by_term: HashMap::from([(
            "HIV".to_string(),
            serde_json::json!([{ "curie": "MONDO:123", "label": "HIV infection", "score": 0.9 }]),
        )]),
    };
    let sapbert = StubAnnotator {
        source: "SAPBert",
        hits_by_term: HashMap::from([(
            "HIV".to_string(),
            serde_json::json!([{ "curie": "NCBITaxon:11676", "name": "Human immunodeficiency virus", "score": 0.95 }]),
        )]),
    };
    Pipeline::new(
        vec![Box::new(nameres), Box::new(sapbert)],
        Box::new(StubNormalizer),
        Box::new(StubOracle),
        Box::new(audit),
        PipelineConfig::default(),
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_hiv_mention_reconciles_exact_and_unrelated() {
    let audit: &'static CountingAudit = Box::leak(Box::default());
    let pipeline = build_pipeline(audit);

    let (output, _failures) = pipeline.process_abstract(&hiv_abstract()).await;

    let methods = &output.results["HIV"];
    assert_eq!(
        methods.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["class", "class_description", "label"],
        "all three granularities ran"
    );

    for buckets in methods.values() {
        let exact = &buckets[&SynonymType::Exact];
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].curie, "MONDO:123");
        assert_eq!(exact[0].biolink_type.as_deref(), Some("Disease"));

        let unrelated = &buckets[&SynonymType::Unrelated];
        assert_eq!(unrelated.len(), 1);
        assert_eq!(unrelated[0].curie, "NCBITaxon:11676");
    }
}

#[tokio::test]
async fn test_malformed_oracle_output_skips_only_that_mention() {
    let audit: &'static CountingAudit = Box::leak(Box::default());
    let pipeline = build_pipeline(audit);

    let (output, failures) = pipeline.process_abstract(&hiv_abstract()).await;

    // The sibling mention still succeeded
    assert!(output.results.contains_key("HIV"));
    assert!(!output.results.contains_key("glargle"));

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].mention, "glargle");
    assert_eq!(failures[0].abstract_id, "PMID:100");
    assert_eq!(failures[0].kind, FailureKind::MalformedVerdict);
}

#[tokio::test]
async fn test_every_oracle_exchange_is_audited() {
    let audit: &'static CountingAudit = Box::leak(Box::default());
    let pipeline = build_pipeline(audit);

    pipeline.process_abstract(&hiv_abstract()).await;

    // 3 granularities for HIV, plus the one failed call for the sibling
    // (audited before verdict parsing rejects it)
    assert_eq!(audit.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_provenance_survives_to_output() {
    let audit: &'static CountingAudit = Box::leak(Box::default());
    let pipeline = build_pipeline(audit);

    let (output, _) = pipeline.process_abstract(&hiv_abstract()).await;

    let buckets: &BTreeMap<_, _> = &output.results["HIV"]["label"];
    let exact = &buckets[&SynonymType::Exact][0];
    assert_eq!(exact.return_parameters.len(), 1);
    assert_eq!(exact.return_parameters[0].source, "NameRes");
    assert_eq!(exact.return_parameters[0].rank, 1);
}
