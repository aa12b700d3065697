//! Per-abstract orchestration with batch-level resilience.
//!
//! Mentions are processed one at a time; a fatal error (transport exhaustion,
//! malformed candidate, malformed verdict) abandons that mention only and is
//! reported in the failure list, while sibling mentions and abstracts
//! continue. No partial record set is emitted for a failed mention.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use synodex_annotate::{Annotator, Normalizer, TaxonCache};
use synodex_common::{AbstractRecord, CandidateRecord, Result, SynodexError, SynonymType};
use synodex_llm::{parse_verdicts, AuditSink, Oracle, OracleAuditEntry};
use tracing::{info, instrument, warn};

use crate::augment::augment_records;
use crate::merge::merge_candidates;
use crate::reconcile::{apply_verdicts, group_by_synonym_type};
use crate::request::{build_request, ClassificationMethod};

// ── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Candidates requested from each annotator per mention.
    pub annotator_limit: usize,
    /// Which classification granularities to run per mention.
    pub methods: Vec<ClassificationMethod>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            annotator_limit: 10,
            methods: vec![
                ClassificationMethod::Label,
                ClassificationMethod::Class,
                ClassificationMethod::ClassDescription,
            ],
        }
    }
}

// ── Output and failure types ─────────────────────────────────────────────────

pub type SynonymBuckets = BTreeMap<SynonymType, Vec<CandidateRecord>>;

/// Per-abstract artifact: for every mention, each granularity's verdict
/// buckets, keyed by the granularity's method name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbstractOutput {
    pub abstract_id: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub results: BTreeMap<String, BTreeMap<String, SynonymBuckets>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    MalformedCandidate,
    MalformedVerdict,
    Other,
}

impl FailureKind {
    pub fn from_error(error: &SynodexError) -> Self {
        match error {
            SynodexError::Http(_) | SynodexError::Api { .. } => FailureKind::Transport,
            SynodexError::MalformedCandidate(_) => FailureKind::MalformedCandidate,
            SynodexError::MalformedVerdict(_) => FailureKind::MalformedVerdict,
            _ => FailureKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::MalformedCandidate => "malformed_candidate",
            FailureKind::MalformedVerdict => "malformed_verdict",
            FailureKind::Other => "other",
        }
    }
}

/// One skipped mention, for the end-of-run summary.
#[derive(Debug, Clone, Serialize)]
pub struct MentionFailure {
    pub abstract_id: String,
    pub mention: String,
    pub kind: FailureKind,
}

// ── Pipeline ─────────────────────────────────────────────────────────────────

pub struct Pipeline {
    annotators: Vec<Box<dyn Annotator>>,
    normalizer: Box<dyn Normalizer>,
    oracle: Box<dyn Oracle>,
    audit: Box<dyn AuditSink>,
    taxa: TaxonCache,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        annotators: Vec<Box<dyn Annotator>>,
        normalizer: Box<dyn Normalizer>,
        oracle: Box<dyn Oracle>,
        audit: Box<dyn AuditSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            annotators,
            normalizer,
            oracle,
            audit,
            taxa: TaxonCache::new(),
            config,
        }
    }

    pub fn taxon_cache(&self) -> &TaxonCache {
        &self.taxa
    }

    /// Process every distinct mention of one abstract. Mentions that fail
    /// fatally are omitted from the output and reported in the failure list.
    #[instrument(skip(self, record), fields(abstract_id = %record.abstract_id))]
    pub async fn process_abstract(
        &self,
        record: &AbstractRecord,
    ) -> (AbstractOutput, Vec<MentionFailure>) {
        let mut output = AbstractOutput {
            abstract_id: record.abstract_id.clone(),
            abstract_text: record.abstract_text.clone(),
            results: BTreeMap::new(),
        };
        let mut failures = Vec::new();

        for mention in record.distinct_mentions() {
            match self.process_mention(record, &mention.text).await {
                Ok(methods) => {
                    output.results.insert(mention.text.clone(), methods);
                }
                Err(e) => {
                    let kind = FailureKind::from_error(&e);
                    warn!(mention = %mention.text, kind = kind.as_str(), error = %e,
                          "mention failed, skipping");
                    failures.push(MentionFailure {
                        abstract_id: record.abstract_id.clone(),
                        mention: mention.text.clone(),
                        kind,
                    });
                }
            }
        }

        info!(
            n_mentions = output.results.len(),
            n_failed = failures.len(),
            "abstract processed"
        );
        (output, failures)
    }

    /// Merge → augment → classify (per granularity) → reconcile, for one
    /// mention. Any error is fatal for the mention and propagated.
    async fn process_mention(
        &self,
        record: &AbstractRecord,
        term: &str,
    ) -> Result<BTreeMap<String, SynonymBuckets>> {
        let mut records: HashMap<String, CandidateRecord> = HashMap::new();
        for annotator in &self.annotators {
            let hits = annotator.annotate(term, self.config.annotator_limit).await?;
            merge_candidates(&mut records, annotator.name(), &hits)?;
        }

        augment_records(&mut records, self.normalizer.as_ref(), &self.taxa).await?;

        let mut methods = BTreeMap::new();
        for method in &self.config.methods {
            // Each granularity judges the candidates independently
            for r in records.values_mut() {
                r.synonym_type = SynonymType::Unrelated;
            }

            let request = build_request(&record.abstract_text, term, &records, *method);
            let raw = self.oracle.complete(&request.prompt).await?;
            self.audit.record(&OracleAuditEntry::new(
                &record.abstract_id,
                term,
                self.oracle.model_id(),
                &request.prompt,
                &raw,
            ))?;
            let verdicts = parse_verdicts(&raw)?;
            apply_verdicts(&mut records, &request.index, &verdicts, *method);

            methods.insert(method.as_str().to_string(), group_by_synonym_type(&records));
        }
        Ok(methods)
    }
}
