//! synodex-pipeline — Candidate reconciliation and synonym classification.
//!
//! Per-mention flow: merge ranked candidates from every annotator source
//! into one curie-keyed record set, enrich the records through the
//! normalizer, build a classification prompt at each configured granularity,
//! and reconcile the oracle's verdicts back onto the records. Each mention's
//! record map is owned exclusively by that mention's pass; the only state
//! shared across mentions is the taxon name cache.

pub mod augment;
pub mod merge;
pub mod pipeline;
pub mod reconcile;
pub mod request;

pub use augment::augment_records;
pub use merge::merge_candidates;
pub use pipeline::{AbstractOutput, FailureKind, MentionFailure, Pipeline, PipelineConfig};
pub use reconcile::{apply_verdicts, group_by_synonym_type};
pub use request::{
    build_request, CandidateGroup, CandidateIndex, ClassificationMethod, ClassificationRequest,
    GroupKey,
};
