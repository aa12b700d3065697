//! Candidate record merger.
//!
//! Combines one annotator source's ranked hit list into the mention's
//! curie-keyed record map. Called once per source; provenance accumulates one
//! entry per (source, occurrence) and is never deduplicated across sources.
//!
//! Label policy: the label is overwritten by every hit, so the last source
//! merged determines the stored label for a curie both sources return. The
//! caller controls source order, which makes the policy explicit rather than
//! an accident of iteration. Augmentation normally replaces the label with
//! the normalizer's preferred name anyway.

use std::collections::HashMap;

use synodex_annotate::AnnotatorHit;
use synodex_common::{CandidateRecord, Provenance, Result, SynodexError};

pub fn merge_candidates(
    records: &mut HashMap<String, CandidateRecord>,
    source: &str,
    hits: &[AnnotatorHit],
) -> Result<()> {
    for (i, hit) in hits.iter().enumerate() {
        let rank = i + 1;
        let curie = hit.curie.clone().ok_or_else(|| {
            SynodexError::MalformedCandidate(format!("{source} hit at rank {rank} has no curie"))
        })?;
        let label = hit.label.clone().ok_or_else(|| {
            SynodexError::MalformedCandidate(format!("{source} hit {curie} has no label"))
        })?;
        let score = hit.score.ok_or_else(|| {
            SynodexError::MalformedCandidate(format!("{source} hit {curie} has no score"))
        })?;

        let record = records
            .entry(curie)
            .or_insert_with_key(|curie| CandidateRecord::new(curie.clone()));
        record.return_parameters.push(Provenance {
            source: source.to_string(),
            score,
            rank,
        });
        record.label = label;
    }
    Ok(())
}
