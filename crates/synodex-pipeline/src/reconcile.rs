//! Verdict reconciler.
//!
//! Maps oracle verdicts (keyed by label and, where the granularity includes
//! it, vocabulary class) back onto every curie sharing that key, then groups
//! the mention's records into synonym-type buckets. Curies never addressed
//! by a verdict keep their creation-time default, `unrelated`.

use std::collections::{BTreeMap, HashMap};

use synodex_common::{CandidateRecord, SynonymType};
use synodex_llm::SynonymVerdict;
use tracing::warn;

use crate::request::{CandidateIndex, ClassificationMethod, GroupKey};

/// Assign synonym types from the oracle's verdicts. Verdicts naming a key
/// absent from the index (hallucinated or malformed candidates) are ignored;
/// they never create records.
pub fn apply_verdicts(
    records: &mut HashMap<String, CandidateRecord>,
    index: &CandidateIndex,
    verdicts: &[SynonymVerdict],
    method: ClassificationMethod,
) {
    for verdict in verdicts {
        let key = GroupKey {
            label: verdict.synonym.clone(),
            class: method
                .uses_class()
                .then(|| verdict.vocabulary_class.clone().unwrap_or_default()),
        };
        match index.get(&key) {
            Some(group) => {
                for curie in &group.curies {
                    if let Some(record) = records.get_mut(curie) {
                        record.synonym_type = verdict.synonym_type;
                    }
                }
            }
            None => warn!(
                synonym = %verdict.synonym,
                class = ?verdict.vocabulary_class,
                "verdict references an unknown candidate key, ignoring"
            ),
        }
    }
}

/// Group records into synonym-type buckets. Bucket membership order follows
/// map iteration order; rank-aware ordering is recoverable from provenance.
pub fn group_by_synonym_type(
    records: &HashMap<String, CandidateRecord>,
) -> BTreeMap<SynonymType, Vec<CandidateRecord>> {
    let mut buckets: BTreeMap<SynonymType, Vec<CandidateRecord>> = BTreeMap::new();
    for record in records.values() {
        buckets.entry(record.synonym_type).or_default().push(record.clone());
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::build_request;

    fn record(curie: &str, label: &str, class: &str) -> CandidateRecord {
        let mut r = CandidateRecord::new(curie);
        r.label = label.to_string();
        r.biolink_type = Some(class.to_string());
        r
    }

    fn setup() -> (HashMap<String, CandidateRecord>, CandidateIndex) {
        let records: HashMap<String, CandidateRecord> = [
            record("MONDO:123", "HIV infection", "Disease"),
            record("NCBITaxon:11676", "Human immunodeficiency virus", "OrganismTaxon"),
        ]
        .into_iter()
        .map(|r| (r.curie.clone(), r))
        .collect();
        let req = build_request("…", "HIV", &records, ClassificationMethod::Class);
        (records, req.index)
    }

    fn verdict(synonym: &str, class: Option<&str>, syn_type: &str) -> SynonymVerdict {
        let mut v = serde_json::json!({ "synonym": synonym, "synonymType": syn_type });
        if let Some(c) = class {
            v["vocabulary class"] = serde_json::json!(c);
        }
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_unaddressed_curies_default_to_unrelated() {
        let (mut records, index) = setup();
        let verdicts = vec![verdict("HIV infection", Some("Disease"), "exact")];
        apply_verdicts(&mut records, &index, &verdicts, ClassificationMethod::Class);

        let buckets = group_by_synonym_type(&records);
        assert_eq!(buckets[&SynonymType::Exact].len(), 1);
        assert_eq!(buckets[&SynonymType::Exact][0].curie, "MONDO:123");
        assert_eq!(buckets[&SynonymType::Unrelated].len(), 1);
        assert_eq!(buckets[&SynonymType::Unrelated][0].curie, "NCBITaxon:11676");
    }

    #[test]
    fn test_hallucinated_verdict_is_ignored() {
        let (mut records, index) = setup();
        let verdicts = vec![verdict("Ebola virus disease", Some("Disease"), "exact")];
        apply_verdicts(&mut records, &index, &verdicts, ClassificationMethod::Class);

        assert_eq!(records.len(), 2, "no records created from unknown keys");
        assert!(records.values().all(|r| r.synonym_type == SynonymType::Unrelated));
    }

    #[test]
    fn test_class_mismatch_misses_the_group() {
        let (mut records, index) = setup();
        let verdicts = vec![verdict("HIV infection", Some("OrganismTaxon"), "exact")];
        apply_verdicts(&mut records, &index, &verdicts, ClassificationMethod::Class);
        assert_eq!(records["MONDO:123"].synonym_type, SynonymType::Unrelated);
    }

    #[test]
    fn test_shared_key_receives_one_verdict_for_all_curies() {
        let records: HashMap<String, CandidateRecord> = [
            record("MONDO:1", "HIV infection", "Disease"),
            record("DOID:1", "HIV infection", "Disease"),
        ]
        .into_iter()
        .map(|r| (r.curie.clone(), r))
        .collect();
        let req = build_request("…", "HIV", &records, ClassificationMethod::Class);
        let mut records = records;
        let verdicts = vec![verdict("HIV infection", Some("Disease"), "narrow")];
        apply_verdicts(&mut records, &req.index, &verdicts, ClassificationMethod::Class);

        assert!(records.values().all(|r| r.synonym_type == SynonymType::Narrow));
    }
}
