//! Metadata augmenter.
//!
//! Enriches a merged record map in place: one batched reverse lookup over
//! all curies (fatal on failure — the full identifier set is
//! identity-defining), then per-curie description lookups and taxon
//! qualification of labels, both of which degrade gracefully on failure.

use std::collections::HashMap;

use synodex_annotate::{Normalizer, TaxonCache};
use synodex_common::{CandidateRecord, Result};
use tracing::{instrument, warn};

#[instrument(skip_all, fields(n_records = records.len()))]
pub async fn augment_records(
    records: &mut HashMap<String, CandidateRecord>,
    normalizer: &dyn Normalizer,
    taxa: &TaxonCache,
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let curies: Vec<String> = records.keys().cloned().collect();
    let metadata = normalizer.reverse_lookup(&curies).await?;

    for curie in records.keys() {
        if !metadata.contains_key(curie) {
            warn!(curie = %curie, "reverse lookup returned no entry, record left unenriched");
        }
    }

    for (curie, meta) in &metadata {
        let Some(record) = records.get_mut(curie) else { continue };
        if let Some(label) = &meta.label {
            record.label = label.clone();
        }
        if meta.biolink_type.is_some() {
            record.biolink_type = meta.biolink_type.clone();
        }
        record.taxa = meta.taxa.clone();

        match normalizer.get_description(curie).await {
            Ok(Some(description)) => record.description = description,
            Ok(None) => {
                warn!(curie = %curie, "normalizer returned no description");
                record.description = String::new();
            }
            Err(e) => {
                warn!(curie = %curie, error = %e, "description lookup failed");
                record.description = String::new();
            }
        }
    }

    for record in records.values_mut() {
        let Some(tax_id) = record.taxa.first() else { continue };
        match taxa.display_name(tax_id, normalizer).await {
            Ok(Some(name)) => {
                let suffix = format!(" ({name})");
                // Re-running the augmenter must not stack qualifiers
                if !record.label.ends_with(&suffix) {
                    record.label.push_str(&suffix);
                }
            }
            Ok(None) => warn!(tax_id = %tax_id, curie = %record.curie, "unknown taxon, label left unqualified"),
            Err(e) => warn!(tax_id = %tax_id, error = %e, "taxon name lookup failed"),
        }
    }

    Ok(())
}
