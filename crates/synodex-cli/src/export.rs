//! Flatten run output to a TSV of exact matches.
//!
//! One row per (abstract, term, curie) judged exact by at least one
//! granularity, with per-method provenance rendered as comma-joined
//! `source_rank` strings. Derivable losslessly from the run output; nothing
//! here re-touches the network.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use synodex_common::SynonymType;
use synodex_pipeline::AbstractOutput;
use tracing::info;

const HEADER: [&str; 7] = [
    "Abstract ID",
    "Term",
    "Curie",
    "Label",
    "Label_SourceRank",
    "Class_SourceRank",
    "ClassDescription_SourceRank",
];

#[derive(Default)]
struct ExactRow {
    label: String,
    label_sources: Vec<String>,
    class_sources: Vec<String>,
    class_description_sources: Vec<String>,
}

pub fn export_exact_matches(input: &Path, output: &Path) -> anyhow::Result<()> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(output)?;
    writer.write_record(HEADER)?;

    let mut n_rows = 0usize;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: AbstractOutput = serde_json::from_str(&line)?;

        for (term, methods) in &doc.results {
            // Accumulate per-curie provenance across the granularities
            let mut rows: BTreeMap<String, ExactRow> = BTreeMap::new();
            for (method, buckets) in methods {
                let Some(exact) = buckets.get(&SynonymType::Exact) else { continue };
                for record in exact {
                    let row = rows.entry(record.curie.clone()).or_default();
                    row.label = record.label.clone();
                    for p in &record.return_parameters {
                        let source_rank = format!("{}_{}", p.source, p.rank);
                        match method.as_str() {
                            "label" => row.label_sources.push(source_rank),
                            "class" => row.class_sources.push(source_rank),
                            "class_description" => {
                                row.class_description_sources.push(source_rank)
                            }
                            _ => {}
                        }
                    }
                }
            }

            for (curie, row) in rows {
                writer.write_record([
                    doc.abstract_id.as_str(),
                    term.as_str(),
                    curie.as_str(),
                    row.label.as_str(),
                    row.label_sources.join(",").as_str(),
                    row.class_sources.join(",").as_str(),
                    row.class_description_sources.join(",").as_str(),
                ])?;
                n_rows += 1;
            }
        }
    }

    writer.flush()?;
    info!(rows = n_rows, output = %output.display(), "export complete");
    Ok(())
}
