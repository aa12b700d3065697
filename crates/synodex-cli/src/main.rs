//! Synodex — reconcile biomedical entity mentions against candidate
//! identifiers from multiple NER services and classify their synonymy with a
//! text-understanding oracle.

mod config;
mod export;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use synodex_annotate::{
    Annotator, NameResAnnotator, SapbertAnnotator, SriNormalizer,
};
use synodex_common::{AbstractRecord, RetryClient};
use synodex_llm::{AuditSink, JsonlAuditSink, NullAuditSink, OpenAiOracle};
use synodex_pipeline::{FailureKind, MentionFailure, Pipeline, PipelineConfig};

use config::Config;

#[derive(Parser)]
#[command(name = "synodex", version, about = "Candidate reconciliation and synonym classification for biomedical abstracts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline over a parsed-abstract jsonl file
    Run {
        /// Input jsonl: one abstract per line with its entity mentions
        input: PathBuf,
        /// Output jsonl: one result object per abstract
        output: PathBuf,
        /// Process at most N abstracts
        #[arg(long)]
        sample: Option<usize>,
    },
    /// Flatten run output to a TSV of exact matches
    Export {
        /// Run output jsonl
        input: PathBuf,
        /// Destination TSV
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("synodex=debug,info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { input, output, sample } => run(input, output, sample).await,
        Command::Export { input, output } => export::export_exact_matches(&input, &output),
    }
}

fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline> {
    let client = RetryClient::new()?;

    let annotators: Vec<Box<dyn Annotator>> = vec![
        Box::new(NameResAnnotator::new(&config.services.nameres_url, client.clone())),
        Box::new(SapbertAnnotator::new(&config.services.sapbert_url, client.clone())),
    ];
    let normalizer = SriNormalizer::new(
        &config.services.nameres_url,
        &config.services.nodenorm_url,
        client.clone(),
    );
    let oracle = OpenAiOracle::new(
        config.oracle.resolved_api_key()?,
        &config.oracle.model,
        client,
    );
    let audit: Box<dyn AuditSink> = match &config.audit.path {
        Some(path) => Box::new(JsonlAuditSink::new(path)),
        None => Box::new(NullAuditSink),
    };

    Ok(Pipeline::new(
        annotators,
        Box::new(normalizer),
        Box::new(oracle),
        audit,
        PipelineConfig {
            annotator_limit: config.pipeline.annotator_limit,
            methods: config.pipeline.parsed_methods()?,
        },
    ))
}

async fn run(input: PathBuf, output: PathBuf, sample: Option<usize>) -> anyhow::Result<()> {
    let config = Config::load()?;
    info!(model = %config.oracle.model, "configuration loaded");
    let pipeline = build_pipeline(&config)?;

    let reader = BufReader::new(File::open(&input)?);
    let mut writer = BufWriter::new(File::create(&output)?);

    let mut n_abstracts = 0usize;
    let mut all_failures: Vec<MentionFailure> = Vec::new();

    for line in reader.lines().take(sample.unwrap_or(usize::MAX)) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: AbstractRecord = serde_json::from_str(&line)?;

        let (result, failures) = pipeline.process_abstract(&record).await;
        writeln!(writer, "{}", serde_json::to_string(&result)?)?;
        all_failures.extend(failures);
        n_abstracts += 1;
    }
    writer.flush()?;

    report_failures(&all_failures);
    info!(
        n_abstracts,
        n_failed_mentions = all_failures.len(),
        taxa_cached = pipeline.taxon_cache().len(),
        output = %output.display(),
        "run complete"
    );
    Ok(())
}

fn report_failures(failures: &[MentionFailure]) {
    if failures.is_empty() {
        return;
    }
    for failure in failures {
        warn!(
            abstract_id = %failure.abstract_id,
            mention = %failure.mention,
            kind = failure.kind.as_str(),
            "mention skipped"
        );
    }
    let mut counts: HashMap<FailureKind, usize> = HashMap::new();
    for failure in failures {
        *counts.entry(failure.kind).or_default() += 1;
    }
    for (kind, count) in counts {
        info!(kind = kind.as_str(), count, "failure total");
    }
}
