//! Configuration loading for the synodex binary.
//! Reads synodex.toml from the current directory or the path in the
//! SYNODEX_CONFIG env var; every section has workable defaults, so a missing
//! file only matters once an API key is needed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use synodex_annotate::nameres::DEFAULT_NAMERES_URL;
use synodex_annotate::normalizer::DEFAULT_NODENORM_URL;
use synodex_annotate::sapbert::DEFAULT_SAPBERT_URL;
use synodex_pipeline::ClassificationMethod;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_nameres_url")]
    pub nameres_url: String,
    #[serde(default = "default_sapbert_url")]
    pub sapbert_url: String,
    #[serde(default = "default_nodenorm_url")]
    pub nodenorm_url: String,
}

fn default_nameres_url() -> String { DEFAULT_NAMERES_URL.to_string() }
fn default_sapbert_url() -> String { DEFAULT_SAPBERT_URL.to_string() }
fn default_nodenorm_url() -> String { DEFAULT_NODENORM_URL.to_string() }

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            nameres_url: default_nameres_url(),
            sapbert_url: default_sapbert_url(),
            nodenorm_url: default_nodenorm_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_oracle_model")]
    pub model: String,
    /// Empty means: fall back to SYNODEX_OPENAI_API_KEY / OPENAI_API_KEY.
    #[serde(default)]
    pub api_key: String,
}

fn default_oracle_model() -> String { "gpt-4-0125-preview".to_string() }

impl Default for OracleConfig {
    fn default() -> Self {
        Self { model: default_oracle_model(), api_key: String::new() }
    }
}

impl OracleConfig {
    pub fn resolved_api_key(&self) -> anyhow::Result<String> {
        if !self.api_key.is_empty() {
            return Ok(self.api_key.clone());
        }
        std::env::var("SYNODEX_OPENAI_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| {
                anyhow::anyhow!(
                    "no oracle API key: set oracle.api_key in synodex.toml or \
                     SYNODEX_OPENAI_API_KEY"
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_annotator_limit")]
    pub annotator_limit: usize,
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
}

fn default_annotator_limit() -> usize { 10 }

fn default_methods() -> Vec<String> {
    vec!["label".to_string(), "class".to_string(), "class_description".to_string()]
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { annotator_limit: default_annotator_limit(), methods: default_methods() }
    }
}

impl PipelineSettings {
    pub fn parsed_methods(&self) -> anyhow::Result<Vec<ClassificationMethod>> {
        self.methods
            .iter()
            .map(|m| match m.as_str() {
                "label" => Ok(ClassificationMethod::Label),
                "class" => Ok(ClassificationMethod::Class),
                "class_description" => Ok(ClassificationMethod::ClassDescription),
                other => Err(anyhow::anyhow!(
                    "unknown classification method {other:?} \
                     (expected label, class, or class_description)"
                )),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuditConfig {
    /// Append-only jsonl of every oracle exchange; disabled when unset.
    pub path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("SYNODEX_CONFIG").unwrap_or_else(|_| "synodex.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}
