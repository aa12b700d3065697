//! Verdict extraction from raw oracle output.
//!
//! Oracles are asked to answer with a JSON array but routinely wrap it in
//! prose or code fences. The structured answer is taken as the substring
//! between the first `[` and the last `]`; anything that does not decode
//! from there is a fatal classification error for the mention.

use serde::Deserialize;
use synodex_common::{Result, SynodexError, SynonymType};

/// One oracle judgment, keyed by the candidate's label and (depending on the
/// requested granularity) its vocabulary class.
#[derive(Debug, Clone, Deserialize)]
pub struct SynonymVerdict {
    pub synonym: String,
    #[serde(default, rename = "vocabulary class")]
    pub vocabulary_class: Option<String>,
    #[serde(rename = "synonymType")]
    pub synonym_type: SynonymType,
}

/// Extract and decode the verdict list from a raw oracle response.
pub fn parse_verdicts(raw: &str) -> Result<Vec<SynonymVerdict>> {
    let start = raw.find('[').ok_or_else(|| {
        SynodexError::MalformedVerdict("no '[' found in oracle response".to_string())
    })?;
    let end = raw.rfind(']').ok_or_else(|| {
        SynodexError::MalformedVerdict("no ']' found in oracle response".to_string())
    })?;
    if end < start {
        return Err(SynodexError::MalformedVerdict(
            "']' precedes '[' in oracle response".to_string(),
        ));
    }
    let chunk = &raw[start..=end];
    serde_json::from_str(chunk)
        .map_err(|e| SynodexError::MalformedVerdict(format!("undecodable verdict list: {e}")))
}
