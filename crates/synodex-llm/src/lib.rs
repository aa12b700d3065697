//! synodex-llm — Text-classification oracle: backend trait, verdict
//! extraction, and audit logging.

pub mod audit;
pub mod backend;
pub mod verdict;

pub use audit::{AuditSink, JsonlAuditSink, NullAuditSink, OracleAuditEntry};
pub use backend::{OpenAiOracle, Oracle};
pub use verdict::{parse_verdicts, SynonymVerdict};
