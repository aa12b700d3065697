//! synodex-common — Shared types, errors, and the retrying HTTP client used
//! across all Synodex crates.

pub mod error;
pub mod http;
pub mod types;

pub use error::{Result, SynodexError};
pub use http::{RetryClient, RetryPolicy};
pub use types::{AbstractRecord, CandidateRecord, Mention, Provenance, SynonymType};
