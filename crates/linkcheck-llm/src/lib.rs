//! Fallback page classifier backed by a text-completion API.
//!
//! The rule table in `linkcheck_core::classify` is authoritative; a
//! [`PageClassifier`] is only asked about pages the table could not place.
//! Which implementation runs is decided by [`LlmSettings::provider`], never
//! by whether a client happens to construct.

pub mod anthropic;
pub mod classifier;
pub mod error;
pub mod openai;
pub mod prompt;

pub use anthropic::AnthropicBackend;
pub use classifier::{
    build_classifier, CompletionBackend, LlmClassifier, LlmSettings, NoopClassifier,
    PageClassifier,
};
pub use error::LlmError;
pub use openai::OpenAiBackend;
