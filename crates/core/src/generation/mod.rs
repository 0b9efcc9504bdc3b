//! Template-based intent generation. Nothing here calls a language model:
//! phrases come from static tables combined by string substitution.

pub mod expander;
pub mod patterns;
pub mod responses;
pub mod service;

pub use expander::{expand_phrases, PhraseExpander, TemplatePhraseExpander};
pub use responses::default_responses;
pub use service::IntentGenerator;
