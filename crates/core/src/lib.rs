pub mod config;
pub mod domain;
pub mod entities;
pub mod errors;
pub mod export;
pub mod generation;
pub mod openapi;
pub mod playbook;
pub mod seams;
pub mod webhook;

pub use domain::entity::{CustomEntity, EntitySpan, EntityTag, EntityType, EntityValue};
pub use domain::intent::{GenerationConfig, Intent, IntentId, PhraseId, TrainingPhrase};
pub use domain::playbook::{PlaybookConfig, PlaybookId, PlaybookInstruction};
pub use domain::style::{Complexity, Tone};
pub use entities::EntityTagger;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use export::{to_dialogflow, DialogflowIntent};
pub use generation::{expand_phrases, IntentGenerator, PhraseExpander, TemplatePhraseExpander};
pub use openapi::{generate_openapi, ApiSpecConfig, EndpointSpec};
pub use playbook::{estimate_performance, PlaybookGenerator};
pub use webhook::{GeneratedCode, WebhookConfig, WebhookGenerator, WebhookLanguage};
