use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{EntitySpan, EntityType};
use crate::domain::style::{Complexity, Tone};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntentId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhraseId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseId(pub String);

/// Parameters collected by the intent form. Generation never mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub intent_name: String,
    pub description: String,
    pub domain: String,
    pub language: String,
    pub phrase_count: usize,
    #[serde(default)]
    pub entity_types: Vec<EntityType>,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub include_entities: bool,
    #[serde(default)]
    pub include_variations: bool,
    #[serde(default)]
    pub include_negatives: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            intent_name: String::new(),
            description: String::new(),
            domain: "general".to_string(),
            language: "en".to_string(),
            phrase_count: 20,
            entity_types: Vec::new(),
            tone: Tone::default(),
            complexity: Complexity::default(),
            include_entities: true,
            include_variations: true,
            include_negatives: false,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.intent_name.trim().is_empty() {
            return Err(DomainError::MissingField { field: "intent name" });
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::MissingField { field: "description" });
        }
        if self.phrase_count == 0 {
            return Err(DomainError::InvariantViolation(
                "phrase count must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPhrase {
    pub id: PhraseId,
    pub text: String,
    pub entities: Vec<EntitySpan>,
    /// Placeholder score drawn at generation time; not produced by any model.
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: ResponseId,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub id: IntentId,
    pub display_name: String,
    pub description: String,
    pub training_phrases: Vec<TrainingPhrase>,
    pub responses: Vec<Response>,
    #[serde(default)]
    pub negative_phrases: Vec<String>,
    pub language: String,
    pub category: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Intent {
    pub fn phrase_texts(&self) -> impl Iterator<Item = &str> {
        self.training_phrases.iter().map(|phrase| phrase.text.as_str())
    }

    /// Replaces a phrase's text in place, as the preview editor does.
    /// Entity spans from the original text no longer apply and are dropped.
    pub fn edit_phrase(
        &mut self,
        phrase_id: &PhraseId,
        text: impl Into<String>,
        edited_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let phrase = self
            .training_phrases
            .iter_mut()
            .find(|phrase| &phrase.id == phrase_id)
            .ok_or_else(|| {
                DomainError::InvariantViolation(format!("unknown phrase id `{}`", phrase_id.0))
            })?;
        phrase.text = text.into();
        phrase.entities.clear();
        self.updated_at = edited_at;
        Ok(())
    }

    pub fn remove_phrase(&mut self, phrase_id: &PhraseId, edited_at: DateTime<Utc>) -> bool {
        let before = self.training_phrases.len();
        self.training_phrases.retain(|phrase| &phrase.id != phrase_id);
        let removed = self.training_phrases.len() != before;
        if removed {
            self.updated_at = edited_at;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{GenerationConfig, Intent, IntentId, PhraseId, TrainingPhrase};
    use crate::errors::DomainError;

    fn config() -> GenerationConfig {
        GenerationConfig {
            intent_name: "book.appointment".to_string(),
            description: "book appointment".to_string(),
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn rejects_blank_description() {
        let config = GenerationConfig { description: "   ".to_string(), ..config() };
        assert_eq!(config.validate(), Err(DomainError::MissingField { field: "description" }));
    }

    #[test]
    fn rejects_zero_phrase_count() {
        let config = GenerationConfig { phrase_count: 0, ..config() };
        assert!(matches!(config.validate(), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn editing_a_phrase_drops_stale_entities_and_bumps_timestamp() {
        let created = Utc::now();
        let mut intent = Intent {
            id: IntentId("intent-1".to_string()),
            display_name: "book.appointment".to_string(),
            description: "book appointment".to_string(),
            training_phrases: vec![TrainingPhrase {
                id: PhraseId("phrase-1".to_string()),
                text: "See me on Monday".to_string(),
                entities: vec![],
                confidence: 0.9,
            }],
            responses: vec![],
            negative_phrases: vec![],
            language: "en".to_string(),
            category: "healthcare".to_string(),
            tags: vec![],
            created_at: created,
            updated_at: created,
        };
        let edited_at = created + Duration::seconds(5);

        intent
            .edit_phrase(&PhraseId("phrase-1".to_string()), "See me on Tuesday", edited_at)
            .expect("edit phrase");

        assert_eq!(intent.training_phrases[0].text, "See me on Tuesday");
        assert_eq!(intent.updated_at, edited_at);
        assert!(intent.edit_phrase(&PhraseId("missing".to_string()), "x", edited_at).is_err());
        assert!(intent.remove_phrase(&PhraseId("phrase-1".to_string()), edited_at));
        assert!(intent.training_phrases.is_empty());
    }
}
