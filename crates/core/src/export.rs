//! Export projections consumed by external agent platforms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::intent::{Intent, IntentId, PhraseId, Response, ResponseId, TrainingPhrase};
use crate::errors::DomainError;
use crate::seams::IdGenerator;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogflowTrainingPhrase {
    pub parts: Vec<TextPart>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText {
    pub text: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogflowMessage {
    pub text: MessageText,
}

/// Flattened Dialogflow intent: one single-part phrase per training phrase
/// and one text message holding every response, both in original order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogflowIntent {
    pub display_name: String,
    pub training_phrases: Vec<DialogflowTrainingPhrase>,
    pub messages: Vec<DialogflowMessage>,
}

impl DialogflowIntent {
    pub fn phrase_texts(&self) -> Vec<String> {
        self.training_phrases
            .iter()
            .map(|phrase| phrase.parts.iter().map(|part| part.text.as_str()).collect::<String>())
            .collect()
    }

    pub fn response_texts(&self) -> Vec<String> {
        self.messages.iter().flat_map(|message| message.text.text.iter().cloned()).collect()
    }

    /// Rebuilds an [`Intent`] with fresh ids. Imported phrases carry no
    /// entity spans and full confidence; blank phrases are dropped.
    pub fn into_intent(
        self,
        ids: &dyn IdGenerator,
        category: &str,
        language: &str,
        now: DateTime<Utc>,
    ) -> Result<Intent, DomainError> {
        if self.display_name.trim().is_empty() {
            return Err(DomainError::MissingField { field: "displayName" });
        }

        let training_phrases = self
            .phrase_texts()
            .into_iter()
            .filter(|text| !text.trim().is_empty())
            .map(|text| TrainingPhrase {
                id: PhraseId(ids.next_id("phrase")),
                text,
                entities: Vec::new(),
                confidence: 1.0,
            })
            .collect();
        let responses = self
            .response_texts()
            .into_iter()
            .map(|text| Response { id: ResponseId(ids.next_id("response")), text })
            .collect();

        Ok(Intent {
            id: IntentId(ids.next_id("intent")),
            description: self.display_name.clone(),
            display_name: self.display_name,
            training_phrases,
            responses,
            negative_phrases: Vec::new(),
            language: language.to_string(),
            category: category.to_string(),
            tags: vec![category.to_string(), "imported".to_string()],
            created_at: now,
            updated_at: now,
        })
    }
}

pub fn to_dialogflow(intent: &Intent) -> DialogflowIntent {
    DialogflowIntent {
        display_name: intent.display_name.clone(),
        training_phrases: intent
            .training_phrases
            .iter()
            .map(|phrase| DialogflowTrainingPhrase {
                parts: vec![TextPart { text: phrase.text.clone() }],
            })
            .collect(),
        messages: vec![DialogflowMessage {
            text: MessageText {
                text: intent.responses.iter().map(|response| response.text.clone()).collect(),
            },
        }],
    }
}

pub fn to_dialogflow_json(intent: &Intent) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_dialogflow(intent))
}

pub fn from_dialogflow_json(raw: &str) -> Result<DialogflowIntent, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Pretty JSON mirroring the entity's own shape.
pub fn to_json_document<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
