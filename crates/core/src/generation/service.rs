use tracing::{debug, info};

use crate::domain::intent::{
    GenerationConfig, Intent, IntentId, PhraseId, Response, ResponseId, TrainingPhrase,
};
use crate::entities::EntityTagger;
use crate::errors::DomainError;
use crate::generation::expander::{negative_phrases, PhraseExpander, TemplatePhraseExpander};
use crate::generation::responses::default_responses;
use crate::seams::{
    Clock, ConfidenceSource, IdGenerator, RandomConfidence, SystemClock, UuidIdGenerator,
};

/// Assembles an [`Intent`] from a config: expanded phrases, entity spans,
/// placeholder confidences and canned responses.
pub struct IntentGenerator<E, I, C, K> {
    expander: E,
    tagger: EntityTagger,
    ids: I,
    confidence: C,
    clock: K,
}

impl Default
    for IntentGenerator<TemplatePhraseExpander, UuidIdGenerator, RandomConfidence, SystemClock>
{
    fn default() -> Self {
        Self::new(
            TemplatePhraseExpander,
            EntityTagger::new(),
            UuidIdGenerator,
            RandomConfidence,
            SystemClock,
        )
    }
}

impl<E, I, C, K> IntentGenerator<E, I, C, K>
where
    E: PhraseExpander,
    I: IdGenerator,
    C: ConfidenceSource,
    K: Clock,
{
    pub fn new(expander: E, tagger: EntityTagger, ids: I, confidence: C, clock: K) -> Self {
        Self { expander, tagger, ids, confidence, clock }
    }

    pub fn generate(&self, config: &GenerationConfig) -> Result<Intent, DomainError> {
        config.validate()?;

        let phrases = self.expander.expand(config);
        debug!(
            event_name = "generation.intent.expanded",
            intent_name = %config.intent_name,
            domain = %config.domain,
            requested = config.phrase_count,
            produced = phrases.len(),
            "expanded training phrases"
        );

        let training_phrases = phrases
            .into_iter()
            .map(|text| {
                let entities = if config.include_entities {
                    self.tagger.tag_all(&text, &config.entity_types)
                } else {
                    Vec::new()
                };
                TrainingPhrase {
                    id: PhraseId(self.ids.next_id("phrase")),
                    text,
                    entities,
                    confidence: self.confidence.next_confidence(),
                }
            })
            .collect::<Vec<_>>();

        let responses = default_responses()
            .into_iter()
            .map(|text| Response { id: ResponseId(self.ids.next_id("response")), text })
            .collect();

        let negative_phrases = if config.include_negatives {
            negative_phrases(&config.description)
        } else {
            Vec::new()
        };

        let now = self.clock.now();
        let intent = Intent {
            id: IntentId(self.ids.next_id("intent")),
            display_name: config.intent_name.trim().to_string(),
            description: config.description.trim().to_string(),
            training_phrases,
            responses,
            negative_phrases,
            language: config.language.clone(),
            category: config.domain.clone(),
            tags: vec![
                config.domain.clone(),
                config.tone.to_string(),
                config.complexity.to_string(),
            ],
            created_at: now,
            updated_at: now,
        };

        info!(
            event_name = "generation.intent.completed",
            intent_id = %intent.id.0,
            phrase_count = intent.training_phrases.len(),
            "intent generated"
        );
        Ok(intent)
    }
}
