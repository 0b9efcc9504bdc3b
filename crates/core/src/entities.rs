//! Regex-driven entity tagging.
//!
//! Each built-in type has one fixed pattern. Patterns run independently, so
//! overlapping matches from different types are all reported.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::entity::{CustomEntity, EntitySpan, EntityTag, EntityType};

const PERSON_PATTERN: &str = r"\b[A-Z][a-z]+ [A-Z][a-z]+\b";
const DATE_TIME_PATTERN: &str = concat!(
    r"(?i)\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday",
    r"|today|tomorrow|yesterday|tonight|next week|next month|this weekend)\b",
    r"|\b\d{1,2}/\d{1,2}/\d{2,4}\b",
    r"|\b\d{4}-\d{2}-\d{2}\b",
    r"|\b\d{1,2}:\d{2}(?:\s?[ap]m)?\b",
    r"|\b\d{1,2}\s?[ap]m\b",
);
const NUMBER_PATTERN: &str = r"\b\d+\b";
const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";
const PHONE_PATTERN: &str = r"\b\d{3}-\d{3}-\d{4}\b";

fn pattern_table() -> &'static [(EntityType, Regex)] {
    static TABLE: OnceLock<Vec<(EntityType, Regex)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        [
            (EntityType::Person, PERSON_PATTERN),
            (EntityType::DateTime, DATE_TIME_PATTERN),
            (EntityType::Number, NUMBER_PATTERN),
            (EntityType::Email, EMAIL_PATTERN),
            (EntityType::Phone, PHONE_PATTERN),
        ]
        .into_iter()
        .filter_map(|(entity_type, pattern)| {
            Regex::new(pattern).ok().map(|regex| (entity_type, regex))
        })
        .collect()
    })
}

struct LookupMatcher {
    regex: Regex,
    canonical: String,
}

struct CompiledCustomEntity {
    name: String,
    matchers: Vec<LookupMatcher>,
}

#[derive(Default)]
pub struct EntityTagger {
    custom: Vec<CompiledCustomEntity>,
}

impl EntityTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches lookup entities. Every value and synonym becomes a
    /// whole-word, case-insensitive matcher resolving to the value.
    pub fn with_custom_entities(mut self, entities: &[CustomEntity]) -> Self {
        self.custom = entities
            .iter()
            .map(|entity| CompiledCustomEntity {
                name: entity.name.clone(),
                matchers: entity
                    .values
                    .iter()
                    .flat_map(|entry| {
                        std::iter::once(&entry.value)
                            .chain(entry.synonyms.iter())
                            .filter(|term| !term.trim().is_empty())
                            .filter_map(|term| {
                                let pattern = format!(r"(?i)\b{}\b", regex::escape(term.trim()));
                                Regex::new(&pattern).ok().map(|regex| LookupMatcher {
                                    regex,
                                    canonical: entry.value.clone(),
                                })
                            })
                    })
                    .collect(),
            })
            .collect();
        self
    }

    /// Built-in matches for the requested types, ordered by start offset.
    /// Matches sharing a start offset keep pattern-table order.
    pub fn tag(&self, text: &str, requested: &[EntityType]) -> Vec<EntitySpan> {
        if requested.is_empty() {
            return Vec::new();
        }

        let mut spans = Vec::new();
        for (entity_type, regex) in pattern_table() {
            if !requested.contains(entity_type) {
                continue;
            }
            for found in regex.find_iter(text) {
                spans.push(span(
                    text,
                    EntityTag::Builtin(*entity_type),
                    found.start(),
                    found.end(),
                    None,
                ));
            }
        }

        spans.sort_by_key(|span| span.start);
        spans
    }

    pub fn tag_custom(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        for entity in &self.custom {
            for matcher in &entity.matchers {
                for found in matcher.regex.find_iter(text) {
                    spans.push(span(
                        text,
                        EntityTag::Custom(entity.name.clone()),
                        found.start(),
                        found.end(),
                        Some(matcher.canonical.clone()),
                    ));
                }
            }
        }
        spans.sort_by_key(|span| span.start);
        spans
    }

    pub fn tag_all(&self, text: &str, requested: &[EntityType]) -> Vec<EntitySpan> {
        let mut spans = self.tag(text, requested);
        spans.extend(self.tag_custom(text));
        spans.sort_by_key(|span| span.start);
        spans
    }

    /// Runs every built-in pattern plus any attached lookup entities.
    pub fn detect(&self, text: &str) -> Vec<EntitySpan> {
        self.tag_all(text, &EntityType::ALL)
    }
}

fn span(
    text: &str,
    entity_type: EntityTag,
    byte_start: usize,
    byte_end: usize,
    canonical: Option<String>,
) -> EntitySpan {
    let start = text[..byte_start].chars().count();
    let value = text[byte_start..byte_end].to_string();
    let end = start + value.chars().count();
    EntitySpan { entity_type, value, start, end, canonical }
}
