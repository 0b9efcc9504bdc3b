use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::intent::GenerationConfig;
use crate::domain::style::{Complexity, Tone};
use crate::generation::patterns::{
    domain_patterns, tone_templates, BASE_FRAMES, COMPLEX_ELABORATION, NEGATIVE_FRAMES,
    SIMPLE_WORD_LIMIT, SYNONYMS,
};

/// Turns a generation config into candidate training phrases.
pub trait PhraseExpander: Send + Sync {
    fn expand(&self, config: &GenerationConfig) -> Vec<String>;
}

/// Deterministic expander backed by the static pattern tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplatePhraseExpander;

impl PhraseExpander for TemplatePhraseExpander {
    fn expand(&self, config: &GenerationConfig) -> Vec<String> {
        expand_phrases(config)
    }
}

pub fn expand_phrases(config: &GenerationConfig) -> Vec<String> {
    let mut pool = base_phrases(&config.description);
    pool.extend(domain_phrases(&config.domain));
    let toned = apply_tone(&pool, config.tone);
    pool.extend(toned);

    let shaped = apply_complexity(&pool, config.complexity);
    let mut candidates = shaped.clone();
    if config.include_variations {
        for phrase in &shaped {
            candidates.extend(synonym_variants(phrase));
        }
    }

    let mut unique = dedupe(candidates);
    unique.truncate(config.phrase_count);
    unique
}

pub fn base_phrases(description: &str) -> Vec<String> {
    let description = description.trim().to_lowercase();
    BASE_FRAMES.iter().map(|frame| fill_description(frame, &description)).collect()
}

pub fn domain_phrases(domain: &str) -> Vec<String> {
    domain_patterns(domain).iter().map(|phrase| phrase.to_string()).collect()
}

pub fn negative_phrases(description: &str) -> Vec<String> {
    let description = description.trim().to_lowercase();
    NEGATIVE_FRAMES.iter().map(|frame| fill_description(frame, &description)).collect()
}

/// Rewritten variants only; the inputs are not echoed back.
pub fn apply_tone(phrases: &[String], tone: Tone) -> Vec<String> {
    let templates = tone_templates(tone);
    phrases
        .iter()
        .flat_map(|phrase| {
            let stripped = strip_terminal_punctuation(phrase);
            let lowered = lower_first(stripped);
            templates.iter().map(move |template| {
                template.replace("{{phrase}}", &lowered).replace("{{Phrase}}", stripped)
            })
        })
        .collect()
}

pub fn apply_complexity(phrases: &[String], complexity: Complexity) -> Vec<String> {
    match complexity {
        Complexity::Simple => phrases
            .iter()
            .map(|phrase| {
                phrase.split_whitespace().take(SIMPLE_WORD_LIMIT).collect::<Vec<_>>().join(" ")
            })
            .collect(),
        Complexity::Moderate => phrases.to_vec(),
        Complexity::Complex => phrases
            .iter()
            .map(|phrase| format!("{}, {COMPLEX_ELABORATION}", strip_terminal_punctuation(phrase)))
            .collect(),
    }
}

/// One variant per synonym for every occurrence of a key word. Each variant
/// carries exactly one substitution.
pub fn synonym_variants(phrase: &str) -> Vec<String> {
    let mut variants = Vec::new();
    for (matcher, synonyms) in synonym_matchers() {
        for found in matcher.find_iter(phrase) {
            for synonym in synonyms.iter() {
                let replacement = match_case(found.as_str(), synonym);
                variants.push(format!(
                    "{}{}{}",
                    &phrase[..found.start()],
                    replacement,
                    &phrase[found.end()..]
                ));
            }
        }
    }
    variants
}

/// Order-preserving, case-sensitive deduplication.
pub fn dedupe(phrases: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(phrases.len());
    phrases.into_iter().filter(|phrase| seen.insert(phrase.clone())).collect()
}

type SynonymMatcher = (Regex, &'static [&'static str]);

fn synonym_matchers() -> &'static [SynonymMatcher] {
    static MATCHERS: OnceLock<Vec<SynonymMatcher>> = OnceLock::new();
    MATCHERS.get_or_init(|| {
        SYNONYMS
            .iter()
            .filter_map(|(word, synonyms)| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(word));
                Regex::new(&pattern).ok().map(|matcher| (matcher, *synonyms))
            })
            .collect()
    })
}

fn fill_description(frame: &str, description: &str) -> String {
    frame.replace("{{description}}", description).trim().to_string()
}

fn strip_terminal_punctuation(phrase: &str) -> &str {
    phrase.trim().trim_end_matches(['.', '?', '!'])
}

/// Lowercases the first letter unless the phrase opens with the pronoun "I".
fn lower_first(phrase: &str) -> String {
    let first_word = phrase.split_whitespace().next().unwrap_or_default();
    if first_word == "I" || first_word.starts_with("I'") {
        return phrase.to_string();
    }

    let mut chars = phrase.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn match_case(original: &str, replacement: &str) -> String {
    let capitalised = original.chars().next().map(char::is_uppercase).unwrap_or(false);
    if !capitalised {
        return replacement.to_string();
    }

    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{
        apply_complexity, apply_tone, base_phrases, dedupe, expand_phrases, synonym_variants,
    };
    use crate::domain::intent::GenerationConfig;
    use crate::domain::style::{Complexity, Tone};
    use crate::generation::patterns::domain_patterns;

    fn config(description: &str, domain: &str) -> GenerationConfig {
        GenerationConfig {
            intent_name: "test.intent".to_string(),
            description: description.to_string(),
            domain: domain.to_string(),
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn base_phrases_lowercase_the_description() {
        let phrases = base_phrases("Check Order Status");
        assert_eq!(phrases.len(), 8);
        assert_eq!(phrases[0], "I want to check order status");
        assert_eq!(phrases[1], "Can you help me check order status");
    }

    #[test]
    fn never_exceeds_requested_count_and_has_no_duplicates() {
        for count in [1, 5, 13, 40, 500] {
            let config = GenerationConfig {
                phrase_count: count,
                tone: Tone::Friendly,
                include_variations: true,
                ..config("help me pay my bill", "banking")
            };
            let phrases = expand_phrases(&config);
            let unique: HashSet<_> = phrases.iter().collect();

            assert!(phrases.len() <= count);
            assert_eq!(unique.len(), phrases.len());
        }
    }

    #[test]
    fn healthcare_formal_contains_canned_and_formal_variants() {
        let config = GenerationConfig {
            tone: Tone::Formal,
            complexity: Complexity::Moderate,
            phrase_count: 500,
            include_variations: false,
            ..config("book appointment", "healthcare")
        };
        let phrases = expand_phrases(&config);

        assert!(domain_patterns("healthcare")
            .iter()
            .any(|canned| phrases.iter().any(|phrase| phrase == canned)));
        assert!(phrases.iter().any(|phrase| phrase.starts_with("Could you please ")));
    }

    #[test]
    fn ecommerce_casual_simple_returns_five_short_phrases() {
        let config = GenerationConfig {
            tone: Tone::Casual,
            complexity: Complexity::Simple,
            phrase_count: 5,
            include_variations: false,
            ..config("check order status", "ecommerce")
        };
        let phrases = expand_phrases(&config);
        let unique: HashSet<_> = phrases.iter().collect();

        assert_eq!(phrases.len(), 5);
        assert_eq!(unique.len(), 5);
        assert!(phrases.iter().all(|phrase| phrase.split_whitespace().count() <= 5));
    }

    #[test]
    fn unknown_domain_contributes_nothing() {
        let config = GenerationConfig {
            tone: Tone::Casual,
            phrase_count: 500,
            include_variations: false,
            ..config("water the plants", "gardening")
        };
        // 8 base frames plus 3 casual rewrites of each.
        assert_eq!(expand_phrases(&config).len(), 32);
    }

    #[test]
    fn empty_description_degrades_without_panicking() {
        let config = GenerationConfig { phrase_count: 100, ..config("", "unknown") };
        let phrases = expand_phrases(&config);
        assert!(phrases.contains(&"I want to".to_string()));
    }

    #[test]
    fn tone_rewrites_keep_pronoun_capitalised() {
        let variants = apply_tone(&["I want to pay".to_string()], Tone::Formal);
        assert_eq!(variants.len(), 3);
        assert_eq!(variants[0], "Could you please I want to pay");

        let variants = apply_tone(&["Where is my order".to_string()], Tone::Casual);
        assert_eq!(variants[0], "Hey, where is my order");
        assert_eq!(variants[1], "Where is my order real quick");
    }

    #[test]
    fn complexity_transforms() {
        let phrases = vec!["Can you help me check my order status today?".to_string()];

        assert_eq!(
            apply_complexity(&phrases, Complexity::Simple),
            vec!["Can you help me check".to_string()]
        );
        assert_eq!(apply_complexity(&phrases, Complexity::Moderate), phrases);
        let complex = apply_complexity(&phrases, Complexity::Complex);
        assert!(complex[0].starts_with("Can you help me check my order status today, taking"));
    }

    #[test]
    fn synonym_variants_substitute_each_occurrence_once() {
        let variants = synonym_variants("Can you help me");
        assert!(variants.contains(&"Could you help me".to_string()));
        assert!(variants.contains(&"May you help me".to_string()));
        assert!(variants.contains(&"Can you assist me".to_string()));
        assert!(variants.contains(&"Can you aid me".to_string()));
        assert_eq!(variants.len(), 6);

        let variants = synonym_variants("I want help and want more");
        // two occurrences of "want" x 4 synonyms plus one "help" x 3 synonyms
        assert_eq!(variants.len(), 11);
        assert!(variants.contains(&"I would like help and want more".to_string()));
        assert!(variants.contains(&"I want help and wish more".to_string()));
    }

    #[test]
    fn synonyms_only_match_whole_words() {
        assert!(synonym_variants("The cannery is helpful").is_empty());
    }

    #[test]
    fn dedupe_is_case_sensitive_and_order_preserving() {
        let phrases = vec![
            "b".to_string(),
            "a".to_string(),
            "B".to_string(),
            "b".to_string(),
            "a".to_string(),
        ];
        assert_eq!(dedupe(phrases), vec!["b".to_string(), "a".to_string(), "B".to_string()]);
    }
}
