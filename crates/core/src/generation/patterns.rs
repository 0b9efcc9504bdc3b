//! Static phrase tables used by the template expander.
//!
//! Templates use `{{description}}` for the lowercased intent description,
//! `{{phrase}}` for a phrase with its first letter lowercased and
//! `{{Phrase}}` for the phrase as written.

use crate::domain::style::Tone;

pub const BASE_FRAMES: [&str; 8] = [
    "I want to {{description}}",
    "Can you help me {{description}}",
    "I need to {{description}}",
    "How do I {{description}}",
    "I'd like to {{description}}",
    "Help me {{description}}",
    "I'm trying to {{description}}",
    "Is it possible to {{description}}",
];

static HEALTHCARE: [&str; 5] = [
    "I need to schedule an appointment with my doctor",
    "Can I book a visit for next week",
    "I want to see a specialist",
    "Help me find an available appointment slot",
    "I need to reschedule my appointment",
];

static ECOMMERCE: [&str; 5] = [
    "Where is my order",
    "I want to track my package",
    "Can I return this item",
    "I need to change my shipping address",
    "What is the status of my purchase",
];

static BANKING: [&str; 5] = [
    "I want to check my account balance",
    "Can I transfer money to another account",
    "I need to report a lost card",
    "Show me my recent transactions",
    "How do I open a savings account",
];

static SUPPORT: [&str; 5] = [
    "I need help with my account",
    "Can I speak to a support agent",
    "Something is not working for me",
    "I want to report a problem",
    "How do I reset my password",
];

/// Canned phrases for a known domain; unknown domains contribute nothing.
pub fn domain_patterns(domain: &str) -> &'static [&'static str] {
    match domain.trim().to_ascii_lowercase().as_str() {
        "healthcare" => &HEALTHCARE,
        "ecommerce" => &ECOMMERCE,
        "banking" => &BANKING,
        "support" => &SUPPORT,
        _ => &[],
    }
}

static FORMAL: [&str; 3] = [
    "Could you please {{phrase}}",
    "I would like to formally request the following: {{phrase}}",
    "Would it be possible to assist me? {{Phrase}}",
];

static CASUAL: [&str; 3] = ["Hey, {{phrase}}", "{{Phrase}} real quick", "Yo, {{phrase}}"];

static FRIENDLY: [&str; 3] =
    ["Hi there! {{Phrase}}", "{{Phrase}}, thanks so much!", "Hello! Could you help? {{Phrase}}"];

static PROFESSIONAL: [&str; 3] = [
    "I am requesting assistance: {{phrase}}",
    "Please assist with the following: {{phrase}}",
    "Kindly help: {{phrase}}",
];

pub fn tone_templates(tone: Tone) -> &'static [&'static str] {
    match tone {
        Tone::Formal => &FORMAL,
        Tone::Casual => &CASUAL,
        Tone::Friendly => &FRIENDLY,
        Tone::Professional => &PROFESSIONAL,
    }
}

pub const SIMPLE_WORD_LIMIT: usize = 5;

pub const COMPLEX_ELABORATION: &str =
    "taking into account any related details and my previous requests";

pub const SYNONYMS: [(&str, &[&str]); 4] = [
    ("want", &["need", "require", "would like", "wish"]),
    ("help", &["assist", "support", "aid"]),
    ("can", &["could", "would", "may"]),
    ("please", &["kindly", "if you could"]),
];

/// Phrases a user might say when this intent should not match.
pub const NEGATIVE_FRAMES: [&str; 4] = [
    "I don't want to {{description}}",
    "Never mind, I don't need to {{description}}",
    "Cancel that",
    "That's not what I asked for",
];

pub const CANNED_RESPONSES: [&str; 4] = [
    "I can help you with that.",
    "Sure, let me take care of that for you.",
    "Got it. Let me look into that right away.",
    "Thanks for reaching out. I'll get that sorted.",
];
