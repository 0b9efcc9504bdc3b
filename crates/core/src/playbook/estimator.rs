use crate::domain::playbook::{
    Impact, OptimizationSuggestion, PerformanceSummary, PlaybookStep, SuggestionKind,
};
use crate::domain::style::Complexity;

pub const CHARS_PER_TOKEN: f64 = 4.0;
pub const LATENCY_PER_STEP_MS: u32 = 200;
pub const COMPLEX_LATENCY_PENALTY_MS: u32 = 500;
pub const TOKEN_BUDGET_WARNING_RATIO: f64 = 0.8;
pub const LATENCY_WARNING_MS: u32 = 3000;

/// Length-based estimate. Prompts are never executed.
pub fn estimate_performance(
    steps: &[PlaybookStep],
    complexity: Complexity,
    max_tokens: u32,
) -> PerformanceSummary {
    let prompt_chars: usize = steps.iter().map(|step| step.prompt.chars().count()).sum();
    let token_count = (prompt_chars as f64 / CHARS_PER_TOKEN).round() as u32;

    let mut estimated_latency_ms = steps.len() as u32 * LATENCY_PER_STEP_MS;
    if complexity == Complexity::Complex {
        estimated_latency_ms += COMPLEX_LATENCY_PENALTY_MS;
    }

    let mut suggestions = Vec::new();
    if f64::from(token_count) > f64::from(max_tokens) * TOKEN_BUDGET_WARNING_RATIO {
        suggestions.push(OptimizationSuggestion {
            kind: SuggestionKind::TokenReduction,
            impact: Impact::High,
            description: format!(
                "Prompts use about {token_count} of {max_tokens} tokens; shorten step prompts \
                 or merge overlapping instructions."
            ),
        });
    }
    if estimated_latency_ms > LATENCY_WARNING_MS {
        suggestions.push(OptimizationSuggestion {
            kind: SuggestionKind::Performance,
            impact: Impact::Medium,
            description: format!(
                "Estimated latency of {estimated_latency_ms}ms is high; reduce the number of \
                 sequential steps."
            ),
        });
    }

    PerformanceSummary { token_count, estimated_latency_ms, complexity, suggestions }
}

#[cfg(test)]
mod tests {
    use super::estimate_performance;
    use crate::domain::playbook::{Impact, PlaybookStep, StepId, SuggestionKind};
    use crate::domain::style::Complexity;

    fn step(order: u32, prompt: &str) -> PlaybookStep {
        PlaybookStep {
            id: StepId(format!("step-{order}")),
            title: format!("Step {order}"),
            description: String::new(),
            prompt: prompt.to_string(),
            order,
            required: true,
            dependencies: vec![],
            expected_output: String::new(),
        }
    }

    #[test]
    fn token_count_is_rounded_quarter_of_total_prompt_length() {
        // 10 + 12 = 22 chars -> 5.5 -> 6
        let steps = vec![step(1, &"a".repeat(10)), step(2, &"b".repeat(12))];
        let summary = estimate_performance(&steps, Complexity::Moderate, 1000);

        assert_eq!(summary.token_count, 6);
        assert_eq!(summary.estimated_latency_ms, 400);
        assert_eq!(summary.complexity, Complexity::Moderate);
        assert!(summary.suggestions.is_empty());
    }

    #[test]
    fn complex_adds_fixed_latency_penalty() {
        let steps: Vec<_> = (1..=4).map(|order| step(order, "prompt")).collect();
        let summary = estimate_performance(&steps, Complexity::Complex, 1000);

        assert_eq!(summary.estimated_latency_ms, 4 * 200 + 500);
    }

    #[test]
    fn warns_when_tokens_exceed_eighty_percent_of_budget() {
        let steps = vec![step(1, &"x".repeat(400))];
        let at_limit = estimate_performance(&steps, Complexity::Simple, 125);
        let over_limit = estimate_performance(&steps, Complexity::Simple, 124);

        // 100 tokens against 0.8 * 125 = 100 is not over the threshold
        assert!(at_limit.suggestions.is_empty());
        assert_eq!(over_limit.suggestions.len(), 1);
        assert_eq!(over_limit.suggestions[0].kind, SuggestionKind::TokenReduction);
        assert_eq!(over_limit.suggestions[0].impact, Impact::High);
    }

    #[test]
    fn warns_on_high_latency() {
        let steps: Vec<_> = (1..=16).map(|order| step(order, "p")).collect();
        let summary = estimate_performance(&steps, Complexity::Moderate, 10_000);

        assert_eq!(summary.estimated_latency_ms, 3200);
        assert_eq!(summary.suggestions.len(), 1);
        assert_eq!(summary.suggestions[0].kind, SuggestionKind::Performance);
        assert_eq!(summary.suggestions[0].impact, Impact::Medium);
    }
}
