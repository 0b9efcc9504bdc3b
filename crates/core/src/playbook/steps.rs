use crate::domain::playbook::{PlaybookConfig, PlaybookStep, StepId};
use crate::domain::style::Complexity;

pub const DEFAULT_GOAL: &str = "assist the user";

struct StepTemplate {
    title: &'static str,
    description: &'static str,
    prompt: &'static str,
    expected_output: &'static str,
    required: bool,
}

static CORE_STEPS: [StepTemplate; 3] = [
    StepTemplate {
        title: "Context Setup",
        description: "Establish the assistant's role and the conversation context.",
        prompt: "You are an assistant specialised in {{domain}}. Your primary goal is to \
                 {{goal}}. Scenario: {{scenario}}. Respond in a {{tone}} tone.",
        expected_output: "The assistant acknowledges its role and the user's situation.",
        required: true,
    },
    StepTemplate {
        title: "Information Gathering",
        description: "Collect the details required before acting.",
        prompt: "Ask the user focused questions to collect the details needed to {{goal}}. \
                 Confirm any {{domain}} specific requirements before moving on.",
        expected_output: "All required details are collected and confirmed with the user.",
        required: true,
    },
    StepTemplate {
        title: "Solution Processing",
        description: "Work toward the goal with the gathered information.",
        prompt: "Using the gathered details, {{goal}} for the following scenario: {{scenario}}. \
                 Summarise the result and confirm the user is satisfied.",
        expected_output: "The user's request is resolved and summarised.",
        required: true,
    },
];

static ADVANCED_STEP: StepTemplate = StepTemplate {
    title: "Advanced Processing",
    description: "Handle exceptions and edge cases for complex conversations.",
    prompt: "Handle exceptions and edge cases in {{domain}}. Validate the outcome against the \
             goal to {{goal}}, escalate anything that cannot be resolved and record the reasoning.",
    expected_output: "Edge cases are handled or escalated with a documented rationale.",
    required: false,
};

/// Three fixed steps, plus the advanced step for complex configs. Each step
/// depends only on the one before it.
pub fn build_steps(config: &PlaybookConfig) -> Vec<PlaybookStep> {
    let goal = first_goal(config);
    let scenario = scenario(config);
    let tone = config.tone.to_string();
    let variables: [(&str, &str); 4] = [
        ("domain", config.domain.trim()),
        ("goal", goal),
        ("scenario", scenario),
        ("tone", tone.as_str()),
    ];

    let mut templates: Vec<&StepTemplate> = CORE_STEPS.iter().collect();
    if config.complexity == Complexity::Complex {
        templates.push(&ADVANCED_STEP);
    }

    let mut steps: Vec<PlaybookStep> = Vec::with_capacity(templates.len());
    for (index, template) in templates.into_iter().enumerate() {
        let order = index as u32 + 1;
        let dependencies = steps.last().map(|previous| vec![previous.id.clone()]).unwrap_or_default();
        steps.push(PlaybookStep {
            id: StepId(format!("step-{order}")),
            title: template.title.to_string(),
            description: template.description.to_string(),
            prompt: substitute(template.prompt, &variables),
            order,
            required: template.required,
            dependencies,
            expected_output: template.expected_output.to_string(),
        });
    }
    steps
}

pub fn first_goal(config: &PlaybookConfig) -> &str {
    config
        .goals
        .iter()
        .map(|goal| goal.trim())
        .find(|goal| !goal.is_empty())
        .unwrap_or(DEFAULT_GOAL)
}

fn scenario(config: &PlaybookConfig) -> &str {
    let scenario = config.scenario.trim();
    if scenario.is_empty() {
        config.description.trim()
    } else {
        scenario
    }
}

fn substitute(template: &str, variables: &[(&str, &str)]) -> String {
    let mut output = template.to_string();
    for (key, value) in variables {
        output = output.replace(&format!("{{{{{key}}}}}"), value);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{build_steps, DEFAULT_GOAL};
    use crate::domain::playbook::{PlaybookConfig, StepId};
    use crate::domain::style::Complexity;

    fn config(complexity: Complexity) -> PlaybookConfig {
        PlaybookConfig {
            name: "Returns".to_string(),
            description: "Guide customers through returns".to_string(),
            domain: "ecommerce".to_string(),
            goals: vec!["process a product return".to_string(), "upsell".to_string()],
            scenario: "a customer received a damaged blender".to_string(),
            complexity,
            ..PlaybookConfig::default()
        }
    }

    #[test]
    fn simple_and_moderate_build_three_ordered_steps() {
        for complexity in [Complexity::Simple, Complexity::Moderate] {
            let steps = build_steps(&config(complexity));
            let orders: Vec<u32> = steps.iter().map(|step| step.order).collect();
            assert_eq!(orders, vec![1, 2, 3]);
        }
    }

    #[test]
    fn complex_appends_optional_advanced_step() {
        let steps = build_steps(&config(Complexity::Complex));
        let orders: Vec<u32> = steps.iter().map(|step| step.order).collect();

        assert_eq!(orders, vec![1, 2, 3, 4]);
        assert_eq!(steps[3].title, "Advanced Processing");
        assert!(!steps[3].required);
    }

    #[test]
    fn dependencies_form_a_flat_chain() {
        let steps = build_steps(&config(Complexity::Complex));

        assert!(steps[0].dependencies.is_empty());
        for pair in steps.windows(2) {
            assert_eq!(pair[1].dependencies, vec![pair[0].id.clone()]);
        }
        assert_eq!(steps[3].dependencies, vec![StepId("step-3".to_string())]);
    }

    #[test]
    fn prompts_interpolate_domain_first_goal_and_scenario() {
        let steps = build_steps(&config(Complexity::Moderate));

        assert!(steps[0].prompt.contains("specialised in ecommerce"));
        assert!(steps[0].prompt.contains("process a product return"));
        assert!(steps[0].prompt.contains("damaged blender"));
        assert!(!steps[0].prompt.contains("upsell"));
        assert!(steps.iter().all(|step| !step.prompt.contains("{{")));
    }

    #[test]
    fn falls_back_to_default_goal_and_description() {
        let config = PlaybookConfig {
            goals: vec![],
            scenario: String::new(),
            ..config(Complexity::Simple)
        };
        let steps = build_steps(&config);

        assert!(steps[0].prompt.contains(DEFAULT_GOAL));
        assert!(steps[0].prompt.contains("Guide customers through returns"));
    }
}
