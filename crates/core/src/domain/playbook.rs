use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::style::{Complexity, Tone};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybookId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Webhook,
    Function,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolParameter {
    pub name: String,
    pub param_type: ParameterType,
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub name: String,
    pub kind: ToolKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableScope {
    Session,
    User,
    Global,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextVariable {
    pub name: String,
    pub var_type: ParameterType,
    pub scope: VariableScope,
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookConfig {
    pub name: String,
    pub description: String,
    pub domain: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub complexity: Complexity,
    pub max_tokens: u32,
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
    #[serde(default)]
    pub context_variables: Vec<ContextVariable>,
    #[serde(default)]
    pub include_examples: bool,
}

impl Default for PlaybookConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            domain: "general".to_string(),
            goals: Vec::new(),
            scenario: String::new(),
            tone: Tone::Professional,
            complexity: Complexity::default(),
            max_tokens: 2000,
            tools: Vec::new(),
            context_variables: Vec::new(),
            include_examples: true,
        }
    }
}

impl PlaybookConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::MissingField { field: "playbook name" });
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::MissingField { field: "description" });
        }
        if self.max_tokens == 0 {
            return Err(DomainError::InvariantViolation(
                "max tokens must be greater than zero".to_string(),
            ));
        }
        if let Some(tool) = self.tools.iter().find(|tool| tool.name.trim().is_empty()) {
            return Err(DomainError::InvariantViolation(format!(
                "tool of kind {:?} is missing a name",
                tool.kind
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookStep {
    pub id: StepId,
    pub title: String,
    pub description: String,
    pub prompt: String,
    pub order: u32,
    pub required: bool,
    pub dependencies: Vec<StepId>,
    pub expected_output: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookGoal {
    pub id: String,
    pub description: String,
    pub priority: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookExample {
    pub title: String,
    pub turns: Vec<Turn>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    TokenReduction,
    Performance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSuggestion {
    pub kind: SuggestionKind,
    pub impact: Impact,
    pub description: String,
}

/// Heuristic estimate derived from prompt lengths; nothing is executed to produce it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub token_count: u32,
    pub estimated_latency_ms: u32,
    pub complexity: Complexity,
    pub suggestions: Vec<OptimizationSuggestion>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookInstruction {
    pub id: PlaybookId,
    pub name: String,
    pub description: String,
    pub domain: String,
    pub steps: Vec<PlaybookStep>,
    pub goals: Vec<PlaybookGoal>,
    pub tools: Vec<ToolSpec>,
    pub examples: Vec<PlaybookExample>,
    pub context_variables: Vec<ContextVariable>,
    pub performance: PerformanceSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::{PlaybookConfig, ToolKind, ToolSpec};
    use crate::errors::DomainError;

    #[test]
    fn requires_name_and_description() {
        let config = PlaybookConfig { description: "returns".to_string(), ..Default::default() };
        assert_eq!(config.validate(), Err(DomainError::MissingField { field: "playbook name" }));

        let config = PlaybookConfig { name: "returns".to_string(), ..Default::default() };
        assert_eq!(config.validate(), Err(DomainError::MissingField { field: "description" }));
    }

    #[test]
    fn rejects_unnamed_tools() {
        let config = PlaybookConfig {
            name: "returns".to_string(),
            description: "handle returns".to_string(),
            tools: vec![ToolSpec {
                name: " ".to_string(),
                kind: ToolKind::Webhook,
                description: String::new(),
                endpoint: None,
                parameters: vec![],
            }],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DomainError::InvariantViolation(_))));
    }
}
