use tracing::info;

use crate::domain::playbook::{
    PlaybookConfig, PlaybookExample, PlaybookGoal, PlaybookId, PlaybookInstruction, Speaker, Turn,
};
use crate::errors::DomainError;
use crate::playbook::estimator::estimate_performance;
use crate::playbook::steps::{build_steps, first_goal};
use crate::seams::{Clock, IdGenerator, SystemClock, UuidIdGenerator};

pub struct PlaybookGenerator<I, K> {
    ids: I,
    clock: K,
}

impl Default for PlaybookGenerator<UuidIdGenerator, SystemClock> {
    fn default() -> Self {
        Self::new(UuidIdGenerator, SystemClock)
    }
}

impl<I, K> PlaybookGenerator<I, K>
where
    I: IdGenerator,
    K: Clock,
{
    pub fn new(ids: I, clock: K) -> Self {
        Self { ids, clock }
    }

    pub fn generate(&self, config: &PlaybookConfig) -> Result<PlaybookInstruction, DomainError> {
        config.validate()?;

        let steps = build_steps(config);
        let performance = estimate_performance(&steps, config.complexity, config.max_tokens);
        let goals = config
            .goals
            .iter()
            .map(|goal| goal.trim())
            .filter(|goal| !goal.is_empty())
            .enumerate()
            .map(|(index, goal)| PlaybookGoal {
                id: format!("goal-{}", index + 1),
                description: goal.to_string(),
                priority: index as u32 + 1,
            })
            .collect();
        let examples =
            if config.include_examples { vec![example_conversation(config)] } else { Vec::new() };

        let now = self.clock.now();
        let instruction = PlaybookInstruction {
            id: PlaybookId(self.ids.next_id("playbook")),
            name: config.name.trim().to_string(),
            description: config.description.trim().to_string(),
            domain: config.domain.clone(),
            steps,
            goals,
            tools: config.tools.clone(),
            examples,
            context_variables: config.context_variables.clone(),
            performance,
            created_at: now,
            updated_at: now,
        };

        info!(
            event_name = "generation.playbook.completed",
            playbook_id = %instruction.id.0,
            step_count = instruction.steps.len(),
            token_count = instruction.performance.token_count,
            suggestion_count = instruction.performance.suggestions.len(),
            "playbook generated"
        );
        Ok(instruction)
    }
}

fn example_conversation(config: &PlaybookConfig) -> PlaybookExample {
    let goal = first_goal(config);
    let turns = vec![
        Turn { speaker: Speaker::User, text: format!("Hi, I need help to {goal}.") },
        Turn {
            speaker: Speaker::Agent,
            text: format!(
                "Happy to help with {}. Could you share a few details so I can get started?",
                config.domain.trim()
            ),
        },
        Turn {
            speaker: Speaker::User,
            text: "Sure, here is everything I have.".to_string(),
        },
        Turn {
            speaker: Speaker::Agent,
            text: format!("Thanks. I have everything I need to {goal}. Anything else?"),
        },
    ];
    PlaybookExample { title: format!("{} walkthrough", config.name.trim()), turns }
}
