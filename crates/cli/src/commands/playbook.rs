use clap::Args;
use serde_json::Value;
use tracing::info;

use buddy_core::domain::playbook::{PlaybookConfig, ToolKind, ToolSpec};
use buddy_core::domain::style::{Complexity, Tone};
use buddy_core::playbook::PlaybookGenerator;
use buddy_db::{PlaybookRepository, SqlPlaybookRepository};

use crate::commands::{
    load_config, persistence_failure, to_data, validation_failure, with_store, CommandResult,
    Failure,
};

#[derive(Clone, Debug, Args)]
pub struct PlaybookArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub description: String,
    #[arg(long, default_value = "general")]
    pub domain: String,
    #[arg(long = "goal", help = "Goal in priority order; repeat for several")]
    pub goals: Vec<String>,
    #[arg(long, default_value = "")]
    pub scenario: String,
    #[arg(long, default_value_t = Tone::Professional)]
    pub tone: Tone,
    #[arg(long, default_value_t = Complexity::Moderate)]
    pub complexity: Complexity,
    #[arg(long, help = "Token budget (defaults to generation.default_max_tokens)")]
    pub max_tokens: Option<u32>,
    #[arg(long = "tool", help = "`name` for a function tool or `name=https://...` for a webhook")]
    pub tools: Vec<String>,
    #[arg(long)]
    pub no_examples: bool,
    #[arg(long)]
    pub save: bool,
    #[arg(long)]
    pub user: Option<String>,
}

pub fn run(args: PlaybookArgs) -> CommandResult {
    CommandResult::from_outcome(
        "playbook",
        execute(args).map(|(message, data)| (message, Some(data))),
    )
}

fn execute(args: PlaybookArgs) -> Result<(String, Value), Failure> {
    let config = load_config(args.user.clone())?;

    let playbook_config = PlaybookConfig {
        name: args.name,
        description: args.description,
        domain: args.domain,
        goals: args.goals,
        scenario: args.scenario,
        tone: args.tone,
        complexity: args.complexity,
        max_tokens: args.max_tokens.unwrap_or(config.generation.max_tokens),
        tools: args.tools.iter().map(|raw| parse_tool(raw)).collect(),
        context_variables: Vec::new(),
        include_examples: !args.no_examples,
    };

    let playbook =
        PlaybookGenerator::default().generate(&playbook_config).map_err(validation_failure)?;
    info!(
        event_name = "cli.playbook.generated",
        playbook_id = %playbook.id.0,
        token_count = playbook.performance.token_count,
        "playbook generated"
    );

    let mut message = format!(
        "generated {} steps for `{}` (~{} tokens, {} suggestions)",
        playbook.steps.len(),
        playbook.name,
        playbook.performance.token_count,
        playbook.performance.suggestions.len()
    );
    if args.save {
        with_store(&config, |pool| {
            let user_id = config.generation.user_id.clone();
            let playbook = playbook.clone();
            async move {
                SqlPlaybookRepository::new(pool)
                    .insert(&user_id, &playbook)
                    .await
                    .map_err(persistence_failure)
            }
        })?;
        message.push_str(&format!(" and saved it for `{}`", config.generation.user_id));
    }

    Ok((message, to_data(&playbook)?))
}

pub(crate) fn parse_tool(raw: &str) -> ToolSpec {
    match raw.split_once('=') {
        Some((name, endpoint)) if !endpoint.trim().is_empty() => ToolSpec {
            name: name.trim().to_string(),
            kind: ToolKind::Webhook,
            description: String::new(),
            endpoint: Some(endpoint.trim().to_string()),
            parameters: Vec::new(),
        },
        Some((name, _)) => function_tool(name),
        None => function_tool(raw),
    }
}

fn function_tool(name: &str) -> ToolSpec {
    ToolSpec {
        name: name.trim().to_string(),
        kind: ToolKind::Function,
        description: String::new(),
        endpoint: None,
        parameters: Vec::new(),
    }
}
