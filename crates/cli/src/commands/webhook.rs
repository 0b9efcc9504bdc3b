use std::fs;
use std::path::PathBuf;

use clap::Args;

use buddy_core::webhook::{WebhookConfig, WebhookGenerator, WebhookLanguage};
use buddy_core::ApplicationError;

use crate::commands::{to_data, CommandResult, Failure};

#[derive(Clone, Debug, Args)]
pub struct WebhookArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value_t = WebhookLanguage::Node, help = "node or python")]
    pub language: WebhookLanguage,
    #[arg(long = "intent", help = "Intent display name to route; repeat for several")]
    pub intents: Vec<String>,
    #[arg(long)]
    pub auth: bool,
    #[arg(long)]
    pub logging: bool,
    #[arg(long, help = "Write the generated source to this path")]
    pub output: Option<PathBuf>,
}

pub fn run(args: WebhookArgs) -> CommandResult {
    CommandResult::from_outcome("webhook", execute(args))
}

fn execute(args: WebhookArgs) -> Result<(String, Option<serde_json::Value>), Failure> {
    let config = WebhookConfig {
        name: args.name,
        language: args.language,
        intents: args.intents,
        include_auth: args.auth,
        include_logging: args.logging,
    };

    let code = WebhookGenerator::new()
        .and_then(|generator| generator.generate(&config))
        .map_err(|error| match ApplicationError::from(error) {
            ApplicationError::Domain(domain) => ("validation", domain.to_string(), 2),
            other => ("rendering", other.to_string(), 1),
        })?;

    let message = match &args.output {
        Some(path) => {
            fs::write(path, &code.source).map_err(|error| {
                ("io", format!("could not write `{}`: {error}", path.display()), 5)
            })?;
            format!("wrote {} to {}", code.file_name, path.display())
        }
        None => format!("generated {}", code.file_name),
    };
    Ok((message, Some(to_data(&code)?)))
}
