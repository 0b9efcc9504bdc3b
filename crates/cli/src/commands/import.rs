use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use buddy_core::export::from_dialogflow_json;
use buddy_core::seams::UuidIdGenerator;

use crate::commands::intent::save;
use crate::commands::{load_config, to_data, validation_failure, CommandResult, Failure};

#[derive(Clone, Debug, Args)]
pub struct ImportArgs {
    #[arg(long, help = "Dialogflow intent JSON as produced by `intent --format dialogflow`")]
    pub file: PathBuf,
    #[arg(long, default_value = "general")]
    pub category: String,
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
}

pub fn run(args: ImportArgs) -> CommandResult {
    CommandResult::from_outcome("import", execute(args))
}

fn execute(args: ImportArgs) -> Result<(String, Option<serde_json::Value>), Failure> {
    let config = load_config(args.user.clone())?;
    let raw = fs::read_to_string(&args.file).map_err(|error| {
        ("input", format!("could not read `{}`: {error}", args.file.display()), 2)
    })?;

    let language = args.language.unwrap_or_else(|| config.generation.language.clone());
    let intent = from_dialogflow_json(&raw)
        .map_err(validation_failure)?
        .into_intent(&UuidIdGenerator, &args.category, &language, Utc::now())
        .map_err(validation_failure)?;

    save(&config, &intent)?;
    tracing::info!(
        event_name = "cli.import.completed",
        intent_id = %intent.id.0,
        phrase_count = intent.training_phrases.len(),
        "dialogflow intent imported"
    );

    Ok((
        format!(
            "imported `{}` with {} training phrases",
            intent.display_name,
            intent.training_phrases.len()
        ),
        Some(to_data(&intent)?),
    ))
}
