use clap::{Args, ValueEnum};
use serde_json::Value;
use tracing::info;

use buddy_core::config::AppConfig;
use buddy_core::domain::entity::EntityType;
use buddy_core::domain::intent::{GenerationConfig, Intent};
use buddy_core::domain::style::{Complexity, Tone};
use buddy_core::export::to_dialogflow;
use buddy_core::generation::IntentGenerator;
use buddy_db::{IntentRepository, SqlIntentRepository};

use crate::commands::{
    load_config, persistence_failure, to_data, validation_failure, with_store, CommandResult,
    Failure,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum IntentFormat {
    #[default]
    Native,
    Dialogflow,
}

#[derive(Clone, Debug, Args)]
pub struct IntentArgs {
    #[arg(long, help = "Intent display name, e.g. order.status")]
    pub name: String,
    #[arg(long, help = "What the user is trying to do")]
    pub description: String,
    #[arg(long, default_value = "general")]
    pub domain: String,
    #[arg(long, help = "Language code (defaults to generation.default_language)")]
    pub language: Option<String>,
    #[arg(long = "count", help = "Number of training phrases to keep")]
    pub phrase_count: Option<usize>,
    #[arg(long = "entity", help = "Entity type to annotate; repeat for several")]
    pub entity_types: Vec<EntityType>,
    #[arg(long, default_value_t = Tone::Friendly)]
    pub tone: Tone,
    #[arg(long, default_value_t = Complexity::Moderate)]
    pub complexity: Complexity,
    #[arg(long)]
    pub no_entities: bool,
    #[arg(long)]
    pub no_variations: bool,
    #[arg(long)]
    pub negatives: bool,
    #[arg(long, value_enum, default_value_t = IntentFormat::Native)]
    pub format: IntentFormat,
    #[arg(long, help = "Store the generated intent")]
    pub save: bool,
    #[arg(long, help = "Owner id used when saving")]
    pub user: Option<String>,
}

pub fn run(args: IntentArgs) -> CommandResult {
    CommandResult::from_outcome("intent", execute(args).map(|(message, data)| (message, Some(data))))
}

fn execute(args: IntentArgs) -> Result<(String, Value), Failure> {
    let config = load_config(args.user.clone())?;

    let generation = GenerationConfig {
        intent_name: args.name,
        description: args.description,
        domain: args.domain,
        language: args.language.unwrap_or_else(|| config.generation.language.clone()),
        phrase_count: args.phrase_count.unwrap_or(config.generation.phrase_count),
        entity_types: args.entity_types,
        tone: args.tone,
        complexity: args.complexity,
        include_entities: !args.no_entities,
        include_variations: !args.no_variations,
        include_negatives: args.negatives,
    };

    let intent = IntentGenerator::default().generate(&generation).map_err(validation_failure)?;
    info!(
        event_name = "cli.intent.generated",
        intent_id = %intent.id.0,
        phrase_count = intent.training_phrases.len(),
        "intent generated"
    );

    let mut message = format!(
        "generated {} training phrases for `{}`",
        intent.training_phrases.len(),
        intent.display_name
    );
    if args.save {
        save(&config, &intent)?;
        message.push_str(&format!(" and saved it for `{}`", config.generation.user_id));
    }

    let data = match args.format {
        IntentFormat::Native => to_data(&intent)?,
        IntentFormat::Dialogflow => to_data(&to_dialogflow(&intent))?,
    };
    Ok((message, data))
}

pub(crate) fn save(config: &AppConfig, intent: &Intent) -> Result<(), Failure> {
    with_store(config, |pool| async move {
        SqlIntentRepository::new(pool)
            .insert(&config.generation.user_id, intent)
            .await
            .map_err(persistence_failure)
    })
}
