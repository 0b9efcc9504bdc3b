use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::{json, Value};

use buddy_core::domain::entity::{CustomEntity, EntityType};
use buddy_core::entities::EntityTagger;
use buddy_db::{EntityRepository, SqlEntityRepository};

use crate::commands::{
    load_config, persistence_failure, to_data, validation_failure, with_store, CommandResult,
    Failure,
};

#[derive(Clone, Debug, Args)]
pub struct DetectArgs {
    #[arg(long, help = "Text to scan for entities")]
    pub text: String,
    #[arg(long = "entity", help = "Restrict to these built-in types; all when omitted")]
    pub entity_types: Vec<EntityType>,
    #[arg(long, help = "JSON file holding an array of custom lookup entities")]
    pub entities_file: Option<PathBuf>,
    #[arg(long, help = "Also match the custom entities stored for the user")]
    pub saved: bool,
    #[arg(long)]
    pub user: Option<String>,
}

pub fn run(args: DetectArgs) -> CommandResult {
    CommandResult::from_outcome("detect", execute(args).map(|(message, data)| (message, Some(data))))
}

fn execute(args: DetectArgs) -> Result<(String, Value), Failure> {
    let mut custom = match &args.entities_file {
        Some(path) => read_custom_entities(path)?,
        None => Vec::new(),
    };
    if args.saved {
        let config = load_config(args.user.clone())?;
        let stored = with_store(&config, |pool| {
            let user_id = config.generation.user_id.clone();
            async move {
                SqlEntityRepository::new(pool).list(&user_id).await.map_err(persistence_failure)
            }
        })?;
        custom.extend(stored);
    }

    let tagger = EntityTagger::new().with_custom_entities(&custom);
    let requested =
        if args.entity_types.is_empty() { EntityType::ALL.to_vec() } else { args.entity_types };
    let spans = tagger.tag_all(&args.text, &requested);

    let message = format!("found {} entities", spans.len());
    Ok((message, json!({ "text": args.text, "entities": to_data(&spans)? })))
}

pub(crate) fn read_custom_entities(path: &Path) -> Result<Vec<CustomEntity>, Failure> {
    let raw = fs::read_to_string(path).map_err(|error| {
        ("input", format!("could not read `{}`: {error}", path.display()), 2)
    })?;
    let entities: Vec<CustomEntity> = serde_json::from_str(&raw).map_err(validation_failure)?;
    for entity in &entities {
        entity.validate().map_err(validation_failure)?;
    }
    Ok(entities)
}
