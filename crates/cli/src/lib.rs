pub mod commands;

use std::io;
use std::process::ExitCode;

use buddy_core::config::{AppConfig, LoadOptions, LogFormat};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::detect::DetectArgs;
use commands::entities::EntitiesCommand;
use commands::import::ImportArgs;
use commands::intent::IntentArgs;
use commands::intents::IntentsCommand;
use commands::openapi::OpenApiArgs;
use commands::playbook::PlaybookArgs;
use commands::playbooks::PlaybooksCommand;
use commands::webhook::WebhookArgs;

#[derive(Debug, Parser)]
#[command(
    name = "buddy",
    about = "Agents Buddy: conversational-agent authoring toolkit",
    long_about = "Generate intents, playbooks, webhook code, and OpenAPI documents; detect entities; \
                  and manage the intents and playbooks you have saved.",
    after_help = "Examples:\n  buddy intent --name book_table --description \"Reserve a table\" --save\n  \
                  buddy detect --text \"call me at 555-123-4567\"\n  buddy intents list --search book"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Generate an intent with training phrases and responses")]
    Intent(IntentArgs),
    #[command(about = "Generate a playbook instruction document")]
    Playbook(PlaybookArgs),
    #[command(about = "Detect entities in a piece of text")]
    Detect(DetectArgs),
    #[command(about = "Generate webhook handler source code")]
    Webhook(WebhookArgs),
    #[command(about = "Generate an OpenAPI 3.0 document for agent tools")]
    Openapi(OpenApiArgs),
    #[command(about = "Import a Dialogflow intent export and save it")]
    Import(ImportArgs),
    #[command(about = "Manage saved intents")]
    Intents {
        #[command(subcommand)]
        command: IntentsCommand,
    },
    #[command(about = "Manage saved playbooks")]
    Playbooks {
        #[command(subcommand)]
        command: PlaybooksCommand,
    },
    #[command(about = "Manage custom entity definitions")]
    Entities {
        #[command(subcommand)]
        command: EntitiesCommand,
    },
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // A broken config still gets logging; the command itself reports the config failure.
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    init_logging(&config);

    let result = dispatch(cli);
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

pub fn dispatch(cli: Cli) -> commands::CommandResult {
    match cli.command {
        Command::Intent(args) => commands::intent::run(args),
        Command::Playbook(args) => commands::playbook::run(args),
        Command::Detect(args) => commands::detect::run(args),
        Command::Webhook(args) => commands::webhook::run(args),
        Command::Openapi(args) => commands::openapi::run(args),
        Command::Import(args) => commands::import::run(args),
        Command::Intents { command } => commands::intents::run(command),
        Command::Playbooks { command } => commands::playbooks::run(command),
        Command::Entities { command } => commands::entities::run(command),
        Command::Migrate => commands::migrate::run(),
        Command::Config => commands::config::run(),
    }
}

/// Logs go to stderr so stdout stays a single JSON envelope.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    let builder =
        tracing_subscriber::fmt().with_target(false).with_env_filter(filter).with_writer(io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
