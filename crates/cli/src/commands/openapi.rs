use std::fs;
use std::path::PathBuf;

use clap::Args;

use buddy_core::openapi::{generate_openapi, ApiSpecConfig, EndpointSpec};

use crate::commands::{validation_failure, CommandResult, Failure};

#[derive(Clone, Debug, Args)]
pub struct OpenApiArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "1.0.0")]
    pub api_version: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "https://api.example.com")]
    pub server: String,
    #[arg(
        long = "endpoint",
        help = "`METHOD /path[:summary]`, e.g. `GET /orders/{id}:Fetch an order`; repeatable"
    )]
    pub endpoints: Vec<String>,
    #[arg(long, help = "Write the document to this path")]
    pub output: Option<PathBuf>,
}

pub fn run(args: OpenApiArgs) -> CommandResult {
    CommandResult::from_outcome("openapi", execute(args))
}

fn execute(args: OpenApiArgs) -> Result<(String, Option<serde_json::Value>), Failure> {
    let endpoints = args
        .endpoints
        .iter()
        .map(|raw| EndpointSpec::parse_shorthand(raw))
        .collect::<Result<Vec<_>, _>>()
        .map_err(validation_failure)?;
    let endpoint_count = endpoints.len();

    let config = ApiSpecConfig {
        title: args.title,
        version: args.api_version,
        description: args.description,
        server_url: args.server,
        endpoints,
    };
    let document = generate_openapi(&config).map_err(validation_failure)?;

    let message = match &args.output {
        Some(path) => {
            let rendered = serde_json::to_string_pretty(&document)
                .map_err(|error| ("serialization", error.to_string(), 1))?;
            fs::write(path, rendered).map_err(|error| {
                ("io", format!("could not write `{}`: {error}", path.display()), 5)
            })?;
            format!("wrote OpenAPI document with {endpoint_count} operations to {}", path.display())
        }
        None => format!("generated OpenAPI document with {endpoint_count} operations"),
    };
    Ok((message, Some(document)))
}
