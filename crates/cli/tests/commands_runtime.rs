use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use buddy_cli::commands::CommandResult;
use buddy_cli::{dispatch, Cli};
use clap::Parser;
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn intent_returns_generated_payload() {
    with_env(&[], || {
        let result = run_cli(&[
            "intent",
            "--name",
            "book_table",
            "--description",
            "Reserve a table at the restaurant",
            "--count",
            "8",
        ]);
        assert_eq!(result.exit_code, 0, "expected successful generation: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "intent");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["displayName"], "book_table");

        let phrases = payload["data"]["trainingPhrases"].as_array().expect("phrases array");
        assert!(!phrases.is_empty());
        assert!(phrases.len() <= 8);
    });
}

#[test]
fn intent_dialogflow_format_flattens_phrases() {
    with_env(&[], || {
        let result = run_cli(&[
            "intent",
            "--name",
            "order_status",
            "--description",
            "Check where an order is",
            "--format",
            "dialogflow",
        ]);
        assert_eq!(result.exit_code, 0, "{}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["displayName"], "order_status");
        assert!(payload["data"]["trainingPhrases"][0]["parts"][0]["text"].is_string());
        assert!(payload["data"]["messages"][0]["text"]["text"].is_array());
    });
}

#[test]
fn intent_without_description_is_a_validation_failure() {
    with_env(&[], || {
        let result = run_cli(&["intent", "--name", "book_table", "--description", "  "]);
        assert_eq!(result.exit_code, 2, "expected validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "intent");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "validation");
    });
}

#[test]
fn saved_intents_can_be_listed_shown_and_deleted() {
    let workspace = TempDir::new().expect("temp dir");
    let url = database_url(&workspace);

    with_env(&[("BUDDY_DATABASE_URL", url.as_str())], || {
        let created = run_cli(&[
            "intent",
            "--name",
            "book_table",
            "--description",
            "Reserve a table",
            "--save",
        ]);
        assert_eq!(created.exit_code, 0, "{}", created.output);
        let intent_id = parse_payload(&created.output)["data"]["id"]
            .as_str()
            .expect("intent id")
            .to_string();

        let other = run_cli(&[
            "intent",
            "--name",
            "cancel_order",
            "--description",
            "Cancel a pending order",
            "--save",
        ]);
        assert_eq!(other.exit_code, 0, "{}", other.output);

        let listed = parse_payload(&run_cli(&["intents", "list", "--search", "BOOK"]).output);
        assert_eq!(listed["command"], "intents.list");
        let rows = listed["data"].as_array().expect("summaries");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], intent_id.as_str());

        let everything = parse_payload(&run_cli(&["intents", "list"]).output);
        assert_eq!(everything["data"].as_array().map(Vec::len), Some(2));

        let someone_else =
            parse_payload(&run_cli(&["intents", "list", "--user", "someone-else"]).output);
        assert_eq!(someone_else["data"].as_array().map(Vec::len), Some(0));

        let shown = run_cli(&["intents", "show", &intent_id]);
        assert_eq!(shown.exit_code, 0, "{}", shown.output);
        assert_eq!(parse_payload(&shown.output)["data"]["displayName"], "book_table");

        let deleted = run_cli(&["intents", "delete", &intent_id]);
        assert_eq!(deleted.exit_code, 0, "{}", deleted.output);

        let missing = run_cli(&["intents", "show", &intent_id]);
        assert_eq!(missing.exit_code, 5);
        assert_eq!(parse_payload(&missing.output)["error_class"], "not_found");
    });
}

#[test]
fn removing_a_phrase_persists() {
    let workspace = TempDir::new().expect("temp dir");
    let url = database_url(&workspace);

    with_env(&[("BUDDY_DATABASE_URL", url.as_str())], || {
        let created = parse_payload(
            &run_cli(&[
                "intent",
                "--name",
                "greet",
                "--description",
                "Say hello",
                "--count",
                "5",
                "--save",
            ])
            .output,
        );
        let intent_id = created["data"]["id"].as_str().expect("intent id").to_string();
        let phrases = created["data"]["trainingPhrases"].as_array().expect("phrases").clone();
        let first_phrase = phrases[0]["id"].as_str().expect("phrase id").to_string();

        let removed = run_cli(&["intents", "remove-phrase", &intent_id, &first_phrase]);
        assert_eq!(removed.exit_code, 0, "{}", removed.output);

        let shown = parse_payload(&run_cli(&["intents", "show", &intent_id]).output);
        let remaining = shown["data"]["trainingPhrases"].as_array().expect("phrases");
        assert_eq!(remaining.len(), phrases.len() - 1);
        assert!(remaining.iter().all(|phrase| phrase["id"] != first_phrase.as_str()));

        let again = run_cli(&["intents", "remove-phrase", &intent_id, &first_phrase]);
        assert_eq!(again.exit_code, 5);
        assert_eq!(parse_payload(&again.output)["error_class"], "not_found");
    });
}

#[test]
fn saved_playbooks_round_trip_through_the_store() {
    let workspace = TempDir::new().expect("temp dir");
    let url = database_url(&workspace);

    with_env(&[("BUDDY_DATABASE_URL", url.as_str())], || {
        let created = run_cli(&[
            "playbook",
            "--name",
            "Returns desk",
            "--description",
            "Handle product returns",
            "--goal",
            "Collect the order number",
            "--tool",
            "lookup_order=https://api.example.com/orders",
            "--save",
        ]);
        assert_eq!(created.exit_code, 0, "{}", created.output);
        let playbook_id =
            parse_payload(&created.output)["data"]["id"].as_str().expect("id").to_string();

        let listed = parse_payload(&run_cli(&["playbooks", "list"]).output);
        assert_eq!(listed["data"][0]["id"], playbook_id.as_str());

        let shown = parse_payload(&run_cli(&["playbooks", "show", &playbook_id]).output);
        assert_eq!(shown["data"]["name"], "Returns desk");
        assert_eq!(shown["data"]["tools"][0]["kind"], "webhook");

        assert_eq!(run_cli(&["playbooks", "delete", &playbook_id]).exit_code, 0);
        assert_eq!(run_cli(&["playbooks", "delete", &playbook_id]).exit_code, 5);
    });
}

#[test]
fn detect_reports_builtin_and_custom_entities() {
    let workspace = TempDir::new().expect("temp dir");
    let entities_file = workspace.path().join("sizes.json");
    fs::write(
        &entities_file,
        r#"[{"id":"size","name":"size","values":[{"value":"large","synonyms":["big"]}]}]"#,
    )
    .expect("write entities file");
    let entities_arg = entities_file.to_string_lossy().to_string();

    with_env(&[], || {
        let result = run_cli(&[
            "detect",
            "--text",
            "Send a big box to js@clinic.org",
            "--entities-file",
            &entities_arg,
        ]);
        assert_eq!(result.exit_code, 0, "{}", result.output);

        let payload = parse_payload(&result.output);
        let entities = payload["data"]["entities"].as_array().expect("entities");
        assert!(entities.iter().any(|span| span["entityType"] == "email"));
        assert!(entities
            .iter()
            .any(|span| span["entityType"] == "custom:size" && span["canonical"] == "large"));
    });
}

#[test]
fn detect_with_unreadable_entities_file_is_an_input_failure() {
    with_env(&[], || {
        let result = run_cli(&[
            "detect",
            "--text",
            "anything",
            "--entities-file",
            "/definitely/not/here.json",
        ]);
        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "input");
    });
}

#[test]
fn webhook_renders_source_for_each_language() {
    with_env(&[], || {
        let expected = [("node", "orders_webhook.js"), ("python", "orders_webhook.py")];
        for (language, file_name) in expected {
            let result = run_cli(&[
                "webhook",
                "--name",
                "orders",
                "--language",
                language,
                "--intent",
                "order_status",
                "--auth",
            ]);
            assert_eq!(result.exit_code, 0, "{}", result.output);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["data"]["fileName"], file_name);
            assert!(payload["data"]["source"].as_str().expect("source").contains("order_status"));
        }
    });
}

#[test]
fn openapi_writes_document_to_disk() {
    let workspace = TempDir::new().expect("temp dir");
    let output = workspace.path().join("openapi.json");
    let output_arg = output.to_string_lossy().to_string();

    with_env(&[], || {
        let result = run_cli(&[
            "openapi",
            "--title",
            "Orders",
            "--endpoint",
            "GET /orders/{id}:Fetch an order",
            "--output",
            &output_arg,
        ]);
        assert_eq!(result.exit_code, 0, "{}", result.output);

        let written: Value =
            serde_json::from_str(&fs::read_to_string(&output).expect("document written"))
                .expect("valid json");
        assert_eq!(written["info"]["title"], "Orders");
        assert!(written["paths"]["/orders/{id}"]["get"].is_object());
    });
}

#[test]
fn openapi_without_endpoints_is_a_validation_failure() {
    with_env(&[], || {
        let result = run_cli(&["openapi", "--title", "Orders"]);
        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "validation");
    });
}

#[test]
fn dialogflow_export_imports_as_a_new_intent() {
    let workspace = TempDir::new().expect("temp dir");
    let url = database_url(&workspace);
    let export_path = workspace.path().join("intent.json");
    fs::write(
        &export_path,
        r#"{
            "displayName": "track_parcel",
            "trainingPhrases": [
                {"parts": [{"text": "where is my parcel"}]},
                {"parts": [{"text": "track "}, {"text": "my delivery"}]}
            ],
            "messages": [{"text": {"text": ["Let me check that for you."]}}]
        }"#,
    )
    .expect("write export");
    let export_arg = export_path.to_string_lossy().to_string();

    with_env(&[("BUDDY_DATABASE_URL", url.as_str())], || {
        let result = run_cli(&["import", "--file", &export_arg, "--category", "shipping"]);
        assert_eq!(result.exit_code, 0, "{}", result.output);

        let listed =
            parse_payload(&run_cli(&["intents", "list", "--category", "shipping"]).output);
        let rows = listed["data"].as_array().expect("summaries");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["display_name"], "track_parcel");
        assert_eq!(rows[0]["phrase_count"], 2);
    });
}

#[test]
fn entity_import_is_all_or_nothing() {
    let workspace = TempDir::new().expect("temp dir");
    let url = database_url(&workspace);
    let clashing = workspace.path().join("clashing.json");
    fs::write(
        &clashing,
        r#"[
            {"id":"colour","name":"colour","values":[{"value":"red"}]},
            {"id":"size","name":"size","values":[{"value":"large"}]},
            {"id":"size","name":"size","values":[{"value":"small"}]}
        ]"#,
    )
    .expect("write entities file");
    let clashing_arg = clashing.to_string_lossy().to_string();

    with_env(&[("BUDDY_DATABASE_URL", url.as_str())], || {
        let failed = run_cli(&["entities", "import", "--file", &clashing_arg]);
        assert_eq!(failed.exit_code, 5, "{}", failed.output);
        assert_eq!(parse_payload(&failed.output)["error_class"], "persistence");

        let listed = parse_payload(&run_cli(&["entities", "list"]).output);
        assert_eq!(listed["data"].as_array().map(Vec::len), Some(0));
    });
}

#[test]
fn blank_env_override_is_reported_as_default() {
    with_env(&[("BUDDY_DATABASE_URL", "")], || {
        let payload = parse_payload(&run_cli(&["config"]).output);
        let lines = payload["data"].as_array().expect("config lines");
        let url = lines.iter().find(|line| line["key"] == "database.url").expect("url line");
        assert_eq!(url["value"], "sqlite://agents-buddy.db");
        assert_eq!(url["source"], "default");
    });
}

#[test]
fn migrate_returns_success_with_valid_env() {
    let workspace = TempDir::new().expect("temp dir");
    let url = database_url(&workspace);

    with_env(&[("BUDDY_DATABASE_URL", url.as_str())], || {
        let result = run_cli(&["migrate"]);
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["versions"].as_array().map(Vec::len), Some(3));

        let second = run_cli(&["migrate"]);
        assert_eq!(second.exit_code, 0, "migrations are idempotent");
    });
}

#[test]
fn config_attributes_env_overrides() {
    with_env(&[("BUDDY_LOG_LEVEL", "debug")], || {
        let result = run_cli(&["config"]);
        assert_eq!(result.exit_code, 0, "{}", result.output);

        let payload = parse_payload(&result.output);
        let lines = payload["data"].as_array().expect("config lines");
        let level = lines.iter().find(|line| line["key"] == "logging.level").expect("level line");
        assert_eq!(level["value"], "debug");
        assert_eq!(level["source"], "env (BUDDY_LOG_LEVEL)");

        let url = lines.iter().find(|line| line["key"] == "database.url").expect("url line");
        assert_eq!(url["source"], "default");
    });
}

#[test]
fn invalid_env_override_is_a_config_failure() {
    with_env(&[("BUDDY_DATABASE_URL", "postgres://elsewhere")], || {
        let result = run_cli(&["intents", "list"]);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "intents.list");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

fn run_cli(args: &[&str]) -> CommandResult {
    let argv = std::iter::once("buddy").chain(args.iter().copied());
    let cli = Cli::try_parse_from(argv).expect("arguments should parse");
    dispatch(cli)
}

fn database_url(workspace: &TempDir) -> String {
    format!("sqlite://{}", workspace.path().join("buddy.db").display())
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid json")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "BUDDY_DATABASE_URL",
        "BUDDY_DATABASE_MAX_CONNECTIONS",
        "BUDDY_DATABASE_TIMEOUT_SECS",
        "BUDDY_GENERATION_DEFAULT_LANGUAGE",
        "BUDDY_GENERATION_DEFAULT_PHRASE_COUNT",
        "BUDDY_GENERATION_DEFAULT_MAX_TOKENS",
        "BUDDY_GENERATION_DEFAULT_USER",
        "BUDDY_LOGGING_LEVEL",
        "BUDDY_LOGGING_FORMAT",
        "BUDDY_LOG_LEVEL",
        "BUDDY_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
