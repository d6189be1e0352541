use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use aether_client::{AetherClient, ClientConfig};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use reqwest::Method;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "aether-cli",
    version,
    about = "Small async CLI for the Aether OS API"
)]
struct Cli {
    /// Base URL for the API.
    #[arg(long, env = "AETHER_BASE_URL", default_value = "http://localhost:3000")]
    base_url: String,

    /// Bearer token sent in the Authorization header.
    #[arg(long, env = "AETHER_TOKEN")]
    token: Option<String>,

    /// Timeout for request/response calls, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List catalog operation ids.
    Operations {
        /// Filter operations by substring match on operation id (case-insensitive).
        #[arg(long)]
        filter: Option<String>,
    },
    /// Call an endpoint by catalog operation id.
    Call(CallArgs),
    /// Send a raw HTTP request using method + path.
    Request(RequestArgs),
    /// Log in and print the token response.
    Login(LoginArgs),
    /// Stream events as JSON lines until interrupted.
    Events(EventsArgs),
}

#[derive(Debug, Args)]
struct CallArgs {
    /// Catalog operation id (for example: listAgents).
    operation_id: String,

    /// Path parameter in form key=value. Repeat as needed.
    #[arg(long = "path-param", value_name = "KEY=VALUE")]
    path_param: Vec<String>,

    /// Query parameter in form key=value. Repeat as needed.
    #[arg(long = "query", value_name = "KEY=VALUE")]
    query: Vec<String>,

    #[command(flatten)]
    body: BodyInput,
}

#[derive(Debug, Args)]
struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE, ...).
    method: String,

    /// Request path (for example: /api/v1/agents).
    path: String,

    /// Query parameter in form key=value. Repeat as needed.
    #[arg(long = "query", value_name = "KEY=VALUE")]
    query: Vec<String>,

    #[command(flatten)]
    body: BodyInput,
}

#[derive(Debug, Args)]
struct LoginArgs {
    #[arg(long, env = "AETHER_USERNAME")]
    username: String,

    #[arg(long, env = "AETHER_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
struct EventsArgs {
    /// Event type to subscribe to. Repeat as needed; omit for all events.
    #[arg(long = "filter", value_name = "TYPE")]
    filter: Vec<String>,

    /// Stop after this many events.
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Debug, Args)]
struct BodyInput {
    /// JSON request body literal.
    #[arg(long, conflicts_with = "body_file")]
    body_json: Option<String>,

    /// Path to a file containing a JSON request body.
    #[arg(long, value_name = "PATH", conflicts_with = "body_json")]
    body_file: Option<PathBuf>,
}

/// Entry point for the async CLI.
///
/// Parses command-line arguments, builds the client, dispatches subcommands,
/// and prints JSON output.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // `operations` is metadata-only; it does not require constructing an HTTP client.
    if let Command::Operations { filter } = &cli.command {
        print_operations(filter.as_deref());
        return Ok(());
    }

    let mut config = ClientConfig::new(&cli.base_url)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(token) = &cli.token {
        config = config.with_token(token.clone());
    }
    let client = AetherClient::with_config(config)
        .with_context(|| format!("failed to create client with base URL '{}'", cli.base_url))?;

    let output = match &cli.command {
        Command::Operations { .. } => unreachable!("handled above"),
        Command::Call(args) => call_operation(&client, args)
            .await
            .with_context(|| format!("operation call failed: '{}'", args.operation_id))?,
        Command::Request(args) => send_request(&client, args)
            .await
            .with_context(|| format!("request failed: {} {}", args.method, args.path))?,
        Command::Login(args) => client
            .login(&args.username, &args.password)
            .await
            .with_context(|| format!("login failed for user '{}'", args.username))?,
        Command::Events(args) => {
            return stream_events(&client, args).await;
        }
    };

    print_json(&output, cli.compact).context("failed to print JSON output")?;
    Ok(())
}

/// Prints the operation catalog.
///
/// When `filter` is provided, only operation ids containing that substring are shown.
fn print_operations(filter: Option<&str>) {
    let filter = filter.map(str::to_ascii_lowercase);

    let operations: Vec<_> = AetherClient::operations()
        .iter()
        .filter(|operation| {
            filter
                .as_ref()
                .is_none_or(|needle| operation.operation_id.to_ascii_lowercase().contains(needle))
        })
        .collect();

    let (operation_id_width, method_width) =
        operations
            .iter()
            .fold((0usize, 0usize), |(id_max, method_max), operation| {
                (
                    id_max.max(operation.operation_id.len()),
                    method_max.max(operation.method.len()),
                )
            });

    for operation in operations {
        println!(
            "{:<operation_id_width$}  {:<method_width$}  {}",
            operation.operation_id, operation.method, operation.path_template
        );
    }
}

/// Calls a catalog operation by `operation_id`.
async fn call_operation(client: &AetherClient, args: &CallArgs) -> Result<Value> {
    let path_params = parse_pairs(&args.path_param, "--path-param")
        .context("failed to parse --path-param arguments")?;
    let query = parse_pairs(&args.query, "--query").context("failed to parse --query arguments")?;
    let body = parse_body(&args.body).context("failed to parse request body input")?;

    let borrowed_path = borrow_pairs(&path_params);
    let borrowed_query = borrow_pairs(&query);

    let value = client
        .call_operation(&args.operation_id, &borrowed_path, &borrowed_query, body)
        .await
        .with_context(|| format!("operation '{}' returned an error", args.operation_id))?;
    Ok(value)
}

/// Sends a raw HTTP request using method + path.
async fn send_request(client: &AetherClient, args: &RequestArgs) -> Result<Value> {
    // Validate method eagerly so CLI errors are explicit before any network call.
    let method = Method::from_str(&args.method.to_ascii_uppercase())
        .with_context(|| format!("invalid HTTP method '{}'", args.method))?;
    let query = parse_pairs(&args.query, "--query").context("failed to parse --query arguments")?;
    let body = parse_body(&args.body).context("failed to parse request body input")?;
    let borrowed_query = borrow_pairs(&query);

    let value = client
        .request_json_with_query(method, &args.path, &borrowed_query, body)
        .await
        .with_context(|| format!("HTTP request failed for path '{}'", args.path))?;
    Ok(value)
}

/// Prints one compact JSON line per event until the stream ends or `--limit` is reached.
async fn stream_events(client: &AetherClient, args: &EventsArgs) -> Result<()> {
    let mut events = client
        .events()
        .subscribe(&args.filter)
        .await
        .context("failed to open event stream")?;

    let mut seen = 0usize;
    while let Some(event) = events.next().await {
        let event = event.context("event stream failed")?;
        println!(
            "{}",
            serde_json::to_string(&event).context("failed to render event")?
        );
        seen += 1;
        if args.limit.is_some_and(|limit| seen >= limit) {
            break;
        }
    }
    Ok(())
}

/// Parses repeated `key=value` arguments into owned key/value pairs.
///
/// Returns an error when a value does not include `=` or has an empty key.
fn parse_pairs(values: &[String], flag_name: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(values.len());
    for item in values {
        let Some((key, value)) = item.split_once('=') else {
            bail!("invalid {flag_name} value '{item}': expected key=value");
        };
        if key.is_empty() {
            bail!("invalid {flag_name} value '{item}': empty key");
        }
        pairs.push((key.to_owned(), value.to_owned()));
    }
    Ok(pairs)
}

fn borrow_pairs(pairs: &[(String, String)]) -> Vec<(&str, &str)> {
    pairs
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect()
}

/// Parses an optional JSON body from inline text or a file path.
///
/// Exactly one of `--body-json` or `--body-file` may be set.
fn parse_body(body: &BodyInput) -> Result<Option<Value>> {
    match (&body.body_json, &body.body_file) {
        (Some(raw), None) => serde_json::from_str(raw)
            .context("failed to parse JSON from --body-json")
            .map(Some),
        (None, Some(path)) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read --body-file '{}'", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| {
                    format!("failed to parse JSON in --body-file '{}'", path.display())
                })
                .map(Some)
        }
        (None, None) => Ok(None),
        (Some(_), Some(_)) => bail!("use only one of --body-json or --body-file"),
    }
}

fn print_json(value: &Value, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    println!("{}", rendered.context("failed to render JSON")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{BodyInput, parse_body, parse_pairs};

    #[test]
    fn parse_pairs_splits_on_first_equals() {
        let pairs = parse_pairs(&["filter=a=b".to_owned()], "--query").expect("valid pair");
        assert_eq!(pairs, vec![("filter".to_owned(), "a=b".to_owned())]);
    }

    #[test]
    fn parse_pairs_rejects_missing_key() {
        assert!(parse_pairs(&["=value".to_owned()], "--query").is_err());
        assert!(parse_pairs(&["novalue".to_owned()], "--query").is_err());
    }

    #[test]
    fn parse_body_reads_inline_json() {
        let body = BodyInput {
            body_json: Some(r#"{"role":"admin"}"#.to_owned()),
            body_file: None,
        };
        let parsed = parse_body(&body).expect("valid body").expect("body present");
        assert_eq!(parsed["role"], "admin");
    }
}
