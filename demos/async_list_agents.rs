//! Log in and list agents using the async `AetherClient`.
//!
//! Run:
//! `AETHER_USERNAME=admin AETHER_PASSWORD=<password> cargo run --example async_list_agents`
//!
//! Optional env vars:
//! - `AETHER_BASE_URL` (defaults to `http://localhost:3000`)
//! - `AETHER_AGENT_STATUS` (only list agents with this status)

use aether_client::AetherClient;
use aether_client::params::AgentListQuery;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (Ok(username), Ok(password)) = (
        std::env::var("AETHER_USERNAME"),
        std::env::var("AETHER_PASSWORD"),
    ) else {
        eprintln!("Set AETHER_USERNAME and AETHER_PASSWORD before running this example.");
        std::process::exit(2);
    };

    let base_url =
        std::env::var("AETHER_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let client = AetherClient::new(base_url)?;
    client.login(&username, &password).await?;

    let query = AgentListQuery {
        status: std::env::var("AETHER_AGENT_STATUS").ok(),
        ..AgentListQuery::default()
    };
    let agents = client.agents().list(&query).await?;
    println!("{}", serde_json::to_string_pretty(&agents)?);
    Ok(())
}
