//! Print live events as JSON lines using the async `AetherClient`.
//!
//! Run:
//! `AETHER_TOKEN=<token> cargo run --example watch_events -- agent.spawned agent.killed`
//!
//! Event types given as arguments restrict the subscription; none means all.
//!
//! Optional env vars:
//! - `AETHER_BASE_URL` (defaults to `http://localhost:3000`)
//! - `AETHER_EVENT_LIMIT` (stop after this many events, defaults to `10`)

use aether_client::AetherClient;
use futures::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let token = match std::env::var("AETHER_TOKEN") {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Set AETHER_TOKEN before running this example.");
            std::process::exit(2);
        }
    };
    let base_url =
        std::env::var("AETHER_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let limit: usize = std::env::var("AETHER_EVENT_LIMIT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(10);
    let filter: Vec<String> = std::env::args().skip(1).collect();

    let client = AetherClient::new(base_url)?.with_token(token);
    let mut events = client.events().subscribe(&filter).await?.take(limit);

    while let Some(event) = events.next().await {
        let event = event?;
        println!("{}", serde_json::to_string(&event)?);
    }

    client.close();
    Ok(())
}
