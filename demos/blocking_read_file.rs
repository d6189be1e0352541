//! Read a file from the agent filesystem using the `BlockingAetherClient`.
//!
//! Run:
//! `AETHER_TOKEN=<token> cargo run --example blocking_read_file -- notes/today.md`
//!
//! Optional env vars:
//! - `AETHER_BASE_URL` (defaults to `http://localhost:3000`)

use aether_client::BlockingAetherClient;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: blocking_read_file <path>");
        std::process::exit(2);
    };
    let token = match std::env::var("AETHER_TOKEN") {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Set AETHER_TOKEN before running this example.");
            std::process::exit(2);
        }
    };

    let base_url =
        std::env::var("AETHER_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let client = BlockingAetherClient::new(base_url)?.with_token(token);

    let file = client.fs().read(&path)?;
    println!("{}", serde_json::to_string_pretty(&file)?);
    Ok(())
}
