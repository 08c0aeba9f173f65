//! Smoke-check a running server against the dream fixtures.
//!
//! Every `*.json` file in the fixtures directory holds `{"input": "<dream>"}`.
//! Each input is posted to the prediction endpoint and the keys of the reply
//! are printed.

use anyhow::Result as AnyResult;
use clap::Parser;
use dream_oracle::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "check_fixtures")]
#[command(about = "Post every fixture to a running server and print the reply keys")]
struct CliArgs {
    /// Prediction endpoint of a running server.
    #[arg(long, default_value = "http://localhost:3000/api/predict")]
    url: String,

    /// Directory containing fixture JSON files.
    #[arg(long, default_value = "tests/fixtures")]
    fixtures_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    input: String,
}

/// Fixture files in `dir`, sorted by file name.
fn fixture_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    Ok(paths)
}

fn load_fixture(path: &Path) -> Result<Fixture> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Top-level keys of a JSON object reply, in document order.
fn reply_keys(reply: &serde_json::Value) -> Vec<String> {
    reply
        .as_object()
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    run().await.map_err(Into::into)
}

async fn run() -> Result<()> {
    let args = CliArgs::parse();
    let client = reqwest::Client::new();

    for path in fixture_paths(&args.fixtures_dir)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let fixture = load_fixture(&path)?;
        println!("Testing: {}", name);

        let response = match client
            .post(&args.url)
            .json(&serde_json::json!({ "dream": fixture.input }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_connect() => {
                eprintln!("Start the server first: cargo run --bin dream-oracle");
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        };

        let reply: serde_json::Value = response.json().await?;
        println!("Keys: {:?}", reply_keys(&reply));
    }

    Ok(())
}
