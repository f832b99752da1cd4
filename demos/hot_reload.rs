//! Demo of watching a configuration directory and reacting to changes.
//!
//! This demo shows how to:
//! - Load a directory of YAML and JSON files as one merged configuration
//! - Keep watching the directory for changes
//! - Consume new snapshots from the output channel
//!
//! Run with: cargo run --example hot_reload
//!
//! While running, try editing the files under demos/config.d/ to see automatic reloads.

use dirconfig::prelude::*;
use serde::Deserialize;
use std::path::Path;
use tokio::sync::mpsc;

#[derive(Debug, Deserialize, Clone)]
struct AppConfig {
    server: ServerConfig,
    database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
struct ServerConfig {
    port: u16,
    host: String,
}

#[derive(Debug, Deserialize, Clone)]
struct DatabaseConfig {
    url: String,
    max_connections: u32,
}

fn print_config(cfg: &AppConfig) {
    println!("  Server: {}:{}", cfg.server.host, cfg.server.port);
    println!(
        "  Database: {} (max connections: {})",
        cfg.database.url, cfg.database.max_connections
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Hot Reload Demo ===\n");

    // Create the initial files if they don't exist
    let config_dir = Path::new("demos/config.d");
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir)?;
        std::fs::write(
            config_dir.join("10-server.yaml"),
            "server:\n  port: 8080\n  host: localhost\n",
        )?;
        std::fs::write(
            config_dir.join("20-database.json"),
            r#"{"database": {"url": "postgres://localhost/mydb", "max_connections": 10}}"#,
        )?;
        println!("Created {}", config_dir.display());
    }

    let provider = DirectoryProvider::new(FileConfig::new(config_dir).with_watch(true));

    // Capacity 1: the watcher waits for us before publishing the next snapshot
    let (tx, mut rx) = mpsc::channel(1);
    let initial = provider.provide(tx).await?;

    println!("Configuration loaded with directory watching enabled");
    println!("Watching: {}\n", config_dir.display());

    println!("Current configuration:");
    print_config(&initial.deserialize_into()?);

    println!(
        "\n===> Try editing files in {} to see automatic reloads! <===",
        config_dir.display()
    );
    println!("     Example changes:");
    println!("     - Change port: 8080 -> 9090 in 10-server.yaml");
    println!("     - Add 30-local.yaml with a database.max_connections override");
    println!("\nPress Ctrl+C to exit\n");

    let mut reloads = 0usize;
    loop {
        tokio::select! {
            data = rx.recv() => {
                let Some(data) = data else { break };
                reloads += 1;
                println!("[Event] Configuration reloaded (reload #{})", reloads);
                match data.deserialize_into::<AppConfig>() {
                    Ok(cfg) => print_config(&cfg),
                    Err(e) => println!("  Ignoring snapshot: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    provider.close()?;
    println!("\nStopped after {} reloads", reloads);
    Ok(())
}
