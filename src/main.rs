//! apex-edge
//!
//! The edge request handler in front of the apexenterprises.net origin.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────────┐
//!                          │                      EDGE                             │
//!                          │                                                       │
//!     Client Request       │  ┌─────────┐   ┌──────────┐   ┌───────────────────┐   │
//!     ─────────────────────┼─▶│  http   │──▶│ request  │──▶│  edge pipeline     │   │
//!                          │  │ server  │   │   URL    │   │ scheme → gone →    │   │
//!                          │  └─────────┘   └──────────┘   │ pagination → cache │   │
//!                          │                               └─────────┬─────────┘   │
//!                          │                                         │ miss        │
//!                          │                                         ▼             │
//!     Client Response      │  ┌─────────┐   ┌──────────┐   ┌───────────────────┐   │
//!     ◀────────────────────┼──│response │◀──│ headers  │◀──│  origin client     │◀──┼── Origin
//!                          │  └────┬────┘   └──────────┘   └───────────────────┘   │
//!                          │       │ deferred cache put                            │
//!                          │       ▼                                               │
//!                          │  ┌─────────┐   ┌──────────────────────────────────┐   │
//!                          │  │  cache  │   │ config · observability · lifecycle│   │
//!                          │  └─────────┘   └──────────────────────────────────┘   │
//!                          └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use apex_edge::lifecycle::startup;

#[derive(Parser)]
#[command(name = "apex-edge", version, about = "Edge request handler for apexenterprises.net")]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    startup::run(cli.config.as_deref()).await?;
    Ok(())
}
