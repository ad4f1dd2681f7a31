//! CLI module for the graph explorer.
//!
//! Subcommands:
//! - `explore`: Replay exploration steps over a JSON dataset

mod explore;
mod output;

use clap::{Parser, Subcommand};

pub use explore::{ExploreCommand, OutputFormat};
pub use output::{EdgeSummary, GroupSummary, NodeSummary, VisualGraphSummary};

/// Graph Explorer - incremental exploration of property graphs
#[derive(Parser)]
#[command(name = "graph-explorer")]
#[command(about = "Explore a property graph node by node, grouping large fan-outs")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay exploration steps and print the resulting visual graph
    Explore(ExploreCommand),
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Explore(cmd) => cmd.run().await,
        }
    }
}
