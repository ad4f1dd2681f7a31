//! Explore subcommand - replay steps over a JSON dataset.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::Serialize;

use crate::config::Config;
use crate::error::AppError;
use crate::models::Dataset;
use crate::services::{ExplorationService, ExplorationStep};
use crate::source::InMemorySource;
use crate::visualization::GraphLayout;

use super::output::VisualGraphSummary;

/// Output format for the resulting graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON format (default).
    #[default]
    Json,
    /// TOON (Token-Oriented Object Notation).
    Toon,
}

/// Replay exploration steps over a dataset and print the visual graph.
#[derive(Parser)]
pub struct ExploreCommand {
    /// Path to a JSON file with `nodes` and `relationships`.
    pub dataset: PathBuf,

    /// Steps to replay: `explore:<id>`, `unexplore:<id>`, or a bare `<id>`.
    pub steps: Vec<ExplorationStep>,

    /// Override the grouping threshold from configuration.
    #[arg(short, long)]
    pub threshold: Option<usize>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Run the force-directed layout and include node positions.
    #[arg(long)]
    pub layout: bool,
}

impl ExploreCommand {
    /// Run the explore command.
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load().map_err(AppError::from).map_err(report)?;
        if let Some(threshold) = self.threshold {
            config.exploration.grouping_threshold = threshold;
        }
        config.validate().map_err(report)?;

        let dataset = Dataset::load(&self.dataset).map_err(report)?;
        let source = InMemorySource::new(dataset).map_err(report)?;
        tracing::info!(
            "Loaded {} nodes and {} relationships from {}",
            source.node_count(),
            source.relationship_count(),
            self.dataset.display()
        );

        let mut service = ExplorationService::new(source, config.exploration.grouping_threshold);
        let result = service.run(self.steps).await;
        if let Some(failed) = &result.failed {
            return Err(eyre!(
                "[{}] step {} ({}) failed: {}",
                failed.code,
                failed.index,
                failed.step,
                failed.error
            ));
        }
        tracing::debug!(executed = result.executed.len(), "Replay complete");

        let layout = self.layout.then(|| {
            let mut layout = GraphLayout::from_visual_graph(service.model().visual_graph());
            layout.stabilize(config.layout.iterations);
            layout
        });

        let summary = VisualGraphSummary::from_model(service.model(), layout.as_ref());
        println!("{}", render(&summary, self.format)?);
        Ok(())
    }
}

/// Serialize `value` in the requested format.
fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Toon => {
            serde_toon::to_string(value).map_err(|e| eyre!("TOON serialization error: {}", e))
        }
    }
}

fn report(err: AppError) -> color_eyre::Report {
    eyre!("[{}] {}", err.code(), err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    use crate::cli::App;

    #[test]
    fn test_cli_definition() {
        App::command().debug_assert();
    }

    #[test]
    fn test_parse_explore_command() {
        let app = App::try_parse_from([
            "graph-explorer",
            "explore",
            "data.json",
            "a",
            "unexplore:b",
            "--threshold",
            "3",
            "--format",
            "toon",
        ])
        .unwrap();

        let crate::cli::Command::Explore(cmd) = app.command;
        assert_eq!(cmd.dataset, PathBuf::from("data.json"));
        assert_eq!(cmd.steps.len(), 2);
        assert!(matches!(cmd.steps[1], ExplorationStep::Unexplore { .. }));
        assert_eq!(cmd.threshold, Some(3));
        assert_eq!(cmd.format, OutputFormat::Toon);
        assert!(!cmd.layout);
    }

    #[test]
    fn test_parse_rejects_empty_step() {
        let result = App::try_parse_from(["graph-explorer", "explore", "data.json", "explore:"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_json() {
        let rendered = render(&serde_json::json!({"a": 1}), OutputFormat::Json).unwrap();
        assert!(rendered.contains("\"a\": 1"));
    }
}
