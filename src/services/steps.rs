//! Exploration steps and their results.
//!
//! A session is replayed as a sequence of steps executed in order. If one
//! fails, later steps are skipped but earlier ones stay applied, so the
//! caller still sees the graph as it stood at the failure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::NodeId;

// ============================================================================
// Step Types
// ============================================================================

/// One user interaction with the explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExplorationStep {
    /// Fetch a node's neighborhood and show it.
    Explore { node_id: NodeId },
    /// Collapse a node back to unexplored.
    Unexplore { node_id: NodeId },
}

impl ExplorationStep {
    pub fn node_id(&self) -> &NodeId {
        match self {
            ExplorationStep::Explore { node_id } | ExplorationStep::Unexplore { node_id } => {
                node_id
            }
        }
    }
}

/// Parses `explore:<id>`, `unexplore:<id>`, or a bare `<id>` (explore).
impl FromStr for ExplorationStep {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (action, id) = match s.split_once(':') {
            Some((action @ ("explore" | "unexplore"), id)) => (action, id),
            _ => ("explore", s),
        };
        if id.trim().is_empty() {
            return Err(AppError::InvalidStep(s.to_string()));
        }

        let node_id = NodeId::new(id.trim());
        Ok(match action {
            "unexplore" => ExplorationStep::Unexplore { node_id },
            _ => ExplorationStep::Explore { node_id },
        })
    }
}

impl fmt::Display for ExplorationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorationStep::Explore { node_id } => write!(f, "explore:{}", node_id),
            ExplorationStep::Unexplore { node_id } => write!(f, "unexplore:{}", node_id),
        }
    }
}

// ============================================================================
// Execution Results
// ============================================================================

/// Result of replaying a sequence of steps.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Steps that executed successfully.
    pub executed: Vec<ExplorationStep>,

    /// The step that failed, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<FailedStep>,

    /// Steps skipped due to the earlier failure.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<ExplorationStep>,
}

impl RunResult {
    pub fn success(executed: Vec<ExplorationStep>) -> Self {
        Self {
            executed,
            failed: None,
            skipped: Vec::new(),
        }
    }

    pub fn with_failure(
        executed: Vec<ExplorationStep>,
        failed: FailedStep,
        skipped: Vec<ExplorationStep>,
    ) -> Self {
        Self {
            executed,
            failed: Some(failed),
            skipped,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }

    /// Executed + failed + skipped.
    pub fn total_steps(&self) -> usize {
        self.executed.len() + usize::from(self.failed.is_some()) + self.skipped.len()
    }
}

/// A step that failed during a run.
#[derive(Debug, Clone, Serialize)]
pub struct FailedStep {
    /// Index of the step in the original sequence.
    pub index: usize,
    /// The step that failed.
    pub step: ExplorationStep,
    /// Machine-readable error code.
    pub code: &'static str,
    /// Error message describing the failure.
    pub error: String,
}

impl FailedStep {
    pub fn new(index: usize, step: ExplorationStep, err: &AppError) -> Self {
        Self {
            index,
            step,
            code: err.code(),
            error: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        assert_eq!(
            "explore:a".parse::<ExplorationStep>().unwrap(),
            ExplorationStep::Explore {
                node_id: NodeId::new("a")
            }
        );
        assert_eq!(
            "unexplore:b".parse::<ExplorationStep>().unwrap(),
            ExplorationStep::Unexplore {
                node_id: NodeId::new("b")
            }
        );
        assert_eq!(
            "c".parse::<ExplorationStep>().unwrap(),
            ExplorationStep::Explore {
                node_id: NodeId::new("c")
            }
        );
    }

    #[test]
    fn test_parse_keeps_colons_in_urls() {
        let step: ExplorationStep = "http://localhost:7474/db/data/node/3".parse().unwrap();
        assert_eq!(
            step.node_id(),
            &NodeId::new("http://localhost:7474/db/data/node/3")
        );

        let step: ExplorationStep = "unexplore:http://localhost:7474/db/data/node/3"
            .parse()
            .unwrap();
        assert!(matches!(step, ExplorationStep::Unexplore { .. }));
        assert_eq!(step.to_string(), "unexplore:http://localhost:7474/db/data/node/3");
    }

    #[test]
    fn test_parse_rejects_empty_id() {
        assert!(matches!(
            "explore:".parse::<ExplorationStep>(),
            Err(AppError::InvalidStep(_))
        ));
        assert!("  ".parse::<ExplorationStep>().is_err());
    }

    #[test]
    fn test_step_serialization() {
        let step = ExplorationStep::Unexplore {
            node_id: NodeId::new("n1"),
        };
        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"type\":\"unexplore\""));
        assert!(json.contains("\"node_id\":\"n1\""));
    }

    #[test]
    fn test_run_result_with_failure() {
        let explore = |id: &str| ExplorationStep::Explore {
            node_id: NodeId::new(id),
        };
        let failed = FailedStep::new(1, explore("b"), &AppError::NodeNotFound("b".into()));
        let result = RunResult::with_failure(vec![explore("a")], failed, vec![explore("c")]);

        assert!(!result.is_success());
        assert_eq!(result.total_steps(), 3);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("NODE_NOT_FOUND"));
    }

    #[test]
    fn test_run_result_success() {
        let result = RunResult::success(vec![]);
        assert!(result.is_success());
        assert_eq!(result.total_steps(), 0);
    }
}
