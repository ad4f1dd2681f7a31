//! Exploration service: a data source wired to the exploration model.

use crate::error::AppError;
use crate::exploration::GraphExplorationModel;
use crate::models::{NodeId, VisualKey};
use crate::source::GraphDataSource;

use super::steps::{ExplorationStep, FailedStep, RunResult};

/// Drives a [`GraphExplorationModel`] from renderer interactions.
///
/// Every fetch completes before the model is touched, so a failed fetch
/// leaves the model unchanged.
pub struct ExplorationService<S> {
    source: S,
    model: GraphExplorationModel,
}

impl<S: GraphDataSource> ExplorationService<S> {
    pub fn new(source: S, grouping_threshold: usize) -> Self {
        Self {
            source,
            model: GraphExplorationModel::new(grouping_threshold),
        }
    }

    pub fn model(&self) -> &GraphExplorationModel {
        &self.model
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the neighborhood of `id` and add it to the model.
    pub async fn explore(&mut self, id: &NodeId) -> Result<(), AppError> {
        let hood = self.source.neighborhood(id).await?;
        tracing::info!(
            node = %id,
            relationships = hood.relationships.len(),
            "Exploring"
        );
        self.model
            .add_node(hood.node, hood.relationships, hood.related_nodes);
        Ok(())
    }

    /// Collapse `id` back to unexplored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NodeNotFound`] if the model has never seen `id`.
    pub fn unexplore(&mut self, id: &NodeId) -> Result<(), AppError> {
        self.ensure_known(id)?;
        tracing::info!(node = %id, "Unexploring");
        self.model.unexplore(id);
        Ok(())
    }

    /// Renderer click: explore an unexplored node, unexplore an explored one.
    pub async fn toggle(&mut self, id: &NodeId) -> Result<(), AppError> {
        if self.model.is_explored(id) {
            self.unexplore(id)
        } else {
            self.explore(id).await
        }
    }

    /// Pin a drawn node in place.
    pub fn pin(&mut self, id: &NodeId) -> Result<(), AppError> {
        if self.model.pin(&VisualKey::Node(id.clone())) {
            Ok(())
        } else {
            Err(AppError::NodeNotFound(id.to_string()))
        }
    }

    /// Release a pinned node.
    pub fn unpin(&mut self, id: &NodeId) -> Result<(), AppError> {
        if self.model.unpin(&VisualKey::Node(id.clone())) {
            Ok(())
        } else {
            Err(AppError::NodeNotFound(id.to_string()))
        }
    }

    /// Forget everything, e.g. when switching to another server.
    pub fn clear(&mut self) {
        self.model.clear();
    }

    /// Execute steps in order, stopping at the first failure.
    pub async fn run(&mut self, steps: Vec<ExplorationStep>) -> RunResult {
        let mut executed = Vec::with_capacity(steps.len());
        let mut remaining = steps.into_iter().enumerate();

        while let Some((index, step)) = remaining.next() {
            let outcome = match &step {
                ExplorationStep::Explore { node_id } => self.explore(node_id).await,
                ExplorationStep::Unexplore { node_id } => self.unexplore(node_id),
            };

            if let Err(err) = outcome {
                tracing::warn!(index, step = %step, error = %err, "Exploration step failed");
                let failed = FailedStep::new(index, step, &err);
                let skipped = remaining.map(|(_, step)| step).collect();
                return RunResult::with_failure(executed, failed, skipped);
            }
            executed.push(step);
        }

        RunResult::success(executed)
    }

    fn ensure_known(&self, id: &NodeId) -> Result<(), AppError> {
        let drawn = self
            .model
            .visual_graph()
            .contains(&VisualKey::Node(id.clone()));
        if drawn || self.model.known_node(id).is_some() {
            Ok(())
        } else {
            Err(AppError::NodeNotFound(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dataset, GraphNode, GraphRelationship};
    use crate::source::InMemorySource;

    fn service(threshold: usize) -> ExplorationService<InMemorySource> {
        let mut nodes = vec![GraphNode::new("hub"), GraphNode::new("friend")];
        let mut relationships = vec![GraphRelationship::new("f", "KNOWS", "hub", "friend")];
        for i in 1..=6 {
            let fan = format!("fan{i}");
            relationships.push(GraphRelationship::new(
                format!("likes{i}"),
                "LIKES",
                fan.as_str(),
                "hub",
            ));
            nodes.push(GraphNode::new(fan));
        }
        let source = InMemorySource::new(Dataset {
            nodes,
            relationships,
        })
        .unwrap();
        ExplorationService::new(source, threshold)
    }

    fn id(id: &str) -> NodeId {
        NodeId::new(id)
    }

    #[tokio::test]
    async fn test_explore_groups_incoming_fan() {
        let mut service = service(5);

        service.explore(&id("hub")).await.unwrap();

        let model = service.model();
        assert!(model.is_explored(&id("hub")));
        let groups: Vec<_> = model.groups().collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].node_count, 6);
        assert_eq!(groups[0].relationship_type, "LIKES");
        assert!(model
            .visual_graph()
            .node(&VisualKey::Node(id("friend")))
            .unwrap()
            .is_unexplored());
    }

    #[tokio::test]
    async fn test_explore_unknown_node_leaves_model_untouched() {
        let mut service = service(5);

        let err = service.explore(&id("nobody")).await.unwrap_err();

        assert!(matches!(err, AppError::NodeNotFound(_)));
        assert_eq!(service.model().visual_graph().node_count(), 0);
    }

    #[tokio::test]
    async fn test_toggle() {
        let mut service = service(5);
        service.toggle(&id("hub")).await.unwrap();
        service.toggle(&id("friend")).await.unwrap();
        assert!(service.model().is_explored(&id("friend")));

        service.toggle(&id("friend")).await.unwrap();

        assert!(!service.model().is_explored(&id("friend")));
        assert!(service.model().is_explored(&id("hub")));
    }

    #[tokio::test]
    async fn test_unexplore_unknown_node() {
        let mut service = service(5);
        service.explore(&id("hub")).await.unwrap();

        let err = service.unexplore(&id("stranger")).unwrap_err();
        assert!(matches!(err, AppError::NodeNotFound(_)));

        // fan1 is known but folded into a group, so there is nothing to collapse.
        service.unexplore(&id("fan1")).unwrap();
        assert_eq!(service.model().groups().next().unwrap().node_count, 6);
    }

    #[tokio::test]
    async fn test_pin_and_unpin() {
        let mut service = service(5);
        service.explore(&id("hub")).await.unwrap();

        service.pin(&id("friend")).unwrap();
        assert!(service
            .model()
            .visual_graph()
            .node(&VisualKey::Node(id("friend")))
            .unwrap()
            .is_fixed());
        service.unpin(&id("friend")).unwrap();
        assert!(service.pin(&id("fan1")).is_err());
    }

    #[tokio::test]
    async fn test_run_stops_at_first_failure() {
        let mut service = service(5);
        let steps: Vec<ExplorationStep> = ["hub", "missing", "friend"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();

        let result = service.run(steps).await;

        assert!(!result.is_success());
        assert_eq!(result.executed.len(), 1);
        let failed = result.failed.as_ref().unwrap();
        assert_eq!(failed.index, 1);
        assert_eq!(failed.code, "NODE_NOT_FOUND");
        assert_eq!(result.skipped.len(), 1);
        assert!(!service.model().is_explored(&id("friend")));
    }

    #[tokio::test]
    async fn test_clear() {
        let mut service = service(5);
        service.explore(&id("hub")).await.unwrap();

        service.clear();

        assert_eq!(service.model().visual_graph().node_count(), 0);
        assert!(service.model().known_nodes().is_empty());
    }
}
