use std::fmt::Display;

use crate::{
    controllers::{image_controller, network_controller},
    models::container_models::LinkContainer,
    utils::docker_utils::ContainerEngine,
};

/// A cleanup registered while the flow runs and executed when it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupAction {
    RemoveNetwork { network_id: String },
    RemoveContainer(LinkContainer),
    RemoveImage { reference: String },
}

impl Display for CleanupAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemoveNetwork { network_id } => write!(f, "remove network {}", network_id),
            Self::RemoveContainer(container) => {
                write!(f, "remove {} container {}", container.role, container.container_id)
            }
            Self::RemoveImage { reference } => write!(f, "remove image {}", reference),
        }
    }
}

/// Deferred actions, unwound last-in first-out.
#[derive(Debug, Default)]
pub struct CleanupStack {
    actions: Vec<CleanupAction>,
}

impl CleanupStack {
    pub fn new() -> CleanupStack {
        CleanupStack { actions: vec![] }
    }

    pub fn defer(&mut self, action: CleanupAction) {
        tracing::debug!(action = %action, "Cleanup registered");
        self.actions.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    ///runs every action in reverse registration order. A failure does not stop the rest; failures are returned
    pub async fn unwind<E: ContainerEngine + ?Sized>(&mut self, engine: &E) -> Vec<String> {
        let mut failures = vec![];
        while let Some(action) = self.actions.pop() {
            let result = match &action {
                CleanupAction::RemoveNetwork { network_id } => {
                    network_controller::remove_network(engine, network_id).await
                }
                CleanupAction::RemoveContainer(container) => container.delete_container(engine).await,
                CleanupAction::RemoveImage { reference } => image_controller::remove_image(engine, reference).await,
            };
            match result {
                Ok(_) => tracing::info!(action = %action, "Cleanup done"),
                Err(err) => {
                    tracing::warn!(action = %action, error = %err, "Cleanup failed");
                    failures.push(format!("{}: {}", action, err));
                }
            }
        }
        failures
    }
}
