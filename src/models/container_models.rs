use std::{collections::HashMap, fmt::Display};

use bollard::{
    container::{Config, NetworkingConfig},
    errors::Error,
    models::EndpointSettings,
};

use crate::utils::docker_utils::ContainerEngine;

use super::{
    error_models::{LinkError, Result},
    image_models::ImageReference,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRole {
    Server,
    Client,
}

impl Display for ContainerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
        }
    }
}

/// What to create: image, optional command override and the network attachment.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub role: ContainerRole,
    pub image: ImageReference,
    ///None keeps the image's own entrypoint/command
    pub cmd: Option<Vec<String>>,
    pub network_id: String,
    ///DNS names the engine resolver maps to this container on `network_id`
    pub aliases: Option<Vec<String>>,
    pub labels: HashMap<String, String>,
}

impl ContainerSpec {
    pub fn to_config(&self) -> Config<String> {
        let endpoint = EndpointSettings {
            network_id: Some(self.network_id.clone()),
            aliases: self.aliases.clone(),
            ..Default::default()
        };
        let mut endpoints_config = HashMap::new();
        endpoints_config.insert(self.network_id.clone(), endpoint);

        Config {
            image: Some(self.image.pull_reference()),
            cmd: self.cmd.clone(),
            tty: Some(false),
            labels: Some(self.labels.clone()),
            networking_config: Some(NetworkingConfig { endpoints_config }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkContainer {
    ///Docker container id
    pub container_id: String,
    pub role: ContainerRole,
    pub image: String,
}

impl LinkContainer {
    pub async fn start_container<E: ContainerEngine + ?Sized>(&self, engine: &E) -> Result<()> {
        let start_result = engine.start_container(&self.container_id).await;
        match start_result {
            Ok(_) => {
                tracing::info!(role = %self.role, container_id = %self.container_id, "Container started");
                Ok(())
            }
            Err(err) => Err(LinkError::ContainerStart {
                role: self.role.to_string(),
                container_id: self.container_id.clone(),
                reason: err.to_string(),
            }),
        }
    }

    ///stop with `grace_seconds` before the engine kills it. The error is handed back, not logged
    pub async fn stop_container<E: ContainerEngine + ?Sized>(
        &self,
        engine: &E,
        grace_seconds: i64,
    ) -> std::result::Result<(), Error> {
        engine.stop_container(&self.container_id, grace_seconds).await
    }

    pub async fn delete_container<E: ContainerEngine + ?Sized>(&self, engine: &E) -> std::result::Result<(), Error> {
        engine.remove_container(&self.container_id).await
    }
}

/// How a wait on a container resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Exited(i64),
    ///the wait channel itself failed
    DeliveryError(String),
}
