use bollard::errors::Error;

use crate::{
    models::{
        error_models::{LinkError, Result},
        network_models::{LinkNetwork, NetworkSpec},
    },
    utils::docker_utils::ContainerEngine,
};

pub async fn create_network<E: ContainerEngine + ?Sized>(engine: &E, spec: &NetworkSpec) -> Result<LinkNetwork> {
    let create_network_result = engine.create_network(spec.to_create_options()).await;
    match create_network_result {
        Ok(response) => {
            if let Some(warning) = response.warning.as_deref().filter(|w| !w.is_empty()) {
                tracing::warn!(network = %spec.name, warning = %warning, "Engine warning on network create");
            }
            match response.id {
                Some(id) if !id.is_empty() => {
                    tracing::info!(network = %spec.name, network_id = %id, "Network created");
                    Ok(LinkNetwork {
                        id,
                        name: spec.name.clone(),
                    })
                }
                _ => Err(LinkError::NetworkCreate {
                    name: spec.name.clone(),
                    reason: "engine returned no network id".to_string(),
                }),
            }
        }
        Err(err) => Err(LinkError::NetworkCreate {
            name: spec.name.clone(),
            reason: err.to_string(),
        }),
    }
}

pub async fn remove_network<E: ContainerEngine + ?Sized>(engine: &E, network_id: &str) -> std::result::Result<(), Error> {
    engine.remove_network(network_id).await
}
