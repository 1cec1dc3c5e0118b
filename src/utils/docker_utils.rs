use std::pin::Pin;

use async_trait::async_trait;
use bollard::{
	container::{
		Config, CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
		StartContainerOptions, StopContainerOptions, WaitContainerOptions,
	},
	errors::Error as DockerError,
	image::{CreateImageOptions, RemoveImageOptions},
	models::{ContainerCreateResponse, ContainerWaitResponse, CreateImageInfo, NetworkCreateResponse},
	network::CreateNetworkOptions,
	Docker,
};
use futures::Stream;

use crate::models::error_models::{LinkError, Result};

pub type PullStream = Pin<Box<dyn Stream<Item = std::result::Result<CreateImageInfo, DockerError>> + Send>>;
pub type WaitStream = Pin<Box<dyn Stream<Item = std::result::Result<ContainerWaitResponse, DockerError>> + Send>>;
pub type LogStream = Pin<Box<dyn Stream<Item = std::result::Result<LogOutput, DockerError>> + Send>>;

/// The engine operations the link flow depends on.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
	/// Progress stream of an image pull; exhausted once the image is local.
	fn pull_stream(&self, image: &str) -> PullStream;
	async fn remove_image(&self, image: &str) -> std::result::Result<(), DockerError>;
	async fn create_network(
		&self,
		options: CreateNetworkOptions<String>,
	) -> std::result::Result<NetworkCreateResponse, DockerError>;
	async fn remove_network(&self, network_id: &str) -> std::result::Result<(), DockerError>;
	async fn create_container(
		&self,
		config: Config<String>,
	) -> std::result::Result<ContainerCreateResponse, DockerError>;
	async fn start_container(&self, container_id: &str) -> std::result::Result<(), DockerError>;
	/// Yields once the container reaches `condition`.
	fn wait_stream(&self, container_id: &str, condition: &str) -> WaitStream;
	fn logs_stream(&self, container_id: &str, options: LogsOptions<String>) -> LogStream;
	async fn stop_container(
		&self,
		container_id: &str,
		grace_seconds: i64,
	) -> std::result::Result<(), DockerError>;
	async fn remove_container(&self, container_id: &str) -> std::result::Result<(), DockerError>;
}

/// bollard backed engine
#[derive(Clone)]
pub struct DockerEngine {
	docker: Docker,
}

impl DockerEngine {
	pub fn new(docker: Docker) -> DockerEngine {
		DockerEngine { docker }
	}

	pub fn docker(&self) -> &Docker {
		&self.docker
	}
}

///connects through DOCKER_HOST (or the local socket) and downgrades the api version to what the daemon speaks
pub async fn connect() -> Result<DockerEngine> {
	let docker = Docker::connect_with_defaults().map_err(|err| LinkError::Connect {
		reason: err.to_string(),
	})?;
	let docker = docker.negotiate_version().await.map_err(|err| LinkError::Connect {
		reason: err.to_string(),
	})?;
	tracing::debug!(api_version = %docker.client_version(), "Engine connected");
	Ok(DockerEngine::new(docker))
}

#[async_trait]
impl ContainerEngine for DockerEngine {
	fn pull_stream(&self, image: &str) -> PullStream {
		let options = CreateImageOptions {
			from_image: image.to_string(),
			..Default::default()
		};
		Box::pin(self.docker.create_image(Some(options), None, None))
	}

	async fn remove_image(&self, image: &str) -> std::result::Result<(), DockerError> {
		self.docker
			.remove_image(image, None::<RemoveImageOptions>, None)
			.await
			.map(|_| ())
	}

	async fn create_network(
		&self,
		options: CreateNetworkOptions<String>,
	) -> std::result::Result<NetworkCreateResponse, DockerError> {
		self.docker.create_network(options).await
	}

	async fn remove_network(&self, network_id: &str) -> std::result::Result<(), DockerError> {
		self.docker.remove_network(network_id).await
	}

	async fn create_container(
		&self,
		config: Config<String>,
	) -> std::result::Result<ContainerCreateResponse, DockerError> {
		self.docker
			.create_container(None::<CreateContainerOptions<String>>, config)
			.await
	}

	async fn start_container(&self, container_id: &str) -> std::result::Result<(), DockerError> {
		self.docker
			.start_container(container_id, None::<StartContainerOptions<String>>)
			.await
	}

	fn wait_stream(&self, container_id: &str, condition: &str) -> WaitStream {
		let options = WaitContainerOptions {
			condition: condition.to_string(),
		};
		Box::pin(self.docker.wait_container(container_id, Some(options)))
	}

	fn logs_stream(&self, container_id: &str, options: LogsOptions<String>) -> LogStream {
		Box::pin(self.docker.logs(container_id, Some(options)))
	}

	async fn stop_container(
		&self,
		container_id: &str,
		grace_seconds: i64,
	) -> std::result::Result<(), DockerError> {
		self.docker
			.stop_container(container_id, Some(StopContainerOptions { t: grace_seconds }))
			.await
	}

	async fn remove_container(&self, container_id: &str) -> std::result::Result<(), DockerError> {
		let remove_container_options = RemoveContainerOptions {
			force: true,
			..Default::default()
		};
		self.docker
			.remove_container(container_id, Some(remove_container_options))
			.await
	}
}
