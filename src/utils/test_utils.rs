//! In-memory `ContainerEngine` that records every call and fails on demand.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use bollard::{
    container::{Config, LogOutput, LogsOptions},
    errors::Error as DockerError,
    models::{ContainerCreateResponse, ContainerWaitResponse, CreateImageInfo, NetworkCreateResponse},
    network::CreateNetworkOptions,
};
use futures::StreamExt;

use super::docker_utils::{ContainerEngine, LogStream, PullStream, WaitStream};

#[derive(Debug, Clone)]
pub enum WaitScript {
    Status(i64),
    /// non-zero exit reported the way bollard does it
    ExitError(i64),
    Delivery,
    Closed,
}

struct Inner {
    calls: Vec<String>,
    failing: HashSet<String>,
    pull_frames: Vec<CreateImageInfo>,
    pull_error: Option<DockerError>,
    wait: WaitScript,
    logs: Vec<LogOutput>,
    next_container: usize,
    network_id: Option<String>,
    network_options: Vec<CreateNetworkOptions<String>>,
    container_configs: Vec<Config<String>>,
    log_options: Vec<LogsOptions<String>>,
    stop_graces: Vec<i64>,
}

#[derive(Clone)]
pub struct RecordingEngine {
    inner: Arc<Mutex<Inner>>,
}

impl Default for RecordingEngine {
    fn default() -> Self {
        RecordingEngine {
            inner: Arc::new(Mutex::new(Inner {
                calls: vec![],
                failing: HashSet::new(),
                pull_frames: vec![
                    CreateImageInfo {
                        status: Some("Pulling from library".to_string()),
                        ..Default::default()
                    },
                    CreateImageInfo {
                        status: Some("Status: Image is up to date".to_string()),
                        ..Default::default()
                    },
                ],
                pull_error: None,
                wait: WaitScript::Status(0),
                logs: vec![],
                next_container: 0,
                network_id: Some("network-1".to_string()),
                network_options: vec![],
                container_configs: vec![],
                log_options: vec![],
                stop_graces: vec![],
            })),
        }
    }
}

fn scripted_error() -> DockerError {
    DockerError::DockerResponseServerError {
        status_code: 500,
        message: "scripted failure".to_string(),
    }
}

impl RecordingEngine {
    /// `operation` alone fails every call of that kind, `operation:target` only the one target.
    pub fn fail_on(self, operation: &str) -> Self {
        self.inner.lock().unwrap().failing.insert(operation.to_string());
        self
    }

    pub fn with_wait(self, wait: WaitScript) -> Self {
        self.inner.lock().unwrap().wait = wait;
        self
    }

    pub fn with_logs(self, logs: Vec<LogOutput>) -> Self {
        self.inner.lock().unwrap().logs = logs;
        self
    }

    /// The next pull yields only `error`, before any progress.
    pub fn with_pull_error(self, error: DockerError) -> Self {
        self.inner.lock().unwrap().pull_error = Some(error);
        self
    }

    pub fn without_network_id(self) -> Self {
        self.inner.lock().unwrap().network_id = None;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn calls_of(&self, operation: &str) -> Vec<String> {
        let prefix = format!("{}:", operation);
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(&prefix))
            .collect()
    }

    pub fn network_options(&self) -> Vec<CreateNetworkOptions<String>> {
        self.inner.lock().unwrap().network_options.clone()
    }

    pub fn container_configs(&self) -> Vec<Config<String>> {
        self.inner.lock().unwrap().container_configs.clone()
    }

    pub fn log_options(&self) -> Vec<LogsOptions<String>> {
        self.inner.lock().unwrap().log_options.clone()
    }

    pub fn stop_graces(&self) -> Vec<i64> {
        self.inner.lock().unwrap().stop_graces.clone()
    }

    /// Records the call and reports whether it was scripted to fail.
    fn record(&self, operation: &str, target: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("{}:{}", operation, target));
        inner.failing.contains(operation) || inner.failing.contains(&format!("{}:{}", operation, target))
    }
}

#[async_trait]
impl ContainerEngine for RecordingEngine {
    fn pull_stream(&self, image: &str) -> PullStream {
        let fails = self.record("pull", image);
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.pull_error.take() {
            return futures::stream::iter(vec![Err(error)]).boxed();
        }
        let mut frames: Vec<Result<CreateImageInfo, DockerError>> =
            inner.pull_frames.iter().cloned().map(Ok).collect();
        if fails {
            frames.truncate(1);
            frames.push(Err(DockerError::DockerStreamError {
                error: format!("pull access denied for {}", image),
            }));
        }
        futures::stream::iter(frames).boxed()
    }

    async fn remove_image(&self, image: &str) -> Result<(), DockerError> {
        if self.record("remove_image", image) {
            return Err(scripted_error());
        }
        Ok(())
    }

    async fn create_network(
        &self,
        options: CreateNetworkOptions<String>,
    ) -> Result<NetworkCreateResponse, DockerError> {
        let fails = self.record("create_network", &options.name);
        let mut inner = self.inner.lock().unwrap();
        inner.network_options.push(options);
        if fails {
            return Err(scripted_error());
        }
        Ok(NetworkCreateResponse {
            id: inner.network_id.clone(),
            warning: None,
        })
    }

    async fn remove_network(&self, network_id: &str) -> Result<(), DockerError> {
        if self.record("remove_network", network_id) {
            return Err(scripted_error());
        }
        Ok(())
    }

    async fn create_container(&self, config: Config<String>) -> Result<ContainerCreateResponse, DockerError> {
        let id = {
            let mut inner = self.inner.lock().unwrap();
            inner.next_container += 1;
            inner.container_configs.push(config);
            format!("container-{}", inner.next_container)
        };
        if self.record("create_container", &id) {
            return Err(scripted_error());
        }
        Ok(ContainerCreateResponse { id, warnings: vec![] })
    }

    async fn start_container(&self, container_id: &str) -> Result<(), DockerError> {
        if self.record("start_container", container_id) {
            return Err(scripted_error());
        }
        Ok(())
    }

    fn wait_stream(&self, container_id: &str, condition: &str) -> WaitStream {
        self.record("wait", &format!("{}:{}", container_id, condition));
        let script = self.inner.lock().unwrap().wait.clone();
        let items: Vec<Result<ContainerWaitResponse, DockerError>> = match script {
            WaitScript::Status(code) => vec![Ok(ContainerWaitResponse {
                status_code: code,
                error: None,
            })],
            WaitScript::ExitError(code) => vec![Err(DockerError::DockerContainerWaitError {
                error: String::new(),
                code,
            })],
            WaitScript::Delivery => vec![Err(DockerError::IOError {
                err: std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
            })],
            WaitScript::Closed => vec![],
        };
        futures::stream::iter(items).boxed()
    }

    fn logs_stream(&self, container_id: &str, options: LogsOptions<String>) -> LogStream {
        let fails = self.record("logs", container_id);
        let mut inner = self.inner.lock().unwrap();
        inner.log_options.push(options);
        let mut items: Vec<Result<LogOutput, DockerError>> = inner.logs.iter().cloned().map(Ok).collect();
        if fails {
            items.push(Err(scripted_error()));
        }
        futures::stream::iter(items).boxed()
    }

    async fn stop_container(&self, container_id: &str, grace_seconds: i64) -> Result<(), DockerError> {
        let fails = self.record("stop_container", container_id);
        self.inner.lock().unwrap().stop_graces.push(grace_seconds);
        if fails {
            return Err(scripted_error());
        }
        Ok(())
    }

    async fn remove_container(&self, container_id: &str) -> Result<(), DockerError> {
        if self.record("remove_container", container_id) {
            return Err(scripted_error());
        }
        Ok(())
    }
}
