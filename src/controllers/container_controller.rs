use std::io::Write;

use bollard::{
    container::{LogOutput, LogsOptions},
    errors::Error,
};
use futures::StreamExt;

use crate::{
    models::{
        container_models::{ContainerSpec, LinkContainer, WaitOutcome},
        error_models::{LinkError, Result},
    },
    utils::docker_utils::ContainerEngine,
};

pub const WAIT_CONDITION_NOT_RUNNING: &str = "not-running";

pub async fn create_container<E: ContainerEngine + ?Sized>(engine: &E, spec: &ContainerSpec) -> Result<LinkContainer> {
    let create_container_result = engine.create_container(spec.to_config()).await;
    match create_container_result {
        Ok(res) => {
            for warning in res.warnings.iter() {
                tracing::warn!(role = %spec.role, warning = %warning, "Engine warning on container create");
            }
            tracing::info!(role = %spec.role, container_id = %res.id, image = %spec.image, "Container created");
            Ok(LinkContainer {
                container_id: res.id,
                role: spec.role,
                image: spec.image.pull_reference(),
            })
        }
        Err(err) => Err(LinkError::ContainerCreate {
            role: spec.role.to_string(),
            reason: err.to_string(),
        }),
    }
}

///blocks until the engine reports the container left the running state. There is no timeout.
pub async fn wait_for_exit<E: ContainerEngine + ?Sized>(engine: &E, container: &LinkContainer) -> WaitOutcome {
    let mut stream = engine.wait_stream(&container.container_id, WAIT_CONDITION_NOT_RUNNING);
    let outcome = match stream.next().await {
        Some(Ok(response)) => WaitOutcome::Exited(response.status_code),
        // bollard turns a non-zero exit status into an error, it is still an exit
        Some(Err(Error::DockerContainerWaitError { code, .. })) => WaitOutcome::Exited(code),
        Some(Err(err)) => WaitOutcome::DeliveryError(err.to_string()),
        None => WaitOutcome::DeliveryError("wait stream closed before an exit status arrived".to_string()),
    };
    tracing::debug!(container_id = %container.container_id, outcome = ?outcome, "Wait resolved");
    outcome
}

/// Fetches the combined logs and splits them: stdout and console frames to `out`, stderr frames to `err`.
pub async fn fetch_logs<E, O, R>(engine: &E, container: &LinkContainer, out: &mut O, err: &mut R) -> Result<()>
where
    E: ContainerEngine + ?Sized,
    O: Write,
    R: Write,
{
    let options = LogsOptions::<String> {
        stdout: true,
        stderr: true,
        follow: false,
        tail: "all".to_string(),
        ..Default::default()
    };
    let mut stream = engine.logs_stream(&container.container_id, options);
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(LogOutput::StdOut { message }) | Ok(LogOutput::Console { message }) => out.write_all(&message)?,
            Ok(LogOutput::StdErr { message }) => err.write_all(&message)?,
            Ok(LogOutput::StdIn { .. }) => {}
            Err(log_err) => {
                return Err(LinkError::Logs {
                    container_id: container.container_id.clone(),
                    reason: log_err.to_string(),
                })
            }
        }
    }
    out.flush()?;
    err.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bytes::Bytes;

    use super::*;
    use crate::{
        models::{container_models::ContainerRole, image_models::ImageReference},
        utils::test_utils::{RecordingEngine, WaitScript},
    };

    fn client() -> LinkContainer {
        LinkContainer {
            container_id: "container-2".to_string(),
            role: ContainerRole::Client,
            image: "curlimages/curl:latest".to_string(),
        }
    }

    #[tokio::test]
    async fn create_returns_engine_id() {
        let engine = RecordingEngine::default();
        let spec = ContainerSpec {
            role: ContainerRole::Server,
            image: ImageReference::parse("mccutchen/go-httpbin").unwrap(),
            cmd: None,
            network_id: "network-1".to_string(),
            aliases: Some(vec!["httpbin".to_string()]),
            labels: HashMap::new(),
        };
        let container = create_container(&engine, &spec).await.unwrap();
        assert_eq!(container.container_id, "container-1");
        assert_eq!(container.role, ContainerRole::Server);
        assert_eq!(container.image, "mccutchen/go-httpbin:latest");

        let failing = RecordingEngine::default().fail_on("create_container");
        let err = create_container(&failing, &spec).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to create server container: Docker responded with status code 500: scripted failure");
    }

    #[tokio::test]
    async fn wait_resolves_to_tagged_outcome() {
        let cases = [
            (WaitScript::Status(0), WaitOutcome::Exited(0)),
            (WaitScript::ExitError(7), WaitOutcome::Exited(7)),
        ];
        for (script, expected) in cases {
            let engine = RecordingEngine::default().with_wait(script);
            assert_eq!(wait_for_exit(&engine, &client()).await, expected);
        }

        let delivery = RecordingEngine::default().with_wait(WaitScript::Delivery);
        assert!(matches!(wait_for_exit(&delivery, &client()).await, WaitOutcome::DeliveryError(_)));

        let closed = RecordingEngine::default().with_wait(WaitScript::Closed);
        assert!(matches!(wait_for_exit(&closed, &client()).await, WaitOutcome::DeliveryError(_)));
        assert_eq!(closed.calls(), vec!["wait:container-2:not-running".to_string()]);
    }

    #[tokio::test]
    async fn logs_are_demultiplexed() {
        let engine = RecordingEngine::default().with_logs(vec![
            LogOutput::StdErr { message: Bytes::from_static(b"  % Total\n") },
            LogOutput::StdOut { message: Bytes::from_static(b"{\"args\":{\"foo\":\"bar\"}}\n") },
            LogOutput::StdIn { message: Bytes::from_static(b"ignored") },
        ]);
        let mut out = Vec::new();
        let mut err = Vec::new();

        fetch_logs(&engine, &client(), &mut out, &mut err).await.unwrap();

        assert_eq!(out, b"{\"args\":{\"foo\":\"bar\"}}\n");
        assert_eq!(err, b"  % Total\n");
        let options = engine.log_options();
        assert!(options[0].stdout && options[0].stderr);
        assert!(!options[0].follow);
        assert_eq!(options[0].tail, "all");
    }

    #[tokio::test]
    async fn log_stream_error_is_fatal() {
        let engine = RecordingEngine::default().fail_on("logs");
        let mut out = Vec::new();
        let mut err = Vec::new();
        match fetch_logs(&engine, &client(), &mut out, &mut err).await {
            Err(LinkError::Logs { container_id, .. }) => assert_eq!(container_id, "container-2"),
            other => panic!("expected Logs error, got {:?}", other),
        }
    }
}
