use std::{collections::HashMap, io::Write};

use uuid::Uuid;

use crate::{
    controllers::{
        cleanup_controller::{CleanupAction, CleanupStack},
        container_controller, image_controller, network_controller,
    },
    models::{
        container_models::{ContainerRole, ContainerSpec, LinkContainer, WaitOutcome},
        error_models::{LinkError, Result},
        link_report_models::LinkReport,
        network_models::NetworkSpec,
    },
    utils::{config_utils::LinkConfig, docker_utils::ContainerEngine},
};

/// Label put on every network and container of a run.
pub const RUN_LABEL: &str = "docker_link.run";

/// Pulls both images, links a server and a client container over a user-defined network,
/// prints the client's output and tears down.
///
/// This is the only error boundary of the flow: whichever step fails, the registered cleanups
/// are unwound in reverse before the error is returned. Pull failures happen before anything
/// is registered.
pub async fn run_link<E, O, R>(engine: &E, config: &LinkConfig, out: &mut O, err: &mut R) -> Result<LinkReport>
where
    E: ContainerEngine + ?Sized,
    O: Write,
    R: Write,
{
    let run_id = Uuid::new_v4();
    tracing::info!(run_id = %run_id, network = %config.network_name, target = %config.server_url(), "Starting link run");

    let images = [&config.client_image, &config.server_image];
    for image in images {
        image_controller::pull_image(engine, image, out).await?;
    }

    let mut cleanup = CleanupStack::new();
    if config.remove_images {
        let mut references: Vec<String> = images.iter().map(|image| image.pull_reference()).collect();
        references.dedup();
        for reference in references {
            cleanup.defer(CleanupAction::RemoveImage { reference });
        }
    }

    let result = link_containers(engine, config, run_id, &mut cleanup, out, err).await;
    let cleanup_failures = cleanup.unwind(engine).await;

    match result {
        Ok(mut report) => {
            report.cleanup_failures = cleanup_failures;
            tracing::info!(
                run_id = %run_id,
                exit_code = report.client_exit_code,
                clean = report.is_clean(),
                "Link run finished"
            );
            Ok(report)
        }
        Err(error) => {
            tracing::debug!(step = error.step(), cleanup_failures = cleanup_failures.len(), "Link run unwound");
            Err(error)
        }
    }
}

async fn link_containers<E, O, R>(
    engine: &E,
    config: &LinkConfig,
    run_id: Uuid,
    cleanup: &mut CleanupStack,
    out: &mut O,
    err: &mut R,
) -> Result<LinkReport>
where
    E: ContainerEngine + ?Sized,
    O: Write,
    R: Write,
{
    let labels = HashMap::from([(RUN_LABEL.to_string(), run_id.to_string())]);

    let network = network_controller::create_network(engine, &NetworkSpec::new(&config.network_name, labels.clone())).await?;
    cleanup.defer(CleanupAction::RemoveNetwork {
        network_id: network.id.clone(),
    });

    let server = launch_container(
        engine,
        cleanup,
        config.remove_containers,
        ContainerSpec {
            role: ContainerRole::Server,
            image: config.server_image.clone(),
            cmd: None,
            network_id: network.id.clone(),
            aliases: Some(vec![config.server_alias.clone()]),
            labels: labels.clone(),
        },
    )
    .await?;

    let client = launch_container(
        engine,
        cleanup,
        config.remove_containers,
        ContainerSpec {
            role: ContainerRole::Client,
            image: config.client_image.clone(),
            cmd: Some(config.client_command()),
            network_id: network.id.clone(),
            aliases: None,
            labels,
        },
    )
    .await?;

    let client_exit_code = match container_controller::wait_for_exit(engine, &client).await {
        WaitOutcome::Exited(code) => code,
        WaitOutcome::DeliveryError(reason) => {
            return Err(LinkError::Wait {
                container_id: client.container_id.clone(),
                reason,
            })
        }
    };
    tracing::info!(container_id = %client.container_id, exit_code = client_exit_code, "Client exited");

    container_controller::fetch_logs(engine, &client, out, err).await?;

    // a failed stop is reported, the network removal still runs after it
    let server_stop_error = match server.stop_container(engine, config.stop_grace_seconds).await {
        Ok(_) => {
            tracing::info!(container_id = %server.container_id, grace_seconds = config.stop_grace_seconds, "Server stopped");
            None
        }
        Err(stop_err) => {
            tracing::warn!(container_id = %server.container_id, error = %stop_err, "Server stop failed");
            Some(stop_err.to_string())
        }
    };

    Ok(LinkReport {
        run_id,
        network_id: network.id,
        server_container_id: server.container_id,
        client_container_id: client.container_id,
        client_exit_code,
        server_stop_error,
        cleanup_failures: vec![],
    })
}

async fn launch_container<E: ContainerEngine + ?Sized>(
    engine: &E,
    cleanup: &mut CleanupStack,
    remove_on_exit: bool,
    spec: ContainerSpec,
) -> Result<LinkContainer> {
    let container = container_controller::create_container(engine, &spec).await?;
    if remove_on_exit {
        cleanup.defer(CleanupAction::RemoveContainer(container.clone()));
    }
    container.start_container(engine).await?;
    Ok(container)
}
