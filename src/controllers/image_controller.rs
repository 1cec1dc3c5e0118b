use std::io::Write;

use bollard::errors::Error;
use futures::StreamExt;

use crate::{
    models::{
        error_models::{LinkError, Result},
        image_models::ImageReference,
    },
    utils::docker_utils::ContainerEngine,
};

///pulls `image` and copies every progress record to `out` as one JSON line until the stream is exhausted
pub async fn pull_image<E, W>(engine: &E, image: &ImageReference, out: &mut W) -> Result<()>
where
    E: ContainerEngine + ?Sized,
    W: Write,
{
    let reference = image.pull_reference();
    tracing::info!(image = %reference, "Pulling image");

    let mut stream = engine.pull_stream(&reference);
    while let Some(progress) = stream.next().await {
        match progress {
            Ok(info) => {
                serde_json::to_writer(&mut *out, &info).map_err(std::io::Error::from)?;
                writeln!(out)?;
            }
            // bollard lifts an error record of the stream into this variant; its Display drops the text
            Err(Error::DockerStreamError { error }) => {
                return Err(LinkError::ImagePull {
                    image: reference,
                    reason: error,
                })
            }
            Err(err) => {
                return Err(LinkError::ImagePull {
                    image: reference,
                    reason: err.to_string(),
                })
            }
        }
    }
    out.flush()?;

    tracing::info!(image = %reference, "Image pulled");
    Ok(())
}

pub async fn remove_image<E: ContainerEngine + ?Sized>(engine: &E, reference: &str) -> std::result::Result<(), Error> {
    engine.remove_image(reference).await
}
