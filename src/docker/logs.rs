use crate::docker::client::{classify, DockerClient};
use crate::types::{ContainerRef, Result};
use bollard::container::LogsOptions;
use futures::TryStreamExt;

/// Everything the daemon still holds for the container, stdout and stderr interleaved.
pub async fn fetch_raw_logs(client: &DockerClient, target: &ContainerRef) -> Result<String> {
    let options = LogsOptions::<String> {
        stdout: true,
        stderr: true,
        follow: false,
        tail: "all".to_string(),
        timestamps: false,
        ..Default::default()
    };

    let bytes = client
        .inner
        .logs(target.as_str(), Some(options))
        .try_fold(Vec::new(), |mut buf, chunk| async move {
            buf.extend_from_slice(&chunk.into_bytes());
            Ok(buf)
        })
        .await
        .map_err(|e| classify(e, Some(target.as_str())))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
