use async_trait::async_trait;
use bollard::container::{ListContainersOptions, RestartContainerOptions, StopContainerOptions};
use tracing::{debug, warn};

use crate::docker::client::{classify, DockerClient};
use crate::docker::logs::fetch_raw_logs;
use crate::docker::{restarted_text, started_text, stopped_text, ContainerBackend};
use crate::types::{ContainerRef, ContainerSummary, Result};

pub async fn list_containers(client: &DockerClient) -> Result<Vec<ContainerSummary>> {
    let options = ListContainersOptions::<String> {
        all: true,
        ..Default::default()
    };

    let containers = client
        .inner
        .list_containers(Some(options))
        .await
        .map_err(|e| classify(e, None))?;

    let mut summaries: Vec<ContainerSummary> = containers
        .into_iter()
        .filter_map(|c| {
            let name = c
                .names
                .as_ref()
                .and_then(|n| n.first())
                .map(|n| n.trim_start_matches('/').to_string())?;
            match ContainerRef::parse(&name) {
                Ok(name) => Some(ContainerSummary {
                    name,
                    status: c.state.unwrap_or_else(|| "unknown".to_string()),
                }),
                Err(e) => {
                    warn!("Skipping container: {}", e);
                    None
                }
            }
        })
        .collect();

    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(summaries)
}

pub async fn start_container(client: &DockerClient, target: &ContainerRef) -> Result<()> {
    match client.inner.start_container::<String>(target.as_str(), None).await {
        Ok(()) => Ok(()),
        Err(bollard::errors::Error::DockerResponseServerError { status_code: 304, .. }) => {
            debug!("Container {} was already running", target);
            Ok(())
        }
        Err(e) => Err(classify(e, Some(target.as_str()))),
    }
}

pub async fn stop_container(client: &DockerClient, target: &ContainerRef) -> Result<()> {
    match client.inner.stop_container(target.as_str(), None::<StopContainerOptions>).await {
        Ok(()) => Ok(()),
        Err(bollard::errors::Error::DockerResponseServerError { status_code: 304, .. }) => {
            debug!("Container {} was already stopped", target);
            Ok(())
        }
        Err(e) => Err(classify(e, Some(target.as_str()))),
    }
}

pub async fn restart_container(client: &DockerClient, target: &ContainerRef) -> Result<()> {
    client
        .inner
        .restart_container(target.as_str(), None::<RestartContainerOptions>)
        .await
        .map_err(|e| classify(e, Some(target.as_str())))
}

/// Backend that talks to the Docker Engine API directly.
#[async_trait]
impl ContainerBackend for DockerClient {
    async fn list(&self) -> Result<Vec<ContainerSummary>> {
        list_containers(self).await
    }

    async fn start(&self, target: &ContainerRef) -> Result<String> {
        start_container(self, target).await?;
        Ok(started_text(target))
    }

    async fn stop(&self, target: &ContainerRef) -> Result<String> {
        stop_container(self, target).await?;
        Ok(stopped_text(target))
    }

    async fn restart(&self, target: &ContainerRef) -> Result<String> {
        restart_container(self, target).await?;
        Ok(restarted_text(target))
    }

    async fn raw_logs(&self, target: &ContainerRef) -> Result<String> {
        fetch_raw_logs(self, target).await
    }
}
