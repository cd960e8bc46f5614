use async_trait::async_trait;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

use crate::docker::{restarted_text, started_text, stopped_text, ContainerBackend};
use crate::types::{AppError, ContainerRef, ContainerSummary, Result};

/// Backend that shells out to the `docker` executable.
///
/// Arguments are passed as separate argv entries, never through a shell, and
/// container names only arrive here as validated `ContainerRef`s.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
}

impl DockerCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    async fn run(&self, args: &[&str], target: Option<&ContainerRef>) -> Result<Output> {
        debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::BackendUnavailable(format!("{}: {}", self.program, e)))?;

        if output.status.success() {
            return Ok(output);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(classify_failure(&stderr, target))
    }

    async fn lifecycle(&self, verb: &str, target: &ContainerRef) -> Result<()> {
        self.run(&[verb, "--", target.as_str()], Some(target)).await.map(|_| ())
    }
}

fn classify_failure(stderr: &str, target: Option<&ContainerRef>) -> AppError {
    match target {
        Some(name) if stderr.contains("No such container") => {
            AppError::ContainerNotFound(name.to_string())
        }
        _ if stderr.contains("Cannot connect to the Docker daemon") => {
            AppError::BackendUnavailable(stderr.to_string())
        }
        _ => AppError::Backend(stderr.to_string()),
    }
}

/// Parses `docker ps --format '{{.Names}}\t{{.State}}'` output.
fn parse_ps(stdout: &str) -> Vec<ContainerSummary> {
    let mut summaries: Vec<ContainerSummary> = stdout
        .lines()
        .filter_map(|line| {
            let (name, state) = line.split_once('\t')?;
            // Linked containers list several comma-separated names; the first is canonical.
            let name = name.split(',').next()?.trim();
            let name = ContainerRef::parse(name).ok()?;
            Some(ContainerSummary { name, status: state.trim().to_string() })
        })
        .collect();

    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}

#[async_trait]
impl ContainerBackend for DockerCli {
    async fn list(&self) -> Result<Vec<ContainerSummary>> {
        let output = self
            .run(&["ps", "--all", "--format", "{{.Names}}\t{{.State}}"], None)
            .await?;
        Ok(parse_ps(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn start(&self, target: &ContainerRef) -> Result<String> {
        self.lifecycle("start", target).await?;
        Ok(started_text(target))
    }

    async fn stop(&self, target: &ContainerRef) -> Result<String> {
        self.lifecycle("stop", target).await?;
        Ok(stopped_text(target))
    }

    async fn restart(&self, target: &ContainerRef) -> Result<String> {
        self.lifecycle("restart", target).await?;
        Ok(restarted_text(target))
    }

    async fn raw_logs(&self, target: &ContainerRef) -> Result<String> {
        let output = self.run(&["logs", "--", target.as_str()], Some(target)).await?;
        // The CLI splits the two streams, so stderr lines land after stdout lines.
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_sorts_ps_output() {
        let out = "web\trunning\ndb\texited\nbad name\trunning\nproxy,web/alias\tpaused\n";
        let names: Vec<(String, String)> = parse_ps(out)
            .into_iter()
            .map(|s| (s.name.to_string(), s.status))
            .collect();
        assert_eq!(
            names,
            vec![
                ("db".to_string(), "exited".to_string()),
                ("proxy".to_string(), "paused".to_string()),
                ("web".to_string(), "running".to_string()),
            ]
        );
    }

    #[test]
    fn classifies_cli_failures() {
        let web = ContainerRef::parse("web").unwrap();
        assert!(matches!(
            classify_failure("Error response from daemon: No such container: web", Some(&web)),
            AppError::ContainerNotFound(_)
        ));
        assert!(matches!(
            classify_failure("Cannot connect to the Docker daemon at unix:///var/run/docker.sock", None),
            AppError::BackendUnavailable(_)
        ));
        assert!(matches!(classify_failure("boom", Some(&web)), AppError::Backend(d) if d == "boom"));
    }

    #[tokio::test]
    async fn missing_executable_is_unavailable() {
        let cli = DockerCli::new("/nonexistent/dockbot-test-docker");
        assert!(matches!(cli.list().await, Err(AppError::BackendUnavailable(_))));
    }
}
