pub mod cli;
pub mod client;
pub mod containers;
pub mod logs;

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::types::{AppError, ContainerRef, ContainerSummary, Result};

/// The container runtime as the bot sees it.
#[async_trait]
pub trait ContainerBackend: Send + Sync {
    /// All containers, running or not, sorted by name.
    async fn list(&self) -> Result<Vec<ContainerSummary>>;

    async fn start(&self, target: &ContainerRef) -> Result<String>;

    async fn stop(&self, target: &ContainerRef) -> Result<String>;

    async fn restart(&self, target: &ContainerRef) -> Result<String>;

    /// Whole log buffer, stdout and stderr, lossily decoded as UTF-8.
    async fn raw_logs(&self, target: &ContainerRef) -> Result<String>;
}

pub(crate) fn started_text(target: &ContainerRef) -> String {
    format!("▶️ Container {} started", target)
}

pub(crate) fn stopped_text(target: &ContainerRef) -> String {
    format!("🛑 Container {} stopped", target)
}

pub(crate) fn restarted_text(target: &ContainerRef) -> String {
    format!("🔄 Container {} restarted", target)
}

/// Bounds every call of the wrapped backend with a deadline.
pub struct TimedBackend<B> {
    inner: B,
    action_timeout: Duration,
    logs_timeout: Duration,
}

impl<B: ContainerBackend> TimedBackend<B> {
    pub fn new(inner: B, action_timeout: Duration, logs_timeout: Duration) -> Self {
        Self { inner, action_timeout, logs_timeout }
    }
}

async fn bounded<T>(limit: Duration, call: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(AppError::BackendTimeout(limit)))
}

#[async_trait]
impl<B: ContainerBackend> ContainerBackend for TimedBackend<B> {
    async fn list(&self) -> Result<Vec<ContainerSummary>> {
        bounded(self.action_timeout, self.inner.list()).await
    }

    async fn start(&self, target: &ContainerRef) -> Result<String> {
        bounded(self.action_timeout, self.inner.start(target)).await
    }

    async fn stop(&self, target: &ContainerRef) -> Result<String> {
        bounded(self.action_timeout, self.inner.stop(target)).await
    }

    async fn restart(&self, target: &ContainerRef) -> Result<String> {
        bounded(self.action_timeout, self.inner.restart(target)).await
    }

    async fn raw_logs(&self, target: &ContainerRef) -> Result<String> {
        bounded(self.logs_timeout, self.inner.raw_logs(target)).await
    }
}

#[async_trait]
impl<B: ContainerBackend + ?Sized> ContainerBackend for Box<B> {
    async fn list(&self) -> Result<Vec<ContainerSummary>> {
        (**self).list().await
    }

    async fn start(&self, target: &ContainerRef) -> Result<String> {
        (**self).start(target).await
    }

    async fn stop(&self, target: &ContainerRef) -> Result<String> {
        (**self).stop(target).await
    }

    async fn restart(&self, target: &ContainerRef) -> Result<String> {
        (**self).restart(target).await
    }

    async fn raw_logs(&self, target: &ContainerRef) -> Result<String> {
        (**self).raw_logs(target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sleepy;

    #[async_trait]
    impl ContainerBackend for Sleepy {
        async fn list(&self) -> Result<Vec<ContainerSummary>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        async fn start(&self, target: &ContainerRef) -> Result<String> {
            Ok(started_text(target))
        }

        async fn stop(&self, target: &ContainerRef) -> Result<String> {
            Ok(stopped_text(target))
        }

        async fn restart(&self, target: &ContainerRef) -> Result<String> {
            Ok(restarted_text(target))
        }

        async fn raw_logs(&self, _target: &ContainerRef) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_calls_fail_with_timeout() {
        let backend = TimedBackend::new(Sleepy, Duration::from_secs(10), Duration::from_secs(30));

        match backend.list().await {
            Err(AppError::BackendTimeout(limit)) => assert_eq!(limit, Duration::from_secs(10)),
            other => panic!("expected timeout, got {:?}", other),
        }

        let web = ContainerRef::parse("web").unwrap();
        match backend.raw_logs(&web).await {
            Err(AppError::BackendTimeout(limit)) => assert_eq!(limit, Duration::from_secs(30)),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fast_calls_pass_through() {
        let backend = TimedBackend::new(Sleepy, Duration::from_secs(10), Duration::from_secs(30));
        let web = ContainerRef::parse("web").unwrap();
        assert_eq!(backend.stop(&web).await.unwrap(), "🛑 Container web stopped");
    }
}
