use bollard::Docker;
use crate::types::{Result, AppError};

/// Handle to the Docker Engine API. Cheap to clone; safe to share across tasks.
#[derive(Clone)]
pub struct DockerClient {
    pub(crate) inner: Docker,
}

impl DockerClient {
    pub fn new() -> Result<Self> {
        let inner = Docker::connect_with_local_defaults()
            .map_err(|e| AppError::BackendUnavailable(e.to_string()))?;
        Ok(Self { inner })
    }
}

/// Sort a bollard failure into the bot's error taxonomy.
pub(crate) fn classify(err: bollard::errors::Error, target: Option<&str>) -> AppError {
    use bollard::errors::Error;

    match err {
        Error::DockerResponseServerError { status_code: 404, message } => match target {
            Some(name) => AppError::ContainerNotFound(name.to_string()),
            None => AppError::Backend(message),
        },
        Error::DockerResponseServerError { status_code, message } => {
            AppError::Backend(format!("{} ({})", message, status_code))
        }
        Error::IOError { err } => AppError::BackendUnavailable(err.to_string()),
        err @ Error::HyperLegacyError { .. } => AppError::BackendUnavailable(err.to_string()),
        other => AppError::Backend(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::errors::Error;

    #[test]
    fn missing_container_is_not_found() {
        let err = Error::DockerResponseServerError {
            status_code: 404,
            message: "No such container: web".to_string(),
        };
        assert!(matches!(classify(err, Some("web")), AppError::ContainerNotFound(n) if n == "web"));
    }

    #[test]
    fn server_failure_keeps_detail() {
        let err = Error::DockerResponseServerError {
            status_code: 500,
            message: "driver failed".to_string(),
        };
        match classify(err, Some("web")) {
            AppError::Backend(detail) => assert_eq!(detail, "driver failed (500)"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn socket_failure_is_unavailable() {
        let err = Error::IOError {
            err: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(matches!(classify(err, None), AppError::BackendUnavailable(_)));
    }
}
