use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bollard::container::{
    Config as ContainerConfig, CreateContainerOptions, RemoveContainerOptions,
    StopContainerOptions,
};
use bollard::models::{HostConfig, RestartPolicy, RestartPolicyNameEnum};
use bollard::Docker;

use crate::error::{OrchestratorError, Result};

/// Everything the runtime needs to run one worker container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub env: Vec<(String, String)>,
    pub labels: HashMap<String, String>,
    /// Host-side bundle directory, bind-mounted read-only at `/bundle`.
    pub bundle_dir: PathBuf,
}

/// Observed state of a container, reduced to what the reaper needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Exited,
}

/// Narrow port to the container runtime: create with labels, start, inspect,
/// stop, remove. Anything satisfying this contract can run the fleet; the
/// tests use an in-memory fake.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create and start the container; returns the runtime container id.
    async fn create_and_start(&self, spec: &ContainerSpec) -> Result<String>;

    /// SIGTERM with the given grace, then force-remove. A container that is
    /// already gone is a success.
    async fn stop_and_remove(&self, name: &str, grace: Duration) -> Result<()>;

    /// `None` when the container does not exist.
    async fn inspect(&self, name: &str) -> Result<Option<ContainerState>>;
}

// Worker resource caps: 128 MiB soft / 256 MiB hard, 0.25 CPU weight /
// 0.5 CPU hard, at most 50 pids.
const MEMORY_SOFT: i64 = 128 * 1024 * 1024;
const MEMORY_HARD: i64 = 256 * 1024 * 1024;
const CPU_SHARES: i64 = 256;
const NANO_CPUS: i64 = 500_000_000;
const PIDS_LIMIT: i64 = 50;

/// Docker adapter over the daemon socket.
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect honoring `DOCKER_HOST`, falling back to the local socket.
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_defaults()
            .map_err(|e| OrchestratorError::Internal(format!("docker connect failed: {e}")))?;
        Ok(Self { docker })
    }
}

fn is_not_found(err: &bollard::errors::Error) -> bool {
    matches!(
        err,
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn create_and_start(&self, spec: &ContainerSpec) -> Result<String> {
        let env: Vec<String> = spec
            .env
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        let labels: HashMap<String, String> = spec.labels.clone();

        let host_config = HostConfig {
            binds: Some(vec![format!(
                "{}:/bundle:ro",
                spec.bundle_dir.to_string_lossy()
            )]),
            memory: Some(MEMORY_HARD),
            memory_reservation: Some(MEMORY_SOFT),
            cpu_shares: Some(CPU_SHARES),
            nano_cpus: Some(NANO_CPUS),
            pids_limit: Some(PIDS_LIMIT),
            restart_policy: Some(RestartPolicy {
                name: Some(RestartPolicyNameEnum::UNLESS_STOPPED),
                maximum_retry_count: None,
            }),
            ..Default::default()
        };

        let config = ContainerConfig {
            image: Some(spec.image.clone()),
            env: Some(env),
            labels: Some(labels),
            host_config: Some(host_config),
            ..Default::default()
        };

        let created = self
            .docker
            .create_container(
                Some(CreateContainerOptions {
                    name: spec.name.as_str(),
                    platform: None,
                }),
                config,
            )
            .await
            .map_err(|e| OrchestratorError::ContainerLaunchFailed(e.to_string()))?;

        if let Err(e) = self
            .docker
            .start_container::<String>(&spec.name, None)
            .await
        {
            // A created-but-unstartable container must not linger.
            let _ = self
                .docker
                .remove_container(
                    &spec.name,
                    Some(RemoveContainerOptions {
                        force: true,
                        ..Default::default()
                    }),
                )
                .await;
            return Err(OrchestratorError::ContainerLaunchFailed(e.to_string()));
        }

        Ok(created.id)
    }

    async fn stop_and_remove(&self, name: &str, grace: Duration) -> Result<()> {
        match self
            .docker
            .stop_container(
                name,
                Some(StopContainerOptions {
                    t: grace.as_secs() as i64,
                }),
            )
            .await
        {
            Ok(()) => {}
            Err(e) if is_not_found(&e) => return Ok(()),
            Err(e) => {
                tracing::warn!(container = name, error = %e, "stop failed, forcing removal");
            }
        }

        match self
            .docker
            .remove_container(
                name,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(OrchestratorError::Internal(format!(
                "container remove failed: {e}"
            ))),
        }
    }

    async fn inspect(&self, name: &str) -> Result<Option<ContainerState>> {
        match self.docker.inspect_container(name, None).await {
            Ok(info) => {
                let running = info
                    .state
                    .as_ref()
                    .and_then(|s| s.running)
                    .unwrap_or(false);
                Ok(Some(if running {
                    ContainerState::Running
                } else {
                    ContainerState::Exited
                }))
            }
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(OrchestratorError::Internal(format!(
                "container inspect failed: {e}"
            ))),
        }
    }
}
