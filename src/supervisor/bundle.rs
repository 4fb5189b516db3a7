use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{OrchestratorError, Result};
use crate::workers::WorkerConfig;

/// Materializes per-worker credential bundles on the host directory that is
/// bind-mounted into worker containers. Bundles hold decrypted material, so
/// they are owner-only on disk and wiped the moment the worker stops.
pub struct BundleManager {
    root: PathBuf,
}

impl BundleManager {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn dir_for(&self, container_name: &str) -> PathBuf {
        self.root.join(container_name)
    }

    /// Write `config.json` and `session.session` under a fresh directory for
    /// this worker. Any stale bundle with the same name is replaced.
    pub async fn materialize(
        &self,
        container_name: &str,
        config: &WorkerConfig,
        session_blob: &[u8],
    ) -> Result<PathBuf> {
        let dir = self.dir_for(container_name);
        if fs::try_exists(&dir).await.unwrap_or(false) {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| bundle_io_error("clear stale bundle", &dir, e))?;
        }
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| bundle_io_error("create bundle dir", &dir, e))?;
        set_mode(&dir, 0o700).await?;

        let config_path = dir.join("config.json");
        let config_bytes = serde_json::to_vec_pretty(config)
            .map_err(|e| OrchestratorError::Internal(format!("bundle config encode: {e}")))?;
        fs::write(&config_path, config_bytes)
            .await
            .map_err(|e| bundle_io_error("write config.json", &config_path, e))?;
        set_mode(&config_path, 0o600).await?;

        let session_path = dir.join("session.session");
        fs::write(&session_path, session_blob)
            .await
            .map_err(|e| bundle_io_error("write session", &session_path, e))?;
        set_mode(&session_path, 0o600).await?;

        Ok(dir)
    }

    /// Remove the bundle. Idempotent; a missing directory is fine.
    pub async fn wipe(&self, container_name: &str) {
        let dir = self.dir_for(container_name);
        if let Err(e) = fs::remove_dir_all(&dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(bundle = %dir.display(), error = %e, "bundle wipe failed");
            }
        }
    }
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .map_err(|e| bundle_io_error("set permissions", path, e))
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

fn bundle_io_error(what: &str, path: &Path, err: std::io::Error) -> OrchestratorError {
    OrchestratorError::Internal(format!("bundle {what} at {}: {err}", path.display()))
}
