//! Staged chart workspaces
//!
//! Commands never run against the caller's chart directory. The chart is
//! copied into a temporary directory first, so packaged archives, downloaded
//! sub-charts and helm login state disappear together with the workspace.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use crate::error::{CoreError, Result};

/// Directories below the helm home, relative to its root
const HELM_CONFIG_DIR: &str = "config";
const HELM_CACHE_DIR: &str = "cache";

/// An ephemeral copy of a chart plus private helm state directories
#[derive(Debug)]
pub struct Workspace {
    root: Option<TempDir>,
    chart_dir: PathBuf,
    helm_home: PathBuf,
    source: PathBuf,
}

impl Workspace {
    /// Copy `source` into a fresh temporary workspace
    pub fn stage(source: &Path) -> Result<Self> {
        if !source.join("Chart.yaml").is_file() {
            return Err(CoreError::ChartNotFound {
                path: source.display().to_string(),
            });
        }

        let root = tempfile::Builder::new().prefix("chartship-").tempdir()?;
        let chart_dir = root.path().join("chart");
        let helm_home = root.path().join("helm-home");

        copy_tree(source, &chart_dir)?;
        fs::create_dir_all(helm_home.join(HELM_CONFIG_DIR))?;
        fs::create_dir_all(helm_home.join(HELM_CACHE_DIR))?;

        tracing::debug!(
            source = %source.display(),
            workspace = %root.path().display(),
            "staged chart workspace"
        );

        Ok(Self {
            root: Some(root),
            chart_dir,
            helm_home,
            source: source.to_path_buf(),
        })
    }

    /// Working copy of the chart
    pub fn chart_dir(&self) -> &Path {
        &self.chart_dir
    }

    /// Private helm configuration and cache root
    pub fn helm_home(&self) -> &Path {
        &self.helm_home
    }

    /// The directory the workspace was staged from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Open up permissions so a container user with another uid can write
    #[cfg(unix)]
    pub fn make_shared(&self) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        for dir in [&self.chart_dir, &self.helm_home] {
            for entry in WalkDir::new(dir) {
                let entry = entry?;
                let mode = if entry.file_type().is_dir() { 0o777 } else { 0o666 };
                fs::set_permissions(entry.path(), fs::Permissions::from_mode(mode))?;
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn make_shared(&self) -> Result<()> {
        Ok(())
    }

    /// Remove the workspace, reporting anything that could not be deleted
    pub fn close(mut self) -> Result<()> {
        match self.root.take() {
            Some(root) => Ok(root.close()?),
            None => Ok(()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(root) = self.root.take() {
            let path = root.path().to_path_buf();
            if let Err(e) = root.close() {
                tracing::warn!(
                    workspace = %path.display(),
                    error = %e,
                    "failed to remove workspace, it may still hold helm login state"
                );
            }
        }
    }
}

/// Helm environment variables pointing at a helm home rooted at `home`
///
/// `home` is the path as seen by the process (host path or container mount).
pub fn helm_home_env(home: &str) -> Vec<(String, String)> {
    let mut env = helm_config_env(home);
    env.extend(helm_cache_env(home));
    env
}

/// Variables moving helm's config, registry logins and repository list below `home`
pub fn helm_config_env(home: &str) -> Vec<(String, String)> {
    let config = format!("{}/{}", home.trim_end_matches('/'), HELM_CONFIG_DIR);

    vec![
        ("HELM_CONFIG_HOME".to_string(), config.clone()),
        (
            "HELM_REGISTRY_CONFIG".to_string(),
            format!("{}/registry/config.json", config),
        ),
        (
            "HELM_REPOSITORY_CONFIG".to_string(),
            format!("{}/repositories.yaml", config),
        ),
    ]
}

/// Variables moving helm's download and repository index cache below `home`
pub fn helm_cache_env(home: &str) -> Vec<(String, String)> {
    let cache = format!("{}/{}", home.trim_end_matches('/'), HELM_CACHE_DIR);

    vec![
        ("HELM_CACHE_HOME".to_string(), cache.clone()),
        (
            "HELM_REPOSITORY_CACHE".to_string(),
            format!("{}/repository", cache),
        ),
    ]
}

/// Copy `src` into `dest`, failing on any entry that cannot be read
fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let rel_path = match entry.path().strip_prefix(src) {
            Ok(p) => p,
            Err(_) => continue,
        };
        let target = dest.join(rel_path);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
