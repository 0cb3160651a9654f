//! Project catalog over the portal directory.
//!
//! Layout: `<portal_dir>/<project_name>/manifest.json`. Manifests are read
//! fresh on every call; nothing is cached between requests.

use chrono::{DateTime, Utc};
use dbtchat_core::error::{Error, ManifestError, Result};
use dbtchat_core::manifest::Manifest;
use dbtchat_security::validate_project_name;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the dbt manifest inside each project directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One listed project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    pub name: String,
    pub display_name: String,
    pub model_count: usize,
    pub dbt_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// `sales_mart` → `Sales Mart`. The rest of each word is lowercased.
pub fn display_name(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read-only view of the projects under a portal directory.
#[derive(Debug, Clone)]
pub struct ProjectCatalog {
    root: PathBuf,
}

impl ProjectCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List every project with a readable manifest, sorted by name.
    pub async fn list(&self) -> Result<Vec<ProjectInfo>> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            warn!(portal = %self.root.display(), error = %e, "Portal directory is not readable");
            Error::Internal("Portal directory is not readable".into())
        })?;

        let mut projects = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::Internal(format!("Failed to scan portal directory: {e}")))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let manifest_path = entry.path().join(MANIFEST_FILE);
            if !tokio::fs::try_exists(&manifest_path).await.unwrap_or(false) {
                continue;
            }

            match Self::describe(&name, &manifest_path).await {
                Ok(info) => projects.push(info),
                Err(e) => warn!(project = %name, error = %e, "Skipping project with unusable manifest"),
            }
        }

        projects.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = projects.len(), "Listed portal projects");
        Ok(projects)
    }

    async fn describe(name: &str, manifest_path: &Path) -> Result<ProjectInfo> {
        let text = tokio::fs::read_to_string(manifest_path)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        let manifest = Manifest::parse(&text)?;

        let last_updated = tokio::fs::metadata(manifest_path)
            .await
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(ProjectInfo {
            name: name.to_string(),
            display_name: display_name(name),
            model_count: manifest.model_count(),
            dbt_version: manifest.dbt_version().unwrap_or("unknown").to_string(),
            last_updated,
        })
    }

    /// Path of a project's manifest, after validating the project name.
    pub fn manifest_path(&self, project_name: &str) -> Result<PathBuf> {
        let dir = validate_project_name(&self.root, project_name)
            .map_err(|e| Error::Validation(e.to_string()))?;
        Ok(dir.join(MANIFEST_FILE))
    }

    /// Read a snapshot of a project's manifest text.
    pub async fn read_manifest(&self, project_name: &str) -> Result<String> {
        let path = self.manifest_path(project_name)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!(project = %project_name, bytes = text.len(), "Read manifest");
                Ok(text)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound {
                project: project_name.to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                Err(ManifestError::Malformed("manifest is not valid UTF-8".into()).into())
            }
            Err(e) => {
                warn!(project = %project_name, error = %e, "Failed to read manifest");
                Err(Error::Internal("Failed to read manifest".into()))
            }
        }
    }
}
