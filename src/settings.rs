//! Per-project code search settings
//!
//! A project file names an optional index file and the folders that belong to
//! the project:
//!
//! ```json
//! {
//!   "code_search": { "csearchindex": "~/.cache/myproject.csearchindex" },
//!   "folders": [{ "path": "~/src/myproject" }, { "path": "vendor" }]
//! }
//! ```
//!
//! Relative paths are anchored at the directory holding the project file.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::{AppConfig, resolve_path};

/// Default project file name, looked up in the working directory
pub const PROJECT_FILE: &str = ".yacs.json";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("the index file, {}, does not exist", .0.display())]
    MissingIndex(PathBuf),

    #[error("failed to read project file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse project file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectData {
    #[serde(default)]
    pub code_search: Option<CodeSearchSection>,
    #[serde(default)]
    pub folders: Vec<ProjectFolder>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CodeSearchSection {
    pub csearchindex: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectFolder {
    pub path: String,
}

impl ProjectData {
    /// Read a project file. Returns the data and the directory relative paths resolve against.
    pub fn load(path: &Path) -> Result<(Self, PathBuf), SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let data = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok((data, base))
    }

    fn index_file(&self) -> Option<&str> {
        self.code_search.as_ref()?.csearchindex.as_deref()
    }
}

/// Everything the runner collaborators need for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub csearch_path: PathBuf,
    pub cindex_path: PathBuf,
    /// Passed to the tools through `CSEARCHINDEX`; `None` uses their default
    pub index_filename: Option<PathBuf>,
    /// Folders to (re)index; empty keeps whatever the index already covers
    pub paths_to_index: Vec<PathBuf>,
}

impl Settings {
    /// Combine user config and project data.
    ///
    /// With `index_project_folders` the index file may not exist yet (it is
    /// about to be built) and the project folders become the paths to index.
    pub fn resolve(
        config: &AppConfig,
        project: &ProjectData,
        base: &Path,
        index_project_folders: bool,
    ) -> Result<Self, SettingsError> {
        let folders = || -> Vec<PathBuf> {
            project
                .folders
                .iter()
                .map(|f| resolve_path(&f.path, base))
                .collect()
        };

        let (index_filename, paths_to_index) = match project.index_file() {
            Some(raw) => {
                let index = resolve_path(raw, base);
                if !index.is_file() && !index_project_folders {
                    return Err(SettingsError::MissingIndex(index));
                }
                (Some(index), folders())
            }
            None if index_project_folders => (None, folders()),
            None => (None, Vec::new()),
        };

        Ok(Self {
            csearch_path: config.path_csearch.clone(),
            cindex_path: config.path_cindex.clone(),
            index_filename,
            paths_to_index,
        })
    }
}
