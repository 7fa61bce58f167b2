//! Search runner collaborator: runs `csearch` for a parsed query and parses
//! its output.

use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info, warn};

use crate::INDEX_ENV_VAR;
use crate::query::Query;
use crate::results::{FileMatchGroup, parse_results};
use crate::settings::Settings;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Parse(#[from] crate::Error),

    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} exited with {status}: {stderr}", program.display())]
    Failed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRunner {
    pub csearch_path: PathBuf,
    pub index_filename: Option<PathBuf>,
}

impl SearchRunner {
    pub fn new(csearch_path: impl Into<PathBuf>) -> Self {
        Self {
            csearch_path: csearch_path.into(),
            index_filename: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            csearch_path: settings.csearch_path.clone(),
            index_filename: settings.index_filename.clone(),
        }
    }

    /// Full argument vector: line numbered output plus the query's own arguments.
    pub fn args(&self, query: &Query) -> crate::Result<Vec<String>> {
        let mut args = vec!["-n".to_string()];
        args.extend(query.to_args()?);
        Ok(args)
    }

    pub fn command(&self, query: &Query) -> crate::Result<Command> {
        let mut cmd = Command::new(&self.csearch_path);
        cmd.args(self.args(query)?);
        if let Some(index) = &self.index_filename {
            cmd.env(INDEX_ENV_VAR, index);
        }
        cmd.stdin(Stdio::null());
        Ok(cmd)
    }

    /// Run the search and group its matches by file.
    ///
    /// The runner exits with status 1 and prints nothing when no line
    /// matched; that is an empty result, not a failure.
    pub fn run(&self, query: &Query) -> Result<Vec<FileMatchGroup>, SearchError> {
        let mut cmd = self.command(query)?;
        debug!(?cmd, "starting search runner");
        let output = cmd.output().map_err(|source| SearchError::Spawn {
            program: self.csearch_path.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let no_matches = output.status.code() == Some(1)
                && stdout.trim().is_empty()
                && stderr.is_empty();
            if no_matches {
                info!("search finished with no matches");
                return Ok(Vec::new());
            }
            return Err(SearchError::Failed {
                program: self.csearch_path.clone(),
                status: output.status,
                stderr,
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!(stderr = %stderr.trim(), "search runner wrote to stderr");
        }

        let groups = parse_results(&stdout)?;
        info!(files = groups.len(), "search finished");
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::ffi::OsStr;

    #[test]
    fn test_args() {
        let runner = SearchRunner::new("csearch");
        let query = Query::new(["hello", "world"])
            .with_file_filter(".*py$")
            .case_insensitive();
        assert_eq!(
            runner.args(&query).unwrap(),
            vec!["-n", "-f", ".*py$", "-i", "(hello|world)"]
        );
    }

    #[test]
    fn test_empty_query_is_rejected_before_spawning() {
        let runner = SearchRunner::new("/nonexistent/yacs-test/csearch");
        let err = runner.run(&Query::default()).unwrap_err();
        assert!(matches!(err, SearchError::Parse(Error::EmptyQuery)));
    }

    #[test]
    fn test_command_sets_index_env() {
        let mut runner = SearchRunner::new("csearch");
        runner.index_filename = Some(PathBuf::from("/tmp/idx"));
        let cmd = runner.command(&Query::new(["x"])).unwrap();
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["-n", "x"]);
        let env: Vec<_> = cmd.get_envs().collect();
        assert_eq!(env, vec![(OsStr::new(INDEX_ENV_VAR), Some(OsStr::new("/tmp/idx")))]);
    }

    #[test]
    fn test_missing_executable() {
        let runner = SearchRunner::new("/nonexistent/yacs-test/csearch");
        let err = runner.run(&Query::new(["x"])).unwrap_err();
        assert!(matches!(err, SearchError::Spawn { .. }));
    }
}
