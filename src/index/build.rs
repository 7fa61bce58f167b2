use regex::Regex;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::INDEX_ENV_VAR;
use crate::settings::Settings;
use crate::utils::progress::{ProgressBar, index_spinner};

/// Minimum time between progress reports
const REPORT_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading index builder output: {0}")]
    Io(#[from] io::Error),

    #[error("{} exited with {status}", program.display())]
    Failed { program: PathBuf, status: ExitStatus },
}

/// Receives progress while the index builder runs.
///
/// Called from whichever thread runs the build.
pub trait IndexListener: Send {
    /// `count` files were indexed since the previous call
    fn on_files_processed(&mut self, count: usize);

    /// The build ended; `Ok` carries the total number of files indexed
    fn on_finished(&mut self, _result: &Result<usize, IndexError>) {}
}

/// Verbose index builder log line for one indexed file, e.g.
/// `2014/10/11 19:26:32 3556 1018 file.name`
fn is_file_line(line: &str) -> bool {
    static FILE_LINE: OnceLock<Regex> = OnceLock::new();
    FILE_LINE
        .get_or_init(|| {
            Regex::new(r"^\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2} \d+ \d+ .+")
                .expect("file line pattern is valid")
        })
        .is_match(line)
}

/// One invocation of the index builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBuilder {
    pub cindex_path: PathBuf,
    pub index_filename: Option<PathBuf>,
    /// When non-empty, replaces the paths the index covers
    pub paths_to_index: Vec<PathBuf>,
}

impl IndexBuilder {
    pub fn new(cindex_path: impl Into<PathBuf>) -> Self {
        Self {
            cindex_path: cindex_path.into(),
            index_filename: None,
            paths_to_index: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cindex_path: settings.cindex_path.clone(),
            index_filename: settings.index_filename.clone(),
            paths_to_index: settings.paths_to_index.clone(),
        }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.cindex_path);
        cmd.arg("-verbose");
        if !self.paths_to_index.is_empty() {
            cmd.arg("-reset");
            cmd.args(&self.paths_to_index);
        }
        if let Some(index) = &self.index_filename {
            cmd.env(INDEX_ENV_VAR, index);
        }
        // The verbose log goes to stderr
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::piped());
        cmd
    }

    /// Run the index builder to completion, reporting progress to `listener`.
    pub fn run<L: IndexListener + ?Sized>(&self, listener: &mut L) -> Result<usize, IndexError> {
        let result = self.build(listener);
        listener.on_finished(&result);
        result
    }

    fn build<L: IndexListener + ?Sized>(&self, listener: &mut L) -> Result<usize, IndexError> {
        let mut cmd = self.command();
        debug!(?cmd, "starting index builder");
        let mut child = cmd.spawn().map_err(|source| IndexError::Spawn {
            program: self.cindex_path.clone(),
            source,
        })?;

        let log = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("index builder log was not captured"))?;
        let counted = count_files(log, listener);
        let status = child.wait()?;
        let total = counted?;

        if !status.success() {
            return Err(IndexError::Failed {
                program: self.cindex_path.clone(),
                status,
            });
        }
        info!(files = total, "index build finished");
        Ok(total)
    }
}

/// Count indexed-file lines in the builder's log, flushing counts to
/// `listener` at most every [`REPORT_INTERVAL`].
fn count_files<R: Read, L: IndexListener + ?Sized>(
    log: R,
    listener: &mut L,
) -> Result<usize, IndexError> {
    let mut total = 0;
    let mut pending = 0;
    let mut last_report = Instant::now();

    for line in BufReader::new(log).split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        if is_file_line(&line) {
            pending += 1;
        } else {
            trace!(line = %line, "index builder");
        }

        if last_report.elapsed() > REPORT_INTERVAL {
            listener.on_files_processed(pending);
            total += pending;
            pending = 0;
            last_report = Instant::now();
        }
    }

    listener.on_files_processed(pending);
    Ok(total + pending)
}

/// Runs index builds on a background thread, one at a time.
#[derive(Debug, Clone, Default)]
pub struct Indexer {
    running: Arc<AtomicBool>,
}

impl Indexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start `builder` in the background. Returns `None` without starting
    /// anything while another build is still running.
    pub fn start<L>(
        &self,
        builder: IndexBuilder,
        mut listener: L,
    ) -> Option<JoinHandle<Result<usize, IndexError>>>
    where
        L: IndexListener + 'static,
    {
        if self.running.swap(true, Ordering::AcqRel) {
            debug!("index build already running, ignoring start request");
            return None;
        }
        let guard = RunningGuard(Arc::clone(&self.running));
        Some(thread::spawn(move || {
            let _guard = guard;
            builder.run(&mut listener)
        }))
    }
}

/// Clears the running flag when the build thread ends, even by panic.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Shows the running file count on a spinner
pub struct SpinnerListener {
    spinner: ProgressBar,
    total: usize,
}

impl SpinnerListener {
    pub fn new() -> Self {
        Self {
            spinner: index_spinner(),
            total: 0,
        }
    }
}

impl Default for SpinnerListener {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexListener for SpinnerListener {
    fn on_files_processed(&mut self, count: usize) {
        self.total += count;
        self.spinner.set_message(format!("cindex ({} files)", self.total));
    }

    fn on_finished(&mut self, _result: &Result<usize, IndexError>) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[derive(Default)]
    struct Recorder {
        reports: Vec<usize>,
    }

    impl IndexListener for Recorder {
        fn on_files_processed(&mut self, count: usize) {
            self.reports.push(count);
        }
    }

    #[test]
    fn test_is_file_line() {
        assert!(is_file_line("2014/10/11 19:26:32 3556 1018 file.name"));
        assert!(is_file_line("2024/01/02 03:04:05 1 0 /src/dir with space/a.rs"));
        assert!(!is_file_line("2014/10/11 19:26:32 flush index"));
        assert!(!is_file_line("index /home/me/.csearchindex: 12 files"));
        assert!(!is_file_line(""));
    }

    #[test]
    fn test_count_files() {
        let log = "\
2014/10/11 19:26:32 create index
2014/10/11 19:26:32 100 20 a.rs
2014/10/11 19:26:32 200 40 b.rs
2014/10/11 19:26:33 flush index
2014/10/11 19:26:33 300 60 c.rs";
        let mut recorder = Recorder::default();
        let total = count_files(log.as_bytes(), &mut recorder).unwrap();
        assert_eq!(total, 3);
        assert_eq!(recorder.reports.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_count_files_tolerates_invalid_utf8() {
        let log: &[u8] = b"2014/10/11 19:26:32 1 1 caf\xe9.txt\n";
        let mut recorder = Recorder::default();
        assert_eq!(count_files(log, &mut recorder).unwrap(), 1);
    }

    #[test]
    fn test_command_with_paths() {
        let builder = IndexBuilder {
            cindex_path: PathBuf::from("/usr/bin/cindex"),
            index_filename: Some(PathBuf::from("/tmp/idx")),
            paths_to_index: vec![PathBuf::from("/src/a"), PathBuf::from("/src/b")],
        };
        let cmd = builder.command();
        assert_eq!(cmd.get_program(), OsStr::new("/usr/bin/cindex"));
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["-verbose", "-reset", "/src/a", "/src/b"]);
        let env: Vec<_> = cmd.get_envs().collect();
        assert_eq!(env, vec![(OsStr::new(INDEX_ENV_VAR), Some(OsStr::new("/tmp/idx")))]);
    }

    #[test]
    fn test_command_without_paths() {
        let cmd = IndexBuilder::new("cindex").command();
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["-verbose"]);
        assert_eq!(cmd.get_envs().count(), 0);
    }

    struct PanicsOnFinish;

    impl IndexListener for PanicsOnFinish {
        fn on_files_processed(&mut self, _count: usize) {}

        fn on_finished(&mut self, _result: &Result<usize, IndexError>) {
            panic!("listener failed");
        }
    }

    #[test]
    fn test_indexer_recovers_from_panicking_listener() {
        let indexer = Indexer::new();
        let handle = indexer
            .start(IndexBuilder::new("/nonexistent/yacs-test/cindex"), PanicsOnFinish)
            .unwrap();
        assert!(handle.join().is_err());
        assert!(!indexer.is_running());

        let next = indexer
            .start(IndexBuilder::new("/nonexistent/yacs-test/cindex"), Recorder::default())
            .unwrap();
        assert!(matches!(next.join().unwrap(), Err(IndexError::Spawn { .. })));
        assert!(!indexer.is_running());
    }

    #[test]
    fn test_missing_executable() {
        let builder = IndexBuilder::new("/nonexistent/yacs-test/cindex");
        let mut recorder = Recorder::default();
        let err = builder.run(&mut recorder).unwrap_err();
        assert!(matches!(err, IndexError::Spawn { .. }));
    }
}
