//! displayplacer driver.
//!
//! Every call spawns the tool afresh and waits for it under a timeout; a
//! child that outlives the timeout is killed.

use std::env;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use glob::glob;
use log::debug;
use wait_timeout::ChildExt;

use super::{DisplayTool, ScreenConfig, ToolOutput, TOOL_NAME};
use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const HOMEBREW_BINS: [&str; 2] = ["/opt/homebrew/bin", "/usr/local/bin"];

const HOMEBREW_CELLARS: [&str; 2] = [
    "/opt/homebrew/Cellar/displayplacer/*/bin/displayplacer",
    "/usr/local/Cellar/displayplacer/*/bin/displayplacer",
];

pub struct Displayplacer {
    path: PathBuf,
    timeout: Duration,
}

impl Displayplacer {
    pub fn new(path: PathBuf, timeout: Duration) -> Self {
        Displayplacer { path, timeout }
    }

    /// Find displayplacer on `$PATH` or in the usual Homebrew locations.
    pub fn locate(timeout: Duration) -> Result<Self> {
        find_tool()
            .map(|path| Displayplacer::new(path, timeout))
            .ok_or(Error::ToolNotFound)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run(&self, mut command: Command, shown: String) -> Result<ToolOutput> {
        debug!("running {}", shown);
        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::ToolInvocationFailed {
                command: shown.clone(),
                source,
            })?;

        // Drain both pipes while waiting so a chatty listing cannot fill
        // the pipe buffer and stall the child.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::ToolTimedOut {
                    command: shown,
                    secs: self.timeout.as_secs(),
                });
            }
            Err(source) => {
                let _ = child.kill();
                return Err(Error::ToolInvocationFailed {
                    command: shown,
                    source,
                });
            }
        };

        let output = ToolOutput {
            success: status.success(),
            stdout: collect(stdout),
            stderr: collect(stderr),
        };
        debug!("{} exited with {}", shown, status);
        Ok(output)
    }
}

impl DisplayTool for Displayplacer {
    fn list(&mut self) -> Result<String> {
        let mut command = Command::new(&self.path);
        command.arg("list");
        let output = self.run(command, format!("{} list", self.path.display()))?;
        if !output.success {
            return Err(Error::ToolReportedError(output.diagnostic().to_owned()));
        }
        Ok(output.stdout)
    }

    fn apply(&mut self, config: &ScreenConfig) -> Result<ToolOutput> {
        let arg = config.to_arg();
        let mut command = Command::new(&self.path);
        command.arg(&arg);
        self.run(command, format!("\"{}\" \"{}\"", self.path.display(), arg))
    }

    fn replay(&mut self, command: &str) -> Result<ToolOutput> {
        // Captured restore commands are shell syntax with quoted arguments.
        let line = substitute_tool_path(command, &self.path);
        let mut shell = Command::new("sh");
        shell.arg("-c").arg(&line);
        self.run(shell, line)
    }
}

/// Point a captured command at the resolved binary instead of the bare name.
pub fn substitute_tool_path(command: &str, path: &Path) -> String {
    let command = command.trim();
    match command.strip_prefix(TOOL_NAME) {
        Some(rest) => format!("{}{}", shell_quote(&path.to_string_lossy()), rest),
        None => command.to_owned(),
    }
}

/// Single-quote `word` for `sh`; embedded quotes become `'\''`.
fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', "'\\''"))
}

fn find_tool() -> Option<PathBuf> {
    if let Some(paths) = env::var_os("PATH") {
        let found = env::split_paths(&paths)
            .map(|dir| dir.join(TOOL_NAME))
            .find(|candidate| candidate.is_file());
        if found.is_some() {
            return found;
        }
    }

    let found = HOMEBREW_BINS
        .iter()
        .map(|dir| Path::new(dir).join(TOOL_NAME))
        .find(|candidate| candidate.is_file());
    if found.is_some() {
        return found;
    }

    // Versioned Cellar installs that were never linked; newest sorts last.
    HOMEBREW_CELLARS.iter().find_map(|pattern| {
        glob(pattern)
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .last()
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_only_the_leading_name() {
        let path = Path::new("/opt/homebrew/bin/displayplacer");
        assert_eq!(
            substitute_tool_path(
                "displayplacer \"id:ABC res:1080x1920 degree:90\"",
                path
            ),
            "'/opt/homebrew/bin/displayplacer' \"id:ABC res:1080x1920 degree:90\""
        );
        assert_eq!(
            substitute_tool_path("  echo displayplacer  ", path),
            "echo displayplacer"
        );
    }

    #[test]
    fn substituted_path_is_not_expanded() {
        let path = Path::new("/Users/o'neil/bin $HOME/`x`/\"dp\"");
        assert_eq!(
            substitute_tool_path("displayplacer list", path),
            "'/Users/o'\\''neil/bin $HOME/`x`/\"dp\"' list"
        );
    }

    #[test]
    fn awkward_install_path_replays() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let odd = dir.path().join("it's $HOME \"`here`\"");
        std::fs::create_dir(&odd)?;
        let link = odd.join(TOOL_NAME);
        std::os::unix::fs::symlink("/bin/echo", &link)?;

        let mut tool = Displayplacer::new(link, DEFAULT_TIMEOUT);
        let output = tool.replay("displayplacer \"id:ABC degree:90\"")?;
        assert!(!output.is_error(), "{}", output.diagnostic());
        assert_eq!(output.stdout.trim(), "id:ABC degree:90");
        Ok(())
    }

    #[test]
    fn replay_runs_through_the_shell() -> Result<()> {
        let mut tool = Displayplacer::new(PathBuf::from("echo"), DEFAULT_TIMEOUT);
        let output = tool.replay("displayplacer \"id:ABC degree:90\"")?;
        assert!(!output.is_error());
        assert_eq!(output.stdout.trim(), "id:ABC degree:90");
        Ok(())
    }

    #[test]
    fn replay_reports_error_marker() -> Result<()> {
        let mut tool = Displayplacer::new(PathBuf::from("echo"), DEFAULT_TIMEOUT);
        let output = tool.replay("echo 'Error: screen not found' >&2")?;
        assert!(output.is_error());
        assert_eq!(output.diagnostic(), "Error: screen not found");
        Ok(())
    }

    #[test]
    fn missing_binary_is_an_invocation_failure() {
        let mut tool = Displayplacer::new(
            PathBuf::from("/nonexistent/displayplacer"),
            DEFAULT_TIMEOUT,
        );
        match tool.list() {
            Err(Error::ToolInvocationFailed { command, .. }) => {
                assert_eq!(command, "/nonexistent/displayplacer list")
            }
            other => panic!("expected invocation failure, got {:?}", other),
        }
    }

    #[test]
    fn hung_tool_is_killed() {
        let mut tool = Displayplacer::new(PathBuf::from("echo"), Duration::from_millis(200));
        match tool.replay("sleep 5") {
            Err(Error::ToolTimedOut { command, .. }) => assert_eq!(command, "sleep 5"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
