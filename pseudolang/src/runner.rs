//! Python process runner
//!
//! Runs generated source (via a temporary script) or an existing file with
//! the first `python3`/`python` found on PATH. Output is captured and relayed
//! once the child exits. The child gets no stdin, so `input()` sees EOF.

use log::debug;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

const INTERPRETERS: [&str; 2] = ["python3", "python"];

#[derive(Error, Debug)]
pub enum ExecError {
    #[error(
        "python is not installed or not in your PATH\n\nPlease install Python 3.x from https://www.python.org/downloads/\n\nAfter installation, ensure Python is added to your system PATH"
    )]
    InterpreterNotFound,

    #[error("failed to write Python code to temporary file: {0}")]
    TempFile(#[source] io::Error),

    #[error("failed to start {}: {source}", .interpreter.display())]
    Spawn {
        interpreter: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("python execution failed{}", .code.map(|c| format!(" (exit code {})", c)).unwrap_or_default())]
    Failed { code: Option<i32> },
}

/// Captured result of one interpreter run
#[derive(Debug)]
pub struct ScriptOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub status: ExitStatus,
}

impl ScriptOutput {
    /// Write captured stdout and stderr to the given streams
    pub fn relay(&self, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
        if !self.stdout.is_empty() {
            out.write_all(&self.stdout)?;
            out.flush()?;
        }
        if !self.stderr.is_empty() {
            err.write_all(&self.stderr)?;
            err.flush()?;
        }
        Ok(())
    }

    /// Fail unless the child exited successfully.
    ///
    /// The exit code is absent when the child was killed by a signal.
    pub fn check(&self) -> Result<(), ExecError> {
        if self.status.success() {
            Ok(())
        } else {
            Err(ExecError::Failed {
                code: self.status.code(),
            })
        }
    }
}

/// Runs Python sources with a discovered interpreter
#[derive(Debug, Clone)]
pub struct PythonRunner {
    interpreter: PathBuf,
}

impl PythonRunner {
    /// Locate `python3`, falling back to `python`
    pub fn discover() -> Result<Self, ExecError> {
        let interpreter = INTERPRETERS
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or(ExecError::InterpreterNotFound)?;

        debug!("Using Python interpreter: {}", interpreter.display());
        Ok(Self { interpreter })
    }

    /// Run `code` from a temporary script that is removed once the run ends
    pub async fn run_source(&self, code: &str) -> Result<ScriptOutput, ExecError> {
        let script = write_temp_script(code)?;
        debug!("Wrote generated code to {}", script.display());

        // `script` lives until the child is done; dropping it deletes the file
        // on every path, including cancellation of this future.
        self.run_file(&script).await
    }

    /// Run an existing Python file in place
    pub async fn run_file(&self, path: &Path) -> Result<ScriptOutput, ExecError> {
        debug!("Running {} {}", self.interpreter.display(), path.display());

        let output = Command::new(&self.interpreter)
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                interpreter: self.interpreter.clone(),
                source,
            })?;

        debug!("Python exited with {}", output.status);

        Ok(ScriptOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            status: output.status,
        })
    }
}

fn write_temp_script(code: &str) -> Result<tempfile::TempPath, ExecError> {
    let mut file = tempfile::Builder::new()
        .prefix("pseudolang_")
        .suffix(".py")
        .tempfile()
        .map_err(ExecError::TempFile)?;

    file.write_all(code.as_bytes()).map_err(ExecError::TempFile)?;
    file.flush().map_err(ExecError::TempFile)?;

    // Close the handle so the interpreter can open the file on every platform.
    Ok(file.into_temp_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> Option<PythonRunner> {
        PythonRunner::discover().ok()
    }

    #[test]
    fn test_failed_message_formats() {
        assert_eq!(
            ExecError::Failed { code: Some(2) }.to_string(),
            "python execution failed (exit code 2)"
        );
        assert_eq!(
            ExecError::Failed { code: None }.to_string(),
            "python execution failed"
        );
        assert!(
            ExecError::InterpreterNotFound
                .to_string()
                .starts_with("python is not installed")
        );
    }

    #[test]
    fn test_temp_script_contents() {
        let script = write_temp_script("print('hi')\n").unwrap();
        let name = script.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("pseudolang_"));
        assert!(name.ends_with(".py"));
        assert_eq!(std::fs::read_to_string(&script).unwrap(), "print('hi')\n");

        let path = script.to_path_buf();
        drop(script);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_run_source_captures_output_and_cleans_up() {
        let Some(runner) = runner() else { return };

        let output = runner
            .run_source("import sys\nprint(__file__)\nprint('oops', file=sys.stderr)")
            .await
            .unwrap();
        output.check().unwrap();

        let script_path = String::from_utf8(output.stdout.clone()).unwrap();
        assert!(script_path.trim().ends_with(".py"));
        assert!(!Path::new(script_path.trim()).exists());
        assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "oops");

        let mut out = Vec::new();
        let mut err = Vec::new();
        output.relay(&mut out, &mut err).unwrap();
        assert_eq!(out, output.stdout);
        assert_eq!(err, output.stderr);
    }

    #[tokio::test]
    async fn test_nonzero_exit_reports_code() {
        let Some(runner) = runner() else { return };

        let output = runner
            .run_source("import sys\nprint('partial')\nsys.exit(3)")
            .await
            .unwrap();

        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "partial");
        let err = output.check().unwrap_err();
        assert!(matches!(err, ExecError::Failed { code: Some(3) }));
        assert_eq!(err.to_string(), "python execution failed (exit code 3)");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_termination_has_no_exit_code() {
        let Some(runner) = runner() else { return };

        let output = runner
            .run_source("import os, signal\nos.kill(os.getpid(), signal.SIGKILL)")
            .await
            .unwrap();

        let err = output.check().unwrap_err();
        assert!(matches!(err, ExecError::Failed { code: None }));
        assert_eq!(err.to_string(), "python execution failed");
    }

    #[tokio::test]
    async fn test_run_file_in_place() {
        let Some(runner) = runner() else { return };

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hello.py");
        std::fs::write(&path, "print(6 * 7)\n").unwrap();

        let output = runner.run_file(&path).await.unwrap();
        output.check().unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "42");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_input_sees_end_of_file() {
        let Some(runner) = runner() else { return };

        let output = runner
            .run_source("try:\n    input()\nexcept EOFError:\n    print('eof')")
            .await
            .unwrap();

        output.check().unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "eof");
    }

    async fn wait_for_line(path: &Path) -> String {
        loop {
            if let Ok(text) = std::fs::read_to_string(path) {
                if text.ends_with('\n') {
                    return text;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
    }

    #[tokio::test]
    async fn test_cancelled_run_kills_child_and_removes_script() {
        let Some(runner) = runner() else { return };

        let dir = tempfile::TempDir::new().unwrap();
        let marker = dir.path().join("marker.txt");
        let code = format!(
            "import time\n\
             with open(r'{marker}', 'w') as f:\n    f.write(__file__ + '\\n')\n\
             time.sleep(2)\n\
             with open(r'{marker}', 'a') as f:\n    f.write('SURVIVED\\n')\n",
            marker = marker.display()
        );

        let script = tokio::select! {
            result = runner.run_source(&code) => panic!("script was not cancelled: {result:?}"),
            line = wait_for_line(&marker) => line,
        };

        assert!(!Path::new(script.trim()).exists());

        tokio::time::sleep(std::time::Duration::from_millis(2500)).await;
        let marker_text = std::fs::read_to_string(&marker).unwrap();
        assert!(!marker_text.contains("SURVIVED"));
    }

    #[tokio::test]
    async fn test_missing_interpreter_fails_to_spawn() {
        let runner = PythonRunner {
            interpreter: PathBuf::from("/nonexistent/python3"),
        };
        let err = runner.run_source("print(1)").await.unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }
}
