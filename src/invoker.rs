//! Launching the external predictor process. The predictor is a black box
//! with a fixed three-argument contract; this module owns the process
//! lifecycle and nothing about what happens inside it.

use crate::error::Error;
use crate::settings::Settings;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Everything captured from one predictor run.
#[derive(Debug)]
pub struct Invocation {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// The seam between the pipeline and the external process. Tests substitute
/// an invoker that writes deterministic output instead of running inference.
pub trait Invoke {
    fn invoke(&self, input_root: &Path, output_root: &Path) -> Result<Invocation, Error>;
}

/// Runs `<python_bin> bin/predict.py model.path=.. indir=.. outdir=..` from
/// the predictor's installation root, so its internal relative paths resolve.
#[derive(Debug, Clone)]
pub struct PredictCommand {
    python_bin: String,
    predictor_dir: PathBuf,
    model_dir: PathBuf,
    stderr_limit: usize,
    timeout: Option<Duration>,
}

impl PredictCommand {
    pub fn new(
        python_bin: impl Into<String>,
        predictor_dir: impl Into<PathBuf>,
        model_dir: impl Into<PathBuf>,
        stderr_limit: usize,
        timeout: Option<Duration>,
    ) -> Self {
        PredictCommand {
            python_bin: python_bin.into(),
            predictor_dir: predictor_dir.into(),
            model_dir: model_dir.into(),
            stderr_limit,
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.python_bin.clone(),
            settings.predictor_dir.clone(),
            settings.model_dir.clone(),
            settings.stderr_limit,
            settings.inference_timeout_secs.map(Duration::from_secs),
        )
    }

    /// Block until the child exits, or kill it once the configured deadline
    /// passes. `None` status means the child never exited on its own.
    fn wait(&self, mut cmd: Command) -> Result<(Option<ExitStatus>, String, String), Error> {
        let mut child = cmd.spawn()?;
        let stdout = reader_thread(child.stdout.take());
        let stderr = reader_thread(child.stderr.take());

        let status = match self.timeout {
            None => Some(child.wait()?),
            Some(limit) => {
                let started = Instant::now();
                loop {
                    if let Some(status) = child.try_wait()? {
                        break Some(status);
                    }
                    if started.elapsed() >= limit {
                        warn!("predictor exceeded {limit:?}, killing it");
                        let _ = child.kill();
                        let _ = child.wait();
                        break None;
                    }
                    thread::sleep(Duration::from_millis(50));
                }
            }
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        Ok((status, stdout, stderr))
    }
}

impl Invoke for PredictCommand {
    fn invoke(&self, input_root: &Path, output_root: &Path) -> Result<Invocation, Error> {
        // Fail fast on a missing weights directory; nothing gets launched.
        if !self.model_dir.exists() {
            return Err(Error::ModelNotFound(self.model_dir.clone()));
        }

        let mut cmd = Command::new(&self.python_bin);
        cmd.arg("bin/predict.py")
            .arg(format!("model.path={}", self.model_dir.display()))
            .arg(format!("indir={}", input_root.display()))
            .arg(format!("outdir={}", output_root.display()))
            .current_dir(&self.predictor_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("launching predictor: {cmd:?}");
        let (status, stdout, stderr) = self.wait(cmd)?;

        match status {
            Some(s) if s.success() => Ok(Invocation {
                status: s.code(),
                stdout,
                stderr,
            }),
            Some(s) => Err(Error::Inference {
                status: s.code(),
                stderr: truncate(&stderr, self.stderr_limit),
            }),
            None => Err(Error::Inference {
                status: None,
                stderr: "predictor killed after exceeding the configured timeout".into(),
            }),
        }
    }
}

/// Drain one of the child's pipes on its own thread so a chatty predictor
/// can't deadlock against a full pipe buffer.
fn reader_thread<R: Read + Send + 'static>(src: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut src) = src {
            let _ = src.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn truncate(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Stand up a fake predictor installation whose `bin/predict.py` is a
    /// shell script, run with `sh` instead of python.
    fn fake_predictor(script: &str) -> (TempDir, PredictCommand) {
        let tmp = TempDir::new().unwrap();
        let predictor_dir = tmp.path().join("lama");
        let model_dir = predictor_dir.join("big-lama");
        fs::create_dir_all(predictor_dir.join("bin")).unwrap();
        fs::create_dir_all(&model_dir).unwrap();
        fs::write(predictor_dir.join("bin/predict.py"), script).unwrap();
        let cmd = PredictCommand::new("sh", &predictor_dir, &model_dir, 2000, None);
        (tmp, cmd)
    }

    fn io_dirs(tmp: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        fs::create_dir_all(&input).unwrap();
        fs::create_dir_all(&output).unwrap();
        (input, output)
    }

    #[test]
    fn missing_model_dir_fails_before_launch() {
        let (tmp, _) = fake_predictor("touch launched.marker\n");
        let missing = tmp.path().join("no-such-weights");
        let cmd = PredictCommand::new("sh", tmp.path().join("lama"), &missing, 2000, None);
        let (input, output) = io_dirs(&tmp);
        let err = cmd.invoke(&input, &output).unwrap_err();
        assert!(matches!(err, Error::ModelNotFound(ref p) if *p == missing));
        // The script never ran.
        assert!(!tmp.path().join("lama/launched.marker").exists());
    }

    #[test]
    fn zero_exit_yields_invocation_with_captured_stdout() {
        let (tmp, cmd) = fake_predictor("echo inference ok\nexit 0\n");
        let (input, output) = io_dirs(&tmp);
        let inv = cmd.invoke(&input, &output).unwrap();
        assert_eq!(inv.status, Some(0));
        assert!(inv.stdout.contains("inference ok"));
    }

    #[test]
    fn predictor_receives_the_three_argument_contract() {
        // The script echoes its argv back; assert the assignment-style args.
        let (tmp, cmd) = fake_predictor("echo \"$1 $2 $3\"\n");
        let (input, output) = io_dirs(&tmp);
        let inv = cmd.invoke(&input, &output).unwrap();
        assert!(inv.stdout.contains("model.path="));
        assert!(inv.stdout.contains(&format!("indir={}", input.display())));
        assert!(inv.stdout.contains(&format!("outdir={}", output.display())));
    }

    #[test]
    fn nonzero_exit_carries_stderr() {
        let (tmp, cmd) = fake_predictor("echo 'CUDA error' >&2\nexit 1\n");
        let (input, output) = io_dirs(&tmp);
        let err = cmd.invoke(&input, &output).unwrap_err();
        // The Display form is what callers see in failure responses.
        assert!(err.to_string().contains("CUDA error"));
        match err {
            Error::Inference { status, stderr } => {
                assert_eq!(status, Some(1));
                assert!(stderr.contains("CUDA error"));
            }
            other => panic!("expected Inference, got {other:?}"),
        }
    }

    #[test]
    fn stderr_is_truncated_to_the_bound() {
        let script = "i=0\nwhile [ $i -lt 300 ]; do echo 'xxxxxxxxxx' >&2; i=$((i+1)); done\nexit 2\n";
        let tmp = TempDir::new().unwrap();
        let predictor_dir = tmp.path().join("lama");
        let model_dir = predictor_dir.join("big-lama");
        fs::create_dir_all(predictor_dir.join("bin")).unwrap();
        fs::create_dir_all(&model_dir).unwrap();
        fs::write(predictor_dir.join("bin/predict.py"), script).unwrap();
        let cmd = PredictCommand::new("sh", &predictor_dir, &model_dir, 100, None);
        let (input, output) = io_dirs(&tmp);
        match cmd.invoke(&input, &output).unwrap_err() {
            Error::Inference { stderr, .. } => assert_eq!(stderr.chars().count(), 100),
            other => panic!("expected Inference, got {other:?}"),
        }
    }

    #[test]
    fn hung_predictor_is_killed_on_timeout() {
        let (tmp, _) = fake_predictor("sleep 30\n");
        let cmd = PredictCommand::new(
            "sh",
            tmp.path().join("lama"),
            tmp.path().join("lama/big-lama"),
            2000,
            Some(Duration::from_millis(300)),
        );
        let (input, output) = io_dirs(&tmp);
        let started = Instant::now();
        let err = cmd.invoke(&input, &output).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(10));
        match err {
            Error::Inference { status, stderr } => {
                assert_eq!(status, None);
                assert!(stderr.contains("timeout"));
            }
            other => panic!("expected Inference, got {other:?}"),
        }
    }
}
