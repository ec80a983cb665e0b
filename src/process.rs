use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of a finished child process.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to start: {0}")]
    Spawn(#[source] io::Error),
    #[error("failed while waiting: {0}")]
    Wait(#[source] io::Error),
    #[error("killed after {}", human(.0))]
    TimedOut(Duration),
}

fn human(limit: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*limit)
}

/// Run `argv` in `cwd` to completion and capture both streams.
///
/// With a `timeout` the child is killed once the limit passes.
pub fn run(argv: &[String], cwd: &Path, timeout: Option<Duration>) -> Result<CommandOutput, RunError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| RunError::Spawn(io::Error::new(io::ErrorKind::InvalidInput, "empty command")))?;

    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    match timeout {
        None => {
            let output = command.output().map_err(RunError::Spawn)?;
            Ok(CommandOutput {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
        Some(limit) => {
            let child = command.spawn().map_err(RunError::Spawn)?;
            wait_with_timeout(child, limit)
        }
    }
}

fn wait_with_timeout(mut child: Child, limit: Duration) -> Result<CommandOutput, RunError> {
    // Drain pipes on their own threads so a chatty child cannot block on a full pipe.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let started = Instant::now();
    let status = loop {
        match child.try_wait().map_err(RunError::Wait)? {
            Some(status) => break status,
            None if started.elapsed() >= limit => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunError::TimedOut(limit));
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    Ok(CommandOutput {
        status,
        stdout: join(stdout)?,
        stderr: join(stderr)?,
    })
}

type Drain = thread::JoinHandle<io::Result<String>>;

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Drain {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn join(handle: Option<Drain>) -> Result<String, RunError> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    handle
        .join()
        .map_err(|_| RunError::Wait(io::Error::other("pipe reader panicked")))?
        .map_err(RunError::Wait)
}

/// Render argv for log lines.
pub fn display(argv: &[String]) -> String {
    argv.join(" ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn captures_both_streams() {
        let dir = std::env::temp_dir();
        let out = run(&argv(&["sh", "-c", "echo out; echo err >&2; exit 2"]), &dir, None).unwrap();
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
        assert!(!out.success());
    }

    #[test]
    fn captures_with_timeout_when_fast() {
        let dir = std::env::temp_dir();
        let out = run(&argv(&["sh", "-c", "echo hi"]), &dir, Some(Duration::from_secs(30))).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hi");
    }

    #[test]
    fn kills_slow_commands() {
        let dir = std::env::temp_dir();
        let err = run(&argv(&["sleep", "5"]), &dir, Some(Duration::from_millis(200))).unwrap_err();
        assert!(matches!(err, RunError::TimedOut(_)));
    }

    #[test]
    fn errors_keep_their_source() {
        use std::error::Error as _;

        let dir = std::env::temp_dir();
        let err = run(&argv(&["definitely-not-a-real-binary-4242"]), &dir, None).unwrap_err();
        assert!(err.to_string().starts_with("failed to start: "));
        let source = err.source().unwrap().downcast_ref::<io::Error>().unwrap();
        assert_eq!(source.kind(), io::ErrorKind::NotFound);

        let timed_out = RunError::TimedOut(Duration::from_secs(90));
        assert_eq!(timed_out.to_string(), "killed after 1m 30s");
        assert!(timed_out.source().is_none());
    }

    #[test]
    fn unreadable_pipe_is_a_wait_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
        }

        let err = join(Some(drain(Broken))).unwrap_err();
        assert!(matches!(err, RunError::Wait(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(join(None).unwrap(), "");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = std::env::temp_dir();
        let err = run(&argv(&["definitely-not-a-real-binary-4242"]), &dir, None).unwrap_err();
        assert!(matches!(err, RunError::Spawn(_)));
        assert!(matches!(run(&[], &dir, None), Err(RunError::Spawn(_))));
    }
}
