//! Running external programs.
//!
//! Every step of a subtree command is an existing tool (`git`, `tar`, `diff`,
//! `gh`). Children inherit stdio unless output is captured, and a non-zero
//! exit aborts the command with the child's status.

use crate::error::{Error, Result};
use std::{
    ffi::OsStr,
    path::Path,
    process::{Command, ExitStatus, Stdio},
};
use tracing::debug;

/// Build a command for `program` running in `dir`.
pub(crate) fn command<I, S>(dir: &Path, program: &str, args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(dir);
    cmd
}

/// Shorthand for a `git` command in `dir`.
pub(crate) fn git<I, S>(dir: &Path, args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    command(dir, "git", args)
}

/// Run to completion and fail unless the exit status is zero.
pub(crate) fn run(cmd: &mut Command) -> Result<()> {
    debug!(command = %command_line(cmd), "running");
    let status = cmd.status()?;
    check(cmd, status)
}

/// Run with stdout captured, accepting any status in `ok_codes`.
pub(crate) fn output(cmd: &mut Command, ok_codes: &[i32]) -> Result<Vec<u8>> {
    debug!(command = %command_line(cmd), "running");
    let output = cmd.stderr(Stdio::inherit()).output()?;

    match output.status.code() {
        Some(code) if ok_codes.contains(&code) => Ok(output.stdout),
        code => Err(Error::CommandFailed {
            command: command_line(cmd),
            code,
        }),
    }
}

/// Run `producer | consumer`, failing if either side fails.
pub(crate) fn pipe(producer: &mut Command, consumer: &mut Command) -> Result<()> {
    let pipeline = format!("{} | {}", command_line(producer), command_line(consumer));
    debug!(command = %pipeline, "running");

    let mut source = producer.stdout(Stdio::piped()).spawn()?;
    let stdout = source
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("producer stdout was not captured"))?;

    let sink_status = match consumer.stdin(Stdio::from(stdout)).status() {
        Ok(status) => status,
        Err(e) => {
            let _ = source.kill();
            let _ = source.wait();
            return Err(e.into());
        }
    };
    if !sink_status.success() {
        // Nobody reads the rest of the stream.
        let _ = source.kill();
    }
    let source_status = source.wait()?;

    if !sink_status.success() {
        return check(consumer, sink_status);
    }

    check(producer, source_status)
}

/// Return `true` if `program` can be found on `PATH`.
pub(crate) fn is_available(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Fail with [`Error::MissingTool`] unless `program` is on `PATH`.
pub(crate) fn require(program: &str) -> Result<()> {
    if is_available(program) {
        Ok(())
    } else {
        Err(Error::MissingTool {
            tool: program.to_string(),
        })
    }
}

fn check(cmd: &Command, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(Error::CommandFailed {
            command: command_line(cmd),
            code: status.code(),
        })
    }
}

fn command_line(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}
