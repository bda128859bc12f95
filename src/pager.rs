use crate::error::{Error, Result};
use std::{
    io::{self, ErrorKind, IsTerminal, Write},
    process::{Command, Stdio},
};
use tracing::debug;

/// Show `content` through `pager` when stdout is a terminal, otherwise
/// write it to stdout unchanged.
pub fn page(pager: &str, content: &[u8]) -> Result<()> {
    let stdout = io::stdout();
    if stdout.is_terminal() {
        spawn_pager(pager, content)
    } else {
        write_plain(stdout.lock(), content)
    }
}

/// Write `content` to stdout. A reader that goes away early is not an error.
pub fn print(content: &[u8]) -> Result<()> {
    write_plain(io::stdout().lock(), content)
}

fn spawn_pager(pager: &str, content: &[u8]) -> Result<()> {
    debug!(pager, bytes = content.len(), "starting pager");

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(pager)
        .stdin(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(content) {
            // The user quit before reading everything.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
            other => other?,
        }
    }

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::CommandFailed {
            command: pager.to_string(),
            code: status.code(),
        })
    }
}

fn write_plain<W: Write>(mut out: W, content: &[u8]) -> Result<()> {
    match out.write_all(content).and_then(|()| out.flush()) {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => Ok(other?),
    }
}
