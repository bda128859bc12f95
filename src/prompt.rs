use std::io::{self, BufRead, Write};

/// Ask a yes/no question and read one line of answer.
///
/// Only `y` or `Y` count as yes. End of input is a no.
pub fn confirm<R: BufRead, W: Write>(mut input: R, mut output: W, question: &str) -> io::Result<bool> {
    write!(output, "{question} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    Ok(matches!(answer.trim(), "y" | "Y"))
}
