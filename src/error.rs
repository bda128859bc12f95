//! Error type and exit codes.

use std::process::ExitCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("branch '{name}' already exists")]
    BranchExists { name: String },

    #[error("'{tool}' is required for this command but was not found in PATH")]
    MissingTool { tool: String },

    #[error("removal of '{prefix}' not confirmed")]
    Declined { prefix: String },

    #[error("`{command}` failed{}", status_suffix(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("this operation is not supported in a bare repository")]
    BareRepository,

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Exit status for the process.
    ///
    /// A failed external command hands its own status through; everything
    /// else exits with 1.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::CommandFailed {
                code: Some(code), ..
            } => match u8::try_from(*code) {
                Ok(0) | Err(_) => ExitCode::FAILURE,
                Ok(code) => ExitCode::from(code),
            },
            _ => ExitCode::FAILURE,
        }
    }
}

fn status_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" with exit status {c}"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_message_includes_status() {
        let err = Error::CommandFailed {
            command: "git fetch lib-upstream main".into(),
            code: Some(128),
        };
        assert_eq!(
            err.to_string(),
            "`git fetch lib-upstream main` failed with exit status 128"
        );
    }

    #[test]
    fn command_failed_without_status() {
        let err = Error::CommandFailed {
            command: "diff".into(),
            code: None,
        };
        assert_eq!(err.to_string(), "`diff` failed");
        assert_eq!(err.exit_code(), ExitCode::FAILURE);
    }

    #[test]
    fn command_failed_propagates_status() {
        let err = Error::CommandFailed {
            command: "git push".into(),
            code: Some(128),
        };
        assert_eq!(err.exit_code(), ExitCode::from(128));
    }

    #[test]
    fn out_of_range_status_falls_back_to_failure() {
        let err = Error::CommandFailed {
            command: "git push".into(),
            code: Some(-1),
        };
        assert_eq!(err.exit_code(), ExitCode::FAILURE);
    }

    #[test]
    fn precondition_errors_exit_with_one() {
        let errors = [
            Error::BranchExists { name: "b".into() },
            Error::MissingTool { tool: "gh".into() },
            Error::Declined { prefix: "lib".into() },
            Error::BareRepository,
        ];
        for err in errors {
            assert_eq!(err.exit_code(), ExitCode::FAILURE);
        }
    }
}
