use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Problems found while turning an input line into a [`Script`](crate::tokenize::Script).
///
/// Any of these rejects the whole line before a single process is started.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line too long ({found} characters, limit is {max})")]
    LineTooLong { max: usize, found: usize },
    #[error("too many arguments ({found}, limit is {max})")]
    TooManyArguments { max: usize, found: usize },
    #[error("missing file name after `{operator}`")]
    MalformedRedirection { operator: String },
}

/// Failures while starting the processes of a pipeline.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{}: {source}", .path.display())]
    Redirection {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{program}: {}", launch_reason(.source))]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program}: cannot create process: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot create pipe: {0}")]
    Pipe(#[source] io::Error),
}

fn launch_reason(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "command not found".to_string(),
        io::ErrorKind::PermissionDenied => "permission denied".to_string(),
        _ => err.to_string(),
    }
}

impl ExecError {
    /// Classifies a failed `spawn` as either a launch failure (the program
    /// itself is the problem) or resource exhaustion (the system refused to
    /// create a process).
    pub fn from_spawn(program: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => ExecError::Launch {
                program: program.to_string(),
                source,
            },
            _ if source.raw_os_error() == Some(libc::ENOEXEC)
                || source.raw_os_error() == Some(libc::EISDIR) =>
            {
                ExecError::Launch {
                    program: program.to_string(),
                    source,
                }
            }
            _ => ExecError::Spawn {
                program: program.to_string(),
                source,
            },
        }
    }

    /// Exit status reported for a stage that failed this way, or `None` when
    /// the failure aborts the whole pipeline.
    pub fn stage_status(&self) -> Option<i32> {
        match self {
            ExecError::Redirection { .. } => Some(1),
            ExecError::Launch { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                Some(127)
            }
            ExecError::Launch { .. } => Some(126),
            ExecError::Spawn { .. } | ExecError::Pipe(_) => None,
        }
    }
}
