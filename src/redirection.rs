use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{ExecError, ParseError};

/// Permissions for output files created by `>` or `>>` (before umask).
const OUTPUT_MODE: u32 = 0o644;

/// Represents an output redirection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub file: PathBuf,
    pub append: bool,
}

/// One pipeline stage: plain arguments plus the redirections it declared.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub args: Vec<String>,
    pub redirect_stdin: Option<PathBuf>,
    pub redirect_stdout: Option<Redirection>,
}

impl ParsedCommand {
    /// The program to run, if the stage names one.
    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// How a redirection operator with nothing after it is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DanglingPolicy {
    /// Drop the operator and keep going.
    #[default]
    Drop,
    /// Reject the whole line.
    Reject,
}

/// Walks the tokens of one stage, pulling `<`, `>` and `>>` targets out of
/// the argument list. A later redirection for the same direction replaces an
/// earlier one; a trailing operator with no target clears it.
pub fn parse_command(
    tokens: &[&str],
    max_args: usize,
    dangling: DanglingPolicy,
) -> Result<ParsedCommand, ParseError> {
    if tokens.len() > max_args {
        return Err(ParseError::TooManyArguments {
            max: max_args,
            found: tokens.len(),
        });
    }

    let mut parsed = ParsedCommand::default();
    let mut i = 0;

    while i < tokens.len() {
        let op = tokens[i];
        match op {
            "<" | ">" | ">>" => {
                let Some(target) = tokens.get(i + 1) else {
                    if dangling == DanglingPolicy::Reject {
                        return Err(ParseError::MalformedRedirection {
                            operator: op.to_string(),
                        });
                    }
                    warn!("dropping `{op}` with no file name after it");
                    if op == "<" {
                        parsed.redirect_stdin = None;
                    } else {
                        parsed.redirect_stdout = None;
                    }
                    break;
                };
                let file = PathBuf::from(target);
                if op == "<" {
                    parsed.redirect_stdin = Some(file);
                } else {
                    parsed.redirect_stdout = Some(Redirection {
                        file,
                        append: op == ">>",
                    });
                }
                i += 2;
            }
            _ => {
                parsed.args.push(op.to_string());
                i += 1;
            }
        }
    }

    Ok(parsed)
}

/// Opens an existing file read-only for `<`.
pub fn open_input(path: &Path) -> Result<File, ExecError> {
    File::open(path).map_err(|source| ExecError::Redirection {
        path: path.to_path_buf(),
        source,
    })
}

/// Opens (creating if needed) a file for `>` or `>>`.
pub fn open_output(redirection: &Redirection) -> Result<File, ExecError> {
    let mut options = OpenOptions::new();
    options.create(true).mode(OUTPUT_MODE);
    if redirection.append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    options
        .open(&redirection.file)
        .map_err(|source| ExecError::Redirection {
            path: redirection.file.clone(),
            source,
        })
}
