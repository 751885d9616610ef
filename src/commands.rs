use bytes::Bytes;
use log::warn;

use crate::history::History;
use crate::tokenize::Pipeline;

/// List of builtin commands
pub const BUILTINS: &[&str] = &["exit", "history"];

/// Commands run by the interpreter itself instead of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    History,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "exit" => Some(Builtin::Exit),
            "history" => Some(Builtin::History),
            _ => None,
        }
    }
}

/// What running a builtin produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinOutcome {
    /// Bytes for the builtin's effective standard output.
    Output(Bytes),
    /// The interpreter should stop.
    Exit,
}

/// Executes a builtin command in the interpreter process.
pub fn execute_builtin(builtin: Builtin, args: &[String], history: &History) -> BuiltinOutcome {
    if args.len() > 1 {
        warn!("{}: ignoring arguments {:?}", args[0], &args[1..]);
    }
    match builtin {
        Builtin::Exit => BuiltinOutcome::Exit,
        Builtin::History => BuiltinOutcome::Output(history.render()),
    }
}

/// True when any stage of the pipeline is `exit`.
pub fn requests_exit(pipeline: &Pipeline) -> bool {
    pipeline
        .stages
        .iter()
        .filter_map(|stage| stage.program())
        .any(|name| Builtin::lookup(name) == Some(Builtin::Exit))
}
