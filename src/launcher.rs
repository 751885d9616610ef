use std::fs::File;
use std::io::{self, PipeReader, PipeWriter, Write};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, ExitStatus, Stdio};

use bytes::Bytes;
use log::{debug, error};

use crate::commands::{Builtin, BuiltinOutcome, execute_builtin};
use crate::error::ExecError;
use crate::history::History;
use crate::redirection::{ParsedCommand, open_input, open_output};

/// Where a stage's standard input comes from when it declares no `<`.
#[derive(Debug)]
pub enum StageInput {
    Inherit,
    Pipe(PipeReader),
}

/// Where a stage's standard output goes when it declares no `>` or `>>`.
#[derive(Debug)]
pub enum StageOutput {
    Inherit,
    Pipe(PipeWriter),
}

/// Effective standard output of a builtin running in the interpreter.
#[derive(Debug)]
pub enum Sink {
    Stdout,
    File(File),
    Pipe(PipeWriter),
}

impl Sink {
    fn deliver(self, payload: &[u8]) -> io::Result<()> {
        match self {
            Sink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(payload)?;
                out.flush()
            }
            Sink::File(mut file) => file.write_all(payload),
            Sink::Pipe(mut writer) => writer.write_all(payload),
        }
    }
}

/// A launched stage, waiting to be collected.
#[derive(Debug)]
pub enum Stage {
    /// A child process.
    Running { program: String, child: Child },
    /// A builtin whose output has not been written yet.
    Builtin { sink: Sink, payload: Bytes },
    /// Nothing left to do; the status is known.
    Done(i32),
}

/// A stage with no output left to write, only a status to collect.
#[derive(Debug)]
pub enum Delivered {
    Running { program: String, child: Child },
    Done(i32),
}

impl Delivered {
    /// Blocks until the stage has finished and returns its exit status.
    pub fn wait(self) -> i32 {
        match self {
            Delivered::Running { program, mut child } => match child.wait() {
                Ok(status) => {
                    debug!("{program} (pid {}) exited: {status}", child.id());
                    status_code(status)
                }
                Err(err) => {
                    error!("waiting for {program}: {err}");
                    1
                }
            },
            Delivered::Done(status) => status,
        }
    }
}

impl Stage {
    /// Writes pending builtin output.
    pub fn deliver(self) -> Delivered {
        match self {
            Stage::Running { program, child } => Delivered::Running { program, child },
            Stage::Done(status) => Delivered::Done(status),
            Stage::Builtin { sink, payload } => match sink.deliver(&payload) {
                Ok(()) => Delivered::Done(0),
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("history: reader went away");
                    Delivered::Done(0)
                }
                Err(err) => {
                    eprintln!("pipesh: history: {err}");
                    Delivered::Done(1)
                }
            },
        }
    }

    /// Writes any pending output, then waits for the stage to finish.
    pub fn wait(self) -> i32 {
        self.deliver().wait()
    }
}

/// Maps a wait status onto 0..=255; death by signal N reports 128 + N.
pub fn status_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

/// Creates the child process for a fully configured command.
pub type Spawner = fn(&mut Command) -> io::Result<Child>;

/// Starts one stage at a time, applying its redirections on top of any pipe
/// ends it inherits.
pub struct Launcher<'a> {
    history: &'a History,
    spawner: Spawner,
    spawned: usize,
}

impl<'a> Launcher<'a> {
    pub fn new(history: &'a History) -> Self {
        Self::with_spawner(history, Command::spawn)
    }

    pub fn with_spawner(history: &'a History, spawner: Spawner) -> Self {
        Self {
            history,
            spawner,
            spawned: 0,
        }
    }

    /// Number of child processes started so far.
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Launches `command`. Explicit redirections take priority over the
    /// inherited pipe ends, which are then closed unused. Every descriptor
    /// handed in is closed in this process before returning, on all paths.
    pub fn launch(
        &mut self,
        command: &ParsedCommand,
        input: StageInput,
        output: StageOutput,
    ) -> Result<Stage, ExecError> {
        let Some(program) = command.program() else {
            return Ok(Stage::Done(0));
        };

        if let Some(builtin) = Builtin::lookup(program) {
            return self.launch_builtin(builtin, command, output);
        }

        let stdin = match (&command.redirect_stdin, input) {
            (Some(path), _) => Stdio::from(open_input(path)?),
            (None, StageInput::Pipe(reader)) => Stdio::from(reader),
            (None, StageInput::Inherit) => Stdio::inherit(),
        };
        let stdout = match (&command.redirect_stdout, output) {
            (Some(redirection), _) => Stdio::from(open_output(redirection)?),
            (None, StageOutput::Pipe(writer)) => Stdio::from(writer),
            (None, StageOutput::Inherit) => Stdio::inherit(),
        };

        let mut process = Command::new(program);
        process.args(&command.args[1..]).stdin(stdin).stdout(stdout);
        let child = (self.spawner)(&mut process)
            .map_err(|source| ExecError::from_spawn(program, source))?;
        self.spawned += 1;
        debug!("started {program} (pid {})", child.id());

        Ok(Stage::Running {
            program: program.to_string(),
            child,
        })
    }

    fn launch_builtin(
        &mut self,
        builtin: Builtin,
        command: &ParsedCommand,
        output: StageOutput,
    ) -> Result<Stage, ExecError> {
        match execute_builtin(builtin, &command.args, self.history) {
            BuiltinOutcome::Exit => Ok(Stage::Done(0)),
            BuiltinOutcome::Output(payload) => {
                let sink = match (&command.redirect_stdout, output) {
                    (Some(redirection), _) => Sink::File(open_output(redirection)?),
                    (None, StageOutput::Pipe(writer)) => Sink::Pipe(writer),
                    (None, StageOutput::Inherit) => Sink::Stdout,
                };
                Ok(Stage::Builtin { sink, payload })
            }
        }
    }
}
