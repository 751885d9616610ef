use std::io;

use log::{debug, error};

use crate::error::ExecError;
use crate::launcher::{Delivered, Launcher, Stage, StageInput, StageOutput};
use crate::tokenize::Pipeline;

/// Runs a `|`-chain and returns the exit status of its last stage.
///
/// All stages are started left to right before any of them is waited on.
/// The parent's copy of each pipe end is handed to exactly one stage and is
/// closed as soon as that stage has been started. A stage that fails to open
/// a redirection or to find its program gets a nonzero status and the rest
/// of the chain still runs. If the system refuses to create a pipe or a
/// process, nothing further is started, the stages already running are
/// reaped, and the error is returned.
pub fn run_pipeline(pipeline: &Pipeline, launcher: &mut Launcher<'_>) -> Result<i32, ExecError> {
    if pipeline.is_empty() {
        return Ok(0);
    }

    let last = pipeline.stages.len() - 1;
    let mut stages = Vec::with_capacity(pipeline.stages.len());
    let mut input = StageInput::Inherit;

    for (i, command) in pipeline.stages.iter().enumerate() {
        let (output, next_input) = if i < last {
            match io::pipe() {
                Ok((reader, writer)) => (StageOutput::Pipe(writer), StageInput::Pipe(reader)),
                Err(err) => {
                    drop(input);
                    return Err(abort(stages, ExecError::Pipe(err)));
                }
            }
        } else {
            (StageOutput::Inherit, StageInput::Inherit)
        };

        let stage_input = std::mem::replace(&mut input, next_input);
        match launcher.launch(command, stage_input, output) {
            Ok(stage) => stages.push(stage),
            Err(err) => match err.stage_status() {
                Some(status) => {
                    eprintln!("pipesh: {err}");
                    stages.push(Stage::Done(status));
                }
                None => {
                    drop(input);
                    return Err(abort(stages, err));
                }
            },
        }
    }

    // builtin output is written only once every reader downstream is running
    let stages: Vec<Delivered> = stages.into_iter().map(Stage::deliver).collect();

    let mut status = 0;
    for stage in stages {
        status = stage.wait();
    }
    debug!("pipeline of {} stage(s) finished with {status}", last + 1);
    Ok(status)
}

fn abort(stages: Vec<Stage>, err: ExecError) -> ExecError {
    error!("aborting pipeline after {} stage(s): {err}", stages.len());
    for stage in stages {
        stage.wait();
    }
    err
}
