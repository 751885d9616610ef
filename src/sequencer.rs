use log::debug;

use crate::commands::requests_exit;
use crate::history::History;
use crate::launcher::Launcher;
use crate::pipeline::run_pipeline;
use crate::tokenize::Script;

/// Whether the interpreter keeps reading lines after a script ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Result of running one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub flow: Flow,
    /// Status of the last pipeline that was evaluated, 0 if none was.
    pub status: i32,
    /// Child processes started while running the line.
    pub spawned: usize,
}

/// Walks the `;` segments in order. Inside a segment the `&&` chain stops at
/// the first nonzero status; the next segment always runs.
pub fn run_script(script: &Script, history: &History) -> Report {
    run_with(script, &mut Launcher::new(history))
}

/// Same as [`run_script`], starting stages through the given launcher.
pub fn run_with(script: &Script, launcher: &mut Launcher<'_>) -> Report {
    let mut status = 0;

    for (n, conjunction) in script.segments.iter().enumerate() {
        let mut run_next = true;
        for pipeline in &conjunction.pipelines {
            if !run_next {
                debug!("segment {n}: skipping the rest of the && chain");
                break;
            }
            if requests_exit(pipeline) {
                return Report {
                    flow: Flow::Exit,
                    status: 0,
                    spawned: launcher.spawned(),
                };
            }
            status = match run_pipeline(pipeline, launcher) {
                Ok(status) => status,
                Err(err) => {
                    eprintln!("pipesh: {err}");
                    1
                }
            };
            run_next = status == 0;
        }
    }

    Report {
        flow: Flow::Continue,
        status,
        spawned: launcher.spawned(),
    }
}
