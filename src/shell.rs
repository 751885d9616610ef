use log::debug;

use crate::config::Config;
use crate::history::History;
use crate::sequencer::{Flow, Report, run_script};
use crate::tokenize::{Limits, is_blank, parse_line};

/// Status reported for a line that could not be parsed.
pub const PARSE_FAILURE: i32 = 2;

/// Session state carried from one input line to the next.
pub struct Shell {
    prompt: String,
    limits: Limits,
    history: History,
}

impl Shell {
    pub fn new(config: &Config) -> Self {
        Self {
            prompt: config.prompt.clone(),
            limits: config.limits(),
            history: config.history(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Parses and runs one line, then records it in the history. Blank lines
    /// are neither run nor recorded.
    pub fn run_line(&mut self, line: &str) -> Report {
        if is_blank(line) {
            return Report {
                flow: Flow::Continue,
                status: 0,
                spawned: 0,
            };
        }

        let report = match parse_line(line, &self.limits) {
            Ok(script) => run_script(&script, &self.history),
            Err(err) => {
                eprintln!("pipesh: {err}");
                Report {
                    flow: Flow::Continue,
                    status: PARSE_FAILURE,
                    spawned: 0,
                }
            }
        };

        if !self.history.push(line) {
            debug!("history is full, not recording {line:?}");
        }
        report
    }
}
