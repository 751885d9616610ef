//! Splits an input line into `;` segments, `&&` conjuncts, `|` stages and
//! finally whitespace-separated words.
//!
//! Each level is a plain slicing function over the text of the level above,
//! so nothing here mutates or aliases the input buffer. Quoting and escapes
//! are not interpreted.

use crate::error::ParseError;
use crate::redirection::{DanglingPolicy, ParsedCommand, parse_command};

/// Fixed bounds applied while parsing a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_line_len: usize,
    pub max_args: usize,
    pub dangling: DanglingPolicy,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_line_len: 1024,
            max_args: 64,
            dangling: DanglingPolicy::Drop,
        }
    }
}

/// A `|`-chain. Zero stages means the conjunct was empty and runs as a no-op.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<ParsedCommand>,
}

impl Pipeline {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Pipelines joined by `&&`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Conjunction {
    pub pipelines: Vec<Pipeline>,
}

/// Everything on one input line: conjunctions joined by `;`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Script {
    pub segments: Vec<Conjunction>,
}

/// Splits on `;`, the outermost operator.
pub fn split_segments(line: &str) -> Vec<&str> {
    line.split(';').collect()
}

/// Splits a segment on `&&`. A lone `&` is left alone.
pub fn split_conjuncts(segment: &str) -> Vec<&str> {
    segment.split("&&").collect()
}

/// Splits a conjunct on `|`.
pub fn split_stages(conjunct: &str) -> Vec<&str> {
    conjunct.split('|').collect()
}

/// Splits a stage into words on spaces, tabs and line ends.
pub fn split_words(stage: &str) -> Vec<&str> {
    stage
        .split(|c: char| c == ' ' || c == '\t' || c == '\n' || c == '\r')
        .filter(|word| !word.is_empty())
        .collect()
}

/// True when the text holds no words at all.
pub fn is_blank(text: &str) -> bool {
    split_words(text).is_empty()
}

/// Parses one raw input line.
pub fn parse_line(line: &str, limits: &Limits) -> Result<Script, ParseError> {
    let line = line.trim_end_matches(['\n', '\r']);
    let len = line.chars().count();
    if len > limits.max_line_len {
        return Err(ParseError::LineTooLong {
            max: limits.max_line_len,
            found: len,
        });
    }

    let mut script = Script::default();
    for segment in split_segments(line) {
        if is_blank(segment) {
            continue;
        }
        let mut conjunction = Conjunction::default();
        for conjunct in split_conjuncts(segment) {
            conjunction.pipelines.push(parse_pipeline(conjunct, limits)?);
        }
        script.segments.push(conjunction);
    }
    Ok(script)
}

fn parse_pipeline(conjunct: &str, limits: &Limits) -> Result<Pipeline, ParseError> {
    let mut pipeline = Pipeline::default();
    for stage in split_stages(conjunct) {
        let words = split_words(stage);
        if words.is_empty() {
            continue;
        }
        pipeline
            .stages
            .push(parse_command(&words, limits.max_args, limits.dangling)?);
    }
    Ok(pipeline)
}
