use rustyline::Helper;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use std::env;

use crate::commands::BUILTINS;

/// Shell completer for tab completion.
pub struct ShellCompleter {
    filename_completer: FilenameCompleter,
}

impl ShellCompleter {
    pub fn new() -> Self {
        Self {
            filename_completer: FilenameCompleter::new(),
        }
    }
}

impl Default for ShellCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> Result<(usize, Vec<Self::Candidate>), ReadlineError> {
        let (start, word) = extract_word(line, pos);
        if !is_command_position(&line[..start]) {
            return self.filename_completer.complete(line, pos, ctx);
        }

        let mut candidates: Vec<Pair> = BUILTINS
            .iter()
            .map(|name| name.to_string())
            .chain(path_executables(word))
            .filter(|name| name.starts_with(word))
            .map(|name| Pair {
                display: name.clone(),
                replacement: format!("{name} "),
            })
            .collect();

        candidates.sort_by(|a, b| a.display.cmp(&b.display));
        candidates.dedup_by(|a, b| a.display == b.display);
        Ok((start, candidates))
    }
}

/// Names in `$PATH` directories starting with `prefix`.
fn path_executables(prefix: &str) -> Vec<String> {
    let Ok(path) = env::var("PATH") else {
        return Vec::new();
    };
    path.split(':')
        .filter_map(|dir| std::fs::read_dir(dir).ok())
        .flat_map(|entries| entries.flatten())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(prefix))
        .collect()
}

fn is_operator_char(c: char) -> bool {
    c == '|' || c == ';' || c == '&'
}

/// The word under the cursor runs back to the last whitespace or operator.
fn extract_word(line: &str, pos: usize) -> (usize, &str) {
    let before = &line[..pos];
    let start = before
        .rfind(|c: char| c.is_whitespace() || is_operator_char(c))
        .map_or(0, |i| i + 1);
    (start, &line[start..pos])
}

/// A word starts a command at the beginning of the line or right after
/// `|`, `;` or `&&`.
fn is_command_position(before: &str) -> bool {
    let before = before.trim_end();
    before.is_empty() || before.ends_with('|') || before.ends_with(';') || before.ends_with("&&")
}

impl Helper for ShellCompleter {}
impl Hinter for ShellCompleter {
    type Hint = String;
}
impl Highlighter for ShellCompleter {}
impl Validator for ShellCompleter {}
