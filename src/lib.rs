//! pipesh: a small interactive command interpreter.
//!
//! An input line is split on `;` into segments, each segment on `&&` into a
//! short-circuiting chain, and each link of the chain on `|` into a pipeline
//! of processes. Stages may redirect standard input with `<` and standard
//! output with `>` or `>>`. `exit` and `history` are builtins.
//!
//! # Architecture
//!
//! - **[`tokenize`]** and **[`redirection`]**: turn a line into a [`tokenize::Script`].
//! - **[`launcher`]**: starts one stage with its pipe ends and redirections.
//! - **[`pipeline`]**: wires stages together with pipes and collects the last status.
//! - **[`sequencer`]**: `;` and `&&` evaluation order.
//! - **[`shell`]**: per-session driver owning the [`history::History`].

pub mod commands;
pub mod completion;
pub mod config;
pub mod error;
pub mod history;
pub mod launcher;
pub mod pipeline;
pub mod redirection;
pub mod sequencer;
pub mod shell;
pub mod signal;
pub mod tokenize;

pub use config::Config;
pub use sequencer::{Flow, Report};
pub use shell::Shell;
