use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use argh::FromArgs;
use log::{LevelFilter, debug};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use simplelog::{ColorChoice, TermLogger, TerminalMode, WriteLogger};

use pipesh::completion::ShellCompleter;
use pipesh::tokenize::is_blank;
use pipesh::{Config, Flow, Shell, signal};

#[derive(FromArgs)]
/// A small command interpreter with pipes, redirections, `;` and `&&`.
struct Args {
    /// config file to read instead of ~/.config/pipesh/config.toml
    #[argh(option)]
    config: Option<PathBuf>,

    /// log level: off, error, warn, info, debug or trace
    #[argh(option)]
    log_level: Option<LevelFilter>,

    /// run this one line, then exit with its status
    #[argh(option, short = 'c')]
    command: Option<String>,
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    init_logging(&config)?;

    let mut shell = Shell::new(&config);

    if let Some(line) = args.command {
        let report = shell.run_line(&line);
        let code = match report.flow {
            Flow::Exit => 0,
            Flow::Continue => report.status,
        };
        std::process::exit(code);
    }

    signal::install_sigint_handler()?;
    repl(&mut shell)
}

fn init_logging(config: &Config) -> Result<()> {
    let log_config = simplelog::Config::default();
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            WriteLogger::init(config.log_level, log_config, file)?;
        }
        None => TermLogger::init(
            config.log_level,
            log_config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )?,
    }
    Ok(())
}

fn repl(shell: &mut Shell) -> Result<()> {
    let mut rl: Editor<ShellCompleter, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ShellCompleter::new()));

    loop {
        match rl.readline(shell.prompt()) {
            Ok(line) => {
                if !is_blank(&line) {
                    rl.add_history_entry(line.as_str())?;
                }
                let report = shell.run_line(&line);
                if signal::finish_interrupted_line(&mut io::stdout())? {
                    debug!("interrupted while running {line:?}");
                }
                if report.flow == Flow::Exit {
                    break;
                }
            }
            // Ctrl-C at the prompt: drop the partial line and prompt again
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("reading input"),
        }
    }

    Ok(())
}
