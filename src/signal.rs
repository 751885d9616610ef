use std::io::{self, Write};
use std::mem::MaybeUninit;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicBool, Ordering};

use libc::{c_int, sighandler_t};
use thiserror::Error;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Error)]
#[error("cannot install handler for signal {signal}: {source}")]
pub struct SigError {
    signal: c_int,
    #[source]
    source: io::Error,
}

/// Only async-signal-safe work here: a single atomic store.
extern "C" fn handle_sigint(_sig: c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Keeps SIGINT from killing the interpreter. Children get the default
/// disposition back when they exec.
pub fn install_sigint_handler() -> Result<(), SigError> {
    install_sighandler(libc::SIGINT, handle_sigint)
}

/// Returns whether SIGINT arrived since the last call, clearing the flag.
pub fn take_interrupted() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}

/// If SIGINT arrived while a line was running, ends the `^C` line on `out`
/// so the next prompt starts on a fresh line. Returns whether it did.
pub fn finish_interrupted_line<W: Write>(out: &mut W) -> io::Result<bool> {
    if !take_interrupted() {
        return Ok(false);
    }
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(true)
}

fn install_sighandler(signal: c_int, handler: extern "C" fn(c_int)) -> Result<(), SigError> {
    let mut action = unsafe { MaybeUninit::<libc::sigaction>::zeroed().assume_init() };
    action.sa_sigaction = handler as sighandler_t;
    action.sa_flags = libc::SA_RESTART;
    unsafe { libc::sigemptyset(&mut action.sa_mask) };

    match unsafe { libc::sigaction(signal, &action, null_mut()) } {
        -1 => Err(SigError {
            signal,
            source: io::Error::last_os_error(),
        }),
        _ => Ok(()),
    }
}
