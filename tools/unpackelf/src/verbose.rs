//! How much unpackelf prints.
//!
//! `-q` silences everything but the exit status, including decode errors.
//! Without flags the `BOARD_*` summary goes to stdout and errors to stderr.
//! `-v` adds the ELF header, one line per segment, each file written, and
//! phase timings. Usage errors from argument parsing are reported before
//! the level is known and ignore it.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

/// Selected by `-q` / `-v`; `-q` wins when both are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet = 0,
    Default = 1,
    Verbose = 2,
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Default as u8);

/// Set the level from the parsed flags. Called once, before decoding.
pub fn init(quiet: bool, verbose: bool) {
    let level = if quiet {
        Verbosity::Quiet
    } else if verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Default
    };
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// The level set by [`init`], or `Default` before it runs.
pub fn verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Default,
    }
}

/// Whether header, segment, and timing details are printed.
pub fn is_verbose() -> bool {
    verbosity() == Verbosity::Verbose
}

/// Whether all output, errors included, is suppressed.
pub fn is_quiet() -> bool {
    verbosity() == Verbosity::Quiet
}

/// `println!` for `-v` details.
///
/// ```ignore
/// vprintln!("  slot {}: {} bytes", index, len);
/// ```
macro_rules! vprintln {
    ($($arg:tt)*) => {
        if $crate::verbose::is_verbose() {
            println!($($arg)*);
        }
    };
}

pub(crate) use vprintln;

/// `println!` for the summary; silent under `-q`.
///
/// ```ignore
/// dprintln!("BOARD_PAGE_SIZE=\"{}\"", page_size);
/// ```
macro_rules! dprintln {
    ($($arg:tt)*) => {
        if !$crate::verbose::is_quiet() {
            println!($($arg)*);
        }
    };
}

pub(crate) use dprintln;

/// `eprintln!` for decode and I/O errors; silent under `-q`.
macro_rules! deprintln {
    ($($arg:tt)*) => {
        if !$crate::verbose::is_quiet() {
            eprintln!($($arg)*);
        }
    };
}

pub(crate) use deprintln;

/// Times one phase of the unpack (`decode`, `write`) and prints the
/// elapsed time under `-v` when dropped.
///
/// ```ignore
/// let _t = Timer::start("decode");
/// let image = unpackelf_elf::decode_file(path)?;
/// // "  decode: 80.1µs" once `_t` goes out of scope
/// ```
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Start timing the phase named `label`.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if is_verbose() {
            let elapsed = self.start.elapsed();
            println!("  {}: {:.1?}", self.label, elapsed);
        }
    }
}
