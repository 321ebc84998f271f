//! Line sources.
//!
//! A line source yields successive lines from exactly one stream. Three
//! strategies exist:
//! - `raw`: rebuild each line byte by byte, dropping carriage returns
//! - `canonical`: platform line reads, terminators kept as read
//! - `interactive`: prompted reads through a [`LineEditor`]
//!
//! Lines are returned with a trailing newline wherever the strategy
//! produces one; the echo loop terminates any line that lacks it.

mod canonical;
mod interactive;
mod raw;

pub use canonical::CanonicalSource;
pub use interactive::InteractiveSource;
pub use raw::RawSource;

use std::io::{self, BufRead, Write};

use crate::config::{Config, Strategy};
use crate::editor::{self, LineEditor};
use crate::error::Result;
use crate::history::HistoryFile;

/// A finite, non-restartable sequence of lines.
pub trait LineSource {
    /// Next line, or `Ok(None)` at end of input.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Build the configured source over an arbitrary stream.
///
/// `prompt_out` receives the interactive prompt and is unused otherwise.
pub fn from_stream<R, W>(config: &Config, input: R, prompt_out: W) -> Box<dyn LineSource>
where
    R: BufRead + 'static,
    W: Write + 'static,
{
    match config.strategy() {
        Strategy::Raw => Box::new(RawSource::new(input)),
        Strategy::Canonical => Box::new(CanonicalSource::new(input)),
        Strategy::Interactive(_) => {
            interactive(config, editor::open_stream(input, prompt_out))
        }
    }
}

/// Build the configured source over the process's standard input.
pub fn from_stdin(config: &Config) -> Result<Box<dyn LineSource>> {
    match config.strategy() {
        Strategy::Interactive(reader) => Ok(interactive(config, editor::open_terminal(reader)?)),
        _ => Ok(from_stream(config, io::stdin().lock(), io::sink())),
    }
}

fn interactive(config: &Config, editor: Box<dyn LineEditor>) -> Box<dyn LineSource> {
    let history = config.history.clone().map(HistoryFile::new);
    Box::new(InteractiveSource::new(editor, config.prompt.clone(), history))
}
