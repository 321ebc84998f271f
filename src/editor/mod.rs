//! Interactive line readers.
//!
//! Every backend offers the same capability set: show a prompt, read one
//! edited line, and keep a history of entered lines. The session picks a
//! backend once at startup and holds it as a `Box<dyn LineEditor>`.
//!
//! ## Backends
//! - `basic`: works on any byte stream (stdin, a file, a socket); no
//!   cursor control, history kept in memory
//! - `terminal`: full terminal editing with emacs or vi bindings

mod basic;
mod terminal;

pub use basic::BasicEditor;
pub use terminal::TerminalEditor;

use std::io::{self, BufRead, Write};

use crate::config::LineReader;
use crate::error::{Error, Result};

/// Prompted, history-aware line input.
pub trait LineEditor {
    /// Show `prompt` (when non-empty) and read one line without its terminator.
    ///
    /// Returns `Ok(None)` at end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Record `entry` as the most recent history item.
    fn add_history(&mut self, entry: &str);

    /// History entries, oldest first.
    fn history(&self) -> Vec<String>;
}

/// Open the terminal-bound backend for `reader`.
///
/// `LineReader::Basic` binds to the process's stdin and stdout.
pub fn open_terminal(reader: LineReader) -> Result<Box<dyn LineEditor>> {
    match reader {
        LineReader::Basic => Ok(Box::new(BasicEditor::new(io::stdin().lock(), io::stdout()))),
        LineReader::Emacs | LineReader::Vi => TerminalEditor::new(reader)
            .map(|editor| Box::new(editor) as Box<dyn LineEditor>)
            .map_err(|source| Error::EditorInit {
                name: reader.name(),
                source,
            }),
        LineReader::None => Err(Error::EditorInit {
            name: reader.name(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "no line reader selected"),
        }),
    }
}

/// Open a backend over an arbitrary stream pair, such as a socket.
///
/// Terminal backends cannot drive a plain stream, so every reader maps to
/// the basic backend here.
pub fn open_stream<R, W>(input: R, prompt_out: W) -> Box<dyn LineEditor>
where
    R: BufRead + 'static,
    W: Write + 'static,
{
    Box::new(BasicEditor::new(input, prompt_out))
}
