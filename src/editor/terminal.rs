//! Terminal line reader backed by rustyline.

use std::io;

use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{EditMode, Editor};
use tracing::debug;

use super::LineEditor;
use crate::config::LineReader;

/// Full terminal editing with emacs or vi key bindings.
pub struct TerminalEditor {
    editor: Editor<(), FileHistory>,
}

impl TerminalEditor {
    pub fn new(reader: LineReader) -> io::Result<Self> {
        let edit_mode = match reader {
            LineReader::Vi => EditMode::Vi,
            _ => EditMode::Emacs,
        };

        // History is recorded explicitly so every backend follows one policy.
        let config = Config::builder()
            .edit_mode(edit_mode)
            .auto_add_history(false)
            .build();

        let editor = Editor::with_config(config).map_err(into_io)?;
        debug!(line_reader = reader.name(), "Terminal line reader ready");
        Ok(Self { editor })
    }
}

impl LineEditor for TerminalEditor {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        read_result(self.editor.readline(prompt))
    }

    fn add_history(&mut self, entry: &str) {
        if let Err(e) = self.editor.add_history_entry(entry) {
            debug!(error = %e, "History entry rejected");
        }
    }

    fn history(&self) -> Vec<String> {
        self.editor.history().iter().cloned().collect()
    }
}

/// End of input and Ctrl-C both close the session.
fn read_result(result: rustyline::Result<String>) -> io::Result<Option<String>> {
    match result {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Eof) => Ok(None),
        Err(ReadlineError::Interrupted) => {
            debug!("Input interrupted");
            Ok(None)
        }
        Err(e) => Err(into_io(e)),
    }
}

fn into_io(e: ReadlineError) -> io::Error {
    match e {
        ReadlineError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}
