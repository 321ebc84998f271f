//! Interactive line strategy.
//!
//! Wraps a [`LineEditor`] with the session prompt and optional history
//! file. History is loaded before the first prompt and saved when the
//! source is dropped, so every exit path persists it.

use std::io;

use super::LineSource;
use crate::editor::LineEditor;
use crate::history::HistoryFile;

pub struct InteractiveSource {
    editor: Box<dyn LineEditor>,
    prompt: String,
    history: Option<HistoryFile>,
}

impl InteractiveSource {
    pub fn new(
        mut editor: Box<dyn LineEditor>,
        prompt: String,
        history: Option<HistoryFile>,
    ) -> Self {
        if let Some(history) = &history {
            for entry in history.load() {
                editor.add_history(&entry);
            }
        }

        Self {
            editor,
            prompt,
            history,
        }
    }

    /// Current history, oldest first.
    #[cfg(test)]
    pub fn history(&self) -> Vec<String> {
        self.editor.history()
    }
}

impl LineSource for InteractiveSource {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let Some(mut line) = self.editor.read_line(&self.prompt)? else {
            return Ok(None);
        };

        // Empty lines are echoed but never recorded.
        if !line.is_empty() {
            self.editor.add_history(&line);
        }
        line.push('\n');
        Ok(Some(line))
    }
}

impl Drop for InteractiveSource {
    fn drop(&mut self) {
        if let Some(history) = &self.history {
            history.save(&self.editor.history());
        }
    }
}
