//! Stream-bound line reader.
//!
//! Writes the prompt to its output stream and reads whole lines from its
//! input. No terminal control is attempted, which makes it usable over a
//! socket or a pipe.

use std::io::{self, BufRead, Write};

use super::LineEditor;

pub struct BasicEditor<R, W> {
    input: R,
    prompt_out: W,
    history: Vec<String>,
}

impl<R: BufRead, W: Write> BasicEditor<R, W> {
    pub fn new(input: R, prompt_out: W) -> Self {
        Self {
            input,
            prompt_out,
            history: Vec::new(),
        }
    }
}

impl<R: BufRead, W: Write> LineEditor for BasicEditor<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if !prompt.is_empty() {
            self.prompt_out.write_all(prompt.as_bytes())?;
            self.prompt_out.flush()?;
        }

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn add_history(&mut self, entry: &str) {
        self.history.push(entry.to_string());
    }

    fn history(&self) -> Vec<String> {
        self.history.clone()
    }
}
