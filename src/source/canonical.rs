//! Canonical line strategy: the platform's buffered line read.

use std::io::{self, BufRead};

use super::LineSource;

/// Reads newline-delimited lines, keeping each terminator as read.
pub struct CanonicalSource<R> {
    input: R,
}

impl<R: BufRead> CanonicalSource<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> LineSource for CanonicalSource<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        match self.input.read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }
}
