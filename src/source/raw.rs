//! Raw line strategy.
//!
//! Lines are rebuilt one byte at a time by [`LineAssembler`]. Carriage
//! returns are dropped wherever they appear and a newline emits the pending
//! line. Working on bytes is equivalent to working on code points here,
//! since both terminators are ASCII and never occur inside a UTF-8 sequence.
//! Invalid UTF-8 is replaced with U+FFFD.

use std::io::{self, BufRead};
use std::mem;

use super::LineSource;

/// Outcome of feeding one byte to a [`LineAssembler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The byte was absorbed (or dropped); no line is complete yet.
    Accumulate,
    /// A newline completed this line (terminator not included).
    Emit(String),
}

/// Accumulate/emit state machine behind the raw strategy.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, byte: u8) -> Step {
        match byte {
            b'\r' => Step::Accumulate,
            b'\n' => Step::Emit(self.take()),
            other => {
                self.pending.push(other);
                Step::Accumulate
            }
        }
    }

    /// Flush a trailing partial line at end of input.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.take())
        }
    }

    fn take(&mut self) -> String {
        let bytes = mem::take(&mut self.pending);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

pub struct RawSource<R> {
    input: R,
    assembler: LineAssembler,
}

impl<R: BufRead> RawSource<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            assembler: LineAssembler::new(),
        }
    }
}

impl<R: BufRead> LineSource for RawSource<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let buf = match self.input.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if buf.is_empty() {
                return Ok(self.assembler.finish().map(terminate));
            }

            let mut used = 0;
            let mut emitted = None;
            for &byte in buf {
                used += 1;
                if let Step::Emit(line) = self.assembler.push(byte) {
                    emitted = Some(line);
                    break;
                }
            }
            self.input.consume(used);

            if let Some(line) = emitted {
                return Ok(Some(terminate(line)));
            }
        }
    }
}

fn terminate(mut line: String) -> String {
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn feed(assembler: &mut LineAssembler, input: &[u8]) -> Vec<String> {
        input
            .iter()
            .filter_map(|&b| match assembler.push(b) {
                Step::Emit(line) => Some(line),
                Step::Accumulate => None,
            })
            .collect()
    }

    #[test]
    fn test_assembler_emits_on_newline() {
        let mut assembler = LineAssembler::new();
        assert_eq!(feed(&mut assembler, b"ab\ncd\n"), vec!["ab", "cd"]);
        assert_eq!(assembler.finish(), None);
    }

    #[test]
    fn test_assembler_drops_carriage_returns() {
        let mut assembler = LineAssembler::new();
        assert_eq!(feed(&mut assembler, b"a\r\nb\rc\n\r\n"), vec!["a", "bc", ""]);
    }

    #[test]
    fn test_assembler_lone_carriage_return() {
        let mut assembler = LineAssembler::new();
        assert_eq!(assembler.push(b'\r'), Step::Accumulate);
        assert_eq!(assembler.finish(), None);
    }

    #[test]
    fn test_assembler_finish_partial() {
        let mut assembler = LineAssembler::new();
        assert!(feed(&mut assembler, b"tail").is_empty());
        assert_eq!(assembler.finish().as_deref(), Some("tail"));
        assert_eq!(assembler.finish(), None);
    }

    #[test]
    fn test_assembler_multibyte() {
        let mut assembler = LineAssembler::new();
        assert_eq!(feed(&mut assembler, "héllo ✓\n".as_bytes()), vec!["héllo ✓"]);
    }

    #[test]
    fn test_assembler_invalid_utf8() {
        let mut assembler = LineAssembler::new();
        assert_eq!(feed(&mut assembler, b"a\xffb\n"), vec!["a\u{fffd}b"]);
    }

    #[test]
    fn test_raw_source_final_partial_line() {
        let mut source = RawSource::new(Cursor::new("a\nb\nc"));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("a\n"));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("b\n"));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("c\n"));
        assert_eq!(source.next_line().unwrap(), None);
    }

    #[test]
    fn test_raw_source_empty_lines() {
        let mut source = RawSource::new(Cursor::new("\n\r\n"));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("\n"));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("\n"));
        assert_eq!(source.next_line().unwrap(), None);
    }

    #[test]
    fn test_raw_source_small_buffer() {
        let input = io::BufReader::with_capacity(2, Cursor::new("long line\r\nx\n"));
        let mut source = RawSource::new(input);
        assert_eq!(source.next_line().unwrap().as_deref(), Some("long line\n"));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("x\n"));
        assert_eq!(source.next_line().unwrap(), None);
    }
}
