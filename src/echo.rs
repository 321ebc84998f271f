//! The echo loop.
//!
//! Two states: `Reading` pulls a line from the source and writes it to the
//! sink, flushing after every line; `Done` is reached on end of input or on
//! the first read or write failure. Failures are logged and end the session
//! without being propagated.

use std::io::{self, Write};

use tracing::{debug, error};

use crate::source::LineSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Reading,
    Done,
}

/// Drain `source` into `sink`, returning the number of lines written.
pub fn run<S, W>(source: &mut S, sink: &mut W) -> usize
where
    S: LineSource + ?Sized,
    W: Write + ?Sized,
{
    let mut state = State::Reading;
    let mut echoed = 0;

    while state == State::Reading {
        state = match source.next_line() {
            Ok(Some(line)) => match write_line(sink, &line) {
                Ok(true) => {
                    echoed += 1;
                    State::Reading
                }
                Ok(false) => State::Reading,
                Err(e) => {
                    error!(error = %e, "Write failed");
                    State::Done
                }
            },
            Ok(None) => {
                debug!(lines = echoed, "End of input");
                State::Done
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => State::Done,
            Err(e) => {
                error!(error = %e, "Read failed");
                State::Done
            }
        };
    }

    echoed
}

/// Write one line, terminating it if needed. Empty lines are skipped.
fn write_line<W: Write + ?Sized>(sink: &mut W, line: &str) -> io::Result<bool> {
    if line.is_empty() {
        return Ok(false);
    }

    sink.write_all(line.as_bytes())?;
    if !line.ends_with('\n') {
        sink.write_all(b"\n")?;
    }
    sink.flush()?;
    Ok(true)
}
