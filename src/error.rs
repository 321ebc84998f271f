//! Error types and the process exit protocol.
//!
//! Every fatal condition maps to one stable exit code. Steady-state read
//! errors never reach this type; the echo loop absorbs them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while configuring or setting up a session.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unrecognized option '{0}'")]
    UnrecognizedOption(String),

    /// Any other command-line usage error reported by the parser.
    #[error("{0}")]
    Usage(String),

    #[error("Missing argument for '{0}' option")]
    MissingArgument(String),

    #[error("Excess command-line arguments: {0:?}")]
    ExcessArguments(Vec<String>),

    #[error("Unsupported line reader '{name}' (supported: {})", .supported.join(", "))]
    UnsupportedLineReader {
        name: String,
        supported: Vec<&'static str>,
    },

    #[error("Failed to read config file '{}': {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot open input file '{}': {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot listen on '{address}': {source}")]
    Listen {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot accept connection: {0}")]
    Accept(#[source] io::Error),

    #[error("Cannot initialize line reader '{name}': {source}")]
    EditorInit {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Cannot connect to '{address}': {source}")]
    Dial {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write output: {0}")]
    Output(#[source] io::Error),
}

impl Error {
    /// Exit code reported to the shell for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Output(_) => 1,
            Error::UnrecognizedOption(_) | Error::Usage(_) => 2,
            Error::MissingArgument(_) => 3,
            Error::ExcessArguments(_) => 4,
            Error::UnsupportedLineReader { .. } => 5,
            Error::ConfigRead { .. } | Error::ConfigParse { .. } => 6,
            Error::OpenInput { .. } => 11,
            Error::Listen { .. } => 12,
            Error::Accept(_) => 13,
            Error::EditorInit { .. } => 14,
            Error::Dial { .. } => 15,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn io_err() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "boom")
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = vec![
            Error::Output(io_err()),
            Error::UnrecognizedOption("-x".into()),
            Error::MissingArgument("--eval".into()),
            Error::ExcessArguments(vec!["a".into()]),
            Error::UnsupportedLineReader {
                name: "ed".into(),
                supported: vec!["basic"],
            },
            Error::OpenInput {
                path: "missing".into(),
                source: io_err(),
            },
            Error::Listen {
                address: "x".into(),
                source: io_err(),
            },
            Error::Accept(io_err()),
            Error::EditorInit {
                name: "emacs",
                source: io_err(),
            },
            Error::Dial {
                address: "x".into(),
                source: io_err(),
            },
        ];

        let mut codes: Vec<u8> = errors.iter().map(Error::exit_code).collect();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
        assert!(!codes.contains(&0));
    }

    #[test]
    fn test_unsupported_line_reader_lists_names() {
        let err = Error::UnsupportedLineReader {
            name: "ed".into(),
            supported: vec!["basic", "emacs", "vi"],
        };
        assert_eq!(
            err.to_string(),
            "Unsupported line reader 'ed' (supported: basic, emacs, vi)"
        );
    }

    #[test]
    fn test_missing_argument_message() {
        let err = Error::MissingArgument("--eval".into());
        assert_eq!(err.to_string(), "Missing argument for '--eval' option");
        assert_eq!(err.exit_code(), 3);
    }
}
