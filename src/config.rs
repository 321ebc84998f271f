//! Configuration module for echoline.
//!
//! Supports both command-line arguments and a TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use serde::Deserialize;
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Command-line arguments for echoline.
///
/// Value-taking options accept hyphenated values so that `-e -5` works;
/// option-looking values are rejected afterwards by [`CliArgs::check_values`].
#[derive(Parser, Debug)]
#[command(name = "echoline")]
#[command(author = "echoline authors")]
#[command(about = "Echo lines from stdin, a file, or a single TCP connection", long_about = None)]
#[command(disable_version_flag = true, args_override_self = true)]
pub struct CliArgs {
    /// Print version and supported line readers
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Print STRING and exit without reading any input
    #[arg(short = 'e', long, value_name = "STRING", allow_hyphen_values = true)]
    pub eval: Option<String>,

    /// Read lines from PATH instead of stdin
    #[arg(long = "file", value_name = "PATH", allow_hyphen_values = true)]
    pub file: Option<String>,

    /// Disable interactive line editing
    #[arg(long)]
    pub no_readline: bool,

    /// Interactive line reader (basic, emacs, vi, none)
    #[arg(long, value_name = "NAME", allow_hyphen_values = true)]
    pub line_reader: Option<String>,

    /// Keep line terminators as read instead of rebuilding each line
    #[arg(long)]
    pub canonical: bool,

    /// Forward local input to a remote listener at ADDRESS
    #[arg(long, value_name = "ADDRESS", allow_hyphen_values = true)]
    pub connect_to: Option<String>,

    /// Accept a single connection on ADDRESS and echo its lines
    #[arg(long, value_name = "ADDRESS", allow_hyphen_values = true)]
    pub socket: Option<String>,

    /// Prompt shown by the interactive line reader
    #[arg(long, value_name = "STRING", allow_hyphen_values = true)]
    pub prompt: Option<String>,

    /// History file loaded and saved by the interactive line reader
    #[arg(long, value_name = "PATH", allow_hyphen_values = true)]
    pub history: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH", allow_hyphen_values = true)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", allow_hyphen_values = true)]
    pub log_level: Option<String>,

    /// Input file ("-" for stdin); option parsing stops here
    #[arg(
        value_name = "FILE",
        num_args = 1..,
        trailing_var_arg = true,
        allow_negative_numbers = true
    )]
    pub input: Vec<String>,
}

impl CliArgs {
    /// Reject option values that are themselves options.
    pub fn check_values(&self) -> Result<()> {
        let values = [
            ("--eval", &self.eval),
            ("--file", &self.file),
            ("--line-reader", &self.line_reader),
            ("--connect-to", &self.connect_to),
            ("--socket", &self.socket),
            ("--prompt", &self.prompt),
            ("--history", &self.history),
            ("--config", &self.config),
            ("--log-level", &self.log_level),
        ];

        for (flag, value) in values {
            if let Some(value) = value {
                if !is_value(value) {
                    return Err(Error::MissingArgument(flag.to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Whether `arg` may be consumed as an option value.
///
/// A bare `-` and anything not starting with `-` are values, as is a dash
/// followed by a signed integer literal (`-5`, `--5`, `-+5`).
pub fn is_value(arg: &str) -> bool {
    arg == "-" || !arg.starts_with('-') || arg[1..].parse::<i64>().is_ok()
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Line reading configuration
#[derive(Debug, Deserialize, Default)]
pub struct SessionConfig {
    pub prompt: Option<String>,
    pub history: Option<PathBuf>,
    pub line_reader: Option<String>,
    #[serde(default)]
    pub canonical: bool,
}

/// Socket configuration
#[derive(Debug, Deserialize, Default)]
pub struct NetworkConfig {
    /// Address to accept a single connection on
    pub socket: Option<String>,
    /// Remote listener to forward input to
    pub connect_to: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Interactive line reader backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineReader {
    /// No interactive editing.
    None,
    /// Stream-bound reader with in-memory history; works on any byte stream.
    Basic,
    /// Terminal editor with emacs key bindings.
    Emacs,
    /// Terminal editor with vi key bindings.
    Vi,
}

impl LineReader {
    /// Names accepted by `--line-reader`, besides `none`.
    pub const SUPPORTED: [&'static str; 3] = ["basic", "emacs", "vi"];

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "none" => Ok(LineReader::None),
            "basic" => Ok(LineReader::Basic),
            "emacs" => Ok(LineReader::Emacs),
            "vi" => Ok(LineReader::Vi),
            _ => Err(Error::UnsupportedLineReader {
                name: name.to_string(),
                supported: Self::SUPPORTED.to_vec(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LineReader::None => "none",
            LineReader::Basic => "basic",
            LineReader::Emacs => "emacs",
            LineReader::Vi => "vi",
        }
    }

    /// Prompt used when none is configured.
    pub fn default_prompt(self) -> String {
        match self {
            LineReader::None => String::new(),
            other => format!("{}> ", other.name()),
        }
    }
}

/// How lines are pulled from the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Rebuild each line byte by byte, dropping carriage returns.
    Raw,
    /// Platform line reads; terminators are kept as read.
    Canonical,
    /// Prompted reads through an interactive line reader.
    Interactive(LineReader),
}

/// What the process should do once arguments are parsed.
#[derive(Debug)]
pub enum Action {
    /// Print the rendered usage and exit successfully.
    Help(String),
    /// Print version information and exit successfully.
    Version,
    /// Run a session.
    Run(Config),
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub eval: Option<String>,
    pub filename: Option<PathBuf>,
    pub socket: Option<String>,
    pub connect_to: Option<String>,
    pub prompt: String,
    pub history: Option<PathBuf>,
    pub line_reader: LineReader,
    pub canonical: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            eval: None,
            filename: None,
            socket: None,
            connect_to: None,
            prompt: String::new(),
            history: None,
            line_reader: LineReader::None,
            canonical: false,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the process arguments and optional TOML file.
    pub fn load() -> Result<Action> {
        Self::from_args(std::env::args_os(), std::io::stdin().is_terminal())
    }

    /// Parse `args` (including the program name).
    ///
    /// `interactive_stdin` decides the line reader when none is named.
    pub fn from_args<I, T>(args: I, interactive_stdin: bool) -> Result<Action>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = match CliArgs::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) => return classify_parse_error(e),
        };
        cli.check_values()?;

        if cli.version {
            return Ok(Action::Version);
        }

        let toml_config = TomlConfig::load(cli.config.as_deref().map(Path::new))?;
        Self::merge(cli, toml_config, interactive_stdin).map(Action::Run)
    }

    fn merge(cli: CliArgs, toml_config: TomlConfig, interactive_stdin: bool) -> Result<Self> {
        let mut positional = cli.input.into_iter();
        let filename = match (cli.file, positional.next()) {
            (Some(_), Some(first)) => {
                return Err(Error::ExcessArguments(
                    std::iter::once(first).chain(positional).collect(),
                ))
            }
            (Some(path), None) | (None, Some(path)) => Some(path),
            (None, None) => None,
        }
        .filter(|path| path != "-")
        .map(PathBuf::from);

        let excess: Vec<String> = positional.collect();
        if !excess.is_empty() {
            return Err(Error::ExcessArguments(excess));
        }

        let socket = cli.socket.or(toml_config.network.socket);
        let connect_to = cli.connect_to.or(toml_config.network.connect_to);
        let canonical = cli.canonical || toml_config.session.canonical;

        // Only an unconfigured session reading the terminal gets an editor
        let reads_terminal =
            interactive_stdin && filename.is_none() && (socket.is_none() || connect_to.is_some());

        let named = cli
            .line_reader
            .as_deref()
            .or(toml_config.session.line_reader.as_deref())
            .map(LineReader::from_name)
            .transpose()?;

        let line_reader = match named {
            _ if cli.no_readline => LineReader::None,
            Some(reader) => reader,
            None if reads_terminal && !canonical => LineReader::Emacs,
            None => LineReader::None,
        };

        Ok(Config {
            eval: cli.eval,
            filename,
            socket,
            connect_to,
            prompt: cli
                .prompt
                .or(toml_config.session.prompt)
                .unwrap_or_else(|| line_reader.default_prompt()),
            history: cli
                .history
                .map(PathBuf::from)
                .or(toml_config.session.history),
            line_reader,
            canonical,
            log_level: cli.log_level.unwrap_or(toml_config.logging.level),
        })
    }

    /// Line source strategy selected by this configuration.
    pub fn strategy(&self) -> Strategy {
        match self.line_reader {
            LineReader::None if self.canonical => Strategy::Canonical,
            LineReader::None => Strategy::Raw,
            reader => Strategy::Interactive(reader),
        }
    }
}

/// Map a clap failure onto the exit protocol.
fn classify_parse_error(e: clap::Error) -> Result<Action> {
    let invalid_arg = match e.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => Some(arg.clone()),
        _ => None,
    };

    match (e.kind(), invalid_arg) {
        (ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand, _) => {
            Ok(Action::Help(e.render().to_string()))
        }
        (ErrorKind::DisplayVersion, _) => Ok(Action::Version),
        (ErrorKind::UnknownArgument, Some(arg)) if !is_value(&arg) => {
            Err(Error::UnrecognizedOption(arg))
        }
        (ErrorKind::UnknownArgument, Some(arg)) => Err(Error::ExcessArguments(vec![arg])),
        // clap reports the option as "--eval <STRING>"
        (ErrorKind::InvalidValue, Some(arg)) => {
            let flag = arg
                .split_whitespace()
                .next()
                .unwrap_or(&arg)
                .trim_end_matches(',')
                .to_string();
            Err(Error::MissingArgument(flag))
        }
        (kind, _) => Err(Error::Usage(
            kind.as_str().unwrap_or("invalid usage").to_string(),
        )),
    }
}
