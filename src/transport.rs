//! Transport selection.
//!
//! Picks exactly one input origin per run, in precedence order:
//! 1. `--eval`: print the literal and stop
//! 2. `--connect-to`: forward local input to a remote listener
//! 3. `--socket`: accept a single connection and echo its lines back
//! 4. otherwise: echo a file or standard input to standard output

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::echo;
use crate::error::{Error, Result};
use crate::source::{self, LineSource};

/// Upper bound on establishing an outbound connection.
const DIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Run one session as selected by `config`.
pub fn run(config: &Config) -> Result<()> {
    if let Some(text) = &config.eval {
        return eval(text, &mut io::stdout());
    }

    if let Some(address) = &config.connect_to {
        return forward(address, config);
    }

    if let Some(address) = &config.socket {
        let listener = listen(address)?;
        return serve(listener, config);
    }

    let mut source = open_local(config)?;
    let echoed = echo::run(source.as_mut(), &mut io::stdout());
    info!(lines = echoed, "Session finished");
    Ok(())
}

/// Write `text` and a newline to `out`.
pub fn eval<W: Write>(text: &str, out: &mut W) -> Result<()> {
    writeln!(out, "{text}")
        .and_then(|()| out.flush())
        .map_err(Error::Output)
}

/// Source over the configured input file, or stdin when none is set.
fn open_local(config: &Config) -> Result<Box<dyn LineSource>> {
    match &config.filename {
        Some(path) => {
            let file = File::open(path).map_err(|source| Error::OpenInput {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "Reading from file");
            Ok(source::from_stream(config, BufReader::new(file), io::stdout()))
        }
        None => source::from_stdin(config),
    }
}

/// Connect to `address` and send it every local input line.
///
/// Replies from the remote side are not read.
fn forward(address: &str, config: &Config) -> Result<()> {
    let mut stream = dial(address)?;
    info!(address, "Connected to remote listener");

    let mut source = open_local(config)?;
    let forwarded = echo::run(source.as_mut(), &mut stream);
    info!(lines = forwarded, "Forwarding finished");
    Ok(())
}

/// Open an outbound connection, trying each resolved address in turn.
pub fn dial(address: &str) -> Result<TcpStream> {
    let dial_error = |source| Error::Dial {
        address: address.to_string(),
        source,
    };

    let mut last_error = io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing");
    for addr in address.to_socket_addrs().map_err(dial_error)? {
        match TcpStream::connect_timeout(&addr, DIAL_TIMEOUT) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!(addr = %addr, error = %e, "Connect attempt failed");
                last_error = e;
            }
        }
    }
    Err(dial_error(last_error))
}

/// Bind a listener on `address` with a backlog of one.
pub fn listen(address: &str) -> Result<TcpListener> {
    let listen_error = |source| Error::Listen {
        address: address.to_string(),
        source,
    };

    let addr = address
        .to_socket_addrs()
        .map_err(listen_error)?
        .next()
        .ok_or_else(|| {
            listen_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "address resolved to nothing",
            ))
        })?;

    create_listener(addr).map_err(listen_error)
}

fn create_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1)?;

    Ok(socket.into())
}

/// Accept exactly one connection on `listener` and echo it until it closes.
///
/// The listener is closed as soon as the connection is accepted.
pub fn serve(listener: TcpListener, config: &Config) -> Result<()> {
    let local = listener.local_addr().map_err(|source| Error::Listen {
        address: config.socket.clone().unwrap_or_default(),
        source,
    })?;
    notice(format_args!("Listening on {local}"));
    info!(address = %local, "Waiting for a connection");

    let (stream, peer) = listener.accept().map_err(Error::Accept)?;
    drop(listener);
    notice(format_args!("Accepted connection from {peer}"));
    info!(peer = %peer, "Accepted connection");

    session(stream, peer, config)
}

fn session(mut stream: TcpStream, peer: SocketAddr, config: &Config) -> Result<()> {
    if let Err(e) = greet(&mut stream, peer) {
        warn!(peer = %peer, error = %e, "Cannot greet peer");
        return Ok(());
    }

    let reader = stream.try_clone().map_err(Error::Accept)?;
    let prompt_out = stream.try_clone().map_err(Error::Accept)?;
    let mut source = source::from_stream(config, BufReader::new(reader), prompt_out);

    let echoed = echo::run(source.as_mut(), &mut stream);
    info!(peer = %peer, lines = echoed, "Connection closed");
    Ok(())
}

fn greet(stream: &mut TcpStream, peer: SocketAddr) -> io::Result<()> {
    writeln!(stream, "Welcome {peer}! Close the connection to end the session.")?;
    stream.flush()
}

/// Print a user-facing notice on stdout.
fn notice(message: std::fmt::Arguments<'_>) {
    let mut out = io::stdout();
    if let Err(e) = writeln!(out, "{message}").and_then(|()| out.flush()) {
        debug!(error = %e, "Cannot print notice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Action, LineReader};
    use std::io::{BufRead, Read};
    use std::thread;

    fn local_listener() -> TcpListener {
        listen("127.0.0.1:0").unwrap()
    }

    #[test]
    fn test_eval_writes_line() {
        let mut out = Vec::new();
        eval("x", &mut out).unwrap();
        assert_eq!(out, b"x\n");
    }

    #[test]
    fn test_listen_failure() {
        match listen("no-port-here") {
            Err(e @ Error::Listen { .. }) => assert_eq!(e.exit_code(), 12),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_listen_address_in_use() {
        let listener = local_listener();
        let addr = listener.local_addr().unwrap().to_string();
        assert!(matches!(listen(&addr), Err(Error::Listen { .. })));
    }

    #[test]
    fn test_dial_failure() {
        let listener = local_listener();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        match dial(&addr) {
            Err(e @ Error::Dial { .. }) => assert_eq!(e.exit_code(), 15),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_dial_success() {
        let listener = local_listener();
        let addr = listener.local_addr().unwrap();
        let stream = dial(&addr.to_string()).unwrap();
        assert_eq!(stream.peer_addr().unwrap(), addr);
    }

    #[test]
    fn test_serve_single_connection() {
        let listener = local_listener();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || serve(listener, &Config::default()));

        let mut client = TcpStream::connect(addr).unwrap();
        let mut reader = BufReader::new(client.try_clone().unwrap());

        let mut greeting = String::new();
        reader.read_line(&mut greeting).unwrap();
        assert!(greeting.starts_with("Welcome "));
        assert!(greeting.ends_with("Close the connection to end the session.\n"));

        client.write_all(b"hello\r\n").unwrap();
        let mut echoed = String::new();
        reader.read_line(&mut echoed).unwrap();
        assert_eq!(echoed, "hello\n");

        client.shutdown(std::net::Shutdown::Write).unwrap();
        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert!(rest.is_empty());

        server.join().unwrap().unwrap();
        assert!(TcpStream::connect(addr).is_err());
    }

    #[test]
    fn test_serve_interactive_prompts_on_connection() {
        let listener = local_listener();
        let addr = listener.local_addr().unwrap();
        let config = Config {
            line_reader: LineReader::Basic,
            prompt: "> ".to_string(),
            ..Config::default()
        };
        let server = thread::spawn(move || serve(listener, &config));

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"ping\n").unwrap();
        client.shutdown(std::net::Shutdown::Write).unwrap();

        let mut received = String::new();
        client.read_to_string(&mut received).unwrap();
        let (greeting, rest) = received.split_once('\n').unwrap();
        assert!(greeting.starts_with("Welcome "));
        assert_eq!(rest, "> ping\n> ");

        server.join().unwrap().unwrap();
    }

    #[test]
    fn test_serve_from_terminal_sends_no_prompt() {
        let config = match Config::from_args(["echoline", "--socket", "127.0.0.1:0"], true) {
            Ok(Action::Run(config)) => config,
            other => panic!("unexpected: {:?}", other),
        };
        let listener = local_listener();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || serve(listener, &config));

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"hello\n").unwrap();
        client.shutdown(std::net::Shutdown::Write).unwrap();

        let mut received = String::new();
        client.read_to_string(&mut received).unwrap();
        let (greeting, rest) = received.split_once('\n').unwrap();
        assert!(greeting.starts_with("Welcome "));
        assert_eq!(rest, "hello\n");

        server.join().unwrap().unwrap();
    }

    #[test]
    fn test_forward_sends_file_lines() {
        let mut input = tempfile::NamedTempFile::new().unwrap();
        input.write_all(b"one\r\ntwo").unwrap();

        let listener = local_listener();
        let addr = listener.local_addr().unwrap();
        let config = Config {
            filename: Some(input.path().to_path_buf()),
            ..Config::default()
        };

        let receiver = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut received = String::new();
            stream.read_to_string(&mut received).unwrap();
            received
        });

        forward(&addr.to_string(), &config).unwrap();
        assert_eq!(receiver.join().unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_missing_input_file() {
        let config = Config {
            filename: Some("/nonexistent/echoline-input".into()),
            ..Config::default()
        };
        match open_local(&config) {
            Err(e @ Error::OpenInput { .. }) => assert_eq!(e.exit_code(), 11),
            Err(other) => panic!("unexpected: {:?}", other),
            Ok(_) => panic!("opened a missing file"),
        }
    }
}
