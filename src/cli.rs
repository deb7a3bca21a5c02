//! Command-line interface for shell-mirror.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;

use lexopt::ValueExt;

/// Command-line arguments.
///
/// Options left unset fall through to the environment, the config file
/// and then the built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Host address to bind to.
    pub host: Option<IpAddr>,
    /// Port to listen on.
    pub port: Option<u16>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Shell program to run.
    pub shell: Option<String>,
    /// Screen buffer capacity in lines.
    pub max_lines: Option<usize>,
    /// Raw log capacity in chunks.
    pub max_buffer: Option<usize>,
    /// Drop escape sequences left open at a chunk boundary.
    pub discard_partial: bool,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('H') | Long("host") => {
                result.host = Some(parse_value(&mut parser, "host")?);
            }
            Short('p') | Long("port") => {
                result.port = Some(parse_value(&mut parser, "port")?);
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('s') | Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Long("max-lines") => {
                result.max_lines = Some(parse_capacity(&mut parser, "max-lines")?);
            }
            Long("max-buffer") => {
                result.max_buffer = Some(parse_capacity(&mut parser, "max-buffer")?);
            }
            Long("discard-partial") => {
                result.discard_partial = true;
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

fn parse_value<T: std::str::FromStr>(
    parser: &mut lexopt::Parser,
    name: &'static str,
) -> Result<T, ArgsError> {
    let value: String = parser.value()?.parse()?;
    value
        .parse()
        .map_err(|_| ArgsError::InvalidValue(name, value))
}

fn parse_capacity(parser: &mut lexopt::Parser, name: &'static str) -> Result<usize, ArgsError> {
    let value: String = parser.value()?.parse()?;
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ArgsError::InvalidValue(name, value)),
    }
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"shell-mirror {version}
Run a shell in a PTY and mirror its screen over HTTP

USAGE:
    shell-mirror [OPTIONS]

OPTIONS:
    -H, --host <ADDR>       Host address to bind [default: 127.0.0.1]
    -p, --port <PORT>       Port to listen on [default: 3000]
    -c, --config <FILE>     Path to configuration file (JSON)
    -s, --shell <PROGRAM>   Shell to run [default: $SHELL]
        --max-lines <N>     Screen lines to keep [default: 1000]
        --max-buffer <N>    Raw output chunks to keep [default: 1000]
        --discard-partial   Drop escape sequences split across reads
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    SHELL_MIRROR_HOST       Host address (overrides config)
    SHELL_MIRROR_PORT       Port number (overrides config)
    SHELL_MIRROR_SHELL      Shell program (overrides config)
    SHELL_MIRROR_MAX_LINES  Screen lines to keep (overrides config)
    SHELL_MIRROR_LOG_LEVEL  Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Start with defaults (localhost:3000, $SHELL)
    shell-mirror

    # Read the last 10 lines without escape codes
    curl 'http://127.0.0.1:3000/api/output?lines=10&strip=true'

    # Type a command, then press Ctrl+C
    curl -X POST -H 'Content-Type: application/json' \
         -d '{{"text":"ls -la\n"}}' http://127.0.0.1:3000/api/input
    curl -X POST -H 'Content-Type: application/json' \
         -d '{{"control":"c"}}' http://127.0.0.1:3000/api/input
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("shell-mirror {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
