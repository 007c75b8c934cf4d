//! Command-line interface for ztna-client.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Gateway base URL.
    pub gateway_url: Option<String>,
    /// Policy engine base URL.
    pub policy_url: Option<String>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Directory holding durable client state.
    pub state_dir: Option<PathBuf>,
    /// Access credential; when given, a session is established at startup.
    pub credential: Option<String>,
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
            Short('g') | Long("gateway-url") => {
                result.gateway_url = Some(parser.value()?.parse()?);
            }
            Short('P') | Long("policy-url") => {
                result.policy_url = Some(parser.value()?.parse()?);
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('s') | Long("state-dir") => {
                result.state_dir = Some(parser.value()?.parse()?);
            }
            Short('k') | Long("credential") => {
                result.credential = Some(parser.value()?.parse()?);
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

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"ztna-client {version}
Zero-trust network access client

USAGE:
    ztna-client [OPTIONS]

OPTIONS:
    -g, --gateway-url <URL>   Gateway base URL [default: http://localhost:5001]
    -P, --policy-url <URL>    Policy engine base URL [default: http://localhost:5002]
    -c, --config <FILE>       Path to configuration file (JSON)
    -s, --state-dir <DIR>     Directory for durable client state
    -k, --credential <TOKEN>  Access credential; connect at startup
    -l, --log-level <LVL>     Log level (error, warn, info, debug, trace)
    -h, --help                Print help
    -V, --version             Print version

ENVIRONMENT VARIABLES:
    ZTNA_CLIENT_GATEWAY_URL   Gateway base URL (overrides config)
    ZTNA_CLIENT_POLICY_URL    Policy engine base URL (overrides config)
    ZTNA_CLIENT_STATE_DIR     State directory (overrides config)
    ZTNA_CLIENT_LOG_LEVEL     Log level (overrides config)
    RUST_LOG                  Alternative log level setting

EXAMPLES:
    # Rediscover and track a persisted session, no new connect
    ztna-client

    # Establish a session against a specific gateway
    ztna-client -g https://gw.corp.example -k "$ZTNA_TOKEN"

    # Start with config file
    ztna-client -c /etc/ztna-client/config.json
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("ztna-client {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
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
