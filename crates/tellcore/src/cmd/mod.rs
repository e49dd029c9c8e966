use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use tellcore_message::{integer_from_text, Message, Token};
use tellcore_transport::DEFAULT_SERVICE_PATH;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod call;
pub mod decode;
pub mod echo;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one command to the service and print its typed results.
    Call(CallArgs),
    /// Print the wire form of a message.
    Encode(EncodeArgs),
    /// Decode wire text into tokens.
    Decode(DecodeArgs),
    /// Run a service stand-in that echoes every token back.
    Echo(EchoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Call(args) => call::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Echo(args) => echo::run(args),
        Command::Version(args) => version::run(args),
    }
}

/// A command-line argument destined for a message.
///
/// `i:<n>` is an integer, `s:<text>` is text, anything else is taken as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedArg(pub Token);

impl FromStr for TypedArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(number) = s.strip_prefix("i:") {
            return integer_from_text(number)
                .map(|v| TypedArg(Token::Integer(v)))
                .map_err(|err| err.to_string());
        }
        let text = s.strip_prefix("s:").unwrap_or(s);
        Ok(TypedArg(Token::from(text)))
    }
}

/// Result token kinds a call should read, in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Expect {
    Int,
    Text,
    Bool,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Command identifier, sent as the first text token.
    pub command: String,
    /// Arguments: `i:<n>` for integers, `s:<text>` or bare words for text.
    pub args: Vec<TypedArg>,
    /// Result tokens to read (comma-separated, in order).
    #[arg(long, short = 'e', value_delimiter = ',')]
    pub expect: Vec<Expect>,
    /// Service socket path.
    #[arg(long, env = "TELLCORE_SOCKET", default_value = DEFAULT_SERVICE_PATH)]
    pub socket: PathBuf,
    /// Bound on each read and write (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Tokens to encode: `i:<n>` for integers, `s:<text>` or bare words for text.
    pub args: Vec<TypedArg>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Wire text to decode. Read from stdin when omitted.
    #[arg(long)]
    pub data: Option<String>,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Exit after the first client disconnects.
    #[arg(long)]
    pub once: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn build_message<'a>(args: impl IntoIterator<Item = &'a TypedArg>) -> Message {
    args.into_iter().map(|arg| arg.0.clone()).collect()
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
