use tellcore_message::Token;
use tellcore_session::{Reply, Session, SessionConfig};

use crate::cmd::{build_message, parse_duration, CallArgs, Expect, TypedArg};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_tokens, OutputFormat};

pub fn run(args: CallArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let config = SessionConfig::new(&args.socket).with_timeout(timeout);

    let command = TypedArg(Token::from(args.command.as_str()));
    let message = build_message(std::iter::once(&command).chain(&args.args));

    let session = Session::open(&config).map_err(|err| session_error("connect failed", err))?;
    tracing::debug!(command = %args.command, arguments = args.args.len(), "calling service");

    let tokens = session
        .call(&message, |reply| read_expected(reply, &args.expect))
        .map_err(|err| session_error("call failed", err))?;
    session
        .close()
        .map_err(|err| session_error("close failed", err))?;

    print_tokens(&tokens, format);
    Ok(SUCCESS)
}

fn read_expected(reply: &mut Reply<'_>, expect: &[Expect]) -> tellcore_message::Result<Vec<Token>> {
    expect
        .iter()
        .map(|kind| match kind {
            Expect::Int => reply.read_integer().map(Token::Integer),
            Expect::Text => reply.read_text().map(Token::Text),
            Expect::Bool => reply.read_bool().map(Token::from),
        })
        .collect()
}
