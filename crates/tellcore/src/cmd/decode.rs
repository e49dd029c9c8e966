use std::io::Read;

use tellcore_message::TokenCursor;

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, message_error, CliResult, SUCCESS};
use crate::output::{print_tokens, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = match args.data {
        Some(data) => data.into_bytes(),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed reading stdin", err))?;
            buf
        }
    };

    let tokens = TokenCursor::new(wire)
        .into_tokens()
        .map_err(|err| message_error("decode failed", err))?;
    print_tokens(&tokens, format);
    Ok(SUCCESS)
}
