use crate::cmd::{build_message, EncodeArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_wire, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let message = build_message(&args.args);
    print_wire(message.as_bytes(), message.len(), format);
    Ok(SUCCESS)
}
