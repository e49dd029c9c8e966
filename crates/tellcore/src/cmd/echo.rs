use std::path::PathBuf;

use tellcore_message::{MessageError, MessageWriter, ResponseReader};
use tellcore_transport::{IpcStream, ServiceSocket};

use crate::cmd::EchoArgs;
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS};

/// How one client connection ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// Client closed on a token boundary.
    Clean,
    /// Client vanished mid-token or sent something unframeable.
    Aborted(String),
}

pub fn run(args: EchoArgs) -> CliResult<i32> {
    let service =
        ServiceSocket::bind(&args.path).map_err(|err| transport_error("bind failed", err))?;
    install_ctrlc_handler(args.path.clone())?;

    loop {
        let stream = service
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;

        match echo_tokens(stream) {
            Ok(SessionEnd::Clean) => tracing::info!("client disconnected"),
            Ok(SessionEnd::Aborted(reason)) => {
                tracing::warn!(%reason, "client session aborted")
            }
            Err(err) => return Err(err),
        }

        if args.once {
            return Ok(SUCCESS);
        }
    }
}

/// Echo every token back as soon as it is framed.
fn echo_tokens(stream: IpcStream) -> CliResult<SessionEnd> {
    let reader_stream = stream
        .try_clone()
        .map_err(|err| transport_error("clone failed", err))?;
    let mut reader = ResponseReader::new(reader_stream);
    let mut writer = MessageWriter::new(stream);

    loop {
        let token = match reader.read_token_or_end() {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(SessionEnd::Clean),
            Err(err) => return Ok(classify_read_error(err)),
        };

        tracing::info!(tag = %token.tag(), value = %token, "echoing token");
        if let Err(err) = writer.send_token(&token) {
            return Ok(SessionEnd::Aborted(err.to_string()));
        }
    }
}

fn classify_read_error(err: MessageError) -> SessionEnd {
    match err {
        MessageError::TransportClosed => SessionEnd::Aborted("closed mid-token".to_string()),
        other => SessionEnd::Aborted(other.to_string()),
    }
}

fn install_ctrlc_handler(path: PathBuf) -> CliResult<()> {
    // `accept` blocks, so stop from the handler and tidy the socket file here.
    ctrlc::set_handler(move || {
        let _ = std::fs::remove_file(&path);
        std::process::exit(SUCCESS);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
