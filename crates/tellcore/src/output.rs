use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tellcore_message::{Message, Tag, Token};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct TokensOutput {
    tokens: Vec<TokenOutput>,
}

#[derive(Serialize)]
struct TokenOutput {
    index: usize,
    #[serde(rename = "type")]
    kind: &'static str,
    value: serde_json::Value,
}

impl TokenOutput {
    fn new(index: usize, token: &Token) -> Self {
        let value = match token {
            Token::Integer(v) => serde_json::Value::from(*v),
            Token::Text(text) => serde_json::Value::from(text.as_str()),
        };
        Self {
            index,
            kind: kind_name(token.tag()),
            value,
        }
    }
}

#[derive(Serialize)]
struct WireOutput<'a> {
    wire: &'a str,
    tokens: usize,
    bytes: usize,
}

/// Print decoded tokens in the requested format.
pub fn print_tokens(tokens: &[Token], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = TokensOutput {
                tokens: tokens
                    .iter()
                    .enumerate()
                    .map(|(i, t)| TokenOutput::new(i, t))
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "TYPE", "VALUE"]);
            for (i, token) in tokens.iter().enumerate() {
                table.add_row(vec![
                    i.to_string(),
                    kind_name(token.tag()).to_string(),
                    token.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (i, token) in tokens.iter().enumerate() {
                println!("#{i} {} {token}", kind_name(token.tag()));
            }
        }
        OutputFormat::Raw => {
            let msg: Message = tokens.iter().cloned().collect();
            print_raw(msg.as_bytes());
        }
    }
}

/// Print a serialized message in the requested format.
pub fn print_wire(wire: &[u8], tokens: usize, format: OutputFormat) {
    let text = String::from_utf8_lossy(wire);
    match format {
        OutputFormat::Json => {
            let out = WireOutput {
                wire: &text,
                tokens,
                bytes: wire.len(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TOKENS", "BYTES", "WIRE"])
                .add_row(vec![tokens.to_string(), wire.len().to_string(), text.into_owned()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{text}"),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn kind_name(tag: Tag) -> &'static str {
    match tag {
        Tag::Integer => "integer",
        Tag::Text => "text",
    }
}
