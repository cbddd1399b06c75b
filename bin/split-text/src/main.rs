// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Split the text given as input parameter into message-sized chunks, and
//! print them in order as if each one was sent as a separate message.
//!
//! If the file is "-" or missing, it is read from standard input instead.
//!
//! ```sh
//! cargo run -p split-text -- [--config split.toml] [FILE|-]
//! ```
//!
//! The optional configuration file is TOML:
//!
//! ```toml
//! chat = "me"            # or "@username", "+34600000000", -1001234
//! max_length = 4096
//! delay_secs = 0.5
//! preserve_lines = true
//! link_preview = false
//! parse_mode = "markdown"
//! reply_to = 1234
//! ```
use grammers_long_message::{
    ChatRef, Deliver, DeliveryRequest, DispatchOptions, LongMessageConfig, ParseMode,
    send_long_message,
};
use clap::Parser;
use log::info;
use simple_logger::SimpleLogger;
use std::error::Error;
use std::fs;
use std::future::Future;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const STDIN_NAME: &str = "-";
const SEPARATOR: &str = "-----";

/// Split a text into message-sized chunks and print them in order.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// TOML file with the dispatch options.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File with the text to split, or "-" for standard input.
    input: Option<String>,
}

/// The destination as written in the configuration file: numeric ids may be
/// given as TOML integers, everything else as strings.
#[derive(Debug, PartialEq, serde::Deserialize)]
#[serde(untagged)]
enum ChatSetting {
    Id(i64),
    Name(String),
}

impl From<&ChatSetting> for ChatRef {
    fn from(setting: &ChatSetting) -> Self {
        match setting {
            ChatSetting::Id(id) => ChatRef::Id(*id),
            ChatSetting::Name(name) => ChatRef::parse(name),
        }
    }
}

#[derive(Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    chat: Option<ChatSetting>,
    max_length: Option<usize>,
    delay_secs: Option<f64>,
    preserve_lines: Option<bool>,
    link_preview: Option<bool>,
    parse_mode: Option<ParseMode>,
    reply_to: Option<i32>,
}

impl Config {
    fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn chat(&self) -> ChatRef {
        self.chat.as_ref().map(ChatRef::from).unwrap_or(ChatRef::Me)
    }

    fn long_message_config(&self) -> Result<LongMessageConfig, Box<dyn Error>> {
        let defaults = LongMessageConfig::default();
        let delay = match self.delay_secs {
            Some(secs) => Duration::try_from_secs_f64(secs)?,
            None => defaults.options.delay,
        };

        Ok(LongMessageConfig {
            max_length: self.max_length.unwrap_or(defaults.max_length),
            preserve_lines: self.preserve_lines.unwrap_or(defaults.preserve_lines),
            options: DispatchOptions {
                parse_mode: self.parse_mode,
                link_preview: self.link_preview.unwrap_or(defaults.options.link_preview),
                reply_to: self.reply_to,
                delay,
                ..defaults.options
            },
        })
    }
}

/// "Delivers" every chunk by printing it to standard output.
///
/// Handles are the 1-based position of the chunk in the output.
#[derive(Default)]
struct Stdout {
    printed: AtomicUsize,
}

impl Stdout {
    fn print(&self, chat: &ChatRef, request: &DeliveryRequest) -> io::Result<usize> {
        let id = self.printed.fetch_add(1, Ordering::Relaxed) + 1;

        let mut out = io::stdout().lock();
        write!(
            out,
            "{SEPARATOR} #{id} to {chat} ({} chars)",
            request.text.chars().count()
        )?;
        if let Some(reply_to) = request.reply_to {
            write!(out, ", in reply to {reply_to}")?;
        }
        if let Some(parse_mode) = request.parse_mode {
            write!(out, ", {parse_mode}")?;
        }
        writeln!(out)?;
        writeln!(out, "{}", request.text)?;
        out.flush()?;

        Ok(id)
    }
}

impl Deliver for Stdout {
    type Handle = usize;
    type Error = io::Error;

    fn deliver(
        &self,
        chat: &ChatRef,
        request: DeliveryRequest,
    ) -> impl Future<Output = Result<usize, io::Error>> + Send {
        let result = self.print(chat, &request);
        async move { result }
    }
}

fn read_input(name: &str) -> io::Result<String> {
    if name == STDIN_NAME {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(name)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()?;

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let chat = config.chat();
    let long_message_config = config.long_message_config()?;
    let text = read_input(args.input.as_deref().unwrap_or(STDIN_NAME))?;

    let stdout = Stdout::default();
    let sent = send_long_message(&stdout, &chat, &text, &long_message_config).await?;
    info!("printed {} chunks", sent.len());

    Ok(())
}
