// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::errors::ParseModeError;
use std::fmt;
use std::str::FromStr;

/// How the text of a chunk should be interpreted by the receiving client.
///
/// The chunks are never inspected for markup, so a formatting entity that
/// spans a chunk boundary will not survive the split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ParseMode {
    /// Both markdown and HTML styles, which may be combined.
    Default,
    Markdown,
    Html,
    /// Plain text, sent as-is.
    Disabled,
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Disabled => "disabled",
        })
    }
}

impl FromStr for ParseMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "disabled" | "none" | "plain" => Ok(Self::Disabled),
            _ => Err(ParseModeError {
                name: s.to_string(),
            }),
        }
    }
}

/// A single chunk ready to be handed over to a [`Deliver`] implementation.
///
/// [`Deliver`]: crate::Deliver
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliveryRequest {
    /// The text of the chunk.
    pub text: String,

    /// How the text should be parsed. `None` leaves it up to the deliverer.
    pub parse_mode: Option<ParseMode>,

    /// Whether the link preview should be shown for the message.
    pub link_preview: bool,

    /// The message identifier to which this message should reply to, if any.
    pub reply_to: Option<i32>,
}

impl DeliveryRequest {
    /// Builds a new request using the given text as the message contents.
    pub fn text<T: Into<String>>(s: T) -> Self {
        Self {
            text: s.into(),
            ..Self::default()
        }
    }

    /// How the text should be parsed.
    pub fn parse_mode(mut self, parse_mode: Option<ParseMode>) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    /// Whether the link preview be shown for the message.
    pub fn link_preview(mut self, link_preview: bool) -> Self {
        self.link_preview = link_preview;
        self
    }

    /// The message identifier to which this message should reply to, if any.
    pub fn reply_to(mut self, reply_to: Option<i32>) -> Self {
        self.reply_to = reply_to;
        self
    }

    /// Strip every parameter that is not needed to deliver the text.
    ///
    /// Only the text, parse mode and link preview flag are kept.
    pub fn without_extras(self) -> Self {
        Self {
            text: self.text,
            parse_mode: self.parse_mode,
            link_preview: self.link_preview,
            reply_to: None,
        }
    }
}

impl From<&str> for DeliveryRequest {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for DeliveryRequest {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}
