// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Reference to the chat where the chunks should be delivered.
///
/// Resolving the reference into something the API understands is up to the
/// [`Deliver`] implementation, which normally owns a session with the cached peers.
///
/// [`Deliver`]: crate::Deliver
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ChatRef {
    /// The logged-in account itself (its "Saved Messages").
    Me,
    /// A chat by its bot-API style identifier.
    Id(i64),
    /// A public username, without the leading `@`.
    Username(String),
    /// A phone number from the address book, digits only.
    Phone(String),
}

impl ChatRef {
    /// Parses a textual chat reference.
    ///
    /// `"me"` and `"self"` refer to the logged-in account, and a negative integer
    /// (such as `"-1001234"`) is the identifier of a group or channel. Otherwise, `@`,
    /// `+` and whitespace are dropped: whatever is left is a phone number if it only
    /// contains digits, and a username if it doesn't.
    ///
    /// Positive user identifiers cannot be told apart from phone numbers in text form,
    /// so they must be given as [`ChatRef::Id`] (or through `From<i64>`).
    pub fn parse(s: &str) -> Self {
        let s = s.trim().to_lowercase();
        if s == "me" || s == "self" {
            return Self::Me;
        }
        if s.starts_with('-') {
            if let Ok(id) = s.parse::<i64>() {
                return Self::Id(id);
            }
        }

        let cleaned = s
            .chars()
            .filter(|c| !matches!(c, '@' | '+') && !c.is_whitespace())
            .collect::<String>();

        if !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit()) {
            Self::Phone(cleaned)
        } else {
            Self::Username(cleaned)
        }
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Me => write!(f, "me"),
            Self::Id(id) => write!(f, "{id}"),
            Self::Username(username) => write!(f, "@{username}"),
            Self::Phone(phone) => write!(f, "+{phone}"),
        }
    }
}

impl FromStr for ChatRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<i64> for ChatRef {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ChatRef {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for ChatRef {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}
