// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::{AlwaysFallback, FallbackPolicy, ParseMode};
use std::fmt;
use std::time::Duration;

/// Maximum length of a text message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Pause between two consecutive chunks when no other delay is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Configuration that controls how each chunk is delivered by [`dispatch`].
///
/// [`dispatch`]: crate::dispatch
pub struct DispatchOptions {
    /// How the text of every chunk should be parsed.
    ///
    /// `None` leaves it up to the [`Deliver`] implementation.
    ///
    /// [`Deliver`]: crate::Deliver
    pub parse_mode: Option<ParseMode>,

    /// Whether the link preview should be shown for the chunks.
    pub link_preview: bool,

    /// The message identifier the first chunk should reply to, if any.
    ///
    /// Later chunks are never sent as replies.
    pub reply_to: Option<i32>,

    /// How long to sleep between two consecutive chunks.
    ///
    /// There is no pause after the last chunk. A zero duration disables the pause.
    pub delay: Duration,

    /// The policy deciding whether a chunk whose delivery failed should be sent
    /// again without the extra parameters.
    pub fallback_policy: Box<dyn FallbackPolicy>,
}

/// Configuration required to split and send a long message.
pub struct LongMessageConfig {
    /// Maximum length of a single chunk, in characters. Must be positive.
    pub max_length: usize,

    /// Whether chunks should only be split at line boundaries.
    ///
    /// Lines longer than [`Self::max_length`] are still split wherever the limit falls.
    pub preserve_lines: bool,

    /// How each chunk is delivered.
    pub options: DispatchOptions,
}

impl Default for DispatchOptions {
    /// Returns an instance without parse mode nor reply target, with link previews
    /// disabled, half a second of delay and an [`AlwaysFallback`] fallback policy.
    fn default() -> Self {
        Self {
            parse_mode: None,
            link_preview: false,
            reply_to: None,
            delay: DEFAULT_DELAY,
            fallback_policy: Box::new(AlwaysFallback),
        }
    }
}

impl Default for LongMessageConfig {
    /// Returns an instance splitting at [`MAX_MESSAGE_LENGTH`] while preserving lines,
    /// with the default [`DispatchOptions`].
    fn default() -> Self {
        Self {
            max_length: MAX_MESSAGE_LENGTH,
            preserve_lines: true,
            options: DispatchOptions::default(),
        }
    }
}

impl fmt::Debug for DispatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchOptions")
            .field("parse_mode", &self.parse_mode)
            .field("link_preview", &self.link_preview)
            .field("reply_to", &self.reply_to)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for LongMessageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LongMessageConfig")
            .field("max_length", &self.max_length)
            .field("preserve_lines", &self.preserve_lines)
            .field("options", &self.options)
            .finish()
    }
}
