// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;

/// This error occurs when the text cannot be segmented with the given parameters.
///
/// It is always reported before any chunk is delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SegmentError {
    /// The maximum chunk length was zero, so no chunk could ever hold any text.
    InvalidMaxLength,
}

impl std::error::Error for SegmentError {}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMaxLength => write!(f, "invalid argument: max_length must be positive"),
        }
    }
}

/// The error type reported when a parse mode name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseModeError {
    /// The name that failed to parse.
    pub name: String,
}

impl std::error::Error for ParseModeError {}

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parse mode: {:?}", self.name)
    }
}

/// This error occurs when a chunk could not be delivered, neither with its
/// original parameters nor with the reduced fallback ones.
///
/// The dispatch is aborted at that chunk: no later chunk was attempted. The
/// handles of the chunks delivered before the failure are kept in [`Self::sent`],
/// so the caller may decide whether a partial delivery is acceptable.
#[derive(Debug)]
pub struct DispatchError<H, E> {
    /// Zero-based index of the chunk that failed.
    pub index: usize,

    /// Amount of chunks the text was split into.
    pub total: usize,

    /// The error returned by the first delivery attempt.
    pub primary: E,

    /// The error returned by the fallback attempt.
    ///
    /// `None` if the [`FallbackPolicy`] decided against retrying the chunk.
    ///
    /// [`FallbackPolicy`]: crate::FallbackPolicy
    pub fallback: Option<E>,

    /// Handles of the chunks delivered before the failure, in send order.
    pub sent: Vec<H>,
}

impl<H, E> DispatchError<H, E> {
    /// The error that ended the dispatch.
    ///
    /// This is the fallback error if a fallback was attempted, and the
    /// primary one otherwise.
    pub fn error(&self) -> &E {
        self.fallback.as_ref().unwrap_or(&self.primary)
    }

    /// Consume the error, returning the final delivery error.
    pub fn into_error(self) -> E {
        self.fallback.unwrap_or(self.primary)
    }
}

impl<H, E: fmt::Display> fmt::Display for DispatchError<H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to deliver chunk {} of {}",
            self.index + 1,
            self.total
        )?;
        if self.fallback.is_some() {
            write!(f, " (fallback failed too)")?;
        }
        write!(f, ": {}", self.error())
    }
}

impl<H: fmt::Debug + 'static, E: std::error::Error + 'static> std::error::Error
    for DispatchError<H, E>
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error())
    }
}

/// The error type returned by [`send_long_message`].
///
/// [`send_long_message`]: crate::send_long_message
#[derive(Debug)]
pub enum SendError<H, E> {
    /// The text could not be segmented. Nothing was sent.
    InvalidArgument(SegmentError),

    /// A chunk could not be delivered, and the remaining ones were not attempted.
    Delivery(DispatchError<H, E>),
}

impl<H, E> SendError<H, E> {
    /// Handles of the chunks which were delivered before the failure.
    ///
    /// Always empty for [`SendError::InvalidArgument`].
    pub fn sent(&self) -> &[H] {
        match self {
            Self::InvalidArgument(_) => &[],
            Self::Delivery(err) => &err.sent,
        }
    }
}

impl<H, E: fmt::Display> fmt::Display for SendError<H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(err) => write!(f, "send long message error: {err}"),
            Self::Delivery(err) => write!(f, "send long message error: {err}"),
        }
    }
}

impl<H: fmt::Debug + 'static, E: std::error::Error + 'static> std::error::Error
    for SendError<H, E>
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::Delivery(err) => Some(err),
        }
    }
}

impl<H, E> From<SegmentError> for SendError<H, E> {
    fn from(error: SegmentError) -> Self {
        Self::InvalidArgument(error)
    }
}

impl<H, E> From<DispatchError<H, E>> for SendError<H, E> {
    fn from(error: DispatchError<H, E>) -> Self {
        Self::Delivery(error)
    }
}
