// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Splitting of over-long texts into chunks.
//!
//! All lengths are measured in characters (Unicode scalar values), so a chunk
//! boundary never falls in the middle of a multi-byte character.
use crate::errors::SegmentError;
use std::num::NonZeroUsize;

/// Iterator over consecutive windows of a string, each `size` characters long.
///
/// The last window may be shorter. An empty string yields no windows.
#[derive(Clone, Debug)]
pub struct CharWindows<'a> {
    rest: &'a str,
    size: NonZeroUsize,
}

impl<'a> CharWindows<'a> {
    pub fn new(text: &'a str, size: NonZeroUsize) -> Self {
        Self { rest: text, size }
    }
}

impl<'a> Iterator for CharWindows<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let end = self
            .rest
            .char_indices()
            .nth(self.size.get())
            .map_or(self.rest.len(), |(i, _)| i);

        let (window, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(window)
    }
}

/// Lines accumulated so far, joined by newlines.
struct LineBuffer {
    text: String,
    // In characters, not bytes.
    len: usize,
}

impl LineBuffer {
    fn new(line: &str, len: usize) -> Self {
        Self {
            text: line.to_string(),
            len,
        }
    }

    fn push_line(&mut self, line: &str, len: usize) {
        self.text.push('\n');
        self.text.push_str(line);
        self.len += len + 1;
    }
}

/// Split `text` into an ordered sequence of chunks of at most `max_length` characters.
///
/// When `preserve_lines` is `true`, whole lines are packed greedily into each chunk,
/// and the chunks only break at newlines (the newline at a break is not part of
/// either chunk). A single line that is longer than `max_length` on its own is
/// force-split into pieces of exactly `max_length` characters (the last one may be
/// shorter), which are never merged with the lines around them.
///
/// Blank lines inside a chunk are kept, but a chunk break swallows the newline it
/// happens at, and chunks made only of newlines are dropped. So a blank line that
/// would have to open a chunk of its own (because the previous chunk is full, or
/// because it starts a text whose next line does not fit with it) is lost, as is a
/// trailing run of blank lines that ends up alone in the last chunk.
///
/// When `preserve_lines` is `false`, lines are ignored and the text is cut every
/// `max_length` characters, so the chunks always add up to the whole text.
///
/// Empty text produces no chunks, and no chunk is ever empty.
///
/// # Examples
///
/// ```
/// use grammers_long_message::segment;
///
/// let text = format!("{}\n{}", "A".repeat(5000), "B".repeat(10));
/// let chunks = segment(&text, 4096, true).unwrap();
///
/// assert_eq!(chunks, ["A".repeat(4096), "A".repeat(904), "B".repeat(10)]);
/// ```
pub fn segment(
    text: &str,
    max_length: usize,
    preserve_lines: bool,
) -> Result<Vec<String>, SegmentError> {
    let max_length = NonZeroUsize::new(max_length).ok_or(SegmentError::InvalidMaxLength)?;

    if preserve_lines {
        Ok(segment_lines(text, max_length))
    } else {
        Ok(CharWindows::new(text, max_length)
            .map(str::to_string)
            .collect())
    }
}

fn segment_lines(text: &str, max_length: NonZeroUsize) -> Vec<String> {
    let mut chunks = Vec::new();
    if text.is_empty() {
        return chunks;
    }

    let mut buffer = None::<LineBuffer>;
    for line in text.split('\n') {
        let len = line.chars().count();

        if let Some(mut buf) = buffer.take() {
            if buf.len + len + 1 <= max_length.get() {
                buf.push_line(line, len);
                buffer = Some(buf);
                continue;
            }
            push_chunk(&mut chunks, buf.text);
        }

        if len > max_length.get() {
            chunks.extend(CharWindows::new(line, max_length).map(str::to_string));
        } else {
            buffer = Some(LineBuffer::new(line, len));
        }
    }

    if let Some(buf) = buffer {
        push_chunk(&mut chunks, buf.text);
    }

    chunks
}

// A chunk made only of newlines would be delivered as an empty message.
fn push_chunk(chunks: &mut Vec<String>, chunk: String) {
    if !chunk.chars().all(|c| c == '\n') {
        chunks.push(chunk);
    }
}
