// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Send texts which are longer than what a single message may hold.
//!
//! Telegram rejects text messages over [`MAX_MESSAGE_LENGTH`] characters. This library
//! splits such texts into chunks with [`segment`], and delivers them one after another
//! with [`dispatch`]. [`send_long_message`] does both.
//!
//! # Delivering
//!
//! The library does not talk to Telegram itself. Instead, the actual sending of each
//! chunk is done by a [`Deliver`] implementation, which usually wraps a logged-in client.
//! Simple cases can use [`deliver_fn`] to turn a closure into one.
//!
//! Sending a message is not idempotent, so the dispatcher is careful to retry a chunk at
//! most once. When a chunk fails to send, it is retried without any extra parameters
//! (such as the message it should reply to), as decided by the [`FallbackPolicy`]. If that
//! fails too, the dispatch stops there.
//!
//! # Flood waits
//!
//! Sending many messages in a short period of time will make the API return flood wait
//! errors. The [`DispatchOptions::delay`] between chunks exists to avoid them, and it
//! defaults to [`DEFAULT_DELAY`].

#![deny(unsafe_code)]

mod chat;
mod config;
mod deliver;
mod dispatch;
pub mod errors;
mod fallback;
mod request;
pub mod segment;

pub use chat::ChatRef;
pub use config::{DEFAULT_DELAY, DispatchOptions, LongMessageConfig, MAX_MESSAGE_LENGTH};
pub use deliver::{Deliver, DeliverFn, deliver_fn};
pub use dispatch::{ChunkOutcome, dispatch, send_long_message};
pub use errors::{DispatchError, SegmentError, SendError};
pub use fallback::{AlwaysFallback, FallbackContext, FallbackOnReply, FallbackPolicy, NoFallback};
pub use request::{DeliveryRequest, ParseMode};
pub use segment::{CharWindows, segment};
