// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::error::Error;
use std::ops::ControlFlow;

pub trait FallbackPolicy: Send + Sync {
    /// Determines whether a chunk whose delivery failed should be sent again
    /// without the extra parameters.
    ///
    /// If it should Continue, the fallback request is delivered exactly once.
    /// If it should Break, the delivery error is propagated to the caller.
    fn should_fall_back(&self, ctx: &FallbackContext<'_>) -> ControlFlow<()>;
}

pub struct FallbackContext<'a> {
    /// Zero-based index of the chunk that failed.
    pub index: usize,
    /// Amount of chunks being dispatched.
    pub total: usize,
    /// The reply target the failed request carried, which the fallback would drop.
    pub reply_to: Option<i32>,
    /// The error the delivery of the chunk failed with.
    ///
    /// Policies that know the concrete error type of their [`Deliver`] implementation
    /// can [`downcast_ref`] it to tell recoverable errors from fatal ones.
    ///
    /// [`Deliver`]: crate::Deliver
    /// [`downcast_ref`]: https://doc.rust-lang.org/std/error/trait.Error.html#method.downcast_ref
    pub error: &'a (dyn Error + 'static),
}

/// Fallback policy that will always retry a failed chunk once, with the reduced request.
pub struct AlwaysFallback;

impl FallbackPolicy for AlwaysFallback {
    fn should_fall_back(&self, _: &FallbackContext<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Fallback policy that will never retry, so any delivery failure is fatal.
pub struct NoFallback;

impl FallbackPolicy for NoFallback {
    fn should_fall_back(&self, _: &FallbackContext<'_>) -> ControlFlow<()> {
        ControlFlow::Break(())
    }
}

/// Fallback policy that will only retry when the failed request was a reply.
///
/// Every other chunk would be retried with the exact same parameters, so a
/// failure there is more likely unrelated to them (for instance, the chat
/// is no longer writable).
pub struct FallbackOnReply;

impl FallbackPolicy for FallbackOnReply {
    fn should_fall_back(&self, ctx: &FallbackContext<'_>) -> ControlFlow<()> {
        if ctx.reply_to.is_some() {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }
}
