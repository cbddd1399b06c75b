// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::{ChatRef, DeliveryRequest};
use std::future::Future;
use std::sync::Arc;

/// Capability to deliver a single text message to a chat.
///
/// This is the only thing the dispatcher needs from a client: authorization, sessions,
/// peer resolution and the network all live behind it. A typical implementation wraps
/// a logged-in client handle, resolves the [`ChatRef`] and sends the [`DeliveryRequest`]
/// as a text message, returning the sent message (or its identifier) as the handle.
///
/// Delivering is assumed to not be idempotent: calling it twice with the same request
/// may very well produce two messages.
pub trait Deliver {
    /// Opaque handle to a delivered message.
    type Handle;

    /// The error produced when a message cannot be delivered.
    type Error;

    fn deliver(
        &self,
        chat: &ChatRef,
        request: DeliveryRequest,
    ) -> impl Future<Output = Result<Self::Handle, Self::Error>> + Send;
}

impl<T: Deliver> Deliver for &T {
    type Handle = T::Handle;
    type Error = T::Error;

    fn deliver(
        &self,
        chat: &ChatRef,
        request: DeliveryRequest,
    ) -> impl Future<Output = Result<Self::Handle, Self::Error>> + Send {
        (**self).deliver(chat, request)
    }
}

impl<T: Deliver> Deliver for Arc<T> {
    type Handle = T::Handle;
    type Error = T::Error;

    fn deliver(
        &self,
        chat: &ChatRef,
        request: DeliveryRequest,
    ) -> impl Future<Output = Result<Self::Handle, Self::Error>> + Send {
        (**self).deliver(chat, request)
    }
}

/// A [`Deliver`] implementation backed by a function returning a future.
///
/// Created with [`deliver_fn`].
#[derive(Clone, Copy, Debug)]
pub struct DeliverFn<F> {
    f: F,
}

/// Use a function (or closure) returning a future as the delivery capability.
///
/// The function receives owned copies of the chat and request, so the returned
/// future may hold onto them.
///
/// # Examples
///
/// ```
/// use grammers_long_message::{deliver_fn, ChatRef, DeliveryRequest};
///
/// let deliverer = deliver_fn(|chat: ChatRef, request: DeliveryRequest| async move {
///     println!("{chat}: {}", request.text);
///     Ok::<_, std::io::Error>(request.text.len())
/// });
/// ```
pub fn deliver_fn<F>(f: F) -> DeliverFn<F> {
    DeliverFn { f }
}

impl<F, Fut, H, E> Deliver for DeliverFn<F>
where
    F: Fn(ChatRef, DeliveryRequest) -> Fut,
    Fut: Future<Output = Result<H, E>> + Send,
{
    type Handle = H;
    type Error = E;

    fn deliver(
        &self,
        chat: &ChatRef,
        request: DeliveryRequest,
    ) -> impl Future<Output = Result<Self::Handle, Self::Error>> + Send {
        (self.f)(chat.clone(), request)
    }
}
