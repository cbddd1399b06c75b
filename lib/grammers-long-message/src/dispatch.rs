// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::errors::{DispatchError, SendError};
use crate::{
    ChatRef, Deliver, DeliveryRequest, DispatchOptions, FallbackContext, LongMessageConfig,
    segment,
};
use log::{debug, info, warn};
use std::ops::ControlFlow;
use tokio::time::sleep;

/// How a chunk ended up being delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The chunk was delivered with all of its parameters.
    Sent,
    /// The first attempt failed, but the reduced fallback request went through.
    FallbackSent,
}

/// Deliver every chunk to `chat`, in order, one at a time.
///
/// Only the first chunk is sent as a reply to [`DispatchOptions::reply_to`]. Between two
/// chunks, the dispatcher sleeps for [`DispatchOptions::delay`], which lets callers stay
/// below the rate limits of whatever the [`Deliver`] implementation talks to.
///
/// If delivering a chunk fails and the [`DispatchOptions::fallback_policy`] allows it, the
/// chunk is delivered once more, this time without the reply target. The outcome of that
/// second attempt is final: if it fails too, no further chunk is attempted and a
/// [`DispatchError`] is returned with the handles of the chunks sent so far.
///
/// The fallback policy is handed the error of the failed attempt, which is why the
/// delivery error must implement [`std::error::Error`].
///
/// Dropping the returned future (for instance, because a surrounding `timeout` elapsed)
/// interrupts the dispatch, including any pause in progress.
pub async fn dispatch<D: Deliver>(
    deliverer: &D,
    chat: &ChatRef,
    chunks: Vec<String>,
    options: &DispatchOptions,
) -> Result<Vec<D::Handle>, DispatchError<D::Handle, D::Error>>
where
    D::Error: std::error::Error + 'static,
{
    let total = chunks.len();
    let mut sent = Vec::with_capacity(total);

    for (index, chunk) in chunks.into_iter().enumerate() {
        let reply_to = if index == 0 { options.reply_to } else { None };
        let request = DeliveryRequest::text(chunk)
            .parse_mode(options.parse_mode)
            .link_preview(options.link_preview)
            .reply_to(reply_to);

        let outcome = match deliverer.deliver(chat, request.clone()).await {
            Ok(handle) => {
                sent.push(handle);
                ChunkOutcome::Sent
            }
            Err(primary) => {
                let ctx = FallbackContext {
                    index,
                    total,
                    reply_to,
                    error: &primary,
                };
                if let ControlFlow::Break(()) = options.fallback_policy.should_fall_back(&ctx) {
                    warn!(
                        "failed to deliver chunk {} of {} to {}, not falling back: {}",
                        index + 1,
                        total,
                        chat,
                        primary
                    );
                    return Err(DispatchError {
                        index,
                        total,
                        primary,
                        fallback: None,
                        sent,
                    });
                }

                warn!(
                    "failed to deliver chunk {} of {} to {}, retrying without extra parameters: {}",
                    index + 1,
                    total,
                    chat,
                    primary
                );
                match deliverer.deliver(chat, request.without_extras()).await {
                    Ok(handle) => {
                        sent.push(handle);
                        ChunkOutcome::FallbackSent
                    }
                    Err(fallback) => {
                        warn!(
                            "fallback for chunk {} of {} to {} failed too, aborting: {}",
                            index + 1,
                            total,
                            chat,
                            fallback
                        );
                        return Err(DispatchError {
                            index,
                            total,
                            primary,
                            fallback: Some(fallback),
                            sent,
                        });
                    }
                }
            }
        };

        debug!("chunk {} of {} to {}: {:?}", index + 1, total, chat, outcome);

        if index + 1 < total && !options.delay.is_zero() {
            sleep(options.delay).await;
        }
    }

    Ok(sent)
}

/// Send a text that may be longer than a single message allows.
///
/// The text is split with [`segment`] according to [`LongMessageConfig::max_length`] and
/// [`LongMessageConfig::preserve_lines`], and the resulting chunks are sent with
/// [`dispatch`]. An empty text sends nothing.
///
/// Returns the handles of every delivered chunk, in order.
///
/// # Examples
///
/// ```
/// # async fn f() -> Result<(), Box<dyn std::error::Error>> {
/// use grammers_long_message::{deliver_fn, send_long_message, ChatRef, DeliveryRequest, LongMessageConfig};
///
/// let deliverer = deliver_fn(|_: ChatRef, request: DeliveryRequest| async move {
///     Ok::<_, std::io::Error>(request.text)
/// });
///
/// let text = "Very long text...\n".repeat(1000);
/// let config = LongMessageConfig {
///     max_length: 100,
///     ..LongMessageConfig::default()
/// };
/// let sent = send_long_message(&deliverer, &ChatRef::Me, &text, &config).await?;
/// assert_eq!(sent.len(), 200);
/// # Ok(())
/// # }
/// ```
pub async fn send_long_message<D: Deliver>(
    deliverer: &D,
    chat: &ChatRef,
    text: &str,
    config: &LongMessageConfig,
) -> Result<Vec<D::Handle>, SendError<D::Handle, D::Error>>
where
    D::Error: std::error::Error + 'static,
{
    let chunks = segment(text, config.max_length, config.preserve_lines)?;
    if chunks.is_empty() {
        debug!("nothing to send to {}", chat);
        return Ok(Vec::new());
    }

    info!(
        "sending {} characters to {} in {} chunks",
        text.chars().count(),
        chat,
        chunks.len()
    );
    Ok(dispatch(deliverer, chat, chunks, &config.options).await?)
}
