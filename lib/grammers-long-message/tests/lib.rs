// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use grammers_long_message::{
    ChatRef, Deliver, DeliveryRequest, DispatchOptions, FallbackContext, FallbackOnReply,
    FallbackPolicy, LongMessageConfig, NoFallback, ParseMode, SegmentError, SendError,
    deliver_fn, dispatch, send_long_message,
};
use simple_logger::SimpleLogger;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, PartialEq)]
struct Rejected(usize);

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt {} rejected", self.0)
    }
}

impl std::error::Error for Rejected {}

/// Records every delivery attempt, failing the ones listed in `failing`.
///
/// The handle of a delivered chunk is the attempt number.
#[derive(Default)]
struct Recorder {
    attempts: Mutex<Vec<(Instant, ChatRef, DeliveryRequest)>>,
    failing: HashSet<usize>,
}

impl Recorder {
    fn failing(attempts: &[usize]) -> Self {
        Self {
            failing: attempts.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<DeliveryRequest> {
        let attempts = self.attempts.lock().unwrap();
        attempts.iter().map(|(_, _, r)| r.clone()).collect()
    }

    fn times(&self) -> Vec<Instant> {
        let attempts = self.attempts.lock().unwrap();
        attempts.iter().map(|(t, _, _)| *t).collect()
    }
}

impl Deliver for Recorder {
    type Handle = usize;
    type Error = Rejected;

    fn deliver(
        &self,
        chat: &ChatRef,
        request: DeliveryRequest,
    ) -> impl Future<Output = Result<usize, Rejected>> + Send {
        let mut attempts = self.attempts.lock().unwrap();
        let attempt = attempts.len();
        attempts.push((Instant::now(), chat.clone(), request));

        let result = if self.failing.contains(&attempt) {
            Err(Rejected(attempt))
        } else {
            Ok(attempt)
        };
        async move { result }
    }
}

fn init_logging() {
    let _ = SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init();
}

fn config(max_length: usize, delay: Duration) -> LongMessageConfig {
    LongMessageConfig {
        max_length,
        options: DispatchOptions {
            delay,
            ..DispatchOptions::default()
        },
        ..LongMessageConfig::default()
    }
}

fn chunks(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_long_text_is_sent_in_order() {
    init_logging();
    let recorder = Recorder::default();
    let text = format!("{}\n{}", "A".repeat(5000), "B".repeat(10));

    let mut config = config(4096, Duration::ZERO);
    config.options.parse_mode = Some(ParseMode::Html);
    config.options.reply_to = Some(77);

    let sent = send_long_message(&recorder, &ChatRef::from("@channel"), &text, &config)
        .await
        .unwrap();
    assert_eq!(sent, [0, 1, 2]);

    let requests = recorder.requests();
    let texts = requests.iter().map(|r| r.text.as_str()).collect::<Vec<_>>();
    assert_eq!(
        texts,
        ["A".repeat(4096), "A".repeat(904), "B".repeat(10)]
    );
    assert!(
        requests
            .iter()
            .all(|r| r.parse_mode == Some(ParseMode::Html) && !r.link_preview)
    );

    let attempts = recorder.attempts.lock().unwrap();
    assert!(
        attempts
            .iter()
            .all(|(_, chat, _)| *chat == ChatRef::Username("channel".into()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_only_first_chunk_replies() {
    let recorder = Recorder::default();
    let options = DispatchOptions {
        reply_to: Some(12),
        link_preview: true,
        delay: Duration::ZERO,
        ..DispatchOptions::default()
    };

    dispatch(&recorder, &ChatRef::Me, chunks(&["a", "b", "c", "d"]), &options)
        .await
        .unwrap();

    let replies = recorder
        .requests()
        .iter()
        .map(|r| r.reply_to)
        .collect::<Vec<_>>();
    assert_eq!(replies, [Some(12), None, None, None]);
    assert!(recorder.requests().iter().all(|r| r.link_preview));
}

#[tokio::test(start_paused = true)]
async fn test_delay_only_between_chunks() {
    let recorder = Recorder::default();
    let delay = Duration::from_millis(500);
    let options = DispatchOptions {
        delay,
        ..DispatchOptions::default()
    };

    let start = Instant::now();
    dispatch(&recorder, &ChatRef::Me, chunks(&["a", "b", "c"]), &options)
        .await
        .unwrap();
    let elapsed = start.elapsed();

    // Two pauses for three chunks, none after the last one.
    assert!(elapsed >= delay * 2, "{elapsed:?}");
    assert!(elapsed < delay * 3, "{elapsed:?}");

    let times = recorder.times();
    assert_eq!(times.len(), 3);
    assert_eq!(times[0], start);
    for pair in times.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= delay && gap < delay * 2, "{gap:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_no_delay_when_zero_or_single_chunk() {
    let recorder = Recorder::default();
    let start = Instant::now();
    dispatch(
        &recorder,
        &ChatRef::Me,
        chunks(&["a", "b", "c"]),
        &DispatchOptions {
            delay: Duration::ZERO,
            ..DispatchOptions::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO);

    let recorder = Recorder::default();
    let start = Instant::now();
    dispatch(
        &recorder,
        &ChatRef::Me,
        chunks(&["only"]),
        &DispatchOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_recovers_chunk() {
    init_logging();
    let recorder = Recorder::failing(&[0]);
    let options = DispatchOptions {
        reply_to: Some(5),
        parse_mode: Some(ParseMode::Markdown),
        delay: Duration::ZERO,
        ..DispatchOptions::default()
    };

    let sent = dispatch(&recorder, &ChatRef::Id(-100), chunks(&["one", "two"]), &options)
        .await
        .unwrap();
    assert_eq!(sent, [1, 2]);

    let requests = recorder.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].reply_to, Some(5));
    assert_eq!(
        requests[1],
        DeliveryRequest::text("one").parse_mode(Some(ParseMode::Markdown))
    );
    assert_eq!(requests[2].text, "two");
    assert_eq!(requests[2].reply_to, None);
}

#[tokio::test(start_paused = true)]
async fn test_pause_follows_recovered_chunk() {
    let recorder = Recorder::failing(&[0]);
    let delay = Duration::from_millis(500);
    let options = DispatchOptions {
        reply_to: Some(5),
        delay,
        ..DispatchOptions::default()
    };

    let start = Instant::now();
    let sent = dispatch(&recorder, &ChatRef::Me, chunks(&["one", "two"]), &options)
        .await
        .unwrap();
    assert_eq!(sent, [1, 2]);

    // The fallback goes out right after the failure, and the pause comes after it.
    let times = recorder.times();
    assert_eq!(times.len(), 3);
    assert_eq!(times[0], start);
    assert_eq!(times[1], start);
    let gap = times[2] - times[1];
    assert!(gap >= delay && gap < delay * 2, "{gap:?}");
    assert!(start.elapsed() < delay * 2);
}

/// Falls back only from failures of even-numbered attempts.
struct EvenAttemptsOnly;

impl FallbackPolicy for EvenAttemptsOnly {
    fn should_fall_back(&self, ctx: &FallbackContext<'_>) -> ControlFlow<()> {
        match ctx.error.downcast_ref::<Rejected>() {
            Some(Rejected(attempt)) if attempt % 2 == 0 => ControlFlow::Continue(()),
            _ => ControlFlow::Break(()),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_policy_sees_delivery_error() {
    let options = DispatchOptions {
        delay: Duration::ZERO,
        fallback_policy: Box::new(EvenAttemptsOnly),
        ..DispatchOptions::default()
    };

    let recorder = Recorder::failing(&[0]);
    let sent = dispatch(&recorder, &ChatRef::Me, chunks(&["a", "b"]), &options)
        .await
        .unwrap();
    assert_eq!(sent, [1, 2]);

    let recorder = Recorder::failing(&[1]);
    let err = dispatch(&recorder, &ChatRef::Me, chunks(&["a", "b", "c"]), &options)
        .await
        .unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(err.primary, Rejected(1));
    assert_eq!(err.fallback, None);
    assert_eq!(recorder.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_fallback_aborts() {
    init_logging();
    // Chunk 2 fails both its primary (attempt 1) and fallback (attempt 2) deliveries.
    let recorder = Recorder::failing(&[1, 2]);
    let delay = Duration::from_millis(500);
    let options = DispatchOptions {
        delay,
        ..DispatchOptions::default()
    };

    let start = Instant::now();
    let err = dispatch(&recorder, &ChatRef::Me, chunks(&["1", "2", "3"]), &options)
        .await
        .unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err.index, 1);
    assert_eq!(err.total, 3);
    assert_eq!(err.sent, [0]);
    assert_eq!(err.primary, Rejected(1));
    assert_eq!(err.fallback, Some(Rejected(2)));
    assert_eq!(err.error(), &Rejected(2));

    // The third chunk is never attempted, and there is no pause after the failure.
    let texts = recorder
        .requests()
        .into_iter()
        .map(|r| r.text)
        .collect::<Vec<_>>();
    assert_eq!(texts, ["1", "2", "2"]);
    assert!(elapsed >= delay && elapsed < delay * 2, "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_no_fallback_policy() {
    let recorder = Recorder::failing(&[0]);
    let options = DispatchOptions {
        fallback_policy: Box::new(NoFallback),
        ..DispatchOptions::default()
    };

    let err = dispatch(&recorder, &ChatRef::Me, chunks(&["a", "b"]), &options)
        .await
        .unwrap_err();

    assert_eq!(err.index, 0);
    assert!(err.sent.is_empty());
    assert_eq!(err.fallback, None);
    assert_eq!(err.into_error(), Rejected(0));
    assert_eq!(recorder.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_on_reply_policy() {
    let options = DispatchOptions {
        reply_to: Some(3),
        delay: Duration::ZERO,
        fallback_policy: Box::new(FallbackOnReply),
        ..DispatchOptions::default()
    };

    // The first chunk is a reply, so it falls back.
    let recorder = Recorder::failing(&[0]);
    let sent = dispatch(&recorder, &ChatRef::Me, chunks(&["a", "b"]), &options)
        .await
        .unwrap();
    assert_eq!(sent, [1, 2]);

    // The second one is not, so its failure is final.
    let recorder = Recorder::failing(&[1]);
    let err = dispatch(&recorder, &ChatRef::Me, chunks(&["a", "b", "c"]), &options)
        .await
        .unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(err.fallback, None);
    assert_eq!(recorder.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_empty_text_sends_nothing() {
    let recorder = Recorder::default();
    let sent = send_long_message(&recorder, &ChatRef::Me, "", &LongMessageConfig::default())
        .await
        .unwrap();

    assert!(sent.is_empty());
    assert!(recorder.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_max_length_sends_nothing() {
    let recorder = Recorder::default();
    let result = send_long_message(&recorder, &ChatRef::Me, "text", &config(0, Duration::ZERO)).await;

    assert!(matches!(
        result,
        Err(SendError::InvalidArgument(SegmentError::InvalidMaxLength))
    ));
    assert!(recorder.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_partial_delivery_is_reported() {
    let recorder = Recorder::failing(&[2, 3]);
    let text = "aaaa\nbbbb\ncccc\ndddd";

    let err = send_long_message(&recorder, &ChatRef::Me, text, &config(4, Duration::ZERO))
        .await
        .unwrap_err();

    assert_eq!(err.sent(), &[0, 1]);
    assert!(err.to_string().contains("chunk 3 of 4"), "{err}");
}

#[tokio::test(start_paused = true)]
async fn test_timeout_interrupts_dispatch() {
    let recorder = Recorder::default();
    let text = "a\nb\nc";
    let config = config(1, Duration::from_millis(500));

    let result = tokio::time::timeout(
        Duration::from_millis(700),
        send_long_message(&recorder, &ChatRef::Me, text, &config),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(recorder.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_closure_and_shared_deliverers() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let deliverer = {
        let seen = Arc::clone(&seen);
        deliver_fn(move |chat: ChatRef, request: DeliveryRequest| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().unwrap().push(format!("{chat}: {}", request.text));
                Ok::<_, Rejected>(request.text.len())
            }
        })
    };

    let sent = send_long_message(
        &deliverer,
        &ChatRef::from("me"),
        "hello\nworld!",
        &config(6, Duration::ZERO),
    )
    .await
    .unwrap();
    assert_eq!(sent, [5, 6]);
    assert_eq!(*seen.lock().unwrap(), ["me: hello", "me: world!"]);

    let shared = Arc::new(Recorder::default());
    dispatch(
        &shared,
        &ChatRef::Me,
        chunks(&["x", "y"]),
        &DispatchOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(shared.requests().len(), 2);
}
