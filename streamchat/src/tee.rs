//! Diagnostic copy of a response body.
//!
//! [`tee_body`] forwards every body chunk unchanged and hands a copy to a
//! detached task that logs the raw text once the body ends. The task is never
//! awaited; when it cannot be started, or goes away, the primary body keeps
//! flowing and the problem is only logged. Nothing is copied unless
//! [`RAW_BODY_TARGET`] is enabled at `debug`.

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{Level, debug, warn};

use crate::sse::Utf8Decoder;
use crate::transport::ByteStream;

/// Log target of the raw body dump.
pub const RAW_BODY_TARGET: &str = "streamchat::raw";

/// Attach the raw-body logger to `body`.
#[must_use]
pub fn tee_body(body: ByteStream) -> ByteStream {
    if !raw_logging_enabled() {
        return body;
    }

    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(e) => {
            warn!(error = %e, "no async runtime for raw body logging, skipping");
            return body;
        }
    };

    let (tx, rx) = mpsc::unbounded_channel::<Bytes>();
    drop(handle.spawn(log_raw_body(rx)));
    forward_copies(body, tx)
}

/// Returns `true` if the raw body dump would be recorded.
#[must_use]
pub fn raw_logging_enabled() -> bool {
    tracing::enabled!(target: RAW_BODY_TARGET, Level::DEBUG)
}

fn forward_copies(body: ByteStream, tx: mpsc::UnboundedSender<Bytes>) -> ByteStream {
    let mut tx = Some(tx);
    Box::pin(body.inspect(move |item| {
        let Ok(bytes) = item else {
            return;
        };
        let gone = tx
            .as_ref()
            .is_some_and(|sender| sender.send(bytes.clone()).is_err());
        if gone {
            warn!("raw body logger went away, detaching");
            tx = None;
        }
    }))
}

async fn log_raw_body(mut rx: mpsc::UnboundedReceiver<Bytes>) {
    let mut decoder = Utf8Decoder::new();
    let mut raw = String::new();
    while let Some(bytes) = rx.recv().await {
        raw.push_str(&decoder.decode(&bytes));
    }
    raw.push_str(&decoder.finish());
    debug!(target: RAW_BODY_TARGET, len = raw.len(), raw = %raw, "raw response body");
}
