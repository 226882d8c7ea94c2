//! Resumable reconnect loop over a remote SSE endpoint (§4.1 of the design).

// std
use std::time::Duration;
// crates.io
use futures::stream::{Stream, StreamExt};
// self
use crate::{
	_prelude::*,
	sse::parser::{SseEvent, SseParser},
};

const DEFAULT_MAX_BACKOFF_EXPONENT: u32 = 10;

/// Backoff tuning. `ReconnectPolicy::default()` implements the spec's
/// `retry_delay + 2^(min(attempt, 10)/e)` formula exactly; tests lower
/// `max_backoff_exponent` so simulated breaks don't wait out real seconds.
#[derive(Clone, Copy, Debug)]
pub struct ReconnectPolicy {
	/// Caps the `attempt` term of the backoff formula; attempts past this
	/// count don't push the delay any higher.
	pub max_backoff_exponent: u32,
}
impl Default for ReconnectPolicy {
	fn default() -> Self {
		Self { max_backoff_exponent: DEFAULT_MAX_BACKOFF_EXPONENT }
	}
}

/// Opens a `GET` request against `url`, resuming via `Last-Event-ID` on
/// reconnect and blending the backoff curve with the server's `retry:`
/// advisory. Yields decoded [`SseEvent`]s; terminates cleanly on EOF and
/// surfaces non-transport failures (bad HTTP status, or failure to
/// establish the connection at all) as [`Error::Transport`] instead of
/// retrying them forever. Only a failure reading an already-established
/// stream is retried — mirrors the original's `httpx.ReadError`/
/// `ConnectError` split, where only the former is caught.
pub fn connect(
	http: reqwest::Client,
	url: String,
	policy: ReconnectPolicy,
) -> impl Stream<Item = Result<SseEvent>> + Send + 'static {
	async_stream::stream! {
		let mut last_event_id: Option<String> = None;
		let mut retry_delay = Duration::ZERO;
		let mut attempt: u32 = 0;

		'reconnect: loop {
			let mut request = http.get(&url);

			if let Some(id) = &last_event_id {
				request = request.header("Last-Event-ID", id.clone());
			}

			// A failure to establish the connection at all (DNS, TCP connect, TLS,
			// malformed handshake) is never retried, on any attempt — only a read
			// failure against an already-open stream is (see `Some(Err(err))`
			// below).
			let response = match request.send().await {
				Ok(response) => response,
				Err(err) => {
					tracing::error!(error = %err, attempt, "sse connect failed");

					yield Err(Error::Transport(err));

					return;
				},
			};
			let response = match response.error_for_status() {
				Ok(response) => response,
				Err(err) => {
					yield Err(Error::Transport(err));

					return;
				},
			};

			tracing::info!(attempt, "sse connected");

			let mut bytes = response.bytes_stream();
			let mut parser = SseParser::new();

			loop {
				match bytes.next().await {
					Some(Ok(chunk)) => {
						let chunk: bytes::Bytes = chunk;
						let text = match std::str::from_utf8(&chunk) {
							Ok(text) => text,
							Err(err) => {
								tracing::warn!(error = %err, "invalid utf-8 in sse stream");

								continue;
							},
						};

						for event in parser.process_chunk(text) {
							if let Some(id) = &event.id {
								last_event_id = Some(id.clone());
							}

							if let Some(retry) = event.retry {
								retry_delay = Duration::from_millis(retry);
							}

							yield Ok(event);
						}
					},
					Some(Err(err)) => {
						tracing::warn!(error = %err, attempt, "sse read failed");

						tokio::time::sleep(backoff(retry_delay, attempt, &policy)).await;

						attempt += 1;

						continue 'reconnect;
					},
					None => {
						if let Some(event) = parser.flush() {
							yield Ok(event);
						}

						return;
					},
				}
			}
		}
	}
}

/// `retry_delay + 2^(min(attempt, cap)/e)`.
fn backoff(retry_delay: Duration, attempt: u32, policy: &ReconnectPolicy) -> Duration {
	let exponent = attempt.min(policy.max_backoff_exponent) as f64 / std::f64::consts::E;

	retry_delay + Duration::from_secs_f64(2f64.powf(exponent))
}
