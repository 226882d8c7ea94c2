//! Incremental, allocation-light SSE line parser.
//!
//! Knows nothing about HTTP, retries, or the GitHub envelope shape; accepts
//! arbitrary byte chunks and yields complete events as they close on a
//! blank line.

// self
use crate::_prelude::*;

/// One complete SSE record.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SseEvent {
	pub event: Option<String>,
	pub data: String,
	pub id: Option<String>,
	pub retry: Option<u64>,
}
impl SseEvent {
	/// Parses `data` as JSON.
	pub fn parse_json<T>(&self) -> serde_json::Result<T>
	where
		T: serde::de::DeserializeOwned,
	{
		serde_json::from_str(&self.data)
	}
}

/// Buffers arbitrary byte chunks and reassembles them into [`SseEvent`]s.
#[derive(Debug, Default)]
pub struct SseParser {
	buffer: String,
	current: Option<SseEvent>,
}
impl SseParser {
	/// An empty parser, ready for the first chunk.
	pub fn new() -> Self {
		Self::default()
	}

	/// Feeds `text` into the buffer and drains every complete line,
	/// returning the events that closed (hit a blank line) as a result.
	pub fn process_chunk(&mut self, text: &str) -> Vec<SseEvent> {
		let mut events = Vec::new();

		self.buffer.push_str(text);

		while let Some(line_end) = self.buffer.find('\n') {
			let line = self.buffer[..line_end].to_owned();

			self.buffer.drain(..=line_end);

			let line = line.trim_end_matches('\r');

			if line.is_empty() {
				if let Some(event) = self.current.take() {
					if !event.data.is_empty() {
						events.push(event);
					}
				}

				continue;
			}

			if line.starts_with(':') {
				continue;
			}

			let Some((field, value)) = line.split_once(':') else { continue };
			let value = value.trim_start();
			let event = self.current.get_or_insert_with(SseEvent::default);

			match field {
				"event" => event.event = Some(value.to_owned()),
				"data" => {
					if !event.data.is_empty() {
						event.data.push('\n');
					}

					event.data.push_str(value);
				},
				"id" => event.id = Some(value.to_owned()),
				"retry" => event.retry = value.parse().ok(),
				_ => {},
			}
		}

		events
	}

	/// Returns whatever event is mid-assembly when the stream ends without
	/// a trailing blank line.
	pub fn flush(&mut self) -> Option<SseEvent> {
		self.current.take().filter(|e| !e.data.is_empty())
	}
}
