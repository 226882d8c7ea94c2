//! Delivery payload: the normalized, case-folded form of one SSE envelope.

// std
use std::collections::BTreeMap;
// self
use crate::_prelude::*;

/// Header carrying the event name, e.g. `star`, `push`.
pub const EVENT_HEADER: &str = "x-github-event";
/// Header carrying the `sha256=<hex>` HMAC signature of the body.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
/// The distinguished key holding the original webhook JSON body.
pub const BODY_KEY: &str = "body";

/// An immutable, case-folded view of one SSE envelope's decoded `data`
/// object.
///
/// Produced once by [`Payload::from_raw`] and shared read-only with every
/// downstream pipeline stage; nothing mutates a `Payload` after
/// preprocessing.
#[derive(Clone, Debug)]
pub struct Payload(BTreeMap<String, Value>);
impl Payload {
	/// Case-folds every key of a decoded SSE `data` object. Returns `None`
	/// for an empty object, per the envelope preprocessor's empty-envelope
	/// rule — callers must silently skip rather than dispatch or error.
	pub(crate) fn from_raw(raw: Map) -> Option<Self> {
		if raw.is_empty() {
			return None;
		}

		Some(Self(raw.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect()))
	}

	/// Looks up a header by name, case-insensitively.
	pub fn get(&self, header: &str) -> Option<&Value> {
		self.0.get(&header.to_lowercase())
	}

	/// The `x-github-event` header value, if present and a string.
	pub fn event_name(&self) -> Option<&str> {
		self.get(EVENT_HEADER).and_then(Value::as_str)
	}

	/// The `x-hub-signature-256` header value, if present and a string.
	pub fn signature(&self) -> Option<&str> {
		self.get(SIGNATURE_HEADER).and_then(Value::as_str)
	}

	/// The `body` object, if present, non-empty, and a JSON object.
	pub fn body(&self) -> Option<&Map> {
		self.get(BODY_KEY).and_then(Value::as_object).filter(|b| !b.is_empty())
	}

	/// `body.action`, if present and a string.
	pub fn action(&self) -> Option<&str> {
		self.body().and_then(|b| b.get("action")).and_then(Value::as_str)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn obj(pairs: &[(&str, Value)]) -> Map {
		pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
	}

	#[test]
	fn empty_envelope_is_skipped() {
		assert!(Payload::from_raw(Map::new()).is_none());
	}

	#[test]
	fn headers_are_case_folded() {
		let raw = obj(&[
			("X-GitHub-Event", Value::String("star".into())),
			("body", Value::Object(obj(&[("action", Value::String("created".into()))]))),
		]);
		let payload = Payload::from_raw(raw).unwrap();

		assert_eq!(payload.event_name(), Some("star"));
		assert_eq!(payload.get("X-GITHUB-EVENT").and_then(Value::as_str), Some("star"));
		assert_eq!(payload.action(), Some("created"));
	}

	#[test]
	fn missing_body_yields_none() {
		let raw = obj(&[("x-github-event", Value::String("push".into()))]);
		let payload = Payload::from_raw(raw).unwrap();

		assert!(payload.body().is_none());
		assert!(payload.action().is_none());
	}

	#[test]
	fn empty_body_object_is_treated_as_missing() {
		let raw = obj(&[
			("x-github-event", Value::String("push".into())),
			("body", Value::Object(Map::new())),
		]);
		let payload = Payload::from_raw(raw).unwrap();

		assert!(payload.body().is_none());
	}
}
