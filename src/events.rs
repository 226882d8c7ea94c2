//! The external event-parser boundary (§4.4): a thin contract lifting a
//! `(event_name, body)` pair into a typed event value.

// std
use std::collections::HashSet;
// self
use crate::_prelude::*;

/// Contract over the external event taxonomy. The core engine depends only
/// on this trait — it never needs to know the concrete event shapes, only
/// the fixed set of names valid for registration and how to turn a body
/// into a typed value.
pub trait EventParser: Send + Sync + 'static {
	/// The typed event value produced by [`EventParser::parse`].
	type Event: Send + Sync + 'static;

	/// The fixed set of event names this parser recognizes. Consulted once
	/// at registration time to reject unknown names with a [`SetupError`].
	fn valid_event_names(&self) -> &HashSet<String>;

	/// Lifts `(event_name, body)` into a typed event, or a validation
	/// failure detailing the field-level issue that becomes the `cause` of
	/// a [`PreprocessingError::InvalidEvent`].
	fn parse(&self, event_name: &str, body: &Map) -> serde_json::Result<Self::Event>;
}
