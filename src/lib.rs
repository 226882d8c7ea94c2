//! Streams GitHub-style webhook deliveries over Server-Sent Events and
//! dispatches them to a hierarchical namespace of user-registered async
//! hooks.
//!
//! The hard part is the event engine: a resumable SSE reconnect loop, an
//! HMAC authentication state machine, a two-level (event/action) hook
//! namespace with wildcard matching, and concurrent dispatch with
//! well-defined error recovery through `ready`/`auth_issue`/`error`
//! meta-events. The concrete GitHub event taxonomy (see [`github`]) sits on
//! top of that engine rather than inside it.

#![deny(clippy::all, missing_docs)]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub mod auth;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod github;
pub mod hooks;
pub mod namespace;
pub mod payload;
pub mod sse;

pub mod prelude {
	#![allow(missing_docs)]

	pub use crate::{
		auth::*, client::*, error::*, events::*, github::*, hooks::*, namespace::*, payload::*,
		sse::*,
	};
}

mod _prelude {
	pub use std::sync::Arc;

	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value;

	pub(crate) use crate::{error::*, payload::Payload};

	pub(crate) type Map = serde_json::Map<String, Value>;
}
