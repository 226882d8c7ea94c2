//! Hook types and the `Error{cause, event_name, payload}` value record
//! routed through `internal.error`.

// std
use std::sync::Arc;
// crates.io
use futures::future::BoxFuture;
// self
use crate::_prelude::*;

/// A user-supplied asynchronous callable of one argument, invoked by the
/// Dispatcher for matching events or meta-events.
pub type Hook<T> = Arc<dyn Fn(T) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync>;

/// A user-supplied asynchronous callable of zero arguments; the shape
/// `internal.ready` hooks take.
pub type NullaryHook = Arc<dyn Fn() -> BoxFuture<'static, Result<(), HookError>> + Send + Sync>;

/// Wraps a failure encountered anywhere in the pipeline, or raised by
/// another hook, and dispatched to `internal.error`. Distinct from
/// [`HookError`]: this is the *argument* error hooks receive, not the
/// error type a hook returns.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub struct ErrorRecord {
	pub cause: Arc<Error>,
	pub event_name: Option<String>,
	pub payload: Option<Payload>,
}
impl ErrorRecord {
	pub(crate) fn new(
		cause: impl Into<Error>,
		event_name: Option<String>,
		payload: Option<Payload>,
	) -> Self {
		Self { cause: Arc::new(cause.into()), event_name, payload }
	}
}
