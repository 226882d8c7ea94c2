#![allow(missing_docs)]

// self
use crate::payload::Payload;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Any(String),

	#[error(transparent)]
	Setup(#[from] SetupError),
	#[error(transparent)]
	Preprocessing(#[from] PreprocessingError),
	#[error(transparent)]
	Hook(#[from] HookError),

	#[error("non-retryable transport failure: {0}")]
	Transport(#[source] reqwest::Error),

	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
impl Error {
	pub fn any<T>(any: T) -> Self
	where
		T: Into<String>,
	{
		Self::Any(any.into())
	}
}

/// Registration-time misuse; raised synchronously and never routed through
/// `internal.error`.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
	#[error("unknown event name: {0}")]
	UnknownEvent(String),
	/// Kept for taxonomy completeness against the rule this variant names;
	/// the string-keyed `on`/`on_any`/`on_ready`/`on_auth_issue`/`on_error`
	/// registration surface has no code path that can ever construct it —
	/// there is no way to pass `"internal"` itself as an event name, only
	/// the dedicated internal entry points or a concrete external event.
	#[error("cannot register against the bare `internal` namespace; use a concrete sub-event")]
	BareInternalNamespace,
	#[error("missing required environment variable: {0}")]
	MissingEnvVar(String),
}

/// An envelope that reached the pipeline but failed validation before a
/// typed event could be produced and dispatched.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessingError {
	#[error("received data is missing the x-github-event header")]
	MissingEventHeader { payload: Payload },
	#[error("received data doesn't contain a body")]
	MissingBody { event_name: String },
	#[error("the received payload could not be parsed as an event")]
	InvalidEvent {
		event_name: String,
		#[source]
		cause: serde_json::Error,
	},
}

/// A failure raised by a user-supplied hook; never constructed by the
/// library itself.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
	#[error("{0}")]
	Any(String),
	#[error(transparent)]
	Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
impl HookError {
	pub fn any<T>(any: T) -> Self
	where
		T: Into<String>,
	{
		Self::Any(any.into())
	}
}
