//! The client facade: wires the reconnect loop, envelope preprocessing,
//! authentication, parsing, and dispatch into `listen()` (§4.7).

// crates.io
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	auth::{self, AuthIssue},
	dispatch,
	events::EventParser,
	hooks::{ErrorRecord, Hook, NullaryHook},
	namespace::HandlerNamespace,
	sse::{self, SseEvent, reconnect::ReconnectPolicy},
};

/// A streaming webhook client: construction, hook registration, and
/// `listen()`.
///
/// Generic over an [`EventParser`] so the engine in this crate never
/// depends on any one concrete event taxonomy; [`crate::github::GithubEventParser`]
/// is the taxonomy this crate ships.
pub struct Client<P: EventParser> {
	source: String,
	token: Option<String>,
	http: reqwest::Client,
	policy: ReconnectPolicy,
	parser: P,
	namespace: HandlerNamespace<P::Event>,
}
impl<P: EventParser> Client<P> {
	/// The canonical constructor. Performs no I/O and reads no
	/// environment state.
	pub fn new(source: impl Into<String>, token: Option<String>, parser: P) -> Self {
		let namespace = HandlerNamespace::new(parser.valid_event_names().clone());

		Self {
			source: source.into(),
			token,
			http: reqwest::Client::new(),
			policy: ReconnectPolicy::default(),
			parser,
			namespace,
		}
	}

	/// Reads `HOOKSTREAM_SOURCE_URL` (required) and `HOOKSTREAM_TOKEN`
	/// (optional) and forwards to [`Client::new`]. A missing required
	/// variable is a [`SetupError`], consistent with every other
	/// registration-time misuse being a synchronous setup failure.
	pub fn from_env(parser: P) -> Result<Self, SetupError> {
		let source = std::env::var("HOOKSTREAM_SOURCE_URL")
			.map_err(|_| SetupError::MissingEnvVar("HOOKSTREAM_SOURCE_URL".into()))?;
		let token = std::env::var("HOOKSTREAM_TOKEN").ok();

		Ok(Self::new(source, token, parser))
	}

	/// Overrides the default (§4.1) backoff policy, e.g. to avoid waiting
	/// out multi-second backoffs in tests.
	pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// The configured source URL.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// The configured shared secret, if any.
	pub fn token(&self) -> Option<&str> {
		self.token.as_deref()
	}

	/// `event.<name>(hook)` when `action` is `None`, `event.<name>.
	/// <action>(hook)` otherwise.
	pub fn on(
		&self,
		event_name: &str,
		action: Option<&str>,
		hook: Hook<Arc<P::Event>>,
	) -> Result<(), SetupError> {
		self.namespace.on(event_name, action, hook)
	}

	/// `event.any(hook)`.
	pub fn on_any(&self, hook: Hook<Arc<P::Event>>) {
		self.namespace.on_any(hook);
	}

	/// `internal.ready(hook)`.
	pub fn on_ready(&self, hook: NullaryHook) {
		self.namespace.on_ready(hook);
	}

	/// `internal.auth_issue(hook)`.
	pub fn on_auth_issue(&self, hook: Hook<AuthIssue>) {
		self.namespace.on_auth_issue(hook);
	}

	/// `internal.error(hook)`.
	pub fn on_error(&self, hook: Hook<ErrorRecord>) {
		self.namespace.on_error(hook);
	}

	/// Starts the ingest loop. Returns when the source closes the stream
	/// cleanly or an unrecovered failure bubbles out.
	pub async fn listen(&self) -> Result<()> {
		self.listen_with_cancellation(&CancellationToken::new()).await
	}

	/// As [`Client::listen`], but the loop also unwinds on `cancel`,
	/// treating cancellation as a fatal signal (§5) rather than routing
	/// it through `internal.error`.
	pub async fn listen_with_cancellation(&self, cancel: &CancellationToken) -> Result<()> {
		let error_hooks = self.namespace.error_hooks();

		dispatch::run_ready(self.namespace.ready_hooks(), error_hooks.clone(), cancel).await?;
		tracing::info!(source = %self.source, "ready");

		let stream = sse::reconnect::connect(self.http.clone(), self.source.clone(), self.policy);

		tokio::pin!(stream);

		loop {
			let sse_event = tokio::select! {
				_ = cancel.cancelled() => return Err(Error::any("listen cancelled")),
				event = stream.next() => event,
			};
			let Some(sse_event) = sse_event else { break };

			self.process_envelope(sse_event?, &error_hooks, cancel).await?;
		}

		Ok(())
	}

	async fn process_envelope(
		&self,
		sse_event: SseEvent,
		error_hooks: &[Hook<ErrorRecord>],
		cancel: &CancellationToken,
	) -> Result<()> {
		let data = match sse_event.parse_json::<Value>() {
			Ok(Value::Object(map)) => map,
			_ => return Ok(()),
		};
		let Some(payload) = Payload::from_raw(data) else { return Ok(()) };
		let Some(event_name) = payload.event_name().map(str::to_owned) else {
			tracing::warn!("envelope missing x-github-event header");

			return dispatch::route_error(
				ErrorRecord::new(
					PreprocessingError::MissingEventHeader { payload: payload.clone() },
					None,
					Some(payload),
				),
				error_hooks,
				cancel,
			)
			.await;
		};
		let Some(body) = payload.body() else {
			tracing::warn!(event_name, "envelope missing body");

			return dispatch::route_error(
				ErrorRecord::new(
					PreprocessingError::MissingBody { event_name: event_name.clone() },
					Some(event_name),
					Some(payload),
				),
				error_hooks,
				cancel,
			)
			.await;
		};

		let (passes, issue) = auth::check(&payload, self.token.as_deref());

		if let Some(issue) = issue {
			dispatch::run(
				self.namespace.auth_issue_hooks(),
				issue,
				Some(event_name.clone()),
				Some(payload.clone()),
				error_hooks.to_vec(),
				cancel,
			)
			.await?;
		}

		if !passes {
			tracing::warn!(event_name, "delivery failed authentication");

			return Ok(());
		}

		let event = match self.parser.parse(&event_name, body) {
			Ok(event) => event,
			Err(cause) => {
				tracing::error!(event_name, error = %cause, "failed to parse event");

				return dispatch::route_error(
					ErrorRecord::new(
						PreprocessingError::InvalidEvent { event_name: event_name.clone(), cause },
						Some(event_name),
						Some(payload),
					),
					error_hooks,
					cancel,
				)
				.await;
			},
		};
		let action = payload.action().map(str::to_owned);
		let hooks = self.namespace.lookup(&event_name, action.as_deref());

		tracing::debug!(event_name, hooks = hooks.len(), "dispatching");

		dispatch::run(
			hooks,
			Arc::new(event),
			Some(event_name),
			Some(payload),
			error_hooks.to_vec(),
			cancel,
		)
		.await
	}
}
