//! The hierarchical handler namespace (§4.5): `event[name][action]` plus
//! `any`/`[*]` wildcards, and a fixed `internal` registry for the three
//! meta-events.

// std
use std::{
	collections::{HashMap, HashSet},
	sync::RwLock,
};
// self
use crate::{
	_prelude::*,
	auth::AuthIssue,
	hooks::{ErrorRecord, Hook, NullaryHook},
};

#[derive(Default)]
struct EventEntry<E> {
	any_action: Vec<Hook<Arc<E>>>,
	by_action: HashMap<String, Vec<Hook<Arc<E>>>>,
}

/// The three fixed internal meta-event hook lists.
#[derive(Default)]
struct Internal {
	ready: RwLock<Vec<NullaryHook>>,
	auth_issue: RwLock<Vec<Hook<AuthIssue>>>,
	error: RwLock<Vec<Hook<ErrorRecord>>>,
}

/// Registration and lookup for one client's hooks. The set of valid event
/// names is fixed at construction (from the [`EventParser`][ep]); hook
/// lists are append-only and read under a lock held only long enough to
/// clone the matching handles.
///
/// [ep]: crate::events::EventParser
pub struct HandlerNamespace<E> {
	valid_event_names: HashSet<String>,
	any: RwLock<Vec<Hook<Arc<E>>>>,
	events: RwLock<HashMap<String, EventEntry<E>>>,
	internal: Internal,
}
impl<E> HandlerNamespace<E> {
	pub(crate) fn new(valid_event_names: HashSet<String>) -> Self {
		Self {
			valid_event_names,
			any: RwLock::new(Vec::new()),
			events: RwLock::new(HashMap::new()),
			internal: Internal::default(),
		}
	}

	/// `event.any(hook)` — fires for every delivery regardless of name or
	/// action.
	pub fn on_any(&self, hook: Hook<Arc<E>>) {
		self.any.write().unwrap().push(hook);
	}

	/// `event.<name>(hook)` when `action` is `None`, `event.<name>.<action>
	/// (hook)` otherwise. Fails immediately if `event_name` is outside the
	/// set the event parser reports.
	pub fn on(
		&self,
		event_name: &str,
		action: Option<&str>,
		hook: Hook<Arc<E>>,
	) -> Result<(), SetupError> {
		if !self.valid_event_names.contains(event_name) {
			return Err(SetupError::UnknownEvent(event_name.to_owned()));
		}

		let mut events = self.events.write().unwrap();
		let entry = events.entry(event_name.to_owned()).or_default();

		match action {
			None => entry.any_action.push(hook),
			Some(action) => entry.by_action.entry(action.to_owned()).or_default().push(hook),
		}

		Ok(())
	}

	/// `internal.ready(hook)` — runs once per `listen()`, before the first
	/// envelope.
	pub fn on_ready(&self, hook: NullaryHook) {
		self.internal.ready.write().unwrap().push(hook);
	}

	/// `internal.auth_issue(hook)` — runs per [`AuthIssue`].
	pub fn on_auth_issue(&self, hook: Hook<AuthIssue>) {
		self.internal.auth_issue.write().unwrap().push(hook);
	}

	/// `internal.error(hook)` — runs per [`ErrorRecord`].
	pub fn on_error(&self, hook: Hook<ErrorRecord>) {
		self.internal.error.write().unwrap().push(hook);
	}

	/// Concatenates, in order, `event.any[*]`, `event[name][*]`, and — if
	/// `action` is present — `event[name][action]`. Dispatch itself is
	/// concurrent; the order here is documentation, not an execution
	/// guarantee.
	pub(crate) fn lookup(&self, event_name: &str, action: Option<&str>) -> Vec<Hook<Arc<E>>> {
		let mut hooks = self.any.read().unwrap().clone();
		let events = self.events.read().unwrap();

		if let Some(entry) = events.get(event_name) {
			hooks.extend(entry.any_action.iter().cloned());

			if let Some(action) = action {
				if let Some(by_action) = entry.by_action.get(action) {
					hooks.extend(by_action.iter().cloned());
				}
			}
		}

		hooks
	}

	pub(crate) fn ready_hooks(&self) -> Vec<NullaryHook> {
		self.internal.ready.read().unwrap().clone()
	}

	pub(crate) fn auth_issue_hooks(&self) -> Vec<Hook<AuthIssue>> {
		self.internal.auth_issue.read().unwrap().clone()
	}

	pub(crate) fn error_hooks(&self) -> Vec<Hook<ErrorRecord>> {
		self.internal.error.read().unwrap().clone()
	}
}
