//! A concrete [`EventParser`] over a representative slice of the GitHub
//! webhook taxonomy: enough to exercise every scenario this crate's own
//! test suite cares about, not the complete upstream schema set.

// std
use std::{collections::HashSet, sync::LazyLock};
// self
use crate::{_prelude::*, events::EventParser};

/// `star` event: a repository was starred or unstarred.
#[allow(missing_docs)]
#[derive(Clone, Debug, Deserialize)]
pub struct StarEvent {
	pub action: String,
	pub starred_at: Option<String>,
	pub repository: Repository,
	pub sender: User,
}

/// `github_app_authorization` event: a user revoked their authorization of
/// a GitHub App.
#[allow(missing_docs)]
#[derive(Clone, Debug, Deserialize)]
pub struct GithubAppAuthorizationEvent {
	pub action: String,
	pub sender: User,
}

/// `push` event: one or more commits were pushed to a ref.
#[allow(missing_docs)]
#[derive(Clone, Debug, Deserialize)]
pub struct PushEvent {
	pub r#ref: String,
	pub before: String,
	pub after: String,
	pub repository: Repository,
	pub pusher: Pusher,
}

#[allow(missing_docs)]
#[derive(Clone, Debug, Deserialize)]
pub struct Repository {
	pub id: u64,
	pub name: String,
	pub full_name: String,
}

#[allow(missing_docs)]
#[derive(Clone, Debug, Deserialize)]
pub struct User {
	pub login: String,
	pub id: u64,
}

#[allow(missing_docs)]
#[derive(Clone, Debug, Deserialize)]
pub struct Pusher {
	pub name: String,
	pub email: Option<String>,
}

/// The typed union of every event [`GithubEventParser`] knows how to
/// produce.
#[derive(Clone, Debug)]
pub enum GithubEvent {
	/// A [`StarEvent`].
	Star(StarEvent),
	/// A [`GithubAppAuthorizationEvent`].
	GithubAppAuthorization(GithubAppAuthorizationEvent),
	/// A [`PushEvent`].
	Push(PushEvent),
}
impl GithubEvent {
	/// `body.action`, if the event carries one.
	pub fn action(&self) -> Option<&str> {
		match self {
			Self::Star(e) => Some(&e.action),
			Self::GithubAppAuthorization(e) => Some(&e.action),
			Self::Push(_) => None,
		}
	}
}

static VALID_EVENT_NAMES: LazyLock<HashSet<String>> = LazyLock::new(|| {
	["star", "github_app_authorization", "push"].into_iter().map(String::from).collect()
});

/// [`EventParser`] implementation over [`GithubEvent`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GithubEventParser;
impl EventParser for GithubEventParser {
	type Event = GithubEvent;

	fn valid_event_names(&self) -> &HashSet<String> {
		&VALID_EVENT_NAMES
	}

	fn parse(&self, event_name: &str, body: &Map) -> serde_json::Result<Self::Event> {
		let value = Value::Object(body.clone());

		match event_name {
			"star" => Ok(GithubEvent::Star(serde_json::from_value(value)?)),
			"github_app_authorization" =>
				Ok(GithubEvent::GithubAppAuthorization(serde_json::from_value(value)?)),
			"push" => Ok(GithubEvent::Push(serde_json::from_value(value)?)),
			other => Err(serde::de::Error::custom(format!("unknown event name: {other}"))),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn body(json: serde_json::Value) -> Map {
		json.as_object().unwrap().clone()
	}

	#[test]
	fn valid_event_names_match_the_implemented_subset() {
		let parser = GithubEventParser;
		let names = parser.valid_event_names();

		assert!(names.contains("star"));
		assert!(names.contains("github_app_authorization"));
		assert!(names.contains("push"));
		assert_eq!(names.len(), 3);
	}

	#[test]
	fn parses_star_event() {
		let parser = GithubEventParser;
		let body = body(serde_json::json!({
			"action": "created",
			"starred_at": "2024-01-01T00:00:00Z",
			"repository": {"id": 1, "name": "repo", "full_name": "org/repo"},
			"sender": {"login": "octocat", "id": 2},
		}));
		let event = parser.parse("star", &body).unwrap();

		match event {
			GithubEvent::Star(star) => assert_eq!(star.action, "created"),
			_ => panic!("expected a star event"),
		}
	}

	#[test]
	fn unknown_event_name_fails() {
		let parser = GithubEventParser;

		assert!(parser.parse("unknown", &Map::new()).is_err());
	}

	#[test]
	fn malformed_body_fails_to_parse() {
		let parser = GithubEventParser;
		let body = body(serde_json::json!({"foo": "bar"}));

		assert!(parser.parse("push", &body).is_err());
	}
}
