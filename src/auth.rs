//! HMAC signature verification against the GitHub webhook shared-secret
//! scheme.

// crates.io
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::_prelude::*;

type HmacSha256 = Hmac<Sha256>;

/// The kind of inconsistency between the configured token and a delivery's
/// signature state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthIssueKind {
	/// A token is configured but the delivery carried no signature.
	Missing,
	/// No token is configured but the delivery carried a signature anyway.
	Unexpected,
	/// A token is configured, a signature was present, but verification
	/// failed.
	Mismatch,
}

/// Notification dispatched to `internal.auth_issue` whenever a delivery's
/// signature state doesn't line up cleanly with the client's configured
/// token. Not an error; never surfaces through `listen()`.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub struct AuthIssue {
	pub kind: AuthIssueKind,
	pub payload: Payload,
}

/// Runs the §4.3 truth table against `payload`, returning whether the
/// delivery passes and, when it doesn't (or the state was merely
/// inconsistent with configuration), the issue to route through
/// `internal.auth_issue`.
pub(crate) fn check(payload: &Payload, token: Option<&str>) -> (bool, Option<AuthIssue>) {
	let signature = payload.signature();

	match (token, signature) {
		(None, None) => (true, None),
		(None, Some(_)) =>
			(true, Some(AuthIssue { kind: AuthIssueKind::Unexpected, payload: payload.clone() })),
		(Some(_), None) =>
			(false, Some(AuthIssue { kind: AuthIssueKind::Missing, payload: payload.clone() })),
		(Some(token), Some(signature)) =>
			if verify(token, payload.body(), signature) {
				(true, None)
			} else {
				(false, Some(AuthIssue { kind: AuthIssueKind::Mismatch, payload: payload.clone() }))
			},
	}
}

/// HMAC-SHA-256 verification over the body, constant-time. The SSE envelope
/// only ever carries `body` as already-decoded JSON, not GitHub's original
/// signed bytes, so this re-serializes before hashing — the same thing the
/// original's `githubkit.webhooks.verify` does against a parsed dict.
fn verify(token: &str, body: Option<&Map>, signature: &str) -> bool {
	let Some(hex_digest) = signature.strip_prefix("sha256=") else { return false };
	let Ok(expected) = hex::decode(hex_digest) else { return false };
	let Some(body) = body else { return false };
	let Ok(bytes) = serde_json::to_vec(body) else { return false };
	let Ok(mut mac) = HmacSha256::new_from_slice(token.as_bytes()) else { return false };

	mac.update(&bytes);
	mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod test {
	use super::*;

	fn signed_payload(token: &str, body: &Map) -> Payload {
		let bytes = serde_json::to_vec(body).unwrap();
		let mut mac = HmacSha256::new_from_slice(token.as_bytes()).unwrap();

		mac.update(&bytes);

		let sig = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));
		let mut raw = Map::new();

		raw.insert("x-github-event".into(), Value::String("push".into()));
		raw.insert("x-hub-signature-256".into(), Value::String(sig));
		raw.insert("body".into(), Value::Object(body.clone()));

		Payload::from_raw(raw).unwrap()
	}

	fn body() -> Map {
		let mut m = Map::new();

		m.insert("action".into(), Value::String("created".into()));

		m
	}

	#[test]
	fn no_token_no_signature_passes() {
		let mut raw = Map::new();

		raw.insert("x-github-event".into(), Value::String("push".into()));
		raw.insert("body".into(), Value::Object(body()));

		let payload = Payload::from_raw(raw).unwrap();
		let (pass, issue) = check(&payload, None);

		assert!(pass);
		assert!(issue.is_none());
	}

	#[test]
	fn no_token_unexpected_signature_passes_with_issue() {
		let mut raw = Map::new();

		raw.insert("x-github-event".into(), Value::String("push".into()));
		raw.insert("x-hub-signature-256".into(), Value::String("sha256=0".into()));
		raw.insert("body".into(), Value::Object(body()));

		let payload = Payload::from_raw(raw).unwrap();
		let (pass, issue) = check(&payload, None);

		assert!(pass);
		assert_eq!(issue.unwrap().kind, AuthIssueKind::Unexpected);
	}

	#[test]
	fn token_missing_signature_fails() {
		let mut raw = Map::new();

		raw.insert("x-github-event".into(), Value::String("push".into()));
		raw.insert("body".into(), Value::Object(body()));

		let payload = Payload::from_raw(raw).unwrap();
		let (pass, issue) = check(&payload, Some("secret"));

		assert!(!pass);
		assert_eq!(issue.unwrap().kind, AuthIssueKind::Missing);
	}

	#[test]
	fn token_matching_signature_passes() {
		let payload = signed_payload("foobar", &body());
		let (pass, issue) = check(&payload, Some("foobar"));

		assert!(pass);
		assert!(issue.is_none());
	}

	#[test]
	fn token_mismatched_signature_fails() {
		let payload = signed_payload("wrong", &body());
		let (pass, issue) = check(&payload, Some("foobar"));

		assert!(!pass);
		assert_eq!(issue.unwrap().kind, AuthIssueKind::Mismatch);
	}
}
