//! A local, in-process SSE source (§12 of the design) used to drive
//! `hookstream::client::Client::listen` end to end without depending on the
//! real GitHub SSE source.

use std::{
	net::SocketAddr,
	sync::{Arc, Mutex},
};

use axum::{
	Router,
	body::Body,
	extract::State,
	http::{HeaderMap, StatusCode},
	response::IntoResponse,
	routing::get,
};
use tokio::net::TcpListener;

/// One scripted response to a single connection attempt.
pub enum Session {
	/// Stream these raw, pre-formatted SSE chunks (each already ending in
	/// the blank-line event terminator), then either end the body cleanly
	/// or, if `break_after` is set, fail it mid-transfer to simulate a
	/// dropped connection.
	Stream { chunks: Vec<String>, break_after: bool },
	/// Respond with this status instead of opening a stream.
	Status(u16),
}

#[derive(Default)]
struct Inner {
	sessions: Vec<Session>,
	next: usize,
	last_event_ids: Vec<Option<String>>,
}

/// Binds to an ephemeral loopback port and serves one [`Session`] per
/// accepted connection, in order.
pub struct SseTestServer {
	addr: SocketAddr,
	state: Arc<Mutex<Inner>>,
	_task: tokio::task::JoinHandle<()>,
}
impl SseTestServer {
	pub async fn start(sessions: Vec<Session>) -> Self {
		let state = Arc::new(Mutex::new(Inner { sessions, next: 0, last_event_ids: Vec::new() }));
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let router = Router::new().route("/", get(handler)).with_state(state.clone());
		let task = tokio::spawn(async move {
			axum::serve(listener, router).await.unwrap();
		});

		Self { addr, state, _task: task }
	}

	pub fn url(&self) -> String {
		format!("http://{}/", self.addr)
	}

	/// The `Last-Event-ID` header observed on each accepted connection, in
	/// the order connections were accepted.
	pub fn last_event_ids(&self) -> Vec<Option<String>> {
		self.state.lock().unwrap().last_event_ids.clone()
	}
}

async fn handler(State(state): State<Arc<Mutex<Inner>>>, headers: HeaderMap) -> impl IntoResponse {
	let last_event_id =
		headers.get("last-event-id").and_then(|v| v.to_str().ok()).map(str::to_owned);
	let mut inner = state.lock().unwrap();

	inner.last_event_ids.push(last_event_id);

	let idx = inner.next;

	inner.next += 1;

	match inner.sessions.get(idx) {
		Some(Session::Status(status)) => StatusCode::from_u16(*status).unwrap().into_response(),
		Some(Session::Stream { chunks, break_after }) => {
			let chunks = chunks.clone();
			let break_after = *break_after;
			let stream = async_stream::stream! {
				for chunk in chunks {
					yield Ok::<_, std::io::Error>(bytes::Bytes::from(chunk));
				}
				if break_after {
					yield Err(std::io::Error::other("simulated transport break"));
				}
			};

			(StatusCode::OK, [("content-type", "text/event-stream")], Body::from_stream(stream))
				.into_response()
		},
		None => StatusCode::NO_CONTENT.into_response(),
	}
}
