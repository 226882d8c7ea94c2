//! Registers a couple of hooks and starts listening.
//!
//! Requires `HOOKSTREAM_SOURCE_URL` (and optionally `HOOKSTREAM_TOKEN`) in
//! the environment or a `.env` file.

use hookstream::{
	client::Client,
	github::{GithubEvent, GithubEventParser},
	hooks::ErrorRecord,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	dotenvy::dotenv().ok();
	tracing_subscriber::fmt::init();

	let client = Client::from_env(GithubEventParser)?;

	client.on_any(std::sync::Arc::new(
		|event: std::sync::Arc<GithubEvent>| -> futures::future::BoxFuture<
			'static,
			Result<(), hookstream::error::HookError>,
		> {
			Box::pin(async move {
				tracing::info!(?event, "received event");

				Ok(())
			})
		},
	));
	client.on_error(std::sync::Arc::new(
		|record: ErrorRecord| -> futures::future::BoxFuture<
			'static,
			Result<(), hookstream::error::HookError>,
		> {
			Box::pin(async move {
				tracing::error!(error = %record.cause, "pipeline error");

				Ok(())
			})
		},
	));

	client.listen().await?;

	Ok(())
}
