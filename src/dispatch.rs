//! Concurrent hook fan-out with fatal-signal discrimination (§4.6).

// std
use std::pin::Pin;
// crates.io
use futures::future::Future;
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	hooks::{ErrorRecord, Hook, NullaryHook},
};

/// Runs every hook in `hooks` concurrently against `arg`, joins them all,
/// and routes ordinary failures to `error_hooks` as an [`ErrorRecord`].
///
/// A [`tokio::task::JoinError`] whose [`JoinError::is_panic`] or
/// [`JoinError::is_cancelled`] is true is a *fatal signal* per §4.6/§9: it
/// is resumed (a panic) or propagated (a cancellation) immediately and
/// never routed through `error_hooks`. `cancel` firing while hooks are
/// in flight aborts every outstanding `JoinHandle` so each subsequently
/// observes `is_cancelled()` (§5's "in-flight hooks inherit the
/// cancellation signal").
///
/// If no `error_hooks` are registered, the first ordinary failure is
/// returned to the caller instead of being silently dropped, matching
/// "otherwise surfaced to the caller of `listen()`" in the error-handling
/// design.
pub(crate) async fn run<T>(
	hooks: Vec<Hook<T>>,
	arg: T,
	event_name: Option<String>,
	payload: Option<Payload>,
	error_hooks: Vec<Hook<ErrorRecord>>,
	cancel: &CancellationToken,
) -> Result<()>
where
	T: Clone + Send + 'static,
{
	let handles: Vec<_> = hooks
		.into_iter()
		.map(|hook| {
			let arg = arg.clone();

			tokio::spawn(async move { hook(arg).await })
		})
		.collect();
	let canceller = spawn_canceller(&handles, cancel);
	let mut failures = Vec::new();

	for handle in handles {
		match handle.await {
			Ok(Ok(())) => {},
			Ok(Err(err)) => failures.push(err),
			Err(join_err) => {
				canceller.abort();
				resume_or_propagate_fatal(join_err)?;
			},
		}
	}

	canceller.abort();

	for failure in failures {
		route_error(
			ErrorRecord::new(failure, event_name.clone(), payload.clone()),
			&error_hooks,
			cancel,
		)
		.await?;
	}

	Ok(())
}

/// Runs the zero-argument `internal.ready` hooks.
pub(crate) async fn run_ready(
	hooks: Vec<NullaryHook>,
	error_hooks: Vec<Hook<ErrorRecord>>,
	cancel: &CancellationToken,
) -> Result<()> {
	let handles: Vec<_> =
		hooks.into_iter().map(|hook| tokio::spawn(async move { hook().await })).collect();
	let canceller = spawn_canceller(&handles, cancel);
	let mut failures = Vec::new();

	for handle in handles {
		match handle.await {
			Ok(Ok(())) => {},
			Ok(Err(err)) => failures.push(err),
			Err(join_err) => {
				canceller.abort();
				resume_or_propagate_fatal(join_err)?;
			},
		}
	}

	canceller.abort();

	for failure in failures {
		route_error(ErrorRecord::new(failure, None, None), &error_hooks, cancel).await?;
	}

	Ok(())
}

/// Dispatches one [`ErrorRecord`] to `error_hooks`. Reentrant: a failing
/// error hook is routed back through this same function, relying on the
/// runtime's own call-stack limit to break an unconditionally-failing
/// error hook rather than a bespoke recursion guard (§9).
pub(crate) fn route_error<'a>(
	record: ErrorRecord,
	error_hooks: &'a [Hook<ErrorRecord>],
	cancel: &'a CancellationToken,
) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
	Box::pin(async move {
		if error_hooks.is_empty() {
			return Err(Arc::try_unwrap(record.cause)
				.unwrap_or_else(|shared| Error::any(shared.to_string())));
		}

		let handles: Vec<_> = error_hooks
			.iter()
			.cloned()
			.map(|hook| {
				let record = record.clone();

				tokio::spawn(async move { hook(record).await })
			})
			.collect();
		let canceller = spawn_canceller(&handles, cancel);
		let mut failures = Vec::new();

		for handle in handles {
			match handle.await {
				Ok(Ok(())) => {},
				Ok(Err(err)) => failures.push(err),
				Err(join_err) => {
					canceller.abort();
					resume_or_propagate_fatal(join_err)?;
				},
			}
		}

		canceller.abort();

		for failure in failures {
			route_error(
				ErrorRecord::new(failure, record.event_name.clone(), record.payload.clone()),
				error_hooks,
				cancel,
			)
			.await?;
		}

		Ok(())
	})
}

/// Watches `cancel`, and once it fires, aborts every handle in `handles` so
/// each becomes a fatal [`tokio::task::JoinError`] (`is_cancelled() ==
/// true`) the next time its owner joins it. The returned task is itself
/// aborted by the caller once the handles have all been joined normally,
/// so it never outlives the `run`/`route_error` call that spawned it.
fn spawn_canceller<O>(
	handles: &[tokio::task::JoinHandle<O>],
	cancel: &CancellationToken,
) -> tokio::task::JoinHandle<()>
where
	O: Send + 'static,
{
	let abort_handles: Vec<_> = handles.iter().map(tokio::task::JoinHandle::abort_handle).collect();
	let cancel = cancel.clone();

	tokio::spawn(async move {
		cancel.cancelled().await;

		for abort_handle in abort_handles {
			abort_handle.abort();
		}
	})
}

/// A panicking or cancelled join is a fatal signal: resume the panic
/// in-place, or propagate the cancellation, rather than routing it as an
/// ordinary hook error.
fn resume_or_propagate_fatal(join_err: tokio::task::JoinError) -> Result<()> {
	if join_err.is_panic() {
		std::panic::resume_unwind(join_err.into_panic());
	}

	Err(Error::any(format!("hook task was cancelled: {join_err}")))
}
