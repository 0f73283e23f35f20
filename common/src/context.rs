use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A cloneable shutdown signal.
///
/// Every clone keeps the owning [`Handler`] waiting in [`Handler::cancel`]
/// until it is dropped, so long running tasks should hold on to their
/// context for as long as they do work.
#[derive(Clone, Debug)]
pub struct Context {
	token: CancellationToken,
	_alive: mpsc::Sender<()>,
}

/// The owning side of a [`Context`].
#[derive(Debug)]
pub struct Handler {
	token: CancellationToken,
	alive: mpsc::Receiver<()>,
}

impl Context {
	#[must_use]
	pub fn new() -> (Self, Handler) {
		let token = CancellationToken::new();
		let (alive_send, alive_recv) = mpsc::channel(1);

		(
			Self {
				token: token.clone(),
				_alive: alive_send,
			},
			Handler {
				token,
				alive: alive_recv,
			},
		)
	}

	pub async fn done(&self) {
		self.token.cancelled().await
	}
}

impl Handler {
	/// Resolves once every [`Context`] tied to this handler has been dropped.
	pub async fn done(&mut self) {
		while self.alive.recv().await.is_some() {}
	}

	/// Cancels the context, then waits for all of its clones to be dropped.
	pub async fn cancel(mut self) {
		self.token.cancel();
		self.done().await;
	}
}
