use tokio::signal::unix::SignalKind;
use tokio::sync::mpsc;

/// Fans several unix signals into one receiver.
pub struct SignalHandler {
	send: mpsc::Sender<SignalKind>,
	recv: mpsc::Receiver<SignalKind>,
}

impl Default for SignalHandler {
	fn default() -> Self {
		let (send, recv) = mpsc::channel(4);
		Self { send, recv }
	}
}

impl SignalHandler {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts listening for `kind`. Must be called from within a tokio runtime.
	pub fn with_signal(self, kind: SignalKind) -> std::io::Result<Self> {
		let mut signal = tokio::signal::unix::signal(kind)?;

		let send = self.send.clone();
		tokio::spawn(async move {
			while signal.recv().await.is_some() {
				if send.send(kind).await.is_err() {
					break;
				}
			}
		});

		Ok(self)
	}

	/// Waits for the next registered signal.
	pub async fn recv(&mut self) -> Option<SignalKind> {
		self.recv.recv().await
	}
}
