use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

/// An in-memory map whose entries expire `ttl` after they were inserted.
///
/// A zero ttl disables the cache, nothing is ever stored.
#[derive(Debug)]
pub struct TtlCache<K, V> {
	ttl: Duration,
	entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
	pub fn new(ttl: Duration) -> Self {
		Self {
			ttl,
			entries: Mutex::new(HashMap::new()),
		}
	}

	pub fn get(&self, key: &K) -> Option<V> {
		let mut entries = self.lock();

		match entries.get(key) {
			Some((expires_at, value)) if *expires_at > Instant::now() => Some(value.clone()),
			Some(_) => {
				entries.remove(key);
				None
			}
			None => None,
		}
	}

	pub fn insert(&self, key: K, value: V) {
		if self.ttl.is_zero() {
			return;
		}

		let now = Instant::now();
		let mut entries = self.lock();
		entries.retain(|_, (expires_at, _)| *expires_at > now);
		entries.insert(key, (now + self.ttl, value));
	}

	/// Number of stored entries, expired ones included until they are purged.
	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn lock(&self) -> MutexGuard<'_, HashMap<K, (Instant, V)>> {
		// A panic while holding the lock cannot leave the map half updated.
		self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}
}
