/// Lets a page fetch once per change of its input key.
///
/// Rendering never consults the guard; only page entry does. Explicit
/// refreshes after a successful transaction bypass it.
#[derive(Debug, Clone)]
pub struct RefetchGuard<K> {
	last: Option<K>,
}

impl<K> Default for RefetchGuard<K> {
	fn default() -> Self {
		Self { last: None }
	}
}

impl<K: PartialEq + Clone> RefetchGuard<K> {
	/// Returns true (and remembers `key`) when `key` differs from the last one seen.
	pub fn should_fetch(&mut self, key: &K) -> bool {
		if self.last.as_ref() == Some(key) {
			return false;
		}
		self.last = Some(key.clone());
		true
	}

	/// Forgets the last key so the next check fetches again.
	pub fn reset(&mut self) {
		self.last = None;
	}
}
