//! Synchronous listener fan-out for the state stores.

use std::fmt;

/// Handle returned by `subscribe`; pass it back to `unsubscribe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Ordered set of listeners notified with a full snapshot of `T`.
pub struct Listeners<T> {
	next_id: u64,
	entries: Vec<(Subscription, Box<dyn FnMut(&T)>)>,
}

impl<T> Default for Listeners<T> {
	fn default() -> Self {
		Self {
			next_id: 0,
			entries: Vec::new(),
		}
	}
}

impl<T> fmt::Debug for Listeners<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Listeners")
			.field("count", &self.entries.len())
			.finish()
	}
}

impl<T> Listeners<T> {
	pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> Subscription {
		let subscription = Subscription(self.next_id);
		self.next_id += 1;
		self.entries.push((subscription, Box::new(listener)));
		subscription
	}

	/// Returns false if the subscription was already gone.
	pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
		let before = self.entries.len();
		self.entries.retain(|(s, _)| *s != subscription);
		self.entries.len() != before
	}

	/// Call every listener, in subscription order.
	pub fn notify(&mut self, value: &T) {
		for (_, listener) in &mut self.entries {
			listener(value);
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
