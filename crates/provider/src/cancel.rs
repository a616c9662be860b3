use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slab::Slab;

/// Something blocked on behalf of a [`WaitContext`] that must be woken when it is cancelled.
pub(crate) trait Wake: Send + Sync {
	fn wake(&self);
}

/// Cancellation context for callers blocked in
/// [`AvailabilityGate::await_handle_with`](crate::AvailabilityGate::await_handle_with).
///
/// Cancellation is sticky: once cancelled, every later wait made with this context fails with
/// [`Error::WaitCancelled`](crate::Error::WaitCancelled) instead of blocking.
#[derive(Clone, Default)]
pub struct WaitContext {
	inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
	cancelled: AtomicBool,
	wakers: Mutex<Slab<Arc<dyn Wake>>>,
}

impl WaitContext {
	/// Creates a context that is not cancelled.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true when cancellation was requested.
	pub fn is_cancelled(&self) -> bool {
		self.inner.cancelled.load(Ordering::Acquire)
	}

	/// Requests cancellation and wakes every wait currently using this context.
	pub fn cancel(&self) {
		if self.inner.cancelled.swap(true, Ordering::AcqRel) {
			return;
		}
		// Wake outside the slab lock; waiters register while holding their gate lock.
		let wakers: Vec<_> = self.inner.wakers.lock().iter().map(|(_, waker)| waker.clone()).collect();
		for waker in wakers {
			waker.wake();
		}
	}

	/// Registers `waker` until the returned guard is dropped.
	pub(crate) fn register(&self, waker: Arc<dyn Wake>) -> WakerGuard<'_> {
		let key = self.inner.wakers.lock().insert(waker);
		WakerGuard { cx: self, key }
	}

	#[cfg(test)]
	pub(crate) fn registered(&self) -> usize {
		self.inner.wakers.lock().len()
	}
}

impl std::fmt::Debug for WaitContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WaitContext").field("cancelled", &self.is_cancelled()).finish()
	}
}

/// Removes a waker registration on drop.
pub(crate) struct WakerGuard<'a> {
	cx: &'a WaitContext,
	key: usize,
}

impl Drop for WakerGuard<'_> {
	fn drop(&mut self) {
		self.cx.inner.wakers.lock().remove(self.key);
	}
}
