//! Availability gate for the host registry.
//!
//! # Role
//!
//! The host registry is published on a foreign thread at an arbitrary time, possibly after the
//! client started. The gate is the single wait/notify point shared by every lookup that needs
//! the registry: callers block in [`AvailabilityGate::await_handle`] and the event source calls
//! [`AvailabilityGate::on_registered`] / [`AvailabilityGate::on_unregistered`].
//!
//! # Invariants
//!
//! - One mutex guards `{handle, destroyed}`. The handle slot is only written while it is held.
//! - A cached handle is returned without locking (acquire load through [`ArcSwapOption`]).
//! - Unregistration is terminal: a destroyed gate never hands out a live handle again.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use keel_container::{RegistryHandle, RegistryLocator};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::cancel::Wake;
use crate::{Error, ProviderConfig, Result, WaitContext};

/// Lifecycle notification for the registry a gate is waiting on.
#[derive(Debug, Clone)]
pub enum RegistryEvent {
	/// A registry matching the gate's filter was published.
	Registered(RegistryHandle),
	/// The registry's properties changed but it still matches.
	Modified,
	/// The registry's properties changed and it no longer matches.
	ModifiedEndMatch,
	/// The registry is being withdrawn.
	Unregistering,
}

#[derive(Debug, Default)]
struct GateState {
	destroyed: bool,
	waiters: usize,
}

struct Shared {
	handle: ArcSwapOption<RegistryHandle>,
	state: Mutex<GateState>,
	available: Condvar,
}

impl Wake for Shared {
	fn wake(&self) {
		let _state = self.state.lock();
		self.available.notify_all();
	}
}

/// Blocks registry lookups until the host registry is published or permanently gone.
pub struct AvailabilityGate {
	filter: String,
	locator: Arc<dyn RegistryLocator>,
	probe: bool,
	shared: Arc<Shared>,
}

impl AvailabilityGate {
	/// Creates a gate waiting for the registry selected by `filter`.
	///
	/// `locator` is probed once, on the first wait, for a registry that was published before
	/// the gate started listening.
	pub fn new(filter: impl Into<String>, locator: Arc<dyn RegistryLocator>) -> Self {
		Self {
			filter: filter.into(),
			locator,
			probe: true,
			shared: Arc::new(Shared {
				handle: ArcSwapOption::empty(),
				state: Mutex::new(GateState::default()),
				available: Condvar::new(),
			}),
		}
	}

	pub fn from_config(config: &ProviderConfig, locator: Arc<dyn RegistryLocator>) -> Self {
		Self::new(config.filter.clone(), locator).with_probe(config.probe_on_wait)
	}

	/// Enables or disables the discovery probe.
	pub fn with_probe(mut self, probe: bool) -> Self {
		self.probe = probe;
		self
	}

	pub fn filter(&self) -> &str {
		&self.filter
	}

	/// Returns the cached handle without blocking.
	pub fn current(&self) -> Option<RegistryHandle> {
		self.shared.handle.load().as_deref().cloned()
	}

	pub fn is_destroyed(&self) -> bool {
		self.shared.state.lock().destroyed
	}

	/// Number of callers currently blocked in the gate.
	pub fn waiters(&self) -> usize {
		self.shared.state.lock().waiters
	}

	/// Returns the registry handle, blocking until it is published.
	///
	/// # Errors
	///
	/// [`Error::RegistryUnavailable`] once the registry has been unregistered.
	pub fn await_handle(&self) -> Result<RegistryHandle> {
		if let Some(handle) = self.current() {
			return Ok(handle);
		}
		self.wait_for_handle(&WaitContext::new())
	}

	/// Like [`Self::await_handle`], but gives up when `cx` is cancelled.
	///
	/// # Errors
	///
	/// [`Error::RegistryUnavailable`] once the registry has been unregistered, and
	/// [`Error::WaitCancelled`] when `cx` is (or becomes) cancelled before a handle is
	/// available. `cx` stays cancelled afterwards.
	pub fn await_handle_with(&self, cx: &WaitContext) -> Result<RegistryHandle> {
		if let Some(handle) = self.current() {
			return Ok(handle);
		}
		self.wait_for_handle(cx)
	}

	fn wait_for_handle(&self, cx: &WaitContext) -> Result<RegistryHandle> {
		let mut state = self.shared.state.lock();
		if self.probe && !state.destroyed && self.shared.handle.load().is_none() {
			if let Some(found) = self.locator.locate(&self.filter) {
				debug!(filter = %self.filter, "found already published registry");
				self.shared.handle.store(Some(Arc::new(found)));
			}
		}

		let _waker = cx.register(self.shared.clone());
		loop {
			if let Some(handle) = self.current() {
				return Ok(handle);
			}
			if state.destroyed {
				return Err(Error::RegistryUnavailable {
					filter: self.filter.clone(),
				});
			}
			if cx.is_cancelled() {
				debug!(filter = %self.filter, "registry wait cancelled");
				return Err(Error::WaitCancelled {
					filter: self.filter.clone(),
				});
			}

			state.waiters += 1;
			trace!(filter = %self.filter, waiters = state.waiters, "waiting for registry");
			self.shared.available.wait(&mut state);
			state.waiters -= 1;
		}
	}

	/// Installs `handle` and releases every waiter. Replaces any previous handle.
	pub fn on_registered(&self, handle: RegistryHandle) {
		let state = self.shared.state.lock();
		if state.destroyed {
			warn!(filter = %self.filter, "ignoring registration on a destroyed gate");
			return;
		}
		self.shared.handle.store(Some(Arc::new(handle)));
		debug!(filter = %self.filter, waiters = state.waiters, "registry registered");
		self.shared.available.notify_all();
	}

	/// Clears the handle, marks the gate destroyed and releases every waiter.
	pub fn on_unregistered(&self) {
		let mut state = self.shared.state.lock();
		self.shared.handle.store(None);
		state.destroyed = true;
		debug!(filter = %self.filter, waiters = state.waiters, "registry unregistered");
		self.shared.available.notify_all();
	}

	/// Dispatches a lifecycle event to [`Self::on_registered`] / [`Self::on_unregistered`].
	pub fn handle_event(&self, event: RegistryEvent) {
		match event {
			RegistryEvent::Registered(handle) => self.on_registered(handle),
			RegistryEvent::ModifiedEndMatch | RegistryEvent::Unregistering => self.on_unregistered(),
			RegistryEvent::Modified => {}
		}
	}
}

impl std::fmt::Debug for AvailabilityGate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AvailabilityGate")
			.field("filter", &self.filter)
			.field("live", &self.shared.handle.load().is_some())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests;
