use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use keel_container::{MemoryLocator, MemoryRegistry};
use rstest::rstest;

use super::*;

const FILTER: &str = "(&(objectClass=keel.container.ComponentRegistry)(keel.container.symbolicname=shop.web))";
const RELEASE_WINDOW: Duration = Duration::from_secs(5);

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn gate() -> Arc<AvailabilityGate> {
	init_tracing();
	Arc::new(AvailabilityGate::new(FILTER, Arc::new(MemoryLocator::new())))
}

fn handle() -> RegistryHandle {
	MemoryRegistry::new().into_handle()
}

/// Blocks until `count` callers are parked in the gate.
fn wait_for_waiters(gate: &AvailabilityGate, count: usize) {
	let deadline = Instant::now() + RELEASE_WINDOW;
	while gate.waiters() != count {
		assert!(Instant::now() < deadline, "expected {count} waiters, saw {}", gate.waiters());
		thread::sleep(Duration::from_millis(1));
	}
}

fn spawn_waiter(gate: &Arc<AvailabilityGate>, cx: WaitContext) -> mpsc::Receiver<Result<RegistryHandle>> {
	let (tx, rx) = mpsc::channel();
	let gate = gate.clone();
	thread::spawn(move || {
		let _ = tx.send(gate.await_handle_with(&cx));
	});
	rx
}

#[test]
fn test_cached_handle_is_returned_immediately() {
	let gate = gate();
	let h = handle();
	gate.on_registered(h.clone());

	assert!(gate.await_handle().unwrap().ptr_eq(&h));
	assert!(gate.current().is_some_and(|current| current.ptr_eq(&h)));
	assert_eq!(gate.waiters(), 0);
}

#[test]
fn test_second_registration_replaces_first() {
	let gate = gate();
	let first = handle();
	let second = handle();
	gate.on_registered(first.clone());
	gate.on_registered(second.clone());

	let got = gate.await_handle().unwrap();
	assert!(got.ptr_eq(&second));
	assert!(!got.ptr_eq(&first));
}

#[test]
fn test_unregistration_is_terminal() {
	let gate = gate();
	gate.on_registered(handle());
	gate.on_unregistered();

	for _ in 0..3 {
		assert_eq!(
			gate.await_handle().unwrap_err(),
			Error::RegistryUnavailable { filter: FILTER.into() }
		);
	}

	gate.on_registered(handle());
	assert!(gate.is_destroyed());
	assert!(gate.current().is_none());
	assert!(matches!(gate.await_handle(), Err(Error::RegistryUnavailable { .. })));
}

#[test]
fn test_registration_releases_blocked_caller() {
	let gate = gate();
	let rx = spawn_waiter(&gate, WaitContext::new());
	wait_for_waiters(&gate, 1);

	let h = handle();
	gate.on_registered(h.clone());

	let got = rx.recv_timeout(RELEASE_WINDOW).unwrap().unwrap();
	assert!(got.ptr_eq(&h));
	wait_for_waiters(&gate, 0);
}

#[test]
fn test_all_waiters_are_released_together() {
	let gate = gate();
	let receivers: Vec<_> = (0..4).map(|_| spawn_waiter(&gate, WaitContext::new())).collect();
	wait_for_waiters(&gate, 4);

	let h = handle();
	gate.on_registered(h.clone());
	for rx in receivers {
		assert!(rx.recv_timeout(RELEASE_WINDOW).unwrap().unwrap().ptr_eq(&h));
	}
}

#[test]
fn test_unregistration_fails_blocked_caller() {
	let gate = gate();
	let rx = spawn_waiter(&gate, WaitContext::new());
	wait_for_waiters(&gate, 1);

	gate.on_unregistered();
	let err = rx.recv_timeout(RELEASE_WINDOW).unwrap().unwrap_err();
	assert_eq!(err, Error::RegistryUnavailable { filter: FILTER.into() });
}

#[test]
fn test_precancelled_context_fails_without_blocking() {
	let gate = gate();
	let cx = WaitContext::new();
	cx.cancel();

	let err = gate.await_handle_with(&cx).unwrap_err();
	assert_eq!(err, Error::WaitCancelled { filter: FILTER.into() });
	assert!(cx.is_cancelled());
	assert_eq!(gate.waiters(), 0);
}

#[test]
fn test_cancel_releases_only_that_caller() {
	let gate = gate();
	let cancelled = WaitContext::new();
	let rx_cancelled = spawn_waiter(&gate, cancelled.clone());
	let rx_patient = spawn_waiter(&gate, WaitContext::new());
	wait_for_waiters(&gate, 2);

	cancelled.cancel();
	let err = rx_cancelled.recv_timeout(RELEASE_WINDOW).unwrap().unwrap_err();
	assert!(matches!(err, Error::WaitCancelled { .. }));
	wait_for_waiters(&gate, 1);
	assert!(!gate.is_destroyed());

	let h = handle();
	gate.on_registered(h.clone());
	assert!(rx_patient.recv_timeout(RELEASE_WINDOW).unwrap().unwrap().ptr_eq(&h));
	assert_eq!(cancelled.registered(), 0);
}

#[test]
fn test_cancelled_context_still_sees_cached_handle() {
	let gate = gate();
	let h = handle();
	gate.on_registered(h.clone());
	let cx = WaitContext::new();
	cx.cancel();
	assert!(gate.await_handle_with(&cx).unwrap().ptr_eq(&h));
}

#[test]
fn test_probe_finds_published_registry() {
	init_tracing();
	let locator = MemoryLocator::new();
	let h = handle();
	locator.publish(FILTER, h.clone());
	let gate = AvailabilityGate::new(FILTER, Arc::new(locator));

	assert!(gate.await_handle().unwrap().ptr_eq(&h));
	assert!(gate.current().is_some());
}

#[test]
fn test_probe_is_skipped_when_disabled_or_destroyed() {
	init_tracing();
	let locator = MemoryLocator::new();
	locator.publish(FILTER, handle());

	let gate = AvailabilityGate::new(FILTER, Arc::new(locator.clone()));
	gate.on_unregistered();
	assert!(matches!(gate.await_handle(), Err(Error::RegistryUnavailable { .. })));

	let gate = AvailabilityGate::new(FILTER, Arc::new(locator)).with_probe(false);
	let cx = WaitContext::new();
	cx.cancel();
	assert!(matches!(gate.await_handle_with(&cx), Err(Error::WaitCancelled { .. })));
}

#[test]
fn test_probe_runs_once_per_wait() {
	init_tracing();
	let probes = Arc::new(std::sync::atomic::AtomicUsize::new(0));
	let counter = probes.clone();
	let locator = move |_: &str| -> Option<RegistryHandle> {
		counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
		None
	};
	let gate = Arc::new(AvailabilityGate::new(FILTER, Arc::new(locator)));
	let rx = spawn_waiter(&gate, WaitContext::new());
	wait_for_waiters(&gate, 1);
	gate.on_registered(handle());
	rx.recv_timeout(RELEASE_WINDOW).unwrap().unwrap();

	assert_eq!(probes.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[rstest]
#[case::registered(|| RegistryEvent::Registered(handle()), true, false)]
#[case::modified(|| RegistryEvent::Modified, false, false)]
#[case::end_match(|| RegistryEvent::ModifiedEndMatch, false, true)]
#[case::unregistering(|| RegistryEvent::Unregistering, false, true)]
fn test_event_dispatch(#[case] event: fn() -> RegistryEvent, #[case] live: bool, #[case] destroyed: bool) {
	let gate = gate();
	gate.handle_event(event());
	assert_eq!(gate.current().is_some(), live);
	assert_eq!(gate.is_destroyed(), destroyed);
}

#[test]
fn test_end_match_is_terminal() {
	let gate = gate();
	gate.handle_event(RegistryEvent::Registered(handle()));
	gate.handle_event(RegistryEvent::ModifiedEndMatch);
	assert!(gate.is_destroyed());
	assert!(gate.current().is_none());
}
