//! Reconnecting socket connection.
//!
//! State machine:
//!
//! ```text
//! Disconnected --open()/retry--> Connecting --open event--> Connected
//!      ^                            |                          |
//!      |                            +------close/error---------+
//!      |                                        |
//!      +------ retry scheduled <---- Reconnecting
//! ```
//!
//! Every socket gets a generation number; events carrying an older generation
//! are dropped, so a replaced or torn-down socket can never drive the state
//! machine. Only one retry timer exists at a time and dropping it cancels it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, info, warn};

use super::message::ServerMessage;
use crate::config::BackoffPolicy;
use crate::error::DashboardError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
	Disconnected,
	Connecting,
	Connected,
	Reconnecting,
}

impl ConnectionState {
	pub fn is_connected(self) -> bool {
		self == ConnectionState::Connected
	}
}

#[derive(Debug)]
pub enum SocketEvent {
	Open,
	Message(String),
	Close,
	Error,
}

/// Callback a transport feeds raw socket events into.
pub type SocketSink = Rc<dyn Fn(SocketEvent)>;

pub trait SocketHandle {
	/// Unhooks every event handler; no event may reach the sink afterwards.
	fn detach(&mut self);
	fn close(&mut self);
}

/// Browser seam: opening sockets and arming one-shot timers.
pub trait Transport: 'static {
	type Socket: SocketHandle;
	/// Pending timer; dropping it cancels the callback.
	type Timer;

	fn connect(&mut self, url: &str, sink: SocketSink) -> Result<Self::Socket, DashboardError>;
	fn schedule(&mut self, delay_ms: u32, fire: Box<dyn FnOnce()>) -> Self::Timer;
}

#[derive(Debug)]
pub enum ConnectionEvent {
	State(ConnectionState),
	Message(ServerMessage),
}

type Listener = Box<dyn FnMut(ConnectionEvent)>;

pub struct ConnectionManager<T: Transport> {
	url: String,
	policy: BackoffPolicy,
	transport: T,
	state: ConnectionState,
	attempt: u32,
	generation: u64,
	socket: Option<T::Socket>,
	retry: Option<T::Timer>,
	listener: Option<Listener>,
	closed: bool,
	this: Weak<RefCell<ConnectionManager<T>>>,
}

impl<T: Transport> ConnectionManager<T> {
	pub fn state(&self) -> ConnectionState {
		self.state
	}

	/// Retries scheduled since the last successful open.
	pub fn attempt(&self) -> u32 {
		self.attempt
	}

	fn connect(&mut self) {
		if self.closed {
			return;
		}
		self.retire_socket();
		self.generation += 1;
		self.set_state(ConnectionState::Connecting);

		let generation = self.generation;
		let this = self.this.clone();
		let sink: SocketSink = Rc::new(move |event| {
			let Some(manager) = this.upgrade() else {
				return;
			};
			match manager.try_borrow_mut() {
				Ok(mut manager) => manager.on_socket_event(generation, event),
				Err(_) => warn!("socket event {event:?} arrived re-entrantly; dropped"),
			}
		});

		match self.transport.connect(&self.url, sink) {
			Ok(socket) => self.socket = Some(socket),
			Err(err) => {
				warn!("connect to {} failed: {err}", self.url);
				self.fail();
			}
		}
	}

	fn on_socket_event(&mut self, generation: u64, event: SocketEvent) {
		if self.closed || generation != self.generation {
			debug!("dropping {event:?} from stale socket #{generation}");
			return;
		}
		match event {
			SocketEvent::Open => {
				if self.state == ConnectionState::Connecting {
					self.attempt = 0;
					info!("connected to {}", self.url);
					self.set_state(ConnectionState::Connected);
				}
			}
			SocketEvent::Message(raw) => match ServerMessage::parse(&raw) {
				Ok(message) => self.emit(ConnectionEvent::Message(message)),
				Err(err) => debug!("dropping payload: {err}"),
			},
			SocketEvent::Close | SocketEvent::Error => {
				if matches!(
					self.state,
					ConnectionState::Connecting | ConnectionState::Connected
				) {
					warn!("connection to {} lost", self.url);
					self.fail();
				}
			}
		}
	}

	fn fail(&mut self) {
		self.set_state(ConnectionState::Reconnecting);
		self.schedule_retry();
	}

	fn schedule_retry(&mut self) {
		let delay = self.policy.delay_ms(self.attempt);
		self.attempt = self.attempt.saturating_add(1);
		// only one pending retry; dropping the old timer cancels it
		self.retry = None;

		let this = self.this.clone();
		let timer = self.transport.schedule(
			delay,
			Box::new(move || {
				let Some(manager) = this.upgrade() else {
					return;
				};
				match manager.try_borrow_mut() {
					Ok(mut manager) => manager.on_retry(),
					Err(_) => warn!("retry fired re-entrantly; skipped"),
				}
			}),
		);
		self.retry = Some(timer);
		info!("retrying in {delay} ms (attempt {})", self.attempt);
		self.set_state(ConnectionState::Disconnected);
	}

	fn on_retry(&mut self) {
		self.retry = None;
		self.connect();
	}

	fn retire_socket(&mut self) {
		if let Some(mut socket) = self.socket.take() {
			socket.detach();
			socket.close();
		}
	}

	fn close(&mut self) {
		if self.closed {
			return;
		}
		self.closed = true;
		self.retry = None;
		self.listener = None;
		self.retire_socket();
		self.state = ConnectionState::Disconnected;
		info!("connection to {} closed", self.url);
	}

	fn set_state(&mut self, state: ConnectionState) {
		if self.state != state {
			self.state = state;
			self.emit(ConnectionEvent::State(state));
		}
	}

	fn emit(&mut self, event: ConnectionEvent) {
		if let Some(listener) = self.listener.as_mut() {
			listener(event);
		}
	}
}

/// Owning handle to a [`ConnectionManager`]. Dropping it tears the connection
/// down.
///
/// The listener runs while the manager is borrowed and must not call back into
/// the handle.
pub struct Connection<T: Transport> {
	inner: Rc<RefCell<ConnectionManager<T>>>,
}

impl<T: Transport> Connection<T> {
	pub fn open(
		url: impl Into<String>,
		policy: BackoffPolicy,
		transport: T,
		listener: impl FnMut(ConnectionEvent) + 'static,
	) -> Self {
		let inner = Rc::new_cyclic(|this| {
			RefCell::new(ConnectionManager {
				url: url.into(),
				policy,
				transport,
				state: ConnectionState::Disconnected,
				attempt: 0,
				generation: 0,
				socket: None,
				retry: None,
				listener: Some(Box::new(listener)),
				closed: false,
				this: this.clone(),
			})
		});
		inner.borrow_mut().connect();
		Self { inner }
	}

	pub fn state(&self) -> ConnectionState {
		self.inner.borrow().state()
	}

	/// Cancels the pending retry, detaches all handlers, then closes the
	/// socket. Nothing registered before this call fires after it.
	pub fn close(&self) {
		self.inner.borrow_mut().close();
	}
}

impl<T: Transport> Drop for Connection<T> {
	fn drop(&mut self) {
		if let Ok(mut manager) = self.inner.try_borrow_mut() {
			manager.close();
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;

	#[derive(Default)]
	struct Wire {
		sinks: Vec<SocketSink>,
		timers: Vec<(u32, Option<Box<dyn FnOnce()>>, Rc<Cell<bool>>)>,
		detached: usize,
		closed: usize,
		refuse: bool,
	}

	struct FakeTransport(Rc<RefCell<Wire>>);

	struct FakeSocket(Rc<RefCell<Wire>>);

	struct FakeTimer(Rc<Cell<bool>>);

	impl Drop for FakeTimer {
		fn drop(&mut self) {
			self.0.set(true);
		}
	}

	impl SocketHandle for FakeSocket {
		fn detach(&mut self) {
			self.0.borrow_mut().detached += 1;
		}

		fn close(&mut self) {
			self.0.borrow_mut().closed += 1;
		}
	}

	impl Transport for FakeTransport {
		type Socket = FakeSocket;
		type Timer = FakeTimer;

		fn connect(&mut self, _url: &str, sink: SocketSink) -> Result<FakeSocket, DashboardError> {
			let mut wire = self.0.borrow_mut();
			if wire.refuse {
				return Err(DashboardError::Socket("refused".into()));
			}
			wire.sinks.push(sink);
			Ok(FakeSocket(Rc::clone(&self.0)))
		}

		fn schedule(&mut self, delay_ms: u32, fire: Box<dyn FnOnce()>) -> FakeTimer {
			let cancelled = Rc::new(Cell::new(false));
			self.0
				.borrow_mut()
				.timers
				.push((delay_ms, Some(fire), Rc::clone(&cancelled)));
			FakeTimer(cancelled)
		}
	}

	struct Harness {
		wire: Rc<RefCell<Wire>>,
		events: Rc<RefCell<Vec<ConnectionEvent>>>,
		conn: Connection<FakeTransport>,
	}

	impl Harness {
		fn open() -> Self {
			let wire = Rc::new(RefCell::new(Wire::default()));
			let events = Rc::new(RefCell::new(Vec::new()));
			let sink = Rc::clone(&events);
			let conn = Connection::open(
				"ws://test/ws",
				BackoffPolicy::default(),
				FakeTransport(Rc::clone(&wire)),
				move |event| sink.borrow_mut().push(event),
			);
			Self { wire, events, conn }
		}

		fn socket(&self, n: usize) -> SocketSink {
			Rc::clone(&self.wire.borrow().sinks[n])
		}

		fn latest(&self) -> SocketSink {
			let wire = self.wire.borrow();
			Rc::clone(wire.sinks.last().expect("a socket was opened"))
		}

		fn delays(&self) -> Vec<u32> {
			self.wire.borrow().timers.iter().map(|(d, _, _)| *d).collect()
		}

		fn fire_pending_timer(&self) -> bool {
			let fire = {
				let mut wire = self.wire.borrow_mut();
				wire.timers
					.iter_mut()
					.rev()
					.find(|(_, fire, cancelled)| fire.is_some() && !cancelled.get())
					.and_then(|(_, fire, _)| fire.take())
			};
			match fire {
				Some(fire) => {
					fire();
					true
				}
				None => false,
			}
		}

		fn states(&self) -> Vec<ConnectionState> {
			self.events
				.borrow()
				.iter()
				.filter_map(|e| match e {
					ConnectionEvent::State(s) => Some(*s),
					ConnectionEvent::Message(_) => None,
				})
				.collect()
		}

		fn message_count(&self) -> usize {
			self.events
				.borrow()
				.iter()
				.filter(|e| matches!(e, ConnectionEvent::Message(_)))
				.count()
		}
	}

	use ConnectionState::*;

	#[test]
	fn open_connects_and_reports_connected() {
		let h = Harness::open();
		assert_eq!(h.conn.state(), Connecting);
		h.latest()(SocketEvent::Open);
		assert_eq!(h.conn.state(), Connected);
		assert_eq!(h.states(), vec![Connecting, Connected]);
	}

	#[test]
	fn two_unexpected_closes_retry_at_two_then_four_seconds() {
		let h = Harness::open();
		h.latest()(SocketEvent::Open);

		h.latest()(SocketEvent::Close);
		assert!(!h.conn.state().is_connected());
		assert!(h.fire_pending_timer());
		h.latest()(SocketEvent::Close);
		assert_eq!(h.delays(), vec![2000, 4000]);

		assert!(h.fire_pending_timer());
		h.latest()(SocketEvent::Open);
		assert!(h.conn.state().is_connected());
		assert_eq!(
			h.states(),
			vec![
				Connecting,
				Connected,
				Reconnecting,
				Disconnected,
				Connecting,
				Reconnecting,
				Disconnected,
				Connecting,
				Connected,
			]
		);
	}

	#[test]
	fn backoff_caps_at_thirty_seconds() {
		let h = Harness::open();
		for _ in 0..6 {
			h.latest()(SocketEvent::Error);
			assert!(h.fire_pending_timer());
		}
		assert_eq!(h.delays(), vec![2000, 4000, 8000, 16000, 30000, 30000]);
	}

	#[test]
	fn successful_open_resets_the_attempt_counter() {
		let h = Harness::open();
		for _ in 0..3 {
			h.latest()(SocketEvent::Close);
			assert!(h.fire_pending_timer());
		}
		h.latest()(SocketEvent::Open);
		assert_eq!(h.conn.inner.borrow().attempt(), 0);
		h.latest()(SocketEvent::Close);
		assert_eq!(h.delays().last(), Some(&2000));
	}

	#[test]
	fn error_followed_by_close_schedules_a_single_retry() {
		let h = Harness::open();
		h.latest()(SocketEvent::Open);
		h.latest()(SocketEvent::Error);
		h.latest()(SocketEvent::Close);
		assert_eq!(h.delays(), vec![2000]);
	}

	#[test]
	fn refused_connect_schedules_retry() {
		let h = Harness::open();
		h.latest()(SocketEvent::Close);
		h.wire.borrow_mut().refuse = true;
		assert!(h.fire_pending_timer());
		assert_eq!(h.delays(), vec![2000, 4000]);
		assert_eq!(h.conn.state(), Disconnected);
	}

	#[test]
	fn reconnect_retires_the_previous_socket() {
		let h = Harness::open();
		h.latest()(SocketEvent::Close);
		assert!(h.fire_pending_timer());
		let wire = h.wire.borrow();
		assert_eq!(wire.detached, 1);
		assert_eq!(wire.closed, 1);
	}

	#[test]
	fn stale_socket_events_are_ignored() {
		let h = Harness::open();
		let first = h.socket(0);
		first(SocketEvent::Close);
		assert!(h.fire_pending_timer());
		first(SocketEvent::Open);
		first(SocketEvent::Message(r#"{"type":"graph_update"}"#.into()));
		assert_eq!(h.conn.state(), Connecting);
		assert_eq!(h.message_count(), 0);
	}

	#[test]
	fn malformed_payload_is_dropped_without_state_change() {
		let h = Harness::open();
		h.latest()(SocketEvent::Open);
		h.latest()(SocketEvent::Message("{{{".into()));
		h.latest()(SocketEvent::Message(r#"{"type":"graph_update"}"#.into()));
		assert_eq!(h.conn.state(), Connected);
		assert_eq!(h.message_count(), 1);
		assert!(h.delays().is_empty());
	}

	#[test]
	fn close_cancels_retry_and_silences_callbacks() {
		let h = Harness::open();
		h.latest()(SocketEvent::Close);
		let pending = Rc::clone(&h.wire.borrow().timers[0].2);
		let before = h.events.borrow().len();

		h.conn.close();
		assert!(pending.get(), "pending retry was cancelled");
		{
			let wire = h.wire.borrow();
			assert_eq!(wire.detached, 1);
			assert_eq!(wire.closed, 1);
		}

		// even if the platform still delivers something, nothing reaches us
		h.latest()(SocketEvent::Open);
		let fire = h.wire.borrow_mut().timers[0].1.take();
		if let Some(fire) = fire {
			fire();
		}
		assert_eq!(h.events.borrow().len(), before);
		assert_eq!(h.wire.borrow().sinks.len(), 1);
	}

	#[test]
	fn dropping_the_handle_tears_down() {
		let h = Harness::open();
		let wire = Rc::clone(&h.wire);
		let sink = h.latest();
		drop(h.conn);
		sink(SocketEvent::Open);
		assert_eq!(wire.borrow().closed, 1);
		assert_eq!(h.events.borrow().len(), 1);
	}
}
