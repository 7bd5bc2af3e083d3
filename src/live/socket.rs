use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use super::connection::{SocketEvent, SocketHandle, SocketSink, Transport};
use crate::error::DashboardError;

/// [`Transport`] backed by the browser `WebSocket` and `setTimeout`.
#[derive(Default)]
pub struct BrowserTransport;

pub struct BrowserSocket {
	socket: WebSocket,
	_on_open: Closure<dyn FnMut(Event)>,
	_on_message: Closure<dyn FnMut(MessageEvent)>,
	_on_close: Closure<dyn FnMut(CloseEvent)>,
	_on_error: Closure<dyn FnMut(Event)>,
}

impl Transport for BrowserTransport {
	type Socket = BrowserSocket;
	type Timer = Timeout;

	fn connect(&mut self, url: &str, sink: SocketSink) -> Result<BrowserSocket, DashboardError> {
		let socket = WebSocket::new(url).map_err(|e| DashboardError::socket("new WebSocket", &e))?;

		let on_open = {
			let sink = Rc::clone(&sink);
			Closure::<dyn FnMut(Event)>::new(move |_: Event| sink(SocketEvent::Open))
		};
		let on_message = {
			let sink = Rc::clone(&sink);
			Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
				match ev.data().as_string() {
					Some(text) => sink(SocketEvent::Message(text)),
					None => debug!("ignoring non-text frame"),
				}
			})
		};
		let on_close = {
			let sink = Rc::clone(&sink);
			Closure::<dyn FnMut(CloseEvent)>::new(move |ev: CloseEvent| {
				debug!("socket closed: code {} {:?}", ev.code(), ev.reason());
				sink(SocketEvent::Close)
			})
		};
		let on_error = Closure::<dyn FnMut(Event)>::new(move |_: Event| sink(SocketEvent::Error));

		socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
		socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
		socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
		socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));

		Ok(BrowserSocket {
			socket,
			_on_open: on_open,
			_on_message: on_message,
			_on_close: on_close,
			_on_error: on_error,
		})
	}

	fn schedule(&mut self, delay_ms: u32, fire: Box<dyn FnOnce()>) -> Timeout {
		Timeout::new(delay_ms, fire)
	}
}

impl SocketHandle for BrowserSocket {
	fn detach(&mut self) {
		self.socket.set_onopen(None);
		self.socket.set_onmessage(None);
		self.socket.set_onclose(None);
		self.socket.set_onerror(None);
	}

	fn close(&mut self) {
		if let Err(e) = self.socket.close() {
			debug!("closing socket: {}", DashboardError::socket("close", &e));
		}
	}
}

impl Drop for BrowserSocket {
	fn drop(&mut self) {
		// the closures die with us; the socket must not call into them
		self.detach();
	}
}
