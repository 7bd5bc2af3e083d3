use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::interaction::{Command, Cursor};
use super::state::{ForceGraphState, FrameGate};
use super::tooltip::{FileTooltip, TooltipModel};
use crate::components::one_shot::OneShot;
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::live::GraphSnapshot;
use crate::live::http;

/// Grace period before a tooltip hides, so the pointer can travel onto it.
const TOOLTIP_HIDE_MS: u32 = 150;

fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map_or(0.0, |p| p.now())
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

fn measure(container: &Element) -> (f64, f64) {
	let (w, h) = (container.client_width(), container.client_height());
	(
		if w > 0 { w as f64 } else { 800.0 },
		if h > 0 { h as f64 } else { 600.0 },
	)
}

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Owns the requestAnimationFrame callback. At most one frame is pending;
/// dropping the loop cancels it.
#[derive(Default)]
struct FrameLoop {
	callback: Option<Closure<dyn FnMut()>>,
	gate: FrameGate,
	handle: Option<i32>,
}

impl FrameLoop {
	fn start(&mut self, callback: Closure<dyn FnMut()>) {
		self.callback = Some(callback);
		self.request();
	}

	fn request(&mut self) {
		let Some(cb) = &self.callback else {
			return;
		};
		if !self.gate.try_request() {
			return;
		}
		let requested = web_sys::window()
			.ok_or_else(|| DashboardError::Browser("no window".into()))
			.and_then(|w| {
				w.request_animation_frame(cb.as_ref().unchecked_ref())
					.map_err(|e| DashboardError::browser("requestAnimationFrame", &e))
			});
		match requested {
			Ok(handle) => self.handle = Some(handle),
			Err(err) => {
				self.gate.complete();
				debug!("{err}");
			}
		}
	}

	fn complete(&mut self) {
		self.handle = None;
		self.gate.complete();
	}

	fn stop(&mut self) {
		if let (Some(handle), Some(window)) = (self.handle.take(), web_sys::window()) {
			let _ = window.cancel_animation_frame(handle);
		}
		self.gate.complete();
		self.callback = None;
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		self.stop();
	}
}

/// A window event listener that unregisters itself when dropped.
struct WindowListener {
	event: &'static str,
	callback: Closure<dyn FnMut()>,
}

impl WindowListener {
	fn attach(event: &'static str, callback: Closure<dyn FnMut()>) -> Result<Self, DashboardError> {
		let window = web_sys::window().ok_or_else(|| DashboardError::Browser("no window".into()))?;
		window
			.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
			.map_err(|e| DashboardError::browser(event, &e))?;
		Ok(Self { event, callback })
	}
}

impl Drop for WindowListener {
	fn drop(&mut self) {
		if let Some(window) = web_sys::window() {
			let _ = window.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
		}
	}
}

fn request_frame(frames: &Weak<RefCell<FrameLoop>>) {
	if let Some(frames) = frames.upgrade() {
		frames.borrow_mut().request();
	}
}

/// Live force-directed view of a [`GraphSnapshot`]: cluster centers with
/// their files, hover tooltips, click to focus a cluster or open a file.
#[component]
pub fn ForceGraphCanvas(#[prop(into)] snapshot: Signal<Arc<GraphSnapshot>>) -> impl IntoView {
	let config = use_context::<DashboardConfig>().unwrap_or_default();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let state: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let frames: Rc<RefCell<FrameLoop>> = Rc::default();
	let resize: Rc<RefCell<Option<WindowListener>>> = Rc::new(RefCell::new(None));

	let tooltip = RwSignal::new(None::<TooltipModel>);
	let tooltip_hovered = RwSignal::new(false);
	let hide_timer: StoredValue<OneShot, LocalStorage> = StoredValue::new_local(OneShot::default());
	let cursor = RwSignal::new(Cursor::Default);
	let is_empty = Memo::new(move |_| snapshot.with(|s| s.is_empty()));

	let show_tooltip = move |model: Option<TooltipModel>| {
		hide_timer.update_value(OneShot::cancel);
		tooltip.set(model);
	};
	let hide_tooltip_soon = move || {
		hide_timer.update_value(|timer| {
			timer.after(TOOLTIP_HIDE_MS, move || {
				if !tooltip_hovered.get_untracked() {
					tooltip.try_set(None);
				}
			})
		});
	};

	let (state_init, frames_init, resize_init) = (state.clone(), Rc::downgrade(&frames), resize.clone());
	let layout = config.layout;
	Effect::new(move |_| {
		let (Some(canvas), Some(container)) = (canvas_ref.get(), container_ref.get()) else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let container: Element = container.into();
		let Some(ctx) = context_2d(&canvas) else {
			warn!("2d canvas context unavailable; graph disabled");
			return;
		};

		let (w, h) = measure(&container);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		*state_init.borrow_mut() = Some(ForceGraphState::new(snapshot.get_untracked(), layout, w, h, now_ms()));

		let (state_resize, frames_resize, canvas_resize) = (state_init.clone(), frames_init.clone(), canvas.clone());
		let on_resize = Closure::new(move || {
			let (nw, nh) = measure(&container);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(s) = state_resize.borrow_mut().as_mut() {
				s.resize(nw, nh);
			}
			request_frame(&frames_resize);
		});
		match WindowListener::attach("resize", on_resize) {
			Ok(listener) => *resize_init.borrow_mut() = Some(listener),
			Err(err) => debug!("{err}"),
		}

		let (state_anim, frames_anim) = (state_init.clone(), frames_init.clone());
		let on_frame = Closure::new(move || {
			let Some(frames) = frames_anim.upgrade() else {
				return;
			};
			frames.borrow_mut().complete();
			let again = match state_anim.borrow_mut().as_mut() {
				Some(s) => {
					s.advance(now_ms());
					s.paint(&ctx);
					s.needs_frame()
				}
				None => false,
			};
			if again {
				frames.borrow_mut().request();
			}
		});
		if let Some(frames) = frames_init.upgrade() {
			frames.borrow_mut().start(on_frame);
		}
	});

	let (state_snap, frames_snap) = (state.clone(), Rc::downgrade(&frames));
	Effect::new(move |_| {
		let next = snapshot.get();
		let refreshed = state_snap
			.borrow_mut()
			.as_mut()
			.and_then(|s| s.set_snapshot(next, now_ms()).then(|| s.tooltip()));
		if let Some(model) = refreshed {
			if model.is_some() {
				show_tooltip(model);
			} else {
				hide_tooltip_soon();
			}
			request_frame(&frames_snap);
		}
	});

	let dispatch = {
		let (state, frames, config) = (state.clone(), Rc::downgrade(&frames), config.clone());
		move |command: Command| match command {
			Command::FitNodes { nodes, padding } => {
				if let Some(s) = state.borrow_mut().as_mut() {
					s.fit_to(&nodes, padding, now_ms());
				}
				request_frame(&frames);
			}
			Command::OpenFile(path) => http::open_file(&config, &path),
		}
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		if let Some(s) = state_md.borrow_mut().as_mut() {
			s.pointer_down(x, y);
			cursor.set(s.cursor());
		}
	};

	let (state_mm, frames_mm) = (state.clone(), Rc::downgrade(&frames));
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		let Some((hover_changed, model, next_cursor, needs_frame)) = state_mm.borrow_mut().as_mut().map(|s| {
			let changed = s.pointer_move(x, y);
			(changed, s.tooltip(), s.cursor(), s.needs_frame())
		}) else {
			return;
		};
		cursor.set(next_cursor);
		if model.is_some() {
			show_tooltip(model);
		} else if hover_changed {
			hide_tooltip_soon();
		}
		if needs_frame {
			request_frame(&frames_mm);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let command = state_mu.borrow_mut().as_mut().and_then(|s| {
			let command = s.pointer_up();
			cursor.set(s.cursor());
			command
		});
		if let Some(command) = command {
			dispatch(command);
		}
	};

	let (state_ml, frames_ml) = (state.clone(), Rc::downgrade(&frames));
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(s) = state_ml.borrow_mut().as_mut() {
			s.pointer_leave();
			cursor.set(s.cursor());
		}
		hide_tooltip_soon();
		request_frame(&frames_ml);
	};

	let (state_wh, frames_wh) = (state.clone(), Rc::downgrade(&frames));
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		if let Some(s) = state_wh.borrow_mut().as_mut() {
			s.wheel(x, y, ev.delta_y());
		}
		request_frame(&frames_wh);
	};

	let open_config = config.clone();
	let on_open = Callback::new(move |path: String| http::open_file(&open_config, &path));
	let on_enter = Callback::new(move |_| {
		tooltip_hovered.set(true);
		hide_timer.update_value(OneShot::cancel);
	});
	let on_leave = Callback::new(move |_| {
		tooltip_hovered.set(false);
		tooltip.set(None);
	});

	let handles = StoredValue::new_local((frames, resize));
	on_cleanup(move || {
		handles.try_with_value(|(frames, resize)| {
			frames.borrow_mut().stop();
			resize.borrow_mut().take();
		});
		hide_timer.try_update_value(OneShot::cancel);
	});

	view! {
		<div node_ref=container_ref class="force-graph" on:mouseleave=on_mouseleave>
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:wheel=on_wheel
				style:display="block"
				style:cursor=move || cursor.get().css()
			/>
			<Show when=move || is_empty.get()>
				<div class="force-graph-empty">
					<p class="title">"No files yet"</p>
					<p class="hint">"Drop files into the watched folder to begin"</p>
				</div>
			</Show>
			<Show when=move || !is_empty.get()>
				<div class="force-graph-legend">
					<span>"Scroll to zoom"</span>
					<span>"Drag to pan"</span>
					<span>"Click a cluster to focus"</span>
					<span>"Click a file to open"</span>
				</div>
			</Show>
			<FileTooltip model=tooltip.into() on_open=on_open on_enter=on_enter on_leave=on_leave />
		</div>
	}
}
