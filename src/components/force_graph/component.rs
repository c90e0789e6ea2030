//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates an HTML canvas element and wires pointer and wheel
//! events to the [`Driver`]. Ticks are delivered through
//! `requestAnimationFrame`: [`FrameLoop`] is the driver's scheduler, and each
//! frame steps the simulation (when a tick is pending) and redraws. Mouse and
//! single-finger touch share the same press/drag/release path.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, ResizeObserver, TouchEvent,
	TouchList, WheelEvent, Window,
};

use super::config::{DriverSettings, PhysicsOverrides, Preset};
use super::driver::{Driver, RunToken, Scheduler};
use super::interaction::GraphEvent;
use super::render;
use super::state::Viewport;
use super::theme::Theme;
use super::types::GraphData;
use super::vector::Vec2;
use crate::error::LayoutError;

/// Milliseconds since page load.
fn now() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or(0.0)
}

/// Animation-frame scheduler shared between the driver and the frame
/// callback.
#[derive(Clone, Default)]
struct FrameLoop {
	token: Rc<Cell<Option<RunToken>>>,
	frame_id: Rc<Cell<Option<i32>>>,
	frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl FrameLoop {
	/// Asks for one frame unless one is already requested.
	fn request_frame(&self) {
		if self.frame_id.get().is_some() {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(ref cb) = *self.frame.borrow() {
			if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				self.frame_id.set(Some(id));
			}
		}
	}

	fn take_token(&self) -> Option<RunToken> {
		self.token.take()
	}
}

impl Scheduler for FrameLoop {
	fn schedule(&mut self, token: RunToken) {
		self.token.set(Some(token));
		self.request_frame();
	}

	fn cancel(&mut self) {
		self.token.set(None);
		if let Some(id) = self.frame_id.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(id);
			}
		}
	}
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
struct PanState {
	active: bool,
	moved: bool,
	start: Vec2,
	transform_start: Vec2,
}

/// Bundles the driver with everything needed to draw it.
struct GraphContext {
	driver: Driver<FrameLoop>,
	frames: FrameLoop,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	theme: Theme,
	pan: PanState,
	width: f64,
	height: f64,
}

impl GraphContext {
	fn client_point(&self, x: i32, y: i32) -> Vec2 {
		let rect = self.canvas.get_bounding_client_rect();
		Vec2::new(x as f64 - rect.left(), y as f64 - rect.top())
	}

	fn point(&self, ev: &MouseEvent) -> Vec2 {
		self.client_point(ev.client_x(), ev.client_y())
	}

	/// First touch in `touches`, in canvas coordinates.
	fn touch_point(&self, touches: TouchList) -> Option<Vec2> {
		touches
			.get(0)
			.map(|t| self.client_point(t.client_x(), t.client_y()))
	}

	fn draw(&self) {
		render::render(&self.driver, &self.ctx, &self.theme, self.width, self.height);
	}

	/// Pointer pressed: grabs the node under it, or starts a pan.
	fn press(&mut self, point: Vec2) {
		if !self.driver.pointer_down(point, now()) {
			let transform = self.driver.transform();
			self.pan = PanState {
				active: true,
				moved: false,
				start: point,
				transform_start: Vec2::new(transform.x, transform.y),
			};
		}
		self.frames.request_frame();
	}

	/// Pointer moved with a button or finger down. Returns false when nothing
	/// is held.
	fn drag_to(&mut self, point: Vec2) -> bool {
		if self.driver.is_dragging() {
			self.driver.on_drag_move(point);
		} else if self.pan.active {
			let offset = point - self.pan.start;
			if offset.length() > self.driver.settings().click_tolerance {
				self.pan.moved = true;
			}
			let transform = self.driver.transform_mut();
			transform.x = self.pan.transform_start.x + offset.x;
			transform.y = self.pan.transform_start.y + offset.y;
		} else {
			return false;
		}
		self.frames.request_frame();
		true
	}

	/// Pointer released at `point`, when known: ends the drag or pan.
	fn release(&mut self, point: Option<Vec2>) -> Vec<GraphEvent> {
		let mut events = Vec::new();
		if self.driver.is_dragging() {
			events.extend(self.driver.on_drag_end(now()));
		} else if self.pan.active {
			if let (false, Some(point)) = (self.pan.moved, point) {
				events.extend(self.driver.background_click(point));
			}
			self.pan = PanState::default();
		}
		self.frames.request_frame();
		events
	}

	/// Re-measures the canvas and passes a changed size on to the driver.
	fn fit(&mut self, window: &Window, sizing: Sizing) {
		let (w, h) = sizing.measure(window, &self.canvas);
		if w == self.width && h == self.height {
			return;
		}
		self.canvas.set_width(w as u32);
		self.canvas.set_height(h as u32);
		self.width = w;
		self.height = h;
		log_layout(self.driver.resize(Viewport::new(w, h), now()));
		self.frames.request_frame();
	}
}

/// How the canvas picks its size.
#[derive(Clone, Copy, Debug)]
struct Sizing {
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
}

impl Sizing {
	fn measure(self, window: &Window, canvas: &HtmlCanvasElement) -> (f64, f64) {
		if self.fullscreen {
			let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
			return (dim(window.inner_width()), dim(window.inner_height()));
		}
		let parent = canvas.parent_element();
		(
			self.width.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			self.height.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		)
	}
}

/// Listeners attached outside the canvas element. Kept so teardown can
/// detach them.
#[derive(Default)]
struct WindowListeners {
	resize: Option<Closure<dyn FnMut()>>,
	observer: Option<ResizeObserver>,
	mouse: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)>,
	touch: Vec<(&'static str, Closure<dyn FnMut(TouchEvent)>)>,
}

impl WindowListeners {
	fn attach(&self, window: &Window) {
		if let Some(ref cb) = self.resize {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		for (name, cb) in &self.mouse {
			let _ = window.add_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
		}
		for (name, cb) in &self.touch {
			let _ = window.add_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
		}
	}

	fn detach(&mut self, window: &Window) {
		if let Some(observer) = self.observer.take() {
			observer.disconnect();
		}
		if let Some(cb) = self.resize.take() {
			let _ =
				window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		for (name, cb) in self.mouse.drain(..) {
			let _ = window.remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
		}
		for (name, cb) in self.touch.drain(..) {
			let _ = window.remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
		}
	}
}

fn log_layout(result: Result<(), LayoutError>) {
	match result {
		Ok(()) => {}
		Err(LayoutError::EmptyGraph) => info!("graph: no data to lay out"),
		Err(e @ LayoutError::ZeroViewport { .. }) => debug!("graph: deferred, {}", e),
	}
}

fn emit(on_event: Option<Callback<GraphEvent>>, events: Vec<GraphEvent>) {
	if let Some(cb) = on_event {
		for event in events {
			cb.run(event);
		}
	}
}

/// Renders an interactive force-directed graph on a canvas element.
///
/// Pass graph data via the reactive `data` signal; a new value lays the graph
/// out from scratch. The component sizes itself to its parent container by
/// default and follows that container's size; set `fullscreen = true` to
/// fill the viewport. Explicit `width`/`height` override automatic sizing.
/// Nodes can be dragged with a mouse or a single finger. Clicks and hover
/// transitions are reported through `on_event`.
///
/// Unmounting cancels the pending frame and detaches every window listener.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = Preset::Graph)] preset: Preset,
	#[prop(optional)] physics: PhysicsOverrides,
	#[prop(optional)] theme: Option<Theme>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] on_event: Option<Callback<GraphEvent>>,
) -> impl IntoView {
	let sizing = Sizing {
		fullscreen,
		width,
		height,
	};
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let listeners: Rc<RefCell<WindowListeners>> = Rc::new(RefCell::new(WindowListeners::default()));
	let (context_init, listeners_init) = (context.clone(), listeners.clone());

	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};

		if let Some(ref mut c) = *context_init.borrow_mut() {
			log_layout(c.driver.load(graph, now()));
			c.frames.request_frame();
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("graph: canvas 2d context unavailable");
			return;
		};

		let (w, h) = sizing.measure(&window, &canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let frames = FrameLoop::default();
		let mut driver = Driver::new(
			frames.clone(),
			physics.apply(preset.params()),
			DriverSettings::default(),
		);
		let start = now();
		let _ = driver.resize(Viewport::new(w, h), start);
		log_layout(driver.load(graph, start));

		*context_init.borrow_mut() = Some(GraphContext {
			driver,
			frames: frames.clone(),
			canvas: canvas.clone(),
			ctx,
			theme: theme.clone().unwrap_or_default(),
			pan: PanState::default(),
			width: w,
			height: h,
		});

		let context_frame = context_init.clone();
		let frames_frame = frames.clone();
		*frames.frame.borrow_mut() = Some(Closure::new(move || {
			frames_frame.frame_id.set(None);
			if let Some(ref mut c) = *context_frame.borrow_mut() {
				if let Some(token) = frames_frame.take_token() {
					c.driver.on_tick(token, now());
				}
				c.draw();
			}
		}));
		frames.request_frame();

		let mut attached = listeners_init.borrow_mut();

		let context_resize = context_init.clone();
		let on_resize = Closure::<dyn FnMut()>::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			if let Some(ref mut c) = *context_resize.borrow_mut() {
				c.fit(&win, sizing);
			}
		});
		// An embedded canvas follows its container, which can change size
		// without the window resizing.
		if !fullscreen {
			if let Some(parent) = canvas.parent_element() {
				match ResizeObserver::new(on_resize.as_ref().unchecked_ref()) {
					Ok(observer) => {
						observer.observe(&parent);
						attached.observer = Some(observer);
					}
					Err(e) => warn!("graph: resize observer unavailable: {:?}", e),
				}
			}
		}
		attached.resize = Some(on_resize);

		// Drag and pan continue outside the canvas, so they listen on the window.
		let context_move = context_init.clone();
		let on_window_move = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
			if let Some(ref mut c) = *context_move.borrow_mut() {
				let point = c.point(&ev);
				c.drag_to(point);
			}
		});

		let context_up = context_init.clone();
		let on_window_up = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
			let mut events = Vec::new();
			if let Some(ref mut c) = *context_up.borrow_mut() {
				let point = c.point(&ev);
				events = c.release(Some(point));
			}
			emit(on_event, events);
		});
		attached.mouse = vec![("mousemove", on_window_move), ("mouseup", on_window_up)];

		let context_touch_move = context_init.clone();
		let on_touch_move = Closure::<dyn FnMut(TouchEvent)>::new(move |ev: TouchEvent| {
			if let Some(ref mut c) = *context_touch_move.borrow_mut() {
				if let Some(point) = c.touch_point(ev.touches()) {
					c.drag_to(point);
				}
			}
		});

		let context_touch_end = context_init.clone();
		let on_touch_end = Closure::<dyn FnMut(TouchEvent)>::new(move |ev: TouchEvent| {
			let mut events = Vec::new();
			if let Some(ref mut c) = *context_touch_end.borrow_mut() {
				let point = c.touch_point(ev.changed_touches());
				events = c.release(point);
			}
			emit(on_event, events);
		});

		let context_touch_cancel = context_init.clone();
		let on_touch_cancel = Closure::<dyn FnMut(TouchEvent)>::new(move |_: TouchEvent| {
			if let Some(ref mut c) = *context_touch_cancel.borrow_mut() {
				c.release(None);
			}
		});
		attached.touch = vec![
			("touchmove", on_touch_move),
			("touchend", on_touch_end),
			("touchcancel", on_touch_cancel),
		];

		attached.attach(&window);
	});

	let teardown = SendWrapper::new((context.clone(), listeners));
	on_cleanup(move || {
		let (context, listeners) = teardown.take();
		if let Some(window) = web_sys::window() {
			listeners.borrow_mut().detach(&window);
		}
		if let Some(mut c) = context.borrow_mut().take() {
			c.driver.shutdown();
			c.frames.frame.borrow_mut().take();
		}
		debug!("graph: canvas unmounted");
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some(ref mut c) = *context_md.borrow_mut() {
			let point = c.point(&ev);
			c.press(point);
		}
	};

	let context_ts = context.clone();
	let on_touchstart = move |ev: TouchEvent| {
		let touches = ev.touches();
		if touches.length() != 1 {
			return;
		}
		// Keeps the browser from synthesizing mouse events for this touch.
		ev.prevent_default();
		if let Some(ref mut c) = *context_ts.borrow_mut() {
			if let Some(point) = c.touch_point(touches) {
				c.press(point);
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let mut events = Vec::new();
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if !c.driver.is_dragging() && !c.pan.active {
				let point = c.point(&ev);
				events = c.driver.hover(point);
				if !events.is_empty() {
					c.frames.request_frame();
				}
			}
		}
		emit(on_event, events);
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let mut events = Vec::new();
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			events = c.driver.pointer_leave();
			c.frames.request_frame();
		}
		emit(on_event, events);
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let point = c.point(&ev);
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			c.driver.transform_mut().zoom_at(point, factor);
			c.frames.request_frame();
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
