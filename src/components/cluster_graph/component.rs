use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::__reexports::send_wrapper::SendWrapper;
use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::input::InputController;
use super::render;
use super::store::NodeGraphStore;
use super::types::{PeerStatus, PointerEvent};

struct GraphState {
	store: NodeGraphStore,
	input: InputController,
	ctx: CanvasRenderingContext2d,
	width: f64,
	height: f64,
	last_frame_ms: Option<f64>,
}

impl GraphState {
	fn tick(&mut self, now_ms: f64) {
		let dt = match self.last_frame_ms {
			Some(last) => (now_ms - last) / 1000.0,
			None => 0.0,
		};
		self.last_frame_ms = Some(now_ms);
		self.store.tick(dt, &mut rand::thread_rng());

		if let Err(err) = render::draw(
			&self.ctx,
			self.width,
			self.height,
			self.store.nodes(),
			self.store.particles(),
		) {
			// A bad frame must not stop the loop; the next one is rescheduled
			// by the caller regardless.
			warn!("cluster graph draw failed: {err:?}");
		}
	}

	fn pointer(&mut self, event: PointerEvent) {
		self.input.handle(event, &mut self.store);
	}
}

/// Live cluster topology: the local node in the middle, one spoke per peer,
/// traffic particles on connected spokes. Nodes can be dragged.
#[component]
pub fn ClusterGraphCanvas(
	#[prop(into)] peers: Signal<Vec<PeerStatus>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<GraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let raf_handle: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let (state_init, animate_init, resize_cb_init, raf_init) = (
		state.clone(),
		animate.clone(),
		resize_cb.clone(),
		raf_handle.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			(
				window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
				window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
			)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		// No 2d context means nothing useful to render; skip the simulation
		// entirely rather than fail loudly.
		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					warn!("canvas 2d context has an unexpected type");
					return;
				}
			},
			_ => {
				warn!("canvas 2d context unavailable; cluster graph disabled");
				return;
			}
		};
		*state_init.borrow_mut() = Some(GraphState {
			store: NodeGraphStore::new(w, h),
			input: InputController::new(),
			ctx,
			width: w,
			height: h,
			last_frame_ms: None,
		});

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = (
					win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
					win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.width = nw;
					s.height = nh;
					// The gravity center follows the surface; node positions
					// are not rescaled.
					s.store.set_center(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner, raf_inner) =
			(state_init.clone(), animate_init.clone(), raf_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move |now_ms: f64| {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(now_ms);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					raf_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			raf_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	// Snapshots may arrive between any two ticks; reconciliation runs to
	// completion here, on the same thread, before the next tick reads the set.
	let state_feed = state.clone();
	Effect::new(move |_| {
		let peers = peers.get();
		if let Some(ref mut s) = *state_feed.borrow_mut() {
			s.store.reconcile(&peers, &mut rand::thread_rng());
		}
	});

	let pointer_pos = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_pos(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer(PointerEvent::Down { x, y });
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_pos(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer(PointerEvent::Move { x, y });
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer(PointerEvent::Up);
		}
	};

	// Leaving the surface releases the drag the same way a mouseup does.
	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer(PointerEvent::Up);
		}
	};

	let cleanup_state = SendWrapper::new((raf_handle, resize_cb, animate, state));
	on_cleanup(move || {
		let (raf_handle, resize_cb, animate, state) = &*cleanup_state;
		if let Some(win) = web_sys::window() {
			if let Some(handle) = raf_handle.take() {
				let _ = win.cancel_animation_frame(handle);
			}
			if let Some(cb) = resize_cb.borrow_mut().take() {
				let _ = win
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		*animate.borrow_mut() = None;
		*state.borrow_mut() = None;
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="cluster-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			style="display: block; cursor: grab;"
		/>
	}
}
