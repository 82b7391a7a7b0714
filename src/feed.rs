//! WebSocket subscription to the cluster-status endpoint.
//!
//! The server pushes one JSON snapshot per second on
//! `/_api/cluster/status/ws`. The feed parses each snapshot into peer
//! records and republishes them as a signal; bad payloads are logged and
//! dropped so the last good roster stays on screen. A lost connection is
//! retried on a fixed delay until [`StatusFeed::stop`] is called.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{MessageEvent, WebSocket};

use crate::components::cluster_graph::{ClusterStatus, PeerStatus};

const RECONNECT_DELAY_MS: i32 = 3_000;

struct FeedInner {
	url: String,
	socket: Option<WebSocket>,
	reconnect_timer: Option<i32>,
	stopped: bool,
	// Keep the socket callbacks alive for the socket's lifetime.
	on_open: Option<Closure<dyn FnMut()>>,
	on_message: Option<Closure<dyn FnMut(MessageEvent)>>,
	on_close: Option<Closure<dyn FnMut()>>,
	reconnect_cb: Option<Closure<dyn FnMut()>>,
}

/// Owns the socket, its callbacks, and the pending reconnect timer.
///
/// `stop()` tears all three down; dropping the feed without stopping it
/// would leave the reconnect timer re-opening sockets forever.
pub struct StatusFeed {
	inner: Rc<RefCell<FeedInner>>,
	peers: ReadSignal<Vec<PeerStatus>>,
	connected: ReadSignal<bool>,
}

impl StatusFeed {
	/// Open the feed and keep it open until `stop()`.
	pub fn start(url: &str) -> Self {
		let (peers, set_peers) = signal(Vec::new());
		let (connected, set_connected) = signal(false);

		let inner = Rc::new(RefCell::new(FeedInner {
			url: url.to_owned(),
			socket: None,
			reconnect_timer: None,
			stopped: false,
			on_open: None,
			on_message: None,
			on_close: None,
			reconnect_cb: None,
		}));
		connect(&inner, set_peers, set_connected);

		Self {
			inner,
			peers,
			connected,
		}
	}

	/// Latest successfully parsed peer roster.
	pub fn peers(&self) -> ReadSignal<Vec<PeerStatus>> {
		self.peers
	}

	/// Whether the socket is currently open.
	pub fn connected(&self) -> ReadSignal<bool> {
		self.connected
	}

	/// Close the socket, cancel any pending reconnect, drop the callbacks.
	pub fn stop(&self) {
		let mut inner = self.inner.borrow_mut();
		inner.stopped = true;
		if let Some(timer) = inner.reconnect_timer.take() {
			if let Some(win) = web_sys::window() {
				win.clear_timeout_with_handle(timer);
			}
		}
		if let Some(socket) = inner.socket.take() {
			socket.set_onopen(None);
			socket.set_onmessage(None);
			socket.set_onclose(None);
			socket.set_onerror(None);
			let _ = socket.close();
		}
		inner.on_open = None;
		inner.on_message = None;
		inner.on_close = None;
		inner.reconnect_cb = None;
	}
}

fn connect(
	inner: &Rc<RefCell<FeedInner>>,
	set_peers: WriteSignal<Vec<PeerStatus>>,
	set_connected: WriteSignal<bool>,
) {
	let url = {
		let mut inner = inner.borrow_mut();
		// Detach the previous socket before its closures are replaced.
		if let Some(old) = inner.socket.take() {
			old.set_onopen(None);
			old.set_onmessage(None);
			old.set_onclose(None);
			let _ = old.close();
		}
		inner.url.clone()
	};
	let socket = match WebSocket::new(&url) {
		Ok(socket) => socket,
		Err(err) => {
			warn!("status feed: cannot open {url}: {err:?}");
			schedule_reconnect(inner, set_peers, set_connected);
			return;
		}
	};

	let on_open = Closure::<dyn FnMut()>::new(move || {
		info!("status feed connected");
		set_connected.set(true);
	});
	socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));

	let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
		let Some(text) = ev.data().as_string() else {
			return;
		};
		match serde_json::from_str::<ClusterStatus>(&text) {
			Ok(status) => set_peers.set(status.peers),
			// Keep the previous roster; a bad frame is not a roster change.
			Err(err) => warn!("status feed: unparseable snapshot: {err}"),
		}
	});
	socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

	let inner_close = inner.clone();
	let on_close = Closure::<dyn FnMut()>::new(move || {
		set_connected.set(false);
		schedule_reconnect(&inner_close, set_peers, set_connected);
	});
	// "error" fires right before "close" on failed sockets; close alone is
	// enough to drive the retry.
	socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

	let mut inner = inner.borrow_mut();
	inner.socket = Some(socket);
	inner.on_open = Some(on_open);
	inner.on_message = Some(on_message);
	inner.on_close = Some(on_close);
}

fn schedule_reconnect(
	inner: &Rc<RefCell<FeedInner>>,
	set_peers: WriteSignal<Vec<PeerStatus>>,
	set_connected: WriteSignal<bool>,
) {
	{
		let inner = inner.borrow();
		if inner.stopped || inner.reconnect_timer.is_some() {
			return;
		}
	}
	let Some(win) = web_sys::window() else {
		return;
	};

	let inner_retry = inner.clone();
	let cb = Closure::<dyn FnMut()>::new(move || {
		{
			let mut inner = inner_retry.borrow_mut();
			inner.reconnect_timer = None;
			if inner.stopped {
				return;
			}
		}
		info!("status feed: reconnecting");
		connect(&inner_retry, set_peers, set_connected);
	});

	match win.set_timeout_with_callback_and_timeout_and_arguments_0(
		cb.as_ref().unchecked_ref(),
		RECONNECT_DELAY_MS,
	) {
		Ok(timer) => {
			let mut inner = inner.borrow_mut();
			inner.reconnect_timer = Some(timer);
			inner.reconnect_cb = Some(cb);
		}
		Err(err) => warn!("status feed: cannot schedule reconnect: {err:?}"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn snapshot_parses_down_to_peer_records() {
		let payload = r#"{
			"node_id": "node-a",
			"status": "cluster",
			"replication_port": 6746,
			"current_sequence": 42,
			"log_entries": 42,
			"peers": [
				{"address": "10.0.0.1:6746", "is_connected": true,
				 "last_seen_secs_ago": 1, "replication_lag": 0, "stats": null},
				{"address": "10.0.0.2:6746", "is_connected": false,
				 "last_seen_secs_ago": 30, "replication_lag": 5, "stats": null}
			],
			"data_dir": "/var/lib/db",
			"stats": {"cpu": 0.2}
		}"#;

		let status: ClusterStatus = serde_json::from_str(payload).unwrap();
		assert_eq!(
			status.peers,
			vec![
				PeerStatus {
					address: "10.0.0.1:6746".into(),
					is_connected: true,
				},
				PeerStatus {
					address: "10.0.0.2:6746".into(),
					is_connected: false,
				},
			]
		);
	}

	#[test]
	fn standalone_snapshot_has_empty_roster() {
		let status: ClusterStatus =
			serde_json::from_str(r#"{"status": "standalone"}"#).unwrap();
		assert!(status.peers.is_empty());
	}

	#[test]
	fn malformed_snapshot_is_an_error_not_a_panic() {
		assert!(serde_json::from_str::<ClusterStatus>("{not json").is_err());
		assert!(serde_json::from_str::<ClusterStatus>(r#"{"peers": 3}"#).is_err());
	}
}
