use leptos::__reexports::send_wrapper::SendWrapper;
use leptos::prelude::*;
use log::warn;

use crate::components::cluster_graph::ClusterGraphCanvas;
use crate::feed::StatusFeed;

/// Status endpoint relative to wherever the dashboard is served from.
fn feed_url() -> Option<String> {
	let location = web_sys::window()?.location();
	let protocol = if location.protocol().ok()? == "https:" {
		"wss"
	} else {
		"ws"
	};
	let host = location.host().ok()?;
	Some(format!("{protocol}://{host}/_api/cluster/status/ws"))
}

/// Cluster topology page: the live graph plus a connection banner.
#[component]
pub fn Home() -> impl IntoView {
	let feed = match feed_url() {
		Some(url) => StatusFeed::start(&url),
		None => {
			warn!("no window location; falling back to localhost feed");
			StatusFeed::start("ws://localhost:6745/_api/cluster/status/ws")
		}
	};
	let peers = feed.peers();
	let connected = feed.connected();

	let feed = SendWrapper::new(feed);
	on_cleanup(move || feed.stop());

	view! {
		<div class="fullscreen-graph">
			<ClusterGraphCanvas peers=peers fullscreen=true />
			<div class="graph-overlay">
				<h1>"Cluster Topology"</h1>
				<p class="subtitle">
					"Live view of this node and its peers. Drag nodes to reposition."
				</p>
				<Show when=move || !connected.get()>
					<p class="feed-warning">"Connection to the cluster status feed failed. Retrying..."</p>
				</Show>
			</div>
		</div>
	}
}
