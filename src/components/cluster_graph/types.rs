use std::f64::consts::PI;

use rand::Rng;
use serde::Deserialize;

/// Id of the local node; peers are keyed by their network address.
pub const SELF_ID: &str = "self";

const SPAWN_RING_RADIUS: f64 = 100.0;
const SPAWN_RING_SPREAD: f64 = 50.0;

/// A visual vertex of the cluster star topology.
#[derive(Clone, Debug)]
pub struct Node {
	pub id: String,
	pub is_self: bool,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub label: String,
	pub connected: bool,
	pub dragged: bool,
}

impl Node {
	/// The local node, created at the surface center.
	pub fn self_node(center: (f64, f64)) -> Self {
		Self {
			id: SELF_ID.into(),
			is_self: true,
			x: center.0,
			y: center.1,
			vx: 0.0,
			vy: 0.0,
			label: "local".into(),
			connected: true,
			dragged: false,
		}
	}

	/// A newly discovered peer, spawned on a ring around `center` so
	/// simultaneous arrivals do not stack on one point.
	pub fn peer(address: &str, center: (f64, f64), rng: &mut impl Rng) -> Self {
		let angle = rng.r#gen::<f64>() * 2.0 * PI;
		let radius = SPAWN_RING_RADIUS + rng.r#gen::<f64>() * SPAWN_RING_SPREAD;
		Self {
			id: address.into(),
			is_self: false,
			x: center.0 + angle.cos() * radius,
			y: center.1 + angle.sin() * radius,
			vx: 0.0,
			vy: 0.0,
			label: address.into(),
			connected: false,
			dragged: false,
		}
	}
}

/// A transient traffic dot travelling from the self node to a peer.
///
/// The target is snapshotted at spawn time and not re-tracked if the peer
/// moves afterwards.
#[derive(Clone, Debug)]
pub struct Particle {
	pub x: f64,
	pub y: f64,
	pub tx: f64,
	pub ty: f64,
	pub progress: f64,
	pub speed: f64,
}

impl Particle {
	pub fn new(from: &Node, to: &Node, rng: &mut impl Rng) -> Self {
		Self {
			x: from.x,
			y: from.y,
			tx: to.x,
			ty: to.y,
			progress: 0.0,
			speed: 0.5 + rng.r#gen::<f64>(),
		}
	}
}

/// One peer entry of a cluster-status snapshot. The live payload carries
/// more fields (lag, heartbeat age, stats); the visualizer reads only these.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PeerStatus {
	pub address: String,
	pub is_connected: bool,
}

/// The status-feed payload as pushed by the server.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ClusterStatus {
	#[serde(default)]
	pub peers: Vec<PeerStatus>,
}

/// Surface-relative pointer input, decoupled from any UI event type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
	Down { x: f64, y: f64 },
	Move { x: f64, y: f64 },
	Up,
}
