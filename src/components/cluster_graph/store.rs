use rand::Rng;

use super::types::{Node, Particle, PeerStatus};
use super::{particles, physics};

// Squared 30px grab radius for pointer hit-testing.
const HIT_RADIUS_SQ: f64 = 900.0;
// Frame deltas above this are a backgrounded tab catching up, not real time.
const DT_MAX: f64 = 0.1;

/// Owner of the node and particle sets.
///
/// Every mutation goes through one of the narrow methods below; reconcile,
/// the tick, and the drag handlers all run on the one UI thread, so ordering
/// (never locking) is what keeps them consistent.
pub struct NodeGraphStore {
	nodes: Vec<Node>,
	particles: Vec<Particle>,
	center: (f64, f64),
}

impl NodeGraphStore {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			nodes: Vec::new(),
			particles: Vec::new(),
			center: (width / 2.0, height / 2.0),
		}
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// Gravity target follows the surface center on resize. Existing node
	/// positions are left alone; the pull drifts them over.
	pub fn set_center(&mut self, width: f64, height: f64) {
		self.center = (width / 2.0, height / 2.0);
	}

	/// Fold a status snapshot into the node set.
	///
	/// The self node is created on first call and never removed. Peers absent
	/// from `peers` are dropped; peers merely reporting `is_connected: false`
	/// stay put. Surviving nodes keep position and velocity so the layout
	/// does not jump between snapshots, and calling this twice with the same
	/// list is a no-op the second time.
	pub fn reconcile(&mut self, peers: &[PeerStatus], rng: &mut impl Rng) {
		if !self.nodes.iter().any(|n| n.is_self) {
			self.nodes.push(Node::self_node(self.center));
		}

		self.nodes
			.retain(|n| n.is_self || peers.iter().any(|p| p.address == n.id));

		for peer in peers {
			match self.nodes.iter_mut().find(|n| n.id == peer.address) {
				Some(node) => node.connected = peer.is_connected,
				None => {
					let mut node = Node::peer(&peer.address, self.center, rng);
					node.connected = peer.is_connected;
					self.nodes.push(node);
				}
			}
		}
	}

	/// One simulation frame: forces, particle emission, particle motion.
	pub fn tick(&mut self, dt: f64, rng: &mut impl Rng) {
		let dt = dt.clamp(0.0, DT_MAX);
		physics::step(&mut self.nodes, self.center, dt);
		particles::spawn(&self.nodes, &mut self.particles, rng);
		particles::advance(&mut self.particles, dt);
	}

	/// First node within grab range of the pointer, in storage order.
	pub fn node_at(&self, x: f64, y: f64) -> Option<usize> {
		self.nodes.iter().position(|n| {
			let (dx, dy) = (n.x - x, n.y - y);
			dx * dx + dy * dy <= HIT_RADIUS_SQ
		})
	}

	/// Mark a node as dragged; returns its id for the drag session. Dragged
	/// nodes are skipped by the physics step until released.
	pub fn begin_drag(&mut self, idx: usize) -> Option<String> {
		let node = self.nodes.get_mut(idx)?;
		node.dragged = true;
		node.vx = 0.0;
		node.vy = 0.0;
		Some(node.id.clone())
	}

	/// Pin the dragged node under the pointer. Velocity stays zeroed so
	/// release does not impart a kick.
	pub fn update_drag(&mut self, id: &str, x: f64, y: f64) {
		if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
			node.x = x;
			node.y = y;
			node.vx = 0.0;
			node.vy = 0.0;
		}
	}

	/// Soft release: the node rejoins the simulation from rest.
	pub fn end_drag(&mut self, id: &str) {
		if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
			node.dragged = false;
		}
	}
}
