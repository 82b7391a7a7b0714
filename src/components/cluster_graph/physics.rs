use super::types::Node;

const REPULSION: f64 = 25_000.0;
const MIN_SEPARATION: f64 = 100.0;
const SEPARATION_STRENGTH: f64 = 2.0;
const GRAVITY_SELF: f64 = 1.5;
const GRAVITY_PEER: f64 = 0.3;
const DAMPING: f64 = 0.90;
// Keeps the pairwise force finite when two nodes land on the same point.
const DIST_EPSILON: f64 = 0.1;

/// One force/integration step over the whole node set.
///
/// Each unordered pair contributes an inverse-square repulsion plus a
/// spring-like separation push below the minimum visual distance; each node
/// is then pulled toward `center`, damped, and integrated. Dragged nodes are
/// exempt from all of it — the input controller owns their position while
/// the drag lasts. Tuned for visual stability, not physical accuracy.
pub fn step(nodes: &mut [Node], center: (f64, f64), dt: f64) {
	for a in 0..nodes.len() {
		for b in (a + 1)..nodes.len() {
			let dx = nodes[b].x - nodes[a].x;
			let dy = nodes[b].y - nodes[a].y;
			let dist = (dx * dx + dy * dy).sqrt() + DIST_EPSILON;

			let mut force = REPULSION / (dist * dist);
			if dist < MIN_SEPARATION {
				force += (MIN_SEPARATION - dist) * SEPARATION_STRENGTH;
			}

			let fx = dx / dist * force * dt;
			let fy = dy / dist * force * dt;
			if !nodes[a].dragged {
				nodes[a].vx -= fx;
				nodes[a].vy -= fy;
			}
			if !nodes[b].dragged {
				nodes[b].vx += fx;
				nodes[b].vy += fy;
			}
		}
	}

	for node in nodes.iter_mut() {
		if node.dragged {
			continue;
		}
		let pull = if node.is_self { GRAVITY_SELF } else { GRAVITY_PEER };
		node.vx += (center.0 - node.x) * pull * dt;
		node.vy += (center.1 - node.y) * pull * dt;
		node.vx *= DAMPING;
		node.vy *= DAMPING;
		node.x += node.vx * dt;
		node.y += node.vy * dt;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node_at(id: &str, x: f64, y: f64) -> Node {
		Node {
			id: id.into(),
			is_self: false,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			label: id.into(),
			connected: true,
			dragged: false,
		}
	}

	fn distance(a: &Node, b: &Node) -> f64 {
		((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
	}

	#[test]
	fn overlapping_nodes_separate() {
		let mut nodes = vec![node_at("a", 95.0, 100.0), node_at("b", 105.0, 100.0)];
		let center = (100.0, 100.0);

		let mut prev = distance(&nodes[0], &nodes[1]);
		for _ in 0..50 {
			step(&mut nodes, center, 0.016);
			let dist = distance(&nodes[0], &nodes[1]);
			assert!(
				dist > prev,
				"nodes collapsed: {dist} after being {prev} apart"
			);
			prev = dist;
		}
	}

	#[test]
	fn dragged_node_is_not_moved() {
		let mut nodes = vec![node_at("a", 95.0, 100.0), node_at("b", 105.0, 100.0)];
		nodes[0].dragged = true;

		step(&mut nodes, (300.0, 300.0), 0.1);

		assert_eq!((nodes[0].x, nodes[0].y), (95.0, 100.0));
		assert_eq!((nodes[0].vx, nodes[0].vy), (0.0, 0.0));
		// The free node still reacts to the dragged one.
		assert!(nodes[1].x > 105.0);
	}

	#[test]
	fn gravity_pulls_toward_center() {
		let mut nodes = vec![node_at("a", 500.0, 100.0)];
		let mut prev = 400.0;
		for _ in 0..100 {
			step(&mut nodes, (100.0, 100.0), 0.016);
			let dist = (nodes[0].x - 100.0).abs();
			assert!(dist < prev + 1e-9);
			prev = dist;
		}
		assert!(prev < 400.0);
	}

	#[test]
	fn self_node_is_pulled_harder_than_peer() {
		let mut nodes = vec![node_at("self", 1000.0, 100.0), node_at("peer", -800.0, 100.0)];
		nodes[0].is_self = true;

		// Far enough apart that repulsion is negligible next to gravity.
		for _ in 0..10 {
			step(&mut nodes, (100.0, 100.0), 0.016);
		}
		let self_travel = 1000.0 - nodes[0].x;
		let peer_travel = nodes[1].x - (-800.0);
		assert!(self_travel > peer_travel);
	}

	#[test]
	fn damping_drains_velocity() {
		let mut nodes = vec![node_at("a", 100.0, 100.0)];
		nodes[0].vx = 1000.0;

		// dt = 0 freezes positions but damping still applies each frame.
		for _ in 0..200 {
			step(&mut nodes, (100.0, 100.0), 0.0);
		}
		assert!(nodes[0].vx.abs() < 1e-6);
	}

	#[test]
	fn coincident_nodes_do_not_produce_nan() {
		let mut nodes = vec![node_at("a", 100.0, 100.0), node_at("b", 100.0, 100.0)];
		step(&mut nodes, (100.0, 100.0), 0.016);
		for node in &nodes {
			assert!(node.x.is_finite() && node.y.is_finite());
			assert!(node.vx.is_finite() && node.vy.is_finite());
		}
	}
}
