use rand::Rng;

use super::types::{Node, Particle};

// Per-frame chance of emitting one traffic dot.
const SPAWN_CHANCE: f64 = 0.05;

/// Maybe emit one particle from the self node toward a random connected peer.
///
/// Nothing is emitted while no peer is connected; the target position is
/// captured once at spawn time.
pub fn spawn(nodes: &[Node], particles: &mut Vec<Particle>, rng: &mut impl Rng) {
	if rng.r#gen::<f64>() >= SPAWN_CHANCE {
		return;
	}
	let Some(origin) = nodes.iter().find(|n| n.is_self) else {
		return;
	};
	let connected: Vec<&Node> = nodes
		.iter()
		.filter(|n| !n.is_self && n.connected)
		.collect();
	if connected.is_empty() {
		return;
	}
	let target = connected[rng.gen_range(0..connected.len())];
	particles.push(Particle::new(origin, target, rng));
}

/// Advance all particles by `dt`, dropping the ones that arrived.
///
/// Position moves toward the target by the `speed * dt` fraction of the
/// remaining distance rather than by a strict lerp over `progress`, so dots
/// ease in as they approach. That matches the shipped visual behavior and is
/// kept deliberately.
pub fn advance(particles: &mut Vec<Particle>, dt: f64) {
	particles.retain_mut(|p| {
		p.progress += p.speed * dt;
		if p.progress >= 1.0 {
			return false;
		}
		let frac = p.speed * dt;
		p.x += (p.tx - p.x) * frac;
		p.y += (p.ty - p.y) * frac;
		true
	});
}
